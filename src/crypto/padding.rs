// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PKCS7-style byte padding for the 16-byte AES block
//!
//! Encoding always appends 1..=16 bytes whose value is the pad length. How
//! strictly decoding checks that is selected by [`PaddingMode`].

use super::CryptoError;
use serde::{Deserialize, Serialize};

pub const BLOCK_SIZE: usize = 16;

/// Strictness of the pad check on decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    /// Only the final byte is checked: `1 <= p <= len`.
    /// This is what the deployed peers accept.
    #[default]
    Lenient,
    /// Full PKCS7: `1 <= p <= 16` and all `p` trailing bytes equal `p`
    Strict,
}

/// Append PKCS7 padding, always adding at least one byte
pub fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.resize(data.len() + pad_len, pad_len as u8);
    padded
}

/// Length of `data` once the padding is removed
pub fn unpadded_len(data: &[u8], mode: PaddingMode) -> Result<usize, CryptoError> {
    let Some(&last) = data.last() else {
        return Err(CryptoError::Padding {
            reason: "no data to unpad".to_string(),
        });
    };
    let pad_len = last as usize;

    if pad_len == 0 || pad_len > data.len() {
        return Err(CryptoError::Padding {
            reason: format!("pad length {} out of range for {} bytes", pad_len, data.len()),
        });
    }

    if mode == PaddingMode::Strict {
        if pad_len > BLOCK_SIZE {
            return Err(CryptoError::Padding {
                reason: format!("pad length {} exceeds block size", pad_len),
            });
        }
        if data[data.len() - pad_len..].iter().any(|&b| b != last) {
            return Err(CryptoError::Padding {
                reason: "pad bytes do not match pad length".to_string(),
            });
        }
    }

    Ok(data.len() - pad_len)
}
