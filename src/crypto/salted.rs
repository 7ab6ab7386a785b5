// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenSSL "Salted__" AES-256-CBC Envelope
//!
//! Password-based encryption compatible with `openssl enc -aes-256-cbc -md md5`
//! and CryptoJS `AES.encrypt(message, passphrase)`.
//!
//! **Envelope Format**:
//! ```text
//! ["Salted__" (8 bytes) | salt (8 bytes) | AES-256-CBC(pkcs7(plaintext))]
//! ```
//!
//! - Salt: 8 random bytes, fresh for every encode
//! - Key/IV: EVP_BytesToKey(MD5) of password and salt, see [`super::kdf`]
//! - No length field; the body is always a whole number of 16-byte blocks
//! - No MAC. A wrong password usually fails the pad check but may also
//!   return garbage
//!
//! On the wire the envelope is carried as standard base64 with padding,
//! which is what CryptoJS's `toString()` emits (`U2FsdGVkX1...`).

use super::kdf::{evp_bytes_to_key, SALT_LEN};
use super::padding::{self, PaddingMode, BLOCK_SIZE};
use super::CryptoError;
use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Marker at the start of every envelope
pub const SALTED_MAGIC: &[u8; 8] = b"Salted__";

/// Marker plus salt
pub const HEADER_LEN: usize = SALTED_MAGIC.len() + SALT_LEN;

/// Envelope length for a plaintext of `plaintext_len` bytes
pub fn envelope_len(plaintext_len: usize) -> usize {
    HEADER_LEN + (plaintext_len / BLOCK_SIZE + 1) * BLOCK_SIZE
}

/// Draw a fresh salt from the OS randomness source
pub fn generate_salt() -> Result<[u8; SALT_LEN], CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::Randomness(e.to_string()))?;
    Ok(salt)
}

/// Encrypt `plaintext` under `password` with a fresh random salt
pub fn encode(plaintext: &[u8], password: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let salt = generate_salt()?;
    encode_with_salt(plaintext, password, &salt)
}

/// Encrypt with a caller-chosen salt
///
/// Reusing a salt with the same password reuses the key and IV, so this is
/// only for reproducing fixtures (e.g. `openssl enc -S`).
pub fn encode_with_salt(
    plaintext: &[u8],
    password: &[u8],
    salt: &[u8; SALT_LEN],
) -> Result<Vec<u8>, CryptoError> {
    let derived = evp_bytes_to_key(password, salt);

    let mut body = padding::pad(plaintext);
    let body_len = body.len();

    let cipher = Aes256CbcEnc::new_from_slices(&derived.key, &derived.iv).map_err(|e| {
        CryptoError::Cipher {
            reason: format!("failed to create AES-256-CBC encryptor: {}", e),
        }
    })?;
    cipher
        .encrypt_padded_mut::<NoPadding>(&mut body, body_len)
        .map_err(|e| CryptoError::Cipher {
            reason: format!("encryption failed: {}", e),
        })?;

    let mut envelope = Vec::with_capacity(HEADER_LEN + body_len);
    envelope.extend_from_slice(SALTED_MAGIC);
    envelope.extend_from_slice(salt);
    envelope.extend_from_slice(&body);

    Ok(envelope)
}

/// Decrypt an envelope produced by [`encode`], OpenSSL or CryptoJS
///
/// # Errors
///
/// - `CryptoError::MalformedEnvelope` if shorter than 16 bytes
/// - `CryptoError::BadMarker` (strict mode only) if the marker is not `Salted__`
/// - `CryptoError::Cipher` if the body is not block aligned
/// - `CryptoError::Padding` if the recovered pad is out of range for `mode`
pub fn decode(envelope: &[u8], password: &[u8], mode: PaddingMode) -> Result<Vec<u8>, CryptoError> {
    if envelope.len() < HEADER_LEN {
        return Err(CryptoError::MalformedEnvelope {
            min: HEADER_LEN,
            actual: envelope.len(),
        });
    }

    // The deployed peers never look at the marker; only strict mode does
    let marker = &envelope[..SALTED_MAGIC.len()];
    if mode == PaddingMode::Strict && marker != SALTED_MAGIC {
        return Err(CryptoError::BadMarker {
            found: format!("0x{}", hex::encode(marker)),
        });
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&envelope[SALTED_MAGIC.len()..HEADER_LEN]);

    let ciphertext = &envelope[HEADER_LEN..];
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Cipher {
            reason: format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                BLOCK_SIZE
            ),
        });
    }

    let derived = evp_bytes_to_key(password, &salt);
    let mut body = ciphertext.to_vec();

    let cipher = Aes256CbcDec::new_from_slices(&derived.key, &derived.iv).map_err(|e| {
        CryptoError::Cipher {
            reason: format!("failed to create AES-256-CBC decryptor: {}", e),
        }
    })?;
    cipher
        .decrypt_padded_mut::<NoPadding>(&mut body)
        .map_err(|e| CryptoError::Cipher {
            reason: format!("decryption failed: {}", e),
        })?;

    let plaintext_len = padding::unpadded_len(&body, mode)?;
    body.truncate(plaintext_len);

    Ok(body)
}

/// [`encode`] and render as standard base64
pub fn encode_base64(plaintext: &[u8], password: &[u8]) -> Result<String, CryptoError> {
    Ok(BASE64.encode(encode(plaintext, password)?))
}

/// Parse standard base64 and [`decode`]
pub fn decode_base64(
    encoded: &str,
    password: &[u8],
    mode: PaddingMode,
) -> Result<Vec<u8>, CryptoError> {
    let envelope = BASE64.decode(encoded.trim())?;
    decode(&envelope, password, mode)
}
