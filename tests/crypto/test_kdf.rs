// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Tests for the EVP_BytesToKey (MD5) key derivation
//!
//! Golden values were produced with:
//! `openssl enc -aes-256-cbc -md md5 -k test-password -S 0102030405060708 -P`

use salted_exchange_node::crypto::evp_bytes_to_key;

const SALT: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

#[test]
fn test_golden_vector_matches_openssl() {
    let derived = evp_bytes_to_key(b"test-password", &SALT);

    let mut material = derived.key.to_vec();
    material.extend_from_slice(&derived.iv);
    assert_eq!(material.len(), 48, "KDF must produce 48 bytes of material");

    assert_eq!(
        hex::encode(material),
        "44b674175973e2b2976839d5f66ae13e1d48a0f352f511a76ce72253d1296f82\
         b2ac14b42695abd93eb0b39d0ada51bd"
    );
}

#[test]
fn test_deterministic_for_same_inputs() {
    let first = evp_bytes_to_key(b"some shared secret", &SALT);
    for _ in 0..10 {
        assert_eq!(evp_bytes_to_key(b"some shared secret", &SALT), first);
    }
}

#[test]
fn test_password_bit_flip_changes_key_and_iv() {
    let base = evp_bytes_to_key(b"test-password", &SALT);

    let mut flipped = b"test-password".to_vec();
    flipped[0] ^= 0x01;
    let changed = evp_bytes_to_key(&flipped, &SALT);

    assert_ne!(base.key, changed.key, "key must change on password bit flip");
    assert_ne!(base.iv, changed.iv, "iv must change on password bit flip");
}

#[test]
fn test_salt_bit_flip_changes_key_and_iv() {
    let base = evp_bytes_to_key(b"test-password", &SALT);

    let mut salt = SALT;
    salt[7] ^= 0x80;
    let changed = evp_bytes_to_key(b"test-password", &salt);

    assert_ne!(base.key, changed.key, "key must change on salt bit flip");
    assert_ne!(base.iv, changed.iv, "iv must change on salt bit flip");
}

#[test]
fn test_empty_password_is_accepted() {
    let derived = evp_bytes_to_key(b"", &SALT);
    assert_eq!(derived.key.len(), 32);
    assert_eq!(derived.iv.len(), 16);
}

#[test]
fn test_key_halves_are_chained_digests() {
    // key = D1 || D2 where D2 depends on D1, so the halves must differ
    let derived = evp_bytes_to_key(b"test-password", &SALT);
    assert_ne!(derived.key[..16], derived.key[16..]);
    assert_ne!(derived.key[16..], derived.iv[..]);
}
