// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Secure channel tests from the client's point of view

use salted_exchange_node::crypto::{
    derive_shared_secret, salted, CipherOptions, CryptoError, PaddingMode, PeerPublicKey,
    SecretEncoding, ServerKeyPair,
};
use salted_exchange_node::session::SecureChannel;
use std::sync::Arc;

/// Client half of the exchange: its key pair and the password it derived
struct Client {
    keypair: ServerKeyPair,
    password: Option<String>,
}

impl Client {
    fn new() -> Self {
        Self {
            keypair: ServerKeyPair::generate().unwrap(),
            password: None,
        }
    }

    async fn exchange(&mut self, node: &SecureChannel, session_id: &str) {
        let node_hex = node
            .exchange_public_keys(session_id, &self.keypair.public_key_hex())
            .await
            .unwrap();
        let node_pub = PeerPublicKey::from_hex(&node_hex).unwrap();
        let secret = derive_shared_secret(&self.keypair, &node_pub, node.options().secret_encoding);
        self.password = Some(secret.to_password());
    }

    fn password(&self) -> &[u8] {
        self.password.as_deref().unwrap().as_bytes()
    }
}

fn node(options: CipherOptions) -> SecureChannel {
    SecureChannel::new(Arc::new(ServerKeyPair::generate().unwrap()), options)
}

#[tokio::test]
async fn test_exchange_returns_node_public_key() {
    let node = node(CipherOptions::default());
    let client = Client::new();

    let returned = node
        .exchange_public_keys("s1", &client.keypair.public_key_hex())
        .await
        .unwrap();

    assert_eq!(returned, node.server_public_key_hex());
    assert!(returned.starts_with("04"));
    assert_eq!(returned.len(), 130);
}

#[tokio::test]
async fn test_message_flow_both_directions() {
    let node = node(CipherOptions::default());
    let mut client = Client::new();
    client.exchange(&node, "s1").await;

    let request = salted::encode_base64(b"what time is it", client.password()).unwrap();
    assert_eq!(
        node.decrypt_message("s1", &request).await.unwrap(),
        b"what time is it"
    );

    let reply = node.encrypt_message("s1", b"noon").await.unwrap();
    assert_eq!(
        salted::decode_base64(&reply, client.password(), PaddingMode::Lenient).unwrap(),
        b"noon"
    );
}

#[tokio::test]
async fn test_strict_padded_options() {
    let options = CipherOptions {
        padding: PaddingMode::Strict,
        secret_encoding: SecretEncoding::Padded,
    };
    let node = node(options);
    let mut client = Client::new();
    client.exchange(&node, "s1").await;

    assert_eq!(client.password().len(), 64);
    let request = salted::encode_base64(b"strict", client.password()).unwrap();
    assert_eq!(node.decrypt_message("s1", &request).await.unwrap(), b"strict");
}

#[tokio::test]
async fn test_reexchange_switches_password() {
    let node = node(CipherOptions::default());
    let mut old_client = Client::new();
    old_client.exchange(&node, "s1").await;
    let old_envelope = salted::encode(b"stale", old_client.password()).unwrap();

    let mut new_client = Client::new();
    new_client.exchange(&node, "s1").await;

    let fresh = salted::encode_base64(b"fresh", new_client.password()).unwrap();
    assert_eq!(node.decrypt_message("s1", &fresh).await.unwrap(), b"fresh");

    // Old password no longer applies: padding error or garbage
    let old_b64 = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, old_envelope);
    match node.decrypt_message("s1", &old_b64).await {
        Ok(plaintext) => assert_ne!(plaintext, b"stale"),
        Err(e) => assert!(matches!(e, CryptoError::Padding { .. })),
    }
}

#[tokio::test]
async fn test_decrypt_without_exchange() {
    let node = node(CipherOptions::default());
    let envelope = salted::encode_base64(b"early", b"anything").unwrap();

    let err = node.decrypt_message("s1", &envelope).await.unwrap_err();
    assert_eq!(err.kind(), "no_peer_key");
}

#[tokio::test]
async fn test_malformed_message_reports_kind() {
    let node = node(CipherOptions::default());
    let mut client = Client::new();
    client.exchange(&node, "s1").await;

    let err = node.decrypt_message("s1", "%%%").await.unwrap_err();
    assert_eq!(err.kind(), "decode_error");

    // "AAAA" decodes to 3 bytes
    let err = node.decrypt_message("s1", "AAAA").await.unwrap_err();
    assert!(matches!(err, CryptoError::MalformedEnvelope { min: 16, actual: 3 }));
}

#[tokio::test]
async fn test_clients_in_parallel() {
    let node = node(CipherOptions::default());
    let mut handles = vec![];

    for i in 0..8 {
        let node_clone = node.clone();
        handles.push(tokio::spawn(async move {
            let session_id = format!("tab-{}", i);
            let mut client = Client::new();
            client.exchange(&node_clone, &session_id).await;

            let message = format!("message {}", i);
            let request = salted::encode_base64(message.as_bytes(), client.password()).unwrap();
            let plaintext = node_clone.decrypt_message(&session_id, &request).await.unwrap();
            assert_eq!(plaintext, message.as_bytes());
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(node.peers().count().await, 8);
}
