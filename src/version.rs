// Version information for the salted exchange node

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-salted-ecdh-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "p256-ecdh-key-exchange",
    "openssl-salted-envelope",
    "evp-bytes-to-key-md5",
    "aes-256-cbc",
    "per-session-peer-keys",
    "strict-padding-mode",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Salted Exchange Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info for API responses
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
