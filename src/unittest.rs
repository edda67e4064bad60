//! Shared fixtures for the unit tests in this crate.

use {
    crate::codec,
    chrono::{DateTime, Utc},
    lazy_static::lazy_static,
    rsa::{
        pkcs1v15::SigningKey,
        pkcs8::{EncodePublicKey, LineEnding},
        signature::{SignatureEncoding, Signer},
        RsaPrivateKey,
    },
    sha1::Sha1,
    std::{fs, path::PathBuf},
    tempfile::TempDir,
};

/// Key pair id used throughout the tests.
pub(crate) const TEST_KEY_PAIR_ID: &str = "test-keypair";

/// Resource URL used throughout the tests.
pub(crate) const TEST_URL: &str = "http://localhost/test/url.html";

lazy_static! {
    // Generating an RSA key is slow; every test shares this one.
    static ref TEST_PRIVATE_KEY: RsaPrivateKey =
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).expect("RSA key generation failed");
}

/// A test key pair on disk: the public half as an SPKI PEM file in a temporary directory, the
/// private half in memory for signing.
pub(crate) struct TestKey {
    /// Holds the key file; the directory is removed when the fixture drops.
    pub(crate) dir: TempDir,
    pub(crate) key_file: PathBuf,
    pub(crate) private_key: RsaPrivateKey,
}

/// Write the shared test key pair's public key to a fresh temporary directory.
pub(crate) fn test_key() -> TestKey {
    let private_key = TEST_PRIVATE_KEY.clone();
    let dir = TempDir::new().expect("unable to create temporary directory");
    let key_file = dir.path().join("test-key.pem");
    let pem = private_key.to_public_key().to_public_key_pem(LineEnding::LF).expect("unable to encode public key");
    fs::write(&key_file, pem).expect("unable to write key file");

    TestKey {
        dir,
        key_file,
        private_key,
    }
}

/// Sign canonical bytes the way the provider's signer does: RSA/SHA-1 with PKCS#1 v1.5 padding.
pub(crate) fn sign_canonical(key: &RsaPrivateKey, canonical: &[u8]) -> Vec<u8> {
    SigningKey::<Sha1>::new(key.clone()).sign(canonical).to_vec()
}

/// Sign canonical bytes and return the signature in wire form (custom-alphabet base64).
pub(crate) fn sign_to_wire(key: &RsaPrivateKey, canonical: &[u8]) -> String {
    codec::encode_wire_b64(&sign_canonical(key, canonical))
}

/// Build a signed URL carrying a canned policy, the way the provider's URL signer lays out the
/// query parameters.
pub(crate) fn signed_url_with_canned_policy(key: &RsaPrivateKey, url: &str, expires: DateTime<Utc>) -> String {
    let canonical = codec::canned_policy_json(url, expires);
    let signature = sign_to_wire(key, canonical.as_bytes());
    let separator = if url.contains('?') {
        '&'
    } else {
        '?'
    };
    format!(
        "{}{}Expires={}&Signature={}&Key-Pair-Id={}",
        url,
        separator,
        expires.timestamp(),
        signature,
        TEST_KEY_PAIR_ID
    )
}

/// Build a signed URL carrying a custom policy blob.
pub(crate) fn signed_url_with_policy(key: &RsaPrivateKey, url: &str, policy_json: &str) -> String {
    let signature = sign_to_wire(key, policy_json.as_bytes());
    let separator = if url.contains('?') {
        '&'
    } else {
        '?'
    };
    format!(
        "{}{}Policy={}&Signature={}&Key-Pair-Id={}",
        url,
        separator,
        codec::encode_wire_b64(policy_json.as_bytes()),
        signature,
        TEST_KEY_PAIR_ID
    )
}
