//! Password verifier: unsalted SHA-256 digest, base64-encoded
//!
//! The verifier lets a decryption attempt fail fast with "incorrect
//! password" before any key material is touched. It is not a key derivation
//! and not a secrecy boundary: the digest is unsalted, so equal passwords
//! always map to the same verifier, and guesses against a captured token run
//! offline at raw SHA-256 speed. The envelope carries the real decryption
//! key regardless of this check.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::codec;

/// Derive the envelope verifier: base64 of SHA-256 over the password bytes.
pub fn derive_verifier(password: &SecretString) -> String {
    let digest = Sha256::digest(password.expose_secret().as_bytes());
    codec::encode(digest.as_slice())
}

/// Check a password attempt against an envelope's verifier field.
///
/// The derived digest text is compared in constant time; a verifier of the
/// wrong length compares unequal without inspecting content.
pub fn verify_password(password: &SecretString, expected: &str) -> bool {
    let derived = derive_verifier(password);
    derived.as_bytes().ct_eq(expected.as_bytes()).into()
}
