//! keyguard-crypto: password-gated message encryption envelopes
//!
//! Pipeline: message → AES-256-GCM (fresh key, fresh nonce) → base64 → `|`-joined token
//!
//! Envelope wire format:
//! ```text
//! <ciphertext-b64>|<key-b64>|<verifier-b64>
//!   ciphertext-b64 = base64( nonce(12) || ciphertext || tag(16) )
//!   key-b64        = base64( raw 32-byte AES key )
//!   verifier-b64   = base64( SHA-256(password) )
//! ```
//!
//! # Security model
//!
//! The envelope carries its own decryption key. The password verifier is an
//! application-level gate that rejects a wrong password early with a friendly
//! error; it is not a cryptographic barrier. Anyone who can parse the token
//! can extract the key field and decrypt without knowing the password. The
//! verifier is also an unsalted SHA-256 digest, so password guesses can be
//! tested against a captured token offline at raw hash speed. Treat the token
//! itself as the secret. A redesign would derive the key from the password
//! with a memory-hard KDF instead of shipping it in the clear; this crate
//! implements the format as deployed.

pub mod cipher;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod password;

pub use cipher::{decrypt, encrypt, encrypt_with_rng};
pub use envelope::{open, seal, seal_with_rng, Envelope};
pub use error::{CryptoError, CryptoResult};
pub use keys::{export_key, generate_key, generate_key_with_rng, import_key, MessageKey};
pub use password::{derive_verifier, verify_password};

/// Size of a message key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;
