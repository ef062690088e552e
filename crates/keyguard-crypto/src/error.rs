use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Failure kinds reported to the immediate caller.
///
/// Variants never carry plaintext, passwords, or key material, and
/// `DecryptionFailed` keeps one fixed message for wrong-key, tampered, and
/// truncated inputs alike.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The token does not split into exactly three non-empty fields.
    #[error("invalid envelope: expected <ciphertext>|<key>|<verifier>")]
    MalformedEnvelope,

    /// The key field is not valid base64 for exactly 32 bytes.
    #[error("invalid key encoding")]
    MalformedKey,

    /// The ciphertext field is not valid base64, or decodes to fewer bytes
    /// than one nonce plus one authentication tag.
    #[error("invalid ciphertext encoding")]
    MalformedCiphertext,

    /// The password digest does not match the envelope verifier.
    #[error("incorrect password")]
    IncorrectPassword,

    /// Authenticated decryption failed.
    #[error("decryption failed: the data may be corrupted or invalid")]
    DecryptionFailed,

    /// Export was requested for a key that was imported from an envelope.
    #[error("key is not exportable")]
    KeyNotExportable,

    /// The entropy source or cipher primitive itself failed.
    #[error("crypto primitive unavailable: {0}")]
    PrimitiveUnavailable(String),
}
