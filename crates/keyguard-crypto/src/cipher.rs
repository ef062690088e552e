//! AES-256-GCM message encryption
//!
//! Encrypted blob layout (before base64):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! No associated data. The nonce is drawn fresh from the CSPRNG immediately
//! before every encryption; a (key, nonce) pair is never reused.

use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use rand::{CryptoRng, RngCore};

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::MessageKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Encrypt a message with AES-256-GCM, nonce from the thread-local CSPRNG.
///
/// Returns base64 of `[nonce][ciphertext][tag]`.
pub fn encrypt(key: &MessageKey, plaintext: &[u8]) -> CryptoResult<String> {
    encrypt_with_rng(key, plaintext, &mut rand::thread_rng())
}

/// Encrypt a message, drawing the nonce from the supplied generator.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    key: &MessageKey,
    plaintext: &[u8],
    rng: &mut R,
) -> CryptoResult<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CryptoError::PrimitiveUnavailable(format!("rng: {e}")))?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::PrimitiveUnavailable("AES-GCM encrypt".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(codec::encode(&blob))
}

/// Decrypt base64 `[nonce][ciphertext][tag]` produced by [`encrypt`].
///
/// Text that is not base64, or decodes to fewer bytes than one nonce plus
/// one tag, is `MalformedCiphertext`. Authentication failure is always the
/// same `DecryptionFailed`, whether the key was wrong or the data was
/// tampered with.
pub fn decrypt(key: &MessageKey, token: &str) -> CryptoResult<Vec<u8>> {
    let blob = codec::decode(token).map_err(|_| CryptoError::MalformedCiphertext)?;
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::MalformedCiphertext);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}
