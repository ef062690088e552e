//! Message keys: generation, base64 export for transport, import on receipt

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::codec;
use crate::error::{CryptoError, CryptoResult};
use crate::KEY_SIZE;

/// A 256-bit AES-GCM message key. Zeroized on drop.
///
/// Freshly generated keys are exportable so they can travel inside an
/// envelope. Keys imported back out of an envelope are not: the receive side
/// never needs to re-export, and refusing keeps a received key from being
/// wrapped into a second envelope by mistake.
#[derive(Clone)]
pub struct MessageKey {
    bytes: [u8; KEY_SIZE],
    exportable: bool,
}

impl MessageKey {
    /// Wrap locally produced key material. The key is exportable.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            bytes,
            exportable: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    pub fn is_exportable(&self) -> bool {
        self.exportable
    }
}

impl Drop for MessageKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageKey")
            .field("bytes", &"[REDACTED]")
            .field("exportable", &self.exportable)
            .finish()
    }
}

/// Generate a random 256-bit message key using the thread-local CSPRNG.
pub fn generate_key() -> CryptoResult<MessageKey> {
    generate_key_with_rng(&mut rand::thread_rng())
}

/// Generate a random 256-bit message key from the supplied generator.
pub fn generate_key_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> CryptoResult<MessageKey> {
    let mut bytes = [0u8; KEY_SIZE];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::PrimitiveUnavailable(format!("rng: {e}")))?;
    Ok(MessageKey::from_bytes(bytes))
}

/// Export a key as base64 of its raw 32 bytes, for embedding in an envelope.
pub fn export_key(key: &MessageKey) -> CryptoResult<String> {
    if !key.is_exportable() {
        return Err(CryptoError::KeyNotExportable);
    }
    Ok(codec::encode(key.as_bytes()))
}

/// Import a key from the base64 form produced by [`export_key`].
///
/// Anything that is not valid base64 for exactly 32 bytes is rejected as
/// `MalformedKey`. The imported key can decrypt but not export.
pub fn import_key(encoded: &str) -> CryptoResult<MessageKey> {
    let mut raw = codec::decode(encoded).map_err(|_| CryptoError::MalformedKey)?;
    if raw.len() != KEY_SIZE {
        raw.zeroize();
        return Err(CryptoError::MalformedKey);
    }

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&raw);
    raw.zeroize();

    Ok(MessageKey {
        bytes,
        exportable: false,
    })
}
