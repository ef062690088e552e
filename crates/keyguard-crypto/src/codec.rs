//! Standard padded base64, shared by all three envelope fields

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode bytes as standard base64 with padding.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
///
/// Strict: whitespace, non-alphabet characters, and missing or non-canonical
/// padding are all rejected.
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}
