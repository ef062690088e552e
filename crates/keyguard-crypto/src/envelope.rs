//! Envelope tokens: pack, unpack, and the end-to-end seal/open pipelines
//!
//! Wire format:
//! ```text
//! <ciphertext-b64>|<key-b64>|<verifier-b64>
//! ```
//!
//! Exactly two `|` delimiters, three non-empty fields. The fields are base64
//! and can never contain the delimiter, so no escaping is needed.

use rand::{CryptoRng, RngCore};
use secrecy::SecretString;
use tracing::debug;

use crate::error::{CryptoError, CryptoResult};
use crate::{cipher, keys, password};

/// Field separator in the token. Outside the base64 alphabet.
pub const DELIMITER: char = '|';

/// A parsed envelope: three base64 fields in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// base64 of `[nonce][ciphertext][tag]`
    pub ciphertext: String,
    /// base64 of the raw 32-byte message key
    pub key: String,
    /// base64 of SHA-256(password)
    pub verifier: String,
}

impl Envelope {
    /// Join the three fields into the transport token.
    pub fn pack(&self) -> String {
        format!(
            "{}{DELIMITER}{}{DELIMITER}{}",
            self.ciphertext, self.key, self.verifier
        )
    }

    /// Split a transport token into its three fields.
    ///
    /// Anything other than exactly three non-empty fields is
    /// `MalformedEnvelope`. Field contents are not inspected here; the key
    /// and ciphertext operations downstream classify those failures.
    pub fn unpack(token: &str) -> CryptoResult<Self> {
        let fields: Vec<&str> = token.split(DELIMITER).collect();
        match fields.as_slice() {
            [ciphertext, key, verifier]
                if !ciphertext.is_empty() && !key.is_empty() && !verifier.is_empty() =>
            {
                Ok(Self {
                    ciphertext: (*ciphertext).to_string(),
                    key: (*key).to_string(),
                    verifier: (*verifier).to_string(),
                })
            }
            _ => Err(CryptoError::MalformedEnvelope),
        }
    }
}

/// Encrypt a message under a fresh key and pack the complete token.
///
/// One call produces all three fields; key, nonce, and verifier are never
/// recombined across calls.
pub fn seal(plaintext: &[u8], password: &SecretString) -> CryptoResult<String> {
    seal_with_rng(plaintext, password, &mut rand::thread_rng())
}

/// [`seal`], drawing the key and nonce from the supplied generator.
pub fn seal_with_rng<R: RngCore + CryptoRng>(
    plaintext: &[u8],
    password: &SecretString,
    rng: &mut R,
) -> CryptoResult<String> {
    let key = keys::generate_key_with_rng(rng)?;
    let envelope = Envelope {
        ciphertext: cipher::encrypt_with_rng(&key, plaintext, rng)?,
        key: keys::export_key(&key)?,
        verifier: password::derive_verifier(password),
    };
    debug!(plaintext_len = plaintext.len(), "message sealed");
    Ok(envelope.pack())
}

/// Open a transport token: parse, gate on the password, then decrypt.
///
/// Failures surface in a fixed order: `MalformedEnvelope`, then
/// `IncorrectPassword`, then `MalformedKey`, then `MalformedCiphertext` or
/// `DecryptionFailed`. A wrong password is reported before the key field is
/// even decoded.
pub fn open(token: &str, password: &SecretString) -> CryptoResult<Vec<u8>> {
    let envelope = Envelope::unpack(token)?;

    if !password::verify_password(password, &envelope.verifier) {
        return Err(CryptoError::IncorrectPassword);
    }

    let key = keys::import_key(&envelope.key)?;
    let plaintext = cipher::decrypt(&key, &envelope.ciphertext)?;
    debug!(plaintext_len = plaintext.len(), "message opened");
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Fails every draw. For error-path tests only.
    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other(
                "entropy source offline",
            )))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_pack_unpack_roundtrip() {
        let envelope = Envelope {
            ciphertext: "Y2lwaGVy".to_string(),
            key: "a2V5".to_string(),
            verifier: "dmVyaWZ5".to_string(),
        };
        assert_eq!(Envelope::unpack(&envelope.pack()).unwrap(), envelope);
    }

    #[test]
    fn test_unpack_splits_in_wire_order() {
        let e = Envelope::unpack("a|b|c").unwrap();
        assert_eq!(e.ciphertext, "a");
        assert_eq!(e.key, "b");
        assert_eq!(e.verifier, "c");
    }

    #[test]
    fn test_unpack_rejects_wrong_arity() {
        assert_eq!(
            Envelope::unpack("a|b"),
            Err(CryptoError::MalformedEnvelope)
        );
        assert_eq!(
            Envelope::unpack("a|b|c|d"),
            Err(CryptoError::MalformedEnvelope)
        );
        assert_eq!(
            Envelope::unpack("no delimiters"),
            Err(CryptoError::MalformedEnvelope)
        );
    }

    #[test]
    fn test_unpack_rejects_empty_fields() {
        assert_eq!(Envelope::unpack(""), Err(CryptoError::MalformedEnvelope));
        assert_eq!(
            Envelope::unpack("|b|c"),
            Err(CryptoError::MalformedEnvelope)
        );
        assert_eq!(
            Envelope::unpack("a||c"),
            Err(CryptoError::MalformedEnvelope)
        );
        assert_eq!(
            Envelope::unpack("a|b|"),
            Err(CryptoError::MalformedEnvelope)
        );
    }

    #[test]
    fn test_seal_produces_three_base64_fields() {
        let token = seal(b"hello world", &SecretString::from("pw123")).unwrap();
        assert_eq!(token.matches(DELIMITER).count(), 2);

        let e = Envelope::unpack(&token).unwrap();
        assert!(crate::codec::decode(&e.ciphertext).is_ok());
        assert!(crate::codec::decode(&e.key).is_ok());
        assert!(crate::codec::decode(&e.verifier).is_ok());
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let token = seal(b"hello world", &SecretString::from("pw123")).unwrap();
        let plaintext = open(&token, &SecretString::from("pw123")).unwrap();
        assert_eq!(plaintext, b"hello world");
    }

    #[test]
    fn test_open_rejects_wrong_password() {
        let token = seal(b"hello world", &SecretString::from("pw123")).unwrap();
        assert_eq!(
            open(&token, &SecretString::from("wrongpw")),
            Err(CryptoError::IncorrectPassword)
        );
    }

    #[test]
    fn test_wrong_password_wins_over_bad_key_field() {
        // The password gate runs before the key field is decoded, so a wrong
        // password is reported even when the key field is garbage.
        let token = seal(b"attack at dawn", &SecretString::from("pw123")).unwrap();
        let mut e = Envelope::unpack(&token).unwrap();
        e.key = "@@not-base64@@".to_string();

        assert_eq!(
            open(&e.pack(), &SecretString::from("wrongpw")),
            Err(CryptoError::IncorrectPassword)
        );
        // With the right password the same token trips on the key field.
        assert_eq!(
            open(&e.pack(), &SecretString::from("pw123")),
            Err(CryptoError::MalformedKey)
        );
    }

    #[test]
    fn test_key_swap_across_envelopes_fails_decryption() {
        let pw = SecretString::from("pw123");
        let t1 = seal(b"message one", &pw).unwrap();
        let t2 = seal(b"message two", &pw).unwrap();

        let e1 = Envelope::unpack(&t1).unwrap();
        let mut e2 = Envelope::unpack(&t2).unwrap();
        e2.key = e1.key;

        assert_eq!(open(&e2.pack(), &pw), Err(CryptoError::DecryptionFailed));
    }

    #[test]
    fn test_seal_with_reset_rng_is_reproducible() {
        let pw = SecretString::from("pw123");
        let t1 = seal_with_rng(b"same message", &pw, &mut StdRng::seed_from_u64(9)).unwrap();
        let t2 = seal_with_rng(b"same message", &pw, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(t1, t2);
    }

    #[test]
    fn test_seal_surfaces_rng_failure() {
        let result = seal_with_rng(b"hello", &SecretString::from("pw123"), &mut FailingRng);
        assert!(matches!(
            result,
            Err(CryptoError::PrimitiveUnavailable(_))
        ));
    }
}
