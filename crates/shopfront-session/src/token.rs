//! Session token minting and verification.
//!
//! A token is the client-held artifact `identifier|expiresAt|tag` where the
//! tag is an HMAC-SHA256 over `identifier ‖ expiresAt` keyed by the server
//! secret. Identifiers are base64url-encoded random bytes, so the alphabet
//! can never contain the field delimiter; the parser still rejects any
//! identifier outside that alphabet rather than trusting the split.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Field delimiter in the serialized token.
pub const TOKEN_DELIMITER: char = '|';

/// Entropy of a minted identifier, in bytes.
const IDENTIFIER_BYTES: usize = 32;

/// A token that passed integrity and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// The embedded session identifier.
    pub identifier: String,
    /// Expiry as a unix timestamp in seconds.
    pub expires_at: i64,
}

/// Mints and verifies integrity-protected session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    /// Keyed MAC instance, cloned per operation.
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec keyed with the server-held secret.
    pub fn new(secret: &str) -> Self {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC-SHA256 accepts keys of any length");
        Self { mac }
    }

    /// Mints a fresh, unguessable session identifier: 32 bytes from the OS
    /// CSPRNG, base64url-encoded.
    pub fn mint_identifier() -> String {
        let mut bytes = [0u8; IDENTIFIER_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Builds a serialized token for the identifier, expiring at the given
    /// unix timestamp. The expiry is fixed at mint time; tokens are never
    /// mutated afterwards.
    pub fn mint(&self, identifier: &str, expires_at: i64) -> String {
        let expires = expires_at.to_string();
        let tag = self.tag(identifier, &expires);
        format!(
            "{identifier}{TOKEN_DELIMITER}{expires}{TOKEN_DELIMITER}{}",
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    /// Verifies a serialized token against the current clock.
    pub fn verify(&self, raw: &str) -> Option<VerifiedToken> {
        self.verify_at(raw, Utc::now().timestamp())
    }

    /// Verifies a serialized token at an explicit point in time.
    ///
    /// Returns `None` for every failure mode — wrong field count, bad
    /// identifier alphabet, non-numeric expiry, expiry not in the future,
    /// or tag mismatch. A token is live strictly before its expiry: at
    /// exactly `expires_at` it is already invalid.
    pub fn verify_at(&self, raw: &str, now: i64) -> Option<VerifiedToken> {
        let fields: Vec<&str> = raw.split(TOKEN_DELIMITER).collect();
        let [identifier, expires, tag] = fields.as_slice() else {
            debug!("Session token rejected: wrong field count");
            return None;
        };

        if identifier.is_empty() || !is_valid_identifier(identifier) {
            debug!("Session token rejected: malformed identifier");
            return None;
        }

        let expires_at: i64 = match expires.parse() {
            Ok(ts) => ts,
            Err(_) => {
                debug!("Session token rejected: non-numeric expiry");
                return None;
            }
        };

        if now >= expires_at {
            debug!("Session token rejected: expired");
            return None;
        }

        let supplied_tag = match URL_SAFE_NO_PAD.decode(tag) {
            Ok(bytes) => bytes,
            Err(_) => {
                debug!("Session token rejected: undecodable tag");
                return None;
            }
        };

        // verify_slice compares in constant time regardless of where the
        // mismatch occurs.
        let mut mac = self.mac.clone();
        mac.update(identifier.as_bytes());
        mac.update(expires.as_bytes());
        if mac.verify_slice(&supplied_tag).is_err() {
            debug!("Session token rejected: tag mismatch");
            return None;
        }

        Some(VerifiedToken {
            identifier: identifier.to_string(),
            expires_at,
        })
    }

    /// Computes the integrity tag over `identifier ‖ expiresAt`.
    fn tag(&self, identifier: &str, expires: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(identifier.as_bytes());
        mac.update(expires.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Identifiers are restricted to the base64url alphabet, which excludes the
/// token delimiter. Anything else is treated as malformed.
fn is_valid_identifier(identifier: &str) -> bool {
    identifier
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: i64 = 172_800;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret")
    }

    #[test]
    fn test_mint_verify_roundtrip() {
        let codec = codec();
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = codec.mint(&id, t0 + TTL);

        let verified = codec.verify_at(&token, t0).expect("token should verify");
        assert_eq!(verified.identifier, id);
        assert_eq!(verified.expires_at, t0 + TTL);
    }

    #[test]
    fn test_identifier_entropy_and_alphabet() {
        let a = TokenCodec::mint_identifier();
        let b = TokenCodec::mint_identifier();
        assert_ne!(a, b);
        // 32 bytes base64url without padding is 43 characters.
        assert_eq!(a.len(), 43);
        assert!(is_valid_identifier(&a));
        assert!(!a.contains(TOKEN_DELIMITER));
    }

    #[test]
    fn test_expired_token_invalid_regardless_of_tag() {
        let codec = codec();
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = codec.mint(&id, t0 + TTL);

        assert!(codec.verify_at(&token, t0 + TTL + 1).is_none());
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = codec.mint(&id, t0 + TTL);

        // Live strictly before expiry, invalid at and after it.
        assert!(codec.verify_at(&token, t0 + TTL - 1).is_some());
        assert!(codec.verify_at(&token, t0 + TTL).is_none());
        assert!(codec.verify_at(&token, t0 + TTL + 1).is_none());
    }

    #[test]
    fn test_any_single_byte_tag_corruption_invalid() {
        let codec = codec();
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = codec.mint(&id, t0 + TTL);

        let (head, tag) = token.rsplit_once(TOKEN_DELIMITER).unwrap();
        let tag_bytes = URL_SAFE_NO_PAD.decode(tag).unwrap();

        for pos in 0..tag_bytes.len() {
            let mut corrupted = tag_bytes.clone();
            corrupted[pos] ^= 0x01;
            let forged = format!(
                "{head}{TOKEN_DELIMITER}{}",
                URL_SAFE_NO_PAD.encode(&corrupted)
            );
            assert!(
                codec.verify_at(&forged, t0).is_none(),
                "corruption at byte {pos} must invalidate the token"
            );
        }
    }

    #[test]
    fn test_tampered_identifier_invalid() {
        let codec = codec();
        let t0 = 1_700_000_000;
        let token = codec.mint("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", t0 + TTL);
        let tampered = token.replacen("aaaa", "bbbb", 1);
        assert!(codec.verify_at(&tampered, t0).is_none());
    }

    #[test]
    fn test_tampered_expiry_invalid() {
        let codec = codec();
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = codec.mint(&id, t0 + TTL);

        let mut fields: Vec<&str> = token.split(TOKEN_DELIMITER).collect();
        let extended = (t0 + TTL * 10).to_string();
        fields[1] = &extended;
        let tampered = fields.join("|");
        assert!(codec.verify_at(&tampered, t0).is_none());
    }

    #[test]
    fn test_delimiter_injection_rejected() {
        let codec = codec();
        let t0 = 1_700_000_000;
        // An identifier carrying the delimiter must be rejected as
        // malformed, never silently mis-parsed.
        let token = codec.mint("abc|def", t0 + TTL);
        assert!(codec.verify_at(&token, t0).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let codec = codec();
        let t0 = 1_700_000_000;
        for raw in [
            "",
            "justonefield",
            "two|fields",
            "a|b|c|d",
            "id|notanumber|dGFn",
            "id!|1700172800|dGFn",
            "|1700172800|dGFn",
        ] {
            assert!(codec.verify_at(raw, t0).is_none(), "{raw:?} must not verify");
        }
    }

    #[test]
    fn test_wrong_secret_invalid() {
        let minting = TokenCodec::new("secret-a");
        let verifying = TokenCodec::new("secret-b");
        let id = TokenCodec::mint_identifier();
        let t0 = 1_700_000_000;
        let token = minting.mint(&id, t0 + TTL);
        assert!(verifying.verify_at(&token, t0).is_none());
        assert!(minting.verify_at(&token, t0).is_some());
    }
}
