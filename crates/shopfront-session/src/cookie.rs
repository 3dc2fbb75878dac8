//! Session cookie descriptor.
//!
//! Framework-agnostic description of the outbound token cookie. The HTTP
//! layer turns this into an actual `Set-Cookie` header.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use shopfront_core::config::session::SessionConfig;

use crate::identity::IssuedToken;

/// Length of the site digest appended to the cookie name.
const SITE_DIGEST_LEN: usize = 16;

/// The session cookie name for this deployment: fixed prefix plus a digest
/// of the site salt, so cookies from different deployments never collide.
pub fn cookie_name(config: &SessionConfig) -> String {
    let digest = Sha256::digest(config.site_salt.as_bytes());
    let mut encoded = URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(SITE_DIGEST_LEN);
    format!("{}_{encoded}", config.cookie.name_prefix)
}

/// Outbound session cookie with all transport attributes resolved.
///
/// `HttpOnly` is always set (the token must not be readable by page
/// scripts) together with `SameSite=Lax`; `Secure` follows configuration
/// and should be enabled under HTTPS.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    /// Cookie name (prefix + site digest).
    pub name: String,
    /// Cookie value: the serialized session token.
    pub value: String,
    /// Path attribute (site root path).
    pub path: String,
    /// Domain attribute. `None` means host-only.
    pub domain: Option<String>,
    /// Whether to set the `Secure` attribute.
    pub secure: bool,
    /// Expiry, matching the token's own expiry.
    pub expires_at: DateTime<Utc>,
    /// Max-Age in seconds.
    pub max_age_seconds: u64,
}

impl SessionCookie {
    /// Builds the cookie carrying a freshly issued token.
    pub fn issue(config: &SessionConfig, token: &IssuedToken) -> Self {
        Self {
            name: cookie_name(config),
            value: token.value.clone(),
            path: config.cookie.path.clone(),
            domain: if config.cookie.domain.is_empty() {
                None
            } else {
                Some(config.cookie.domain.clone())
            },
            secure: config.cookie.secure,
            expires_at: token.expires_at,
            max_age_seconds: config.ttl_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_name_incorporates_site_digest() {
        let mut config = SessionConfig::default();
        config.site_salt = "shop-a.example".to_string();
        let name_a = cookie_name(&config);

        config.site_salt = "shop-b.example".to_string();
        let name_b = cookie_name(&config);

        assert!(name_a.starts_with("shopfront_session_"));
        assert_ne!(name_a, name_b, "deployments must not share cookie names");
    }

    #[test]
    fn test_cookie_name_stable_per_site() {
        let config = SessionConfig::default();
        assert_eq!(cookie_name(&config), cookie_name(&config));
    }

    #[test]
    fn test_issue_resolves_attributes() {
        let mut config = SessionConfig::default();
        config.cookie.domain = "shop.example".to_string();
        config.cookie.secure = true;

        let token = IssuedToken {
            value: "id|123|tag".to_string(),
            expires_at: Utc::now(),
        };
        let cookie = SessionCookie::issue(&config, &token);

        assert_eq!(cookie.value, "id|123|tag");
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.domain.as_deref(), Some("shop.example"));
        assert!(cookie.secure);
        assert_eq!(cookie.max_age_seconds, 172_800);
    }

    #[test]
    fn test_empty_domain_is_host_only() {
        let config = SessionConfig::default();
        let token = IssuedToken {
            value: "v".to_string(),
            expires_at: Utc::now(),
        };
        assert!(SessionCookie::issue(&config, &token).domain.is_none());
    }
}
