//! Visitor session configuration.

use serde::{Deserialize, Serialize};

/// Visitor session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Server-held secret key for the token integrity tag (HMAC-SHA256).
    /// Must never be exposed to clients.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Site-specific salt mixed into the cookie name so tokens from
    /// different deployments never collide.
    #[serde(default = "default_site_salt")]
    pub site_salt: String,
    /// Session lifetime in seconds. Applied to both the token expiry and
    /// the durable record TTL (sliding, refreshed on every save).
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Session cookie attributes.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            site_salt: default_site_salt(),
            ttl_seconds: default_ttl(),
            cookie: CookieConfig::default(),
        }
    }
}

/// Session cookie attribute configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Fixed prefix for the cookie name. The site-salt digest is appended.
    #[serde(default = "default_cookie_prefix")]
    pub name_prefix: String,
    /// Cookie path (site root path).
    #[serde(default = "default_cookie_path")]
    pub path: String,
    /// Cookie domain. Empty means host-only.
    #[serde(default)]
    pub domain: String,
    /// Whether to set the `Secure` attribute. Enable under HTTPS.
    #[serde(default)]
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_cookie_prefix(),
            path: default_cookie_path(),
            domain: String::new(),
            secure: false,
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_site_salt() -> String {
    "shopfront".to_string()
}

fn default_ttl() -> u64 {
    // 48 hours
    172_800
}

fn default_cookie_prefix() -> String {
    "shopfront_session".to_string()
}

fn default_cookie_path() -> String {
    "/".to_string()
}
