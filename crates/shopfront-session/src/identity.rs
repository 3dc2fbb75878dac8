//! Per-request session identity resolution.
//!
//! Decides which session identity applies to a request: an authenticated
//! user always wins; otherwise a verified client token is reused; otherwise
//! a fresh identifier is minted and a new token arranged for transmission.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use shopfront_core::config::session::SessionConfig;

use crate::token::TokenCodec;

/// The stable string that scopes a session's data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionIdentity {
    /// Derived from a host-managed user account. Stable across devices.
    Authenticated(String),
    /// Randomly generated, tied to one client token.
    Anonymous(String),
}

impl SessionIdentity {
    /// The opaque identifier string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authenticated(id) | Self::Anonymous(id) => id,
        }
    }

    /// Whether this identity came from the host authentication signal.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl std::fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the resolver consumes from the request, passed explicitly —
/// no ambient cookie or current-user reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext<'a> {
    /// Verified host-level authenticated-user identifier, if any.
    pub authenticated_user: Option<&'a str>,
    /// Raw value of the session cookie, if the client sent one.
    pub token: Option<&'a str>,
}

/// A freshly minted token that must be transmitted to the client.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Serialized token, the outbound cookie value.
    pub value: String,
    /// Expiry fixed at mint time.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of identity resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The identity that scopes this request's session data.
    pub identity: SessionIdentity,
    /// Present only when a new anonymous identity was minted.
    pub issued: Option<IssuedToken>,
}

/// Resolves the session identity for each request.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    /// Token mint/verify codec.
    codec: TokenCodec,
    /// Token lifetime.
    ttl: Duration,
}

impl IdentityResolver {
    /// Creates a resolver from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            codec: TokenCodec::new(&config.secret),
            ttl: Duration::seconds(config.ttl_seconds as i64),
        }
    }

    /// Resolves the identity for a request against the current clock.
    pub fn resolve(&self, ctx: &RequestContext<'_>) -> Resolution {
        self.resolve_at(ctx, Utc::now())
    }

    /// Resolves the identity for a request at an explicit point in time.
    ///
    /// Identifier collisions are treated as acceptably improbable given the
    /// 32 bytes of identifier entropy; no collision check is performed.
    pub fn resolve_at(&self, ctx: &RequestContext<'_>, now: DateTime<Utc>) -> Resolution {
        if let Some(user) = ctx.authenticated_user {
            return Resolution {
                identity: SessionIdentity::Authenticated(user.to_string()),
                issued: None,
            };
        }

        if let Some(raw) = ctx.token {
            if let Some(verified) = self.codec.verify_at(raw, now.timestamp()) {
                debug!("Reusing verified visitor token");
                return Resolution {
                    identity: SessionIdentity::Anonymous(verified.identifier),
                    issued: None,
                };
            }
            // Malformed, expired, or forged: fall through and supersede it
            // with a brand-new token.
        }

        let identifier = TokenCodec::mint_identifier();
        let expires_at = now + self.ttl;
        let value = self.codec.mint(&identifier, expires_at.timestamp());
        debug!("Minted new visitor identity");

        Resolution {
            identity: SessionIdentity::Anonymous(identifier),
            issued: Some(IssuedToken { value, expires_at }),
        }
    }
}
