//! # shopfront-session
//!
//! Visitor session core for Shopfront: establishes a session identity per
//! request and attaches a mutable key-value bag to it, persisted between
//! requests with a bounded lifetime.
//!
//! An authenticated user identity always wins. Otherwise the client-held
//! token cookie is verified (keyed-hash integrity tag, constant-time
//! comparison) and its identifier reused; failing that, a fresh random
//! identifier is minted and a new token issued.

pub mod cookie;
pub mod identity;
pub mod store;
pub mod token;

pub use cookie::SessionCookie;
pub use identity::{IdentityResolver, RequestContext, Resolution, SessionIdentity};
pub use store::Session;
pub use token::TokenCodec;
