//! Store key builders for Shopfront durable records.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

/// Key for the durable session record of an identity.
pub fn session(identity: &str) -> String {
    format!("session_{identity}")
}
