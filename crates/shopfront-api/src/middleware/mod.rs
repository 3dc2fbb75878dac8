//! Tower middleware layers.

pub mod session;
