//! Trait definitions for pluggable backends.

pub mod store;

pub use store::TransientStore;
