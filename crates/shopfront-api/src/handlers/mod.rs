//! HTTP request handlers.

pub mod cart;
pub mod health;
