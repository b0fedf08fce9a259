//! HTTP route handlers.

pub mod cart;
pub mod configurations;
pub mod system;
