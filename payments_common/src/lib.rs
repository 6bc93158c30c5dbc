//! Helpers shared between the payments engine and the payments server.
pub mod helpers;
mod secret;

pub use secret::Secret;
