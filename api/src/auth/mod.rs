//! Authentication
//!
//! Callers authenticate with their platform session token.

pub mod session;

pub use session::auth_middleware;
