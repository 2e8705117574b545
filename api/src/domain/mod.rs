//! Domain layer
//!
//! Contains pure business logic with no knowledge of HTTP or the platform's wire format.
//! - `entities`: Domain models and the rules that operate on them
//! - `ports`: Trait definitions for the platform

pub mod entities;
pub mod ports;
