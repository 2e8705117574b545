//! Reports module
//!
//! Static Markdown project documentation rendered on request.

pub mod renderer;

pub use renderer::{render, render_roadmap, render_testing, render_timeline};
