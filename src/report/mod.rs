//! Presenter.
//!
//! Turns structured command results and scheduled digests into chat-ready
//! text, or into JSON for scripting.

pub mod generator;

pub use generator::*;
