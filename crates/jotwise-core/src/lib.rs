//! # jotwise-core
//!
//! Core types, traits, and abstractions for the jotwise note service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other jotwise crates depend on: the shared error type, the note
//! model, the enhancement section markers, and the traits that sit at every
//! seam to an external collaborator (persistence, completion transport,
//! session resolution).

pub mod error;
pub mod logging;
pub mod models;
pub mod sections;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use sections::{Section, DECORATIVE_GLYPHS};
pub use traits::*;
