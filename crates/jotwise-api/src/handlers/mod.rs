//! HTTP handlers.

pub mod enhance;
pub mod health;
pub mod notes;
pub mod summarize;
