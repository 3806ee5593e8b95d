//! NutriAI Shared Library
//!
//! This crate contains the data models, error taxonomy, and input
//! validation shared between the client core and its tests.

pub mod errors;
pub mod models;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
