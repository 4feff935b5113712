//! Utility functions shared across layers.
//!
//! - [`token_generator`] - Random short token generation

pub mod token_generator;
