//! Common utilities module
//!
//! Error types shared across the image pipeline.

pub mod error;

pub use error::{ConversionError, Result};
