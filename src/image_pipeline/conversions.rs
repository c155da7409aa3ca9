//! Pipeline conversions module
//!
//! Orchestration of RAW decoding, metadata translation, classification,
//! header construction and FITS encoding for one file at a time.

mod converter;
mod raw_to_fits;
mod types;


pub use converter::FileConverter;
pub use raw_to_fits::RawToFitsPipeline;
pub use types::{ConversionConfig, ConversionConfigBuilder, OUTPUT_EXTENSION};
