//! RAW image reading module
//!
//! Format-agnostic decoding of the sensor mosaic.

mod reader;
mod rawloader_reader;
pub mod types;

pub use reader::RawImageReader;
pub use rawloader_reader::RawLoaderReader;
pub use types::RawImageData;
