//! EXIF metadata translation
//!
//! Turns the tagged metadata block of a RAW file into a name to typed value
//! mapping that camera profiles build FITS header entries from.

mod reader;
mod exif_reader;
pub mod types;

pub use reader::{DROPPED_FIELDS, MetadataReader};
pub use exif_reader::{ExifMetadataReader, tag_name, translate_fields, translate_value};
pub use types::{MetadataRecord, MetadataValue};
