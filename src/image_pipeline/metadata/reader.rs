use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::metadata::types::MetadataRecord;

/// Fields that are never carried over: vendor binary blob and embedded XMP packet.
pub const DROPPED_FIELDS: [&str; 2] = ["MakerNote", "XMLPacket"];

/// Decodes the tagged metadata block of a RAW file into named, typed fields.
pub trait MetadataReader {
    fn read_metadata(&self, data: &[u8]) -> Result<MetadataRecord>;
}
