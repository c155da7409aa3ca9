use crate::image_pipeline::channels::CfaLayout;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::header::HeaderEntry;
use crate::image_pipeline::metadata::MetadataRecord;

/// Per-camera knowledge: which files it produces, how its colour-filter tile
/// is laid out and how its EXIF fields map onto FITS keywords.
pub trait CameraProfile: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extension of the RAW files, without the dot. Matched case-insensitively.
    fn source_extension(&self) -> &'static str;

    fn cfa_layout(&self) -> CfaLayout;

    /// Header entries derived from the translated metadata.
    ///
    /// Fails with `RequiredFieldMissing` when a field the profile needs is absent.
    fn header_entries(&self, metadata: &MetadataRecord) -> Result<Vec<HeaderEntry>>;
}
