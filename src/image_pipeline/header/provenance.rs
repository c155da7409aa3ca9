//! Provenance entries and the per-channel trailer lines.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::image_pipeline::classify::Classification;
use crate::image_pipeline::header::types::HeaderEntry;

pub const ORIGINATOR: &str = "nef2fits";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entries naming the tool, its version, the source file and the
/// classification derived from the file name.
pub fn provenance_entries(file_name: &str, classification: &Classification) -> Vec<HeaderEntry> {
    vec![
        HeaderEntry::new("ORIGIN", ORIGINATOR).with_comment("FITS file originator"),
        HeaderEntry::new("SWMODIFY", format!("{ORIGINATOR} v{VERSION}")),
        HeaderEntry::new("FILENAME", file_name).with_comment("original filename"),
        HeaderEntry::new("IMAGETYP", classification.image_type.as_str())
            .with_comment("image calibration class or OBJECT"),
        HeaderEntry::new("OBJECT", classification.object.as_str()).with_comment("Target object name"),
    ]
}

/// Library versions resolved at build time, `?` when unknown.
pub fn library_versions() -> [(&'static str, &'static str); 5] {
    [
        ("Rust", env!("NEF2FITS_VERSION_RUSTC")),
        (ORIGINATOR, VERSION),
        ("rawloader", env!("NEF2FITS_VERSION_RAWLOADER")),
        ("kamadak-exif", env!("NEF2FITS_VERSION_EXIF")),
        ("notify", env!("NEF2FITS_VERSION_NOTIFY")),
    ]
}

pub fn versions_comment() -> String {
    let versions: Vec<String> = library_versions()
        .iter()
        .map(|(name, version)| format!("{name} v{version}"))
        .collect();
    format!("made with: {}", versions.join(", "))
}

pub fn history_line(converted_at: DateTime<Utc>) -> String {
    format!(
        "Converted from NEF to FITS on {} UTC",
        converted_at.to_rfc3339_opts(SecondsFormat::Secs, true).trim_end_matches('Z')
    )
}
