//! FITS header construction
//!
//! Ordered, key-unique headers built from camera metadata, provenance
//! entries and user overrides.

mod builder;
mod overrides;
mod provenance;
pub mod types;

pub use builder::HeaderBuilder;
pub use overrides::{load_header_overrides, parse_header_overrides};
pub use provenance::{ORIGINATOR, VERSION, history_line, library_versions, provenance_entries, versions_comment};
pub use types::{Header, HeaderEntry, HeaderValue};
