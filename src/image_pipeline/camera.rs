//! Camera profiles
//!
//! Everything camera-specific lives behind [`CameraProfile`]; the rest of
//! the pipeline only sees the layout and header entries a profile returns.

mod profile;
mod nikon;

use std::fmt;

pub use nikon::NikonD810a;
pub use profile::CameraProfile;

#[cfg(test)]
pub(crate) use nikon::tests::d810a_metadata;

/// Supported cameras, selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CameraModel {
    #[default]
    #[value(name = "nikon-d810a")]
    NikonD810a,
}

impl CameraModel {
    pub fn profile(self) -> &'static dyn CameraProfile {
        match self {
            CameraModel::NikonD810a => &NikonD810a,
        }
    }
}

impl fmt::Display for CameraModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().name())
    }
}
