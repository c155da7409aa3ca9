use std::path::{Path, PathBuf};

use crate::image_pipeline::common::error::Result;

/// A file-to-file conversion, as driven by the watch engine.
pub trait FileConverter {
    /// Whether `path` names a file this converter accepts.
    fn is_source(&self, path: &Path) -> bool;

    /// Where the output for `input` is (or would be) written.
    fn output_path(&self, input: &Path) -> PathBuf;

    /// Converts `input`, returning the path written.
    fn convert_file(&self, input: &Path) -> Result<PathBuf>;
}
