//! Conversion configuration types

use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;

use crate::image_pipeline::camera::CameraModel;
use crate::image_pipeline::classify::default_object_pattern;
use crate::image_pipeline::header::HeaderEntry;

/// Extension of the files the pipeline writes.
pub const OUTPUT_EXTENSION: &str = "fits";

/// Configuration for RAW to FITS conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Root the output tree is rebased under; outputs sit next to their input when unset
    pub prefix: Option<PathBuf>,
    /// Directory the relative structure under `prefix` is taken from
    pub base_dir: Option<PathBuf>,
    /// Whether an existing output file may be replaced
    pub overwrite: bool,
    /// Pattern whose first group is the object name within a file basename
    pub object_pattern: Regex,
    /// Camera profile used for header entries and channel layout
    pub camera: CameraModel,
    /// Entries applied last, replacing anything the pipeline computed
    pub header_overrides: Arc<[HeaderEntry]>,
    /// Whether to reject frames too small to split into channels
    pub validate_dimensions: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            base_dir: None,
            overwrite: false,
            object_pattern: default_object_pattern(),
            camera: CameraModel::default(),
            header_overrides: Arc::from(Vec::new()),
            validate_dimensions: true,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    prefix: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    overwrite: Option<bool>,
    object_pattern: Option<Regex>,
    camera: Option<CameraModel>,
    header_overrides: Option<Vec<HeaderEntry>>,
    validate_dimensions: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn base_dir(mut self, base_dir: Option<PathBuf>) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = Some(overwrite);
        self
    }

    pub fn object_pattern(mut self, pattern: Regex) -> Self {
        self.object_pattern = Some(pattern);
        self
    }

    pub fn camera(mut self, camera: CameraModel) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn header_overrides(mut self, entries: Vec<HeaderEntry>) -> Self {
        self.header_overrides = Some(entries);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            prefix: self.prefix.or(default.prefix),
            base_dir: self.base_dir.or(default.base_dir),
            overwrite: self.overwrite.unwrap_or(default.overwrite),
            object_pattern: self.object_pattern.unwrap_or(default.object_pattern),
            camera: self.camera.unwrap_or(default.camera),
            header_overrides: self.header_overrides.map(Arc::from).unwrap_or(default.header_overrides),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}
