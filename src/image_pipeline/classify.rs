//! Object name and IMAGETYP classification from the file name.

use std::fmt;

use regex::Regex;
use tracing::warn;

/// Matches `code-object_details` and captures `object` in group 1.
pub const DEFAULT_OBJECT_PATTERN: &str = r"(?:.+-)?([^_\s]+)(?:_.+)?";

/// Calibration class of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Object,
    Bias,
    Flat,
    Dark,
}

impl ImageType {
    /// Calibration kinds in match priority order.
    const CALIBRATION: [ImageType; 3] = [ImageType::Bias, ImageType::Flat, ImageType::Dark];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageType::Object => "OBJECT",
            ImageType::Bias => "BIAS",
            ImageType::Flat => "FLAT",
            ImageType::Dark => "DARK",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub object: String,
    pub image_type: ImageType,
    /// The pattern did not match and `object` is the whole basename.
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct ObjectClassifier {
    pattern: Regex,
}

impl Default for ObjectClassifier {
    fn default() -> Self {
        Self::new(default_object_pattern())
    }
}

impl ObjectClassifier {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Classifies a file basename (no directory, no extension).
    ///
    /// The object name is capture group 1 of the pattern, or the unmodified
    /// basename when the pattern or its group does not match. The upper-cased
    /// name is searched for BIAS, FLAT and DARK in that order; the first hit
    /// wins, otherwise the frame is an OBJECT.
    pub fn classify(&self, basename: &str) -> Classification {
        let captured = self
            .pattern
            .captures(basename)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.trim().is_empty());

        let (object, fallback) = match captured {
            Some(name) => (name.to_string(), false),
            None => {
                warn!(basename, pattern = %self.pattern, "Object pattern did not match, using the whole file name");
                (basename.to_string(), true)
            }
        };

        let normalized = object.trim().to_uppercase();
        let image_type = ImageType::CALIBRATION
            .into_iter()
            .find(|kind| normalized.contains(kind.as_str()))
            .unwrap_or(ImageType::Object);

        Classification {
            object,
            image_type,
            fallback,
        }
    }
}

pub fn default_object_pattern() -> Regex {
    Regex::new(DEFAULT_OBJECT_PATTERN).expect("default object pattern is a valid regex")
}
