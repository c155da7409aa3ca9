use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    camera::CameraProfile,
    channels::{Channel, split_channels},
    classify::{Classification, ObjectClassifier},
    common::error::{ConversionError, Result},
    conversions::converter::FileConverter,
    conversions::types::{ConversionConfig, OUTPUT_EXTENSION},
    fits::{FitsWriter, ImageExtension, StandardFitsWriter},
    header::{Header, HeaderBuilder, provenance_entries},
    metadata::{ExifMetadataReader, MetadataReader},
    raw::{RawImageReader, RawLoaderReader},
};

/// Converts one RAW frame into a FITS file holding its four colour channels.
pub struct RawToFitsPipeline<R: RawImageReader, M: MetadataReader, W: FitsWriter> {
    reader: R,
    metadata: M,
    writer: W,
    classifier: ObjectClassifier,
    config: ConversionConfig,
}

impl RawToFitsPipeline<RawLoaderReader, ExifMetadataReader, StandardFitsWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self::with_custom(RawLoaderReader, ExifMetadataReader, StandardFitsWriter, config)
    }
}

impl<R: RawImageReader, M: MetadataReader, W: FitsWriter> RawToFitsPipeline<R, M, W> {
    pub fn with_custom(reader: R, metadata: M, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            metadata,
            writer,
            classifier: ObjectClassifier::new(config.object_pattern.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn camera(&self) -> &'static dyn CameraProfile {
        self.config.camera.profile()
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width < 2 || height < 2 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Converts RAW bytes into FITS bytes written to `output`.
    ///
    /// `file_name` is the name of the source file; its stem is what the
    /// object name and image type are derived from.
    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], file_name: &str, output: &mut dyn Write) -> Result<Classification> {
        let camera = self.camera();

        let raw_image = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = raw_image.width,
                height = raw_image.height
            ).entered();
            self.validate_dimensions(raw_image.width, raw_image.height)?;
        }

        let metadata = {
            let _span = tracing::info_span!("read_metadata").entered();
            self.metadata.read_metadata(input_data)?
        };

        let basename = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        let classification = self.classifier.classify(&basename);

        let headers: Vec<Header> = {
            let _span = tracing::info_span!("build_headers", camera = camera.name()).entered();
            let builder = HeaderBuilder::new(
                camera.header_entries(&metadata)?,
                provenance_entries(file_name, &classification),
                &self.config.header_overrides,
                Utc::now(),
            );
            Channel::ALL.iter().map(|&channel| builder.for_channel(channel)).collect()
        };

        let channels = {
            let _span = tracing::info_span!("split_channels").entered();
            split_channels(&raw_image, &camera.cfa_layout())
        };

        {
            let _span = tracing::info_span!("encode_fits").entered();
            let extensions: Vec<ImageExtension<'_>> = channels
                .iter()
                .zip(&headers)
                .map(|(image, header)| ImageExtension { image, header })
                .collect();
            self.writer.write_fits(&extensions, output)?;
        }

        info!(
            width = raw_image.width,
            height = raw_image.height,
            object = %classification.object,
            imagetyp = %classification.image_type,
            "Conversion complete"
        );
        Ok(classification)
    }

    /// Derives the output path: the source extension becomes `.fits` and,
    /// with a prefix configured, the path is rebased under it. The part kept
    /// below the prefix is the input path relative to `base_dir` when it lies
    /// inside it, otherwise the input path itself; root and `..` components
    /// are dropped so the result never leaves the prefix. A relative
    /// `base_dir` also matches absolute inputs below it, as reported by the
    /// watcher.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let renamed = input.with_extension(OUTPUT_EXTENSION);
        let Some(prefix) = &self.config.prefix else {
            return renamed;
        };

        let relative = self
            .config
            .base_dir
            .as_deref()
            .and_then(|base| relative_to(&renamed, base))
            .unwrap_or(renamed);
        let kept: PathBuf = relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        prefix.join(kept)
    }

    /// Converts the file at `input_path`, returning the path of the FITS file written.
    #[instrument(skip(self, input_path))]
    pub fn convert_file<P: AsRef<Path>>(&self, input_path: P) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        if !input_path.exists() {
            return Err(ConversionError::InputMissing(input_path.to_path_buf()));
        }

        let output_path = self.output_path(input_path);
        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        if !self.config.overwrite && output_path.exists() {
            return Err(ConversionError::OutputExists(output_path));
        }

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let file_name = input_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut encoded = Vec::new();
        self.convert(&input_data, &file_name, &mut encoded)?;

        {
            let _span = tracing::info_span!("write_output_file").entered();
            self.write_output(&output_path, &encoded)?;
        }

        info!("Converted {} to FITS, exported to {}", input_path.display(), output_path.display());
        Ok(output_path)
    }

    fn write_output(&self, output_path: &Path, encoded: &[u8]) -> Result<()> {
        if self.config.prefix.is_some() {
            if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    ConversionError::OutputWriteError(format!("{}: {}", parent.display(), e))
                })?;
            }
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if self.config.overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let file = options.open(output_path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => ConversionError::OutputExists(output_path.to_path_buf()),
            _ => ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e)),
        })?;
        write_or_discard(file, output_path, encoded)
    }
}

/// `path` below `base`, comparing both as given and then both made absolute.
fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    if let Ok(rest) = path.strip_prefix(base) {
        return Some(rest.to_path_buf());
    }
    let path = std::path::absolute(path).ok()?;
    let base = std::path::absolute(base).ok()?;
    path.strip_prefix(&base).ok().map(Path::to_path_buf)
}

/// Writes `encoded` through `file`, which was opened on `output_path`.
///
/// On failure the partial file is removed, so a later attempt is not
/// refused as an existing output.
pub(super) fn write_or_discard<W: Write>(mut file: W, output_path: &Path, encoded: &[u8]) -> Result<()> {
    let written = file.write_all(encoded).and_then(|()| file.flush());
    drop(file);

    written.map_err(|e| {
        if let Err(remove_err) = std::fs::remove_file(output_path) {
            warn!(output = %output_path.display(), error = %remove_err, "Could not remove partial output");
        }
        ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
    })
}

impl<R: RawImageReader, M: MetadataReader, W: FitsWriter> FileConverter for RawToFitsPipeline<R, M, W> {
    fn is_source(&self, path: &Path) -> bool {
        let wanted = self.camera().source_extension();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        Self::output_path(self, input)
    }

    fn convert_file(&self, input: &Path) -> Result<PathBuf> {
        Self::convert_file(self, input)
    }
}
