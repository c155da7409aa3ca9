//! nef2fits: RAW camera frames to four-channel FITS files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use tracing::info;

use nef2fits_rs::image_pipeline::{
    CameraModel, ConversionConfig, DEFAULT_OBJECT_PATTERN, RawToFitsPipeline, load_header_overrides,
};
use nef2fits_rs::logger;
use nef2fits_rs::watch::{JOIN_TIMEOUT, WatchEngine};

/// Image converter from camera RAW (NEF) to FITS, one extension per Bayer channel
#[derive(Parser)]
#[command(name = "nef2fits")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert RAW files, one after the other
    Convert {
        /// RAW files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        options: ConversionOptions,
    },

    /// Watch a directory and convert RAW files as they appear
    Watch {
        /// Directory to watch
        directory: PathBuf,

        /// Also watch subdirectories
        #[arg(short, long)]
        recursive: bool,

        #[command(flatten)]
        options: ConversionOptions,
    },
}

#[derive(Args)]
struct ConversionOptions {
    /// Folder to write the converted files under, keeping their relative
    /// structure: with `--prefix baz`, `./foo/00.nef` becomes `baz/foo/00.fits`
    #[arg(short, long)]
    prefix: Option<PathBuf>,

    /// JSON file of extra header entries, an array of [key, value] or
    /// [key, value, comment] arrays; they replace computed entries
    #[arg(long)]
    header: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    overwrite: bool,

    /// Camera that produced the files
    #[arg(long, value_enum, default_value = "nikon-d810a")]
    camera: CameraModel,

    /// Regex applied to the file name; group 1 is the OBJECT name
    #[arg(long, default_value = DEFAULT_OBJECT_PATTERN)]
    object_regex: String,
}

impl ConversionOptions {
    fn into_config(self, base_dir: Option<PathBuf>) -> Result<ConversionConfig> {
        let object_pattern = Regex::new(&self.object_regex)
            .with_context(|| format!("Invalid --object-regex {:?}", self.object_regex))?;
        let header_overrides = match &self.header {
            Some(path) => load_header_overrides(path)?,
            None => Vec::new(),
        };
        info!("Loaded {} header override(s)", header_overrides.len());

        Ok(ConversionConfig::builder()
            .prefix(self.prefix)
            .base_dir(base_dir)
            .overwrite(self.overwrite)
            .object_pattern(object_pattern)
            .camera(self.camera)
            .header_overrides(header_overrides)
            .build())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Commands::Convert { files, options } => convert(&files, options),
        Commands::Watch {
            directory,
            recursive,
            options,
        } => watch(&directory, recursive, options),
    }
}

fn convert(files: &[PathBuf], options: ConversionOptions) -> Result<()> {
    let pipeline = RawToFitsPipeline::new(options.into_config(None)?);
    info!(camera = %pipeline.config().camera, "Converting {} file(s)", files.len());

    for path in files {
        pipeline
            .convert_file(path)
            .with_context(|| format!("Conversion of {} failed", path.display()))?;
    }
    Ok(())
}

fn watch(directory: &Path, recursive: bool, options: ConversionOptions) -> Result<()> {
    // Event paths come back absolute and with symlinks resolved.
    let directory = directory
        .canonicalize()
        .with_context(|| format!("Cannot watch {}", directory.display()))?;
    let directory = directory.as_path();
    let pipeline = RawToFitsPipeline::new(options.into_config(Some(directory.to_path_buf()))?);
    info!(camera = %pipeline.config().camera, "Starting watch mode");

    let handle = WatchEngine::new(pipeline, directory, recursive)
        .start()
        .with_context(|| format!("Cannot watch {}", directory.display()))?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("Error setting Ctrl-C handler")?;
    info!("Press Ctrl-C to stop");

    handle.wait_for(&interrupted);
    info!("Stopping...");
    handle.stop(JOIN_TIMEOUT);
    Ok(())
}
