use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Input file does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Output file already exists (overwrite disabled): {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Failed to decode RAW image: {0}")]
    DecodeError(String),

    #[error("Failed to read EXIF metadata: {0}")]
    MetadataDecode(String),

    #[error("Required metadata field missing: {0}")]
    RequiredFieldMissing(String),

    #[error("Invalid metadata field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Failed to encode FITS file: {0}")]
    EncodeError(String),

    #[error("Invalid FITS keyword: {0:?}")]
    InvalidKeyword(String),

    #[error("Invalid header file: {0}")]
    HeaderFile(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
