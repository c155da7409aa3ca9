//! Image processing pipeline module
//!
//! RAW frames go in, multi-extension FITS files come out: the sensor mosaic
//! is split into its four colour channels and each channel is written with a
//! header built from the camera's EXIF metadata.

pub mod raw;
pub mod metadata;
pub mod channels;
pub mod classify;
pub mod header;
pub mod camera;
pub mod fits;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use raw::{
    RawImageData,
    RawImageReader,
    RawLoaderReader,
};

pub use metadata::{
    ExifMetadataReader,
    MetadataReader,
    MetadataRecord,
    MetadataValue,
};

pub use channels::{
    CfaLayout,
    Channel,
    ChannelImage,
    ChannelSet,
    split_channels,
};

pub use classify::{
    Classification,
    ImageType,
    ObjectClassifier,
    DEFAULT_OBJECT_PATTERN,
};

pub use header::{
    Header,
    HeaderBuilder,
    HeaderEntry,
    HeaderValue,
    load_header_overrides,
};

pub use camera::{
    CameraModel,
    CameraProfile,
    NikonD810a,
};

pub use fits::{
    FitsWriter,
    StandardFitsWriter,
};

pub use conversions::{
    ConversionConfig,
    ConversionConfigBuilder,
    FileConverter,
    RawToFitsPipeline,
};
