//! RAW frame reader backed by the rawloader library.
//!
//! rawloader understands NEF, ARW, CR2, DNG and most other TIFF-based RAW
//! containers. Only the undemosaiced sensor data is used here: no crops,
//! black level or white balance are applied, the grid is handed over exactly
//! as the sensor recorded it.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::RawImageData;

pub struct RawLoaderReader;

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

impl RawImageReader for RawLoaderReader {
    /// Decodes the RAW bytes into a single-sample-per-pixel mosaic.
    ///
    /// Float RAW data (normalized 0.0-1.0) is scaled into the u16 range.
    /// Frames with more than one component per pixel (already demosaiced
    /// linear DNGs, for instance) carry no colour-filter mosaic to split
    /// and are rejected.
    fn read_raw(&self, data: &[u8]) -> Result<RawImageData> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(ConversionError::UnsupportedFormat(format!(
                "{} components per pixel, expected a single-channel mosaic",
                decoded.cpp
            )));
        }

        let width = decoded.width;
        let height = decoded.height;
        debug!(make = %decoded.make, model = %decoded.model, "Decoded frame: {}x{}", width, height);

        let data: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v * u16::MAX as f32) as u16).collect()
            }
        };

        if data.len() != width * height {
            return Err(ConversionError::DecodeError(format!(
                "decoded {} samples for a {}x{} frame",
                data.len(),
                width,
                height
            )));
        }

        // The white level is the largest value the sensor can produce, so its
        // bit length is the effective sample depth (4095 -> 12, 16383 -> 14).
        let max_white_level = decoded.whitelevels.iter().max().copied().unwrap_or(u16::MAX);
        let bits_per_sample = if max_white_level == 0 {
            DEFAULT_BITS_PER_SAMPLE
        } else {
            U16_BITS - max_white_level.leading_zeros()
        };

        debug!("Calculated bits_per_sample: {} (max white level: {})", bits_per_sample, max_white_level);

        Ok(RawImageData {
            width,
            height,
            data,
            bits_per_sample,
        })
    }
}
