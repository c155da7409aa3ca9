//! Nikon D810A, the astro-modified full-frame body.

use crate::image_pipeline::camera::profile::CameraProfile;
use crate::image_pipeline::channels::CfaLayout;
use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::header::{HeaderEntry, HeaderValue};
use crate::image_pipeline::metadata::{MetadataRecord, MetadataValue};

/// Pixel pitch in micrometers.
const PIXEL_SIZE_UM: f64 = 4.88;

/// 14-bit ADC.
const SATURATION: i64 = 1 << 14;

pub struct NikonD810a;

impl CameraProfile for NikonD810a {
    fn name(&self) -> &'static str {
        "Nikon D810A"
    }

    fn source_extension(&self) -> &'static str {
        "nef"
    }

    fn cfa_layout(&self) -> CfaLayout {
        CfaLayout {
            r: (0, 0),
            g1: (0, 1),
            b: (1, 0),
            g2: (1, 1),
        }
    }

    fn header_entries(&self, metadata: &MetadataRecord) -> Result<Vec<HeaderEntry>> {
        let timestamp = text(metadata, "DateTimeOriginal")?;
        let (date, time) = split_timestamp(&timestamp)?;

        Ok(vec![
            HeaderEntry::new("EXPOSURE", field(metadata, "ExposureTime")?)
                .with_comment("Exposure time in seconds"),
            HeaderEntry::new("ISOSPEED", field(metadata, "ISOSpeedRatings")?)
                .with_comment("Camera ISO speed sensitivity rating"),
            HeaderEntry::new("CAMERA", field(metadata, "Model")?).with_comment("Camera model"),
            HeaderEntry::new("DATE-OBS", date.replace(':', "/")).with_comment("YYYY/MM/DD"),
            HeaderEntry::new("TIME-OBS", time).with_comment("hh:mm:ss"),
            HeaderEntry::new("DETECTOR", "Full-frame DSLR CMOS"),
            HeaderEntry::new("PIXSIZE1", PIXEL_SIZE_UM).with_comment("Micrometers"),
            HeaderEntry::new("PIXSIZE2", PIXEL_SIZE_UM).with_comment("Micrometers"),
            HeaderEntry::new("SATURATE", SATURATION).with_comment("14-bit saturation value"),
            HeaderEntry::new("SWCREATE", field(metadata, "Software")?),
        ])
    }
}

fn required<'a>(metadata: &'a MetadataRecord, name: &str) -> Result<&'a MetadataValue> {
    metadata
        .get(name)
        .ok_or_else(|| ConversionError::RequiredFieldMissing(name.to_string()))
}

fn text(metadata: &MetadataRecord, name: &str) -> Result<String> {
    match required(metadata, name)? {
        MetadataValue::Text(s) => Ok(s.clone()),
        other => Err(invalid(name, format!("expected text, found {other:?}"))),
    }
}

/// A metadata field as a single FITS value.
fn field(metadata: &MetadataRecord, name: &str) -> Result<HeaderValue> {
    match required(metadata, name)? {
        MetadataValue::Integer(i) => Ok(HeaderValue::Int(*i)),
        MetadataValue::Ratio(x) | MetadataValue::Real(x) => Ok(HeaderValue::Float(*x)),
        MetadataValue::Text(s) => Ok(HeaderValue::Str(s.trim().to_string())),
        // ISO speed is stored as a list on some firmware; the first value is the setting.
        MetadataValue::Integers(v) if !v.is_empty() => Ok(HeaderValue::Int(v[0])),
        other => Err(invalid(name, format!("no FITS representation for {other:?}"))),
    }
}

/// `2024:03:12 22:05:09` -> (`2024:03:12`, `22:05:09`)
fn split_timestamp(timestamp: &str) -> Result<(String, String)> {
    let mut parts = timestamp.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(date), Some(time), None) => Ok((date.to_string(), time.to_string())),
        _ => Err(invalid("DateTimeOriginal", format!("expected 'date time', found {timestamp:?}"))),
    }
}

fn invalid(field: &str, reason: String) -> ConversionError {
    ConversionError::InvalidField {
        field: field.to_string(),
        reason,
    }
}
