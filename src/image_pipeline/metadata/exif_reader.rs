//! EXIF metadata reader backed by kamadak-exif.
//!
//! RAW files such as NEF are TIFF containers, so the primary IFD and its
//! Exif sub-IFD can be read directly from the file bytes.

use std::io::Cursor;

use exif::{Context, Field, In, Tag, Value};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::metadata::reader::{DROPPED_FIELDS, MetadataReader};
use crate::image_pipeline::metadata::types::{MetadataRecord, MetadataValue};

pub struct ExifMetadataReader;

impl MetadataReader for ExifMetadataReader {
    fn read_metadata(&self, data: &[u8]) -> Result<MetadataRecord> {
        let exif = exif::Reader::new()
            .read_from_container(&mut Cursor::new(data))
            .map_err(|e| ConversionError::MetadataDecode(e.to_string()))?;

        let record = translate_fields(exif.fields());
        debug!("Translated {} EXIF fields", record.len());
        Ok(record)
    }
}

/// Translates primary-image TIFF and Exif fields, then drops [`DROPPED_FIELDS`].
pub fn translate_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) -> MetadataRecord {
    let mut record: MetadataRecord = fields
        .into_iter()
        .filter(|f| f.ifd_num == In::PRIMARY)
        .filter(|f| matches!(f.tag.context(), Context::Tiff | Context::Exif))
        .filter_map(|f| translate_value(&f.value).map(|v| (tag_name(f.tag), v)))
        .collect();

    for name in DROPPED_FIELDS {
        record.remove(name);
    }
    record
}

/// Classic TIFF/Exif field name for `tag`.
///
/// kamadak-exif follows Exif 2.3 naming, which renamed a few fields and
/// does not know the XMP packet tag at all.
pub fn tag_name(tag: Tag) -> String {
    match (tag.context(), tag.number()) {
        (Context::Tiff, 0x02bc) => "XMLPacket".to_string(),
        (Context::Exif, 0x8827) => "ISOSpeedRatings".to_string(),
        _ => tag.to_string(),
    }
}

/// Maps an EXIF value onto a [`MetadataValue`] by its type code.
///
/// Returns `None` for values of an unknown type.
pub fn translate_value(value: &Value) -> Option<MetadataValue> {
    let translated = match value {
        Value::Byte(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::Short(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::Long(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::SByte(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::SShort(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::SLong(v) => integers(v.iter().map(|&x| i64::from(x))),
        Value::Ascii(v) => {
            let text = v.first().map(|s| String::from_utf8_lossy(s).into_owned()).unwrap_or_default();
            MetadataValue::Text(text)
        }
        Value::Rational(v) => ratio(v.iter().map(|r| (f64::from(r.num), f64::from(r.denom)))),
        Value::SRational(v) => ratio(v.iter().map(|r| (f64::from(r.num), f64::from(r.denom)))),
        Value::Undefined(bytes, _) => MetadataValue::Bytes(bytes.clone()),
        Value::Float(v) => reals(v.iter().map(|&x| f64::from(x))),
        Value::Double(v) => reals(v.iter().copied()),
        _ => return None,
    };
    Some(translated)
}

fn integers(values: impl Iterator<Item = i64>) -> MetadataValue {
    let mut values: Vec<i64> = values.collect();
    if values.len() == 1 {
        MetadataValue::Integer(values.remove(0))
    } else {
        MetadataValue::Integers(values)
    }
}

fn reals(values: impl Iterator<Item = f64>) -> MetadataValue {
    let mut values: Vec<f64> = values.collect();
    if values.len() == 1 {
        MetadataValue::Real(values.remove(0))
    } else {
        MetadataValue::Reals(values)
    }
}

/// A single numerator/denominator pair; anything else is NaN.
fn ratio(mut pairs: impl Iterator<Item = (f64, f64)>) -> MetadataValue {
    let value = match (pairs.next(), pairs.next()) {
        (Some((num, den)), None) if den != 0.0 => num / den,
        _ => f64::NAN,
    };
    MetadataValue::Ratio(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::{Rational, SRational};

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn integer_types_decode_to_integers() {
        assert_eq!(translate_value(&Value::Short(vec![800])), Some(MetadataValue::Integer(800)));
        assert_eq!(translate_value(&Value::SLong(vec![-3])), Some(MetadataValue::Integer(-3)));
        assert_eq!(translate_value(&Value::Byte(vec![7])), Some(MetadataValue::Integer(7)));
        assert_eq!(
            translate_value(&Value::Short(vec![8, 8, 8])),
            Some(MetadataValue::Integers(vec![8, 8, 8]))
        );
    }

    #[test]
    fn ascii_decodes_to_text() {
        let value = Value::Ascii(vec![b"NIKON D810A".to_vec()]);
        assert_eq!(translate_value(&value), Some(MetadataValue::Text("NIKON D810A".into())));
    }

    #[test]
    fn rationals_divide() {
        let exposure = Value::Rational(vec![Rational { num: 1, denom: 250 }]);
        assert_eq!(translate_value(&exposure), Some(MetadataValue::Ratio(0.004)));

        let bias = Value::SRational(vec![SRational { num: -2, denom: 3 }]);
        assert_eq!(translate_value(&bias), Some(MetadataValue::Ratio(-2.0 / 3.0)));
    }

    #[test]
    fn malformed_rationals_are_nan() {
        let zero = Value::Rational(vec![Rational { num: 1, denom: 0 }]);
        let many = Value::Rational(vec![Rational { num: 1, denom: 2 }, Rational { num: 3, denom: 4 }]);
        for value in [zero, many, Value::Rational(vec![])] {
            match translate_value(&value) {
                Some(MetadataValue::Ratio(v)) => assert!(v.is_nan()),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn undefined_and_floats_pass_through() {
        let blob = Value::Undefined(vec![0x30, 0x32, 0x33, 0x30], 0);
        assert_eq!(translate_value(&blob), Some(MetadataValue::Bytes(b"0230".to_vec())));
        assert_eq!(translate_value(&Value::Double(vec![2.5])), Some(MetadataValue::Real(2.5)));
        assert_eq!(translate_value(&Value::Float(vec![0.5])), Some(MetadataValue::Real(0.5)));
    }

    #[test]
    fn dropped_fields_are_removed() {
        let fields = vec![
            field(Tag::Model, Value::Ascii(vec![b"D810A".to_vec()])),
            field(Tag::MakerNote, Value::Undefined(vec![1, 2, 3], 0)),
            field(Tag(Context::Tiff, 0x02bc), Value::Byte(b"<x:xmpmeta/>".to_vec())),
        ];
        let record = translate_fields(&fields);

        assert!(record.contains("Model"));
        assert!(!record.contains("MakerNote"));
        assert!(!record.contains("XMLPacket"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn iso_uses_classic_name_and_thumbnail_fields_are_skipped() {
        let mut thumb = field(Tag::Model, Value::Ascii(vec![b"thumb".to_vec()]));
        thumb.ifd_num = In::THUMBNAIL;
        let fields = vec![field(Tag::PhotographicSensitivity, Value::Short(vec![1600])), thumb];
        let record = translate_fields(&fields);

        assert_eq!(record.get("ISOSpeedRatings"), Some(&MetadataValue::Integer(1600)));
        assert!(!record.contains("Model"));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = ExifMetadataReader.read_metadata(b"not a tiff");
        assert!(matches!(result, Err(ConversionError::MetadataDecode(_))));
    }
}
