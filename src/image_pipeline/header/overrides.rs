//! Header override files.
//!
//! A JSON array whose elements are `[key, value]` or `[key, value, comment]`
//! arrays, for example:
//!
//! ```json
//! [["OBSERVER", "J. Doe"], ["CAMERA", "TEST-CAM", "overridden"]]
//! ```

use std::path::Path;

use serde_json::Value;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::fits::validate_keyword;
use crate::image_pipeline::header::types::{HeaderEntry, HeaderValue};

pub fn load_header_overrides(path: &Path) -> Result<Vec<HeaderEntry>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConversionError::HeaderFile(format!("{}: {}", path.display(), e)))?;
    parse_header_overrides(&text)
        .map_err(|e| ConversionError::HeaderFile(format!("{}: {}", path.display(), e)))
}

pub fn parse_header_overrides(text: &str) -> std::result::Result<Vec<HeaderEntry>, String> {
    let root: Value = serde_json::from_str(text).map_err(|e| e.to_string())?;
    let Value::Array(items) = root else {
        return Err("expected a JSON array".to_string());
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_entry(item).map_err(|e| format!("element {i}: {e}")))
        .collect()
}

fn parse_entry(item: &Value) -> std::result::Result<HeaderEntry, String> {
    let parts = item.as_array().ok_or("expected a [key, value] or [key, value, comment] array")?;
    let (key, value, comment) = match parts.as_slice() {
        [key, value] => (key, value, None),
        [key, value, comment] => (key, value, Some(comment)),
        other => return Err(format!("expected 2 or 3 items, found {}", other.len())),
    };

    let key = key.as_str().ok_or("key must be a string")?;
    validate_keyword(key).map_err(|e| e.to_string())?;
    let value = match value {
        Value::Bool(b) => HeaderValue::Bool(*b),
        Value::String(s) => HeaderValue::Str(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => HeaderValue::Int(i),
            None => HeaderValue::Float(n.as_f64().ok_or("number out of range")?),
        },
        _ => return Err(format!("unsupported value for {key}: {value}")),
    };

    let mut entry = HeaderEntry::new(key, value);
    if let Some(comment) = comment {
        entry.comment = Some(comment.as_str().ok_or("comment must be a string")?.to_string());
    }
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_pairs_and_triples() {
        let entries = parse_header_overrides(
            r#"[["CAMERA","TEST-CAM","overridden"], ["GAIN", 2], ["PIXSIZE1", 4.5], ["BAYER", false]]"#,
        )
        .unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], HeaderEntry::new("CAMERA", "TEST-CAM").with_comment("overridden"));
        assert_eq!(entries[1].value, HeaderValue::Int(2));
        assert_eq!(entries[2].value, HeaderValue::Float(4.5));
        assert_eq!(entries[3].value, HeaderValue::Bool(false));
        assert_eq!(entries[3].comment, None);
    }

    #[test]
    fn rejects_bad_shapes() {
        for bad in [
            r#"{"CAMERA": "x"}"#,
            r#"[["CAMERA"]]"#,
            r#"[["A", 1, "c", "extra"]]"#,
            r#"[[1, 2]]"#,
            r#"[["A", null]]"#,
            r#"[["A", [1, 2]]]"#,
            r#"[["A", 1, 5]]"#,
            "not json",
        ] {
            assert!(parse_header_overrides(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn rejects_non_standard_keys() {
        for bad in [r#"[["camera", "x"]]"#, r#"[["OBSERVER1", "x"]]"#, r#"[["MY.KEY", 1]]"#] {
            let err = parse_header_overrides(bad).unwrap_err();
            assert!(err.contains("Invalid FITS keyword"), "{err}");
        }
    }

    #[test]
    fn error_names_the_element() {
        let err = parse_header_overrides(r#"[["A", 1], ["B"]]"#).unwrap_err();
        assert!(err.starts_with("element 1:"), "{err}");
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[["OBSERVER", "someone"]]"#).unwrap();

        let entries = load_header_overrides(file.path()).unwrap();
        assert_eq!(entries, vec![HeaderEntry::new("OBSERVER", "someone")]);
    }

    #[test]
    fn missing_file_is_a_header_error() {
        let result = load_header_overrides(Path::new("/nonexistent/header.json"));
        assert!(matches!(result, Err(ConversionError::HeaderFile(_))));
    }
}
