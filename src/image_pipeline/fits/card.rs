//! 80-column FITS header cards.

use tracing::warn;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::header::HeaderValue;

pub const CARD_LEN: usize = 80;

/// Longest text a COMMENT or HISTORY card holds.
const COMMENTARY_LEN: usize = CARD_LEN - 8;

/// Numbers and logicals end in column 30, short strings are padded to it.
const FIXED_VALUE_WIDTH: usize = 20;

/// Longest string value between the quotes, with `''` counted as two.
const MAX_STRING_LEN: usize = CARD_LEN - 12;

/// Keywords are 1 to 8 of `A-Z`, `0-9`, `-` and `_`.
pub fn validate_keyword(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key.len() <= 8
        && key
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(ConversionError::InvalidKeyword(key.to_string()))
    }
}

/// `KEY     = value / comment`, padded or cut to 80 columns.
pub fn value_card(key: &str, value: &HeaderValue, comment: Option<&str>) -> Result<String> {
    validate_keyword(key)?;
    let mut card = format!("{key:<8}= {}", format_value(key, value));
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        card.push_str(" / ");
        card.push_str(&ascii(comment));
    }
    Ok(fit(card))
}

/// COMMENT or HISTORY text, wrapped over as many cards as it needs.
pub fn commentary_cards(key: &str, text: &str) -> Vec<String> {
    let text = ascii(text);
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![fit(key.to_string())];
    }
    chars
        .chunks(COMMENTARY_LEN)
        .map(|chunk| fit(format!("{key:<8}{}", chunk.iter().collect::<String>())))
        .collect()
}

pub fn end_card() -> String {
    fit("END".to_string())
}

fn format_value(key: &str, value: &HeaderValue) -> String {
    match value {
        HeaderValue::Bool(b) => format!("{:>FIXED_VALUE_WIDTH$}", if *b { "T" } else { "F" }),
        HeaderValue::Int(i) => format!("{i:>FIXED_VALUE_WIDTH$}"),
        HeaderValue::Float(x) if x.is_finite() => format!("{:>FIXED_VALUE_WIDTH$}", format_float(*x)),
        // Undefined value.
        HeaderValue::Float(_) => " ".repeat(FIXED_VALUE_WIDTH),
        HeaderValue::Str(s) => {
            let quoted = quote(key, s);
            format!("{:<FIXED_VALUE_WIDTH$}", format!("'{quoted:<8}'"))
        }
    }
}

/// Escapes quotes and clips the text so the closing quote stays on the card.
fn quote(key: &str, text: &str) -> String {
    let mut quoted = String::new();
    for c in ascii(text).chars() {
        let width = if c == '\'' { 2 } else { 1 };
        if quoted.len() + width > MAX_STRING_LEN {
            warn!(key, "String value clipped to {MAX_STRING_LEN} characters");
            break;
        }
        quoted.push(c);
        if c == '\'' {
            quoted.push('\'');
        }
    }
    quoted
}

/// Shortest round-trip form with an upper-case exponent and a decimal point.
fn format_float(x: f64) -> String {
    let repr = format!("{x:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.0E{exponent}"),
        None => repr,
    }
}

/// FITS headers are restricted to printable ASCII.
fn ascii(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

fn fit(mut card: String) -> String {
    card.truncate(CARD_LEN);
    format!("{card:<CARD_LEN$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_format_numbers_end_in_column_30() {
        let card = value_card("NAXIS1", &HeaderValue::Int(3680), None).unwrap();
        assert_eq!(card.len(), 80);
        assert_eq!(&card[..30], "NAXIS1  =                 3680");

        let card = value_card("SIMPLE", &HeaderValue::Bool(true), Some("conforms to FITS standard")).unwrap();
        assert_eq!(card.trim_end(), "SIMPLE  =                    T / conforms to FITS standard");
    }

    #[test]
    fn strings_are_quoted_and_padded() {
        let card = value_card("XTENSION", &HeaderValue::Str("IMAGE".into()), None).unwrap();
        assert_eq!(card.trim_end(), "XTENSION= 'IMAGE   '");

        let card = value_card("OBSERVER", &HeaderValue::Str("O'Neil".into()), None).unwrap();
        assert_eq!(card.trim_end(), "OBSERVER= 'O''Neil '");
    }

    #[test]
    fn floats() {
        assert_eq!(format_float(4.88), "4.88");
        assert_eq!(format_float(30.0), "30.0");
        assert_eq!(format_float(1e-7), "1.0E-7");
        let card = value_card("EXPOSURE", &HeaderValue::Float(f64::NAN), Some("s")).unwrap();
        assert_eq!(card.trim_end(), format!("EXPOSURE= {} / s", " ".repeat(20)));
    }

    #[test]
    fn long_strings_keep_their_closing_quote() {
        let card = value_card("NOTES", &HeaderValue::Str("y".repeat(100)), Some("dropped")).unwrap();
        assert_eq!(card, format!("NOTES   = '{}'", "y".repeat(68)));

        // An escaped quote is never split at the limit.
        let text = format!("{}'", "y".repeat(67));
        let card = value_card("NOTES", &HeaderValue::Str(text), None).unwrap();
        assert_eq!(card.trim_end(), format!("NOTES   = '{}'", "y".repeat(67)));

        let text = format!("{}'", "y".repeat(66));
        let card = value_card("NOTES", &HeaderValue::Str(text), None).unwrap();
        assert_eq!(card, format!("NOTES   = '{}'''", "y".repeat(66)));
    }

    #[test]
    fn long_comments_are_cut() {
        let card = value_card("EXPOSURE", &HeaderValue::Float(30.0), Some(&"c".repeat(100))).unwrap();
        assert_eq!(card.len(), 80);
        assert!(card.starts_with("EXPOSURE=                 30.0 / ccc"));
    }

    #[test]
    fn rejects_bad_keywords() {
        for key in ["", "TOOLONGKEY", "HAS SPACE", "A=B", "camera", "Object", "A.B", "A'B"] {
            assert!(matches!(validate_keyword(key), Err(ConversionError::InvalidKeyword(_))), "{key}");
        }
        for key in ["DATE-OBS", "PIXSIZE1", "MY_KEY"] {
            assert!(validate_keyword(key).is_ok(), "{key}");
        }
    }

    #[test]
    fn commentary_wraps() {
        let text = "a".repeat(100);
        let cards = commentary_cards("COMMENT", &text);
        assert_eq!(cards.len(), 2);
        assert!(cards[0].starts_with("COMMENT aaaa"));
        assert_eq!(cards[1].trim_end(), format!("COMMENT {}", "a".repeat(28)));
    }
}
