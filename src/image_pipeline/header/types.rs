//! FITS header model

use std::fmt;

/// Value of a FITS header keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Bool(b) => f.write_str(if *b { "T" } else { "F" }),
            HeaderValue::Int(i) => write!(f, "{i}"),
            HeaderValue::Float(x) => write!(f, "{x}"),
            HeaderValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        HeaderValue::Bool(v)
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::Str(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        HeaderValue::Str(v)
    }
}

/// A `(key, value, comment)` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderEntry {
    pub key: String,
    pub value: HeaderValue,
    pub comment: Option<String>,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Ordered header where every key appears once.
///
/// Setting a key that is already present replaces its value and comment but
/// keeps its original position. COMMENT and HISTORY lines are kept apart and
/// written after the keyword records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    entries: Vec<HeaderEntry>,
    comments: Vec<String>,
    history: Vec<String>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, entry: HeaderEntry) {
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => {
                existing.value = entry.value;
                existing.comment = entry.comment;
            }
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, key: &str) -> Option<&HeaderEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_comment(&mut self, text: impl Into<String>) {
        self.comments.push(text.into());
    }

    pub fn add_history(&mut self, text: impl Into<String>) {
        self.history.push(text.into());
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Extend<HeaderEntry> for Header {
    fn extend<I: IntoIterator<Item = HeaderEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.set(entry);
        }
    }
}

impl FromIterator<HeaderEntry> for Header {
    fn from_iter<I: IntoIterator<Item = HeaderEntry>>(iter: I) -> Self {
        let mut header = Header::new();
        header.extend(iter);
        header
    }
}
