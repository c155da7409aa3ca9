//! Layered header construction.
//!
//! Layers are applied in a fixed order, each one able to replace keys set by
//! the ones before it:
//!
//! 1. camera metadata entries, led by `EXTEND`
//! 2. provenance entries
//! 3. caller overrides
//!
//! Every channel header starts with its own `EXTEND` and `FILTER` entries,
//! which the layers may also replace, and ends with the library-versions
//! COMMENT and the conversion HISTORY line.

use chrono::{DateTime, Utc};

use crate::image_pipeline::channels::Channel;
use crate::image_pipeline::header::provenance::{history_line, versions_comment};
use crate::image_pipeline::header::types::{Header, HeaderEntry};

#[derive(Debug, Clone)]
pub struct HeaderBuilder<'a> {
    camera: Vec<HeaderEntry>,
    provenance: Vec<HeaderEntry>,
    overrides: &'a [HeaderEntry],
    converted_at: DateTime<Utc>,
}

impl<'a> HeaderBuilder<'a> {
    pub fn new(
        camera: Vec<HeaderEntry>,
        provenance: Vec<HeaderEntry>,
        overrides: &'a [HeaderEntry],
        converted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            camera,
            provenance,
            overrides,
            converted_at,
        }
    }

    fn layers(&self) -> impl Iterator<Item = HeaderEntry> + '_ {
        std::iter::once(HeaderEntry::new("EXTEND", true))
            .chain(self.camera.iter().cloned())
            .chain(self.provenance.iter().cloned())
            .chain(self.overrides.iter().cloned())
    }

    /// The three layers merged, without per-channel entries or trailer.
    pub fn common(&self) -> Header {
        self.layers().collect()
    }

    /// Full header of one channel extension.
    pub fn for_channel(&self, channel: Channel) -> Header {
        let mut header: Header = [
            HeaderEntry::new("EXTEND", true),
            HeaderEntry::new("FILTER", channel.filter()),
        ]
        .into_iter()
        .collect();
        header.extend(self.layers());
        header.add_comment(versions_comment());
        header.add_history(history_line(self.converted_at));
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::header::types::HeaderValue;

    fn builder(overrides: &[HeaderEntry]) -> HeaderBuilder<'_> {
        HeaderBuilder::new(
            vec![
                HeaderEntry::new("EXPOSURE", 30.0).with_comment("Exposure time in seconds"),
                HeaderEntry::new("CAMERA", "NIKON D810A").with_comment("Camera model"),
            ],
            vec![
                HeaderEntry::new("ORIGIN", "nef2fits"),
                HeaderEntry::new("OBJECT", "M42"),
            ],
            overrides,
            Utc::now(),
        )
    }

    fn keys(header: &Header) -> Vec<&str> {
        header.entries().iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn channel_header_order() {
        let header = builder(&[]).for_channel(Channel::G1);
        assert_eq!(keys(&header), ["EXTEND", "FILTER", "EXPOSURE", "CAMERA", "ORIGIN", "OBJECT"]);
        assert_eq!(header.get("FILTER").unwrap().value, HeaderValue::Str("Photographic G".into()));
        assert_eq!(header.comments().len(), 1);
        assert_eq!(header.history().len(), 1);
    }

    #[test]
    fn overrides_replace_in_place() {
        let overrides = [
            HeaderEntry::new("CAMERA", "TEST-CAM").with_comment("overridden"),
            HeaderEntry::new("OBSERVER", "someone"),
        ];
        let header = builder(&overrides).for_channel(Channel::R);

        let camera = header.get("CAMERA").unwrap();
        assert_eq!(camera.value, HeaderValue::Str("TEST-CAM".into()));
        assert_eq!(camera.comment.as_deref(), Some("overridden"));
        assert_eq!(
            keys(&header),
            ["EXTEND", "FILTER", "EXPOSURE", "CAMERA", "ORIGIN", "OBJECT", "OBSERVER"]
        );
    }

    #[test]
    fn overrides_can_replace_channel_entries() {
        let overrides = [HeaderEntry::new("FILTER", "Luminance")];
        let header = builder(&overrides).for_channel(Channel::B);
        assert_eq!(header.get("FILTER").unwrap().value, HeaderValue::Str("Luminance".into()));
        assert_eq!(keys(&header)[1], "FILTER");
    }

    #[test]
    fn merge_is_last_write_wins_first_position() {
        let l1 = [HeaderEntry::new("A", 1i64), HeaderEntry::new("B", 1i64)];
        let l2 = [HeaderEntry::new("C", 2i64), HeaderEntry::new("A", 2i64)];
        let l3 = [HeaderEntry::new("B", 3i64).with_comment("three"), HeaderEntry::new("D", 3i64)];
        let header = HeaderBuilder::new(l1.to_vec(), l2.to_vec(), &l3, Utc::now()).common();

        assert_eq!(keys(&header), ["EXTEND", "A", "B", "C", "D"]);
        assert_eq!(header.get("A").unwrap().value, HeaderValue::Int(2));
        assert_eq!(header.get("B").unwrap().value, HeaderValue::Int(3));
        assert_eq!(header.get("B").unwrap().comment.as_deref(), Some("three"));
    }
}
