//! Multi-extension FITS encoder for 16-bit channel images.

use std::io::Write;

use tracing::{debug, warn};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::fits::card::{CARD_LEN, commentary_cards, end_card, value_card};
use crate::image_pipeline::fits::writer::{FitsWriter, ImageExtension};
use crate::image_pipeline::header::{Header, HeaderValue};

pub const BLOCK_LEN: usize = 2880;

/// Offset mapping unsigned 16-bit pixels onto FITS signed 16-bit integers.
const BZERO_U16: i64 = 32768;

/// Keywords describing the HDU structure, written by the encoder only.
const STRUCTURAL_KEYWORDS: [&str; 11] = [
    "SIMPLE", "XTENSION", "BITPIX", "NAXIS", "NAXIS1", "NAXIS2", "PCOUNT", "GCOUNT", "BZERO", "BSCALE",
    "EXTNAME",
];

pub struct StandardFitsWriter;

impl FitsWriter for StandardFitsWriter {
    fn write_fits(&self, extensions: &[ImageExtension<'_>], output: &mut dyn Write) -> Result<()> {
        if extensions.is_empty() {
            return Err(ConversionError::EncodeError("no image extensions to write".to_string()));
        }

        for (index, extension) in extensions.iter().enumerate() {
            let cards = header_cards(extension, index == 0)?;
            debug!(
                extname = extension.image.channel.name(),
                cards = cards.len(),
                "Encoding HDU {}x{}",
                extension.image.width,
                extension.image.height
            );
            write_header(&cards, output)?;
            write_data(&extension.image.data, output)?;
        }
        output.flush()?;
        Ok(())
    }
}

fn header_cards(extension: &ImageExtension<'_>, primary: bool) -> Result<Vec<String>> {
    let image = extension.image;
    let mut cards = Vec::new();

    if primary {
        cards.push(value_card("SIMPLE", &HeaderValue::Bool(true), Some("conforms to FITS standard"))?);
    } else {
        cards.push(value_card("XTENSION", &"IMAGE".into(), Some("Image extension"))?);
    }
    cards.push(value_card("BITPIX", &HeaderValue::Int(16), Some("array data type"))?);
    cards.push(value_card("NAXIS", &HeaderValue::Int(2), Some("number of array dimensions"))?);
    cards.push(value_card("NAXIS1", &HeaderValue::Int(image.width as i64), None)?);
    cards.push(value_card("NAXIS2", &HeaderValue::Int(image.height as i64), None)?);
    if !primary {
        cards.push(value_card("PCOUNT", &HeaderValue::Int(0), Some("number of parameters"))?);
        cards.push(value_card("GCOUNT", &HeaderValue::Int(1), Some("number of groups"))?);
    }

    push_entries(&mut cards, extension.header)?;

    cards.push(value_card("BZERO", &HeaderValue::Int(BZERO_U16), None)?);
    cards.push(value_card("BSCALE", &HeaderValue::Int(1), None)?);
    cards.push(value_card("EXTNAME", &image.channel.name().into(), Some("extension name"))?);

    for comment in extension.header.comments() {
        cards.extend(commentary_cards("COMMENT", comment));
    }
    for history in extension.header.history() {
        cards.extend(commentary_cards("HISTORY", history));
    }
    cards.push(end_card());
    Ok(cards)
}

fn push_entries(cards: &mut Vec<String>, header: &Header) -> Result<()> {
    for entry in header.entries() {
        if STRUCTURAL_KEYWORDS.contains(&entry.key.as_str()) {
            warn!(key = %entry.key, "Ignoring header entry that would redefine the HDU structure");
            continue;
        }
        cards.push(value_card(&entry.key, &entry.value, entry.comment.as_deref())?);
    }
    Ok(())
}

fn write_header(cards: &[String], output: &mut dyn Write) -> Result<()> {
    for card in cards {
        output.write_all(card.as_bytes())?;
    }
    let written = cards.len() * CARD_LEN;
    output.write_all(&vec![b' '; padding(written)])?;
    Ok(())
}

fn write_data(data: &[u16], output: &mut dyn Write) -> Result<()> {
    let mut bytes = Vec::with_capacity(data.len() * 2 + BLOCK_LEN);
    for &value in data {
        // value - 32768 as a big-endian i16 is the value with its top bit flipped.
        bytes.extend_from_slice(&(value ^ 0x8000).to_be_bytes());
    }
    bytes.resize(bytes.len() + padding(bytes.len()), 0);
    output.write_all(&bytes)?;
    Ok(())
}

fn padding(len: usize) -> usize {
    (BLOCK_LEN - len % BLOCK_LEN) % BLOCK_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::channels::{Channel, ChannelImage};
    use crate::image_pipeline::header::HeaderEntry;

    fn image(channel: Channel) -> ChannelImage {
        ChannelImage {
            channel,
            width: 3,
            height: 2,
            data: vec![0, 1, 32768, 65535, 100, 200],
        }
    }

    fn cards(bytes: &[u8]) -> Vec<String> {
        bytes
            .chunks(CARD_LEN)
            .map(|c| String::from_utf8_lossy(c).trim_end().to_string())
            .collect()
    }

    #[test]
    fn writes_primary_and_extension() {
        let header: Header = [HeaderEntry::new("EXTEND", true), HeaderEntry::new("OBJECT", "M42")]
            .into_iter()
            .collect();
        let r = image(Channel::R);
        let g = image(Channel::G1);
        let extensions = [
            ImageExtension { image: &r, header: &header },
            ImageExtension { image: &g, header: &header },
        ];

        let mut out = Vec::new();
        StandardFitsWriter.write_fits(&extensions, &mut out).unwrap();

        // header block + data block per HDU
        assert_eq!(out.len(), 4 * BLOCK_LEN);

        let primary = cards(&out[..BLOCK_LEN]);
        assert_eq!(primary[0], "SIMPLE  =                    T / conforms to FITS standard");
        assert_eq!(primary[3], "NAXIS1  =                    3");
        assert_eq!(primary[4], "NAXIS2  =                    2");
        assert!(primary.contains(&"OBJECT  = 'M42     '".to_string()));
        assert!(primary.contains(&"EXTNAME = 'R       '           / extension name".to_string()));
        assert!(primary.contains(&"END".to_string()));

        let data = &out[BLOCK_LEN..BLOCK_LEN + 12];
        let decoded: Vec<u16> = data
            .chunks(2)
            .map(|b| (i16::from_be_bytes([b[0], b[1]]) as i32 + 32768) as u16)
            .collect();
        assert_eq!(decoded, r.data);
        assert!(out[BLOCK_LEN + 12..2 * BLOCK_LEN].iter().all(|&b| b == 0));

        let extension = cards(&out[2 * BLOCK_LEN..3 * BLOCK_LEN]);
        assert_eq!(extension[0], "XTENSION= 'IMAGE   '           / Image extension");
        assert!(extension.contains(&"EXTNAME = 'G1      '           / extension name".to_string()));
    }

    #[test]
    fn structural_overrides_are_ignored() {
        let header: Header = [HeaderEntry::new("BITPIX", 8i64)].into_iter().collect();
        let r = image(Channel::R);
        let mut out = Vec::new();
        StandardFitsWriter
            .write_fits(&[ImageExtension { image: &r, header: &header }], &mut out)
            .unwrap();

        let bitpix: Vec<_> = cards(&out[..BLOCK_LEN]).into_iter().filter(|c| c.starts_with("BITPIX")).collect();
        assert_eq!(bitpix, ["BITPIX  =                   16 / array data type"]);
    }

    #[test]
    fn invalid_keyword_fails() {
        let header: Header = [HeaderEntry::new("WAYTOOLONG", 1i64)].into_iter().collect();
        let r = image(Channel::R);
        let mut out = Vec::new();
        let result = StandardFitsWriter.write_fits(&[ImageExtension { image: &r, header: &header }], &mut out);
        assert!(matches!(result, Err(ConversionError::InvalidKeyword(_))));
    }
}
