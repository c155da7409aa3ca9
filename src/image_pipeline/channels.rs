//! Colour-filter channel splitting
//!
//! A Bayer sensor repeats a 2x2 colour-filter tile. Sampling the mosaic with
//! stride 2 at each of the four tile offsets yields four half-resolution
//! single-colour images without any interpolation.

use crate::image_pipeline::raw::RawImageData;

/// One of the four photosite positions of the 2x2 colour-filter tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G1,
    B,
    G2,
}

impl Channel {
    /// Output order of the extensions; the first one is the primary HDU.
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G1, Channel::B, Channel::G2];

    pub fn name(self) -> &'static str {
        match self {
            Channel::R => "R",
            Channel::G1 => "G1",
            Channel::B => "B",
            Channel::G2 => "G2",
        }
    }

    /// Value of the FILTER keyword, e.g. `Photographic G`.
    pub fn filter(self) -> String {
        let letter = &self.name()[..1];
        format!("Photographic {letter}")
    }
}

/// (row, column) offset of a channel inside the 2x2 tile.
pub type TileOffset = (usize, usize);

/// Where each channel sits inside the colour-filter tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfaLayout {
    pub r: TileOffset,
    pub g1: TileOffset,
    pub b: TileOffset,
    pub g2: TileOffset,
}

impl CfaLayout {
    pub fn offset(&self, channel: Channel) -> TileOffset {
        match channel {
            Channel::R => self.r,
            Channel::G1 => self.g1,
            Channel::B => self.b,
            Channel::G2 => self.g2,
        }
    }
}

/// Half-resolution image of a single channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelImage {
    pub channel: Channel,
    pub width: usize,
    pub height: usize,
    pub data: Vec<u16>,
}

impl ChannelImage {
    pub fn at(&self, row: usize, col: usize) -> u16 {
        self.data[row * self.width + col]
    }
}

/// The four channel images of one frame, in [`Channel::ALL`] order.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    images: [ChannelImage; 4],
}

impl ChannelSet {
    pub fn get(&self, channel: Channel) -> &ChannelImage {
        &self.images[Channel::ALL.iter().position(|&c| c == channel).unwrap_or(0)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelImage> {
        self.images.iter()
    }
}

/// Splits `frame` into its four channels according to `layout`.
///
/// Each channel image has `height / 2` rows and `width / 2` columns; a
/// trailing odd row or column is dropped. Frames smaller than 2x2 produce
/// empty images.
pub fn split_channels(frame: &RawImageData, layout: &CfaLayout) -> ChannelSet {
    let images = Channel::ALL.map(|channel| sample(frame, channel, layout.offset(channel)));
    ChannelSet { images }
}

fn sample(frame: &RawImageData, channel: Channel, (dy, dx): TileOffset) -> ChannelImage {
    let width = frame.width / 2;
    let height = frame.height / 2;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let src = &frame.data[(2 * row + dy) * frame.width..][..frame.width];
        data.extend(src.iter().skip(dx).step_by(2).take(width));
    }
    ChannelImage {
        channel,
        width,
        height,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIKON: CfaLayout = CfaLayout {
        r: (0, 0),
        g1: (0, 1),
        b: (1, 0),
        g2: (1, 1),
    };

    fn frame(width: usize, height: usize) -> RawImageData {
        RawImageData {
            width,
            height,
            data: (0..(width * height) as u16).collect(),
            bits_per_sample: 14,
        }
    }

    #[test]
    fn channels_sample_their_tile_offset() {
        let src = frame(6, 4);
        let set = split_channels(&src, &NIKON);

        for image in set.iter() {
            assert_eq!((image.width, image.height), (3, 2));
        }
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(set.get(Channel::R).at(i, j), src.at(2 * i, 2 * j));
                assert_eq!(set.get(Channel::G1).at(i, j), src.at(2 * i, 2 * j + 1));
                assert_eq!(set.get(Channel::B).at(i, j), src.at(2 * i + 1, 2 * j));
                assert_eq!(set.get(Channel::G2).at(i, j), src.at(2 * i + 1, 2 * j + 1));
            }
        }
    }

    #[test]
    fn odd_dimensions_are_floored() {
        let src = frame(5, 7);
        let set = split_channels(&src, &NIKON);

        for image in set.iter() {
            assert_eq!((image.width, image.height), (2, 3));
            assert_eq!(image.data.len(), 6);
        }
        assert_eq!(set.get(Channel::G2).at(2, 1), src.at(5, 3));
    }

    #[test]
    fn layout_is_honoured() {
        let swapped = CfaLayout {
            r: (1, 1),
            g1: (0, 1),
            b: (0, 0),
            g2: (1, 0),
        };
        let src = frame(4, 4);
        let set = split_channels(&src, &swapped);

        assert_eq!(set.get(Channel::R).data, vec![5, 7, 13, 15]);
        assert_eq!(set.get(Channel::B).data, vec![0, 2, 8, 10]);
    }

    #[test]
    fn set_keeps_output_order() {
        let set = split_channels(&frame(2, 2), &NIKON);
        let names: Vec<_> = set.iter().map(|i| i.channel.name()).collect();
        assert_eq!(names, ["R", "G1", "B", "G2"]);
        assert_eq!(Channel::G2.filter(), "Photographic G");
    }
}
