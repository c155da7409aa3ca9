use std::io::Write;

use crate::image_pipeline::channels::ChannelImage;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::header::Header;

/// One image HDU: pixels plus the header written in front of them.
#[derive(Debug, Clone, Copy)]
pub struct ImageExtension<'a> {
    pub image: &'a ChannelImage,
    pub header: &'a Header,
}

/// Encodes image extensions into a FITS file; the first one becomes the primary HDU.
pub trait FitsWriter {
    fn write_fits(&self, extensions: &[ImageExtension<'_>], output: &mut dyn Write) -> Result<()>;
}
