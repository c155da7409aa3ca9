//! FITS writing module

mod card;
mod standard_fits_writer;
mod writer;

pub use card::{commentary_cards, validate_keyword, value_card};
pub use standard_fits_writer::{BLOCK_LEN, StandardFitsWriter};
pub use writer::{FitsWriter, ImageExtension};
