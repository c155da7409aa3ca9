//! RAW frame types

/// Undemosaiced sensor frame as read from the RAW file.
#[derive(Debug, Clone)]
pub struct RawImageData {
    /// Width of the frame in pixels (columns)
    pub width: usize,
    /// Height of the frame in pixels (rows)
    pub height: usize,
    /// Row-major pixel data, one sample per photosite (colour-filter mosaic)
    pub data: Vec<u16>,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
}

impl RawImageData {
    /// Sample at `row`, `col`. Panics when out of bounds.
    pub fn at(&self, row: usize, col: usize) -> u16 {
        self.data[row * self.width + col]
    }
}
