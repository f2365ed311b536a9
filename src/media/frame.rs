//! Decoded RGBA frame handed from a frame source to the GPU

/// One RGBA8 frame, tightly packed (no row padding)
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// 4 bytes per pixel, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Presentation timestamp in seconds
    pub pts: f64,
    /// Frame index (0-based, restarts on loop)
    pub frame_index: u64,
}

impl DecodedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, pts: f64, frame_index: u64) -> Self {
        Self {
            data,
            width,
            height,
            pts,
            frame_index,
        }
    }

    /// Byte length of a packed RGBA frame
    pub fn expected_size(width: u32, height: u32) -> usize {
        (width as usize) * (height as usize) * 4
    }

    /// Data length matches the dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() == Self::expected_size(self.width, self.height)
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }
}
