//! Synthetic image data for offline capture tests

use crate::types::ImageBuffer;

/// Create a synthetic RGB8 image for a device
///
/// The gradient shifts with `sequence` so consecutive captures differ.
pub fn synthetic_image(sequence: u64, width: u32, height: u32, device_id: &str) -> ImageBuffer {
    let mut data = vec![0u8; (width * height * 3) as usize];

    let base = (sequence % 256) as u8;
    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            data[idx] = base.wrapping_add((x % 256) as u8);
            data[idx + 1] = base.wrapping_add((y % 256) as u8);
            data[idx + 2] = base.wrapping_add(((x + y) % 256) as u8);
        }
    }

    ImageBuffer::new(data, width, height, device_id.to_string())
}
