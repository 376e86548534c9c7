//! Frame conversion and transformation utilities.

use super::types::{Frame, PixelOrder};

/// Normalize a frame to display (red-green-blue) channel order.
///
/// Frames already in RGB pass through untouched. BGR frames get their
/// first and third channel swapped in place.
pub fn to_display_order(frame: &mut Frame) {
    if frame.order == PixelOrder::Rgb {
        return;
    }

    for px in frame.data.chunks_exact_mut(Frame::BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
    frame.order = PixelOrder::Rgb;
}

/// Mirror a frame horizontally (flip left-right) for selfie view.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let bpp = Frame::BYTES_PER_PIXEL;

    for row in frame.data.chunks_exact_mut(width * bpp) {
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
