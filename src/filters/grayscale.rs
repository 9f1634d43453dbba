//! Color space conversion.
//!
//! Uses ITU-R BT.709 luminosity coefficients.
//!
//! ## Bit Depth Support
//!
//! - **u16 (16-bit)**: Values 0-65535, for precision-preserving pipelines
//! - **u8 (8-bit)**: Values 0-255, for thresholding
//!
//! Every input variant is read through [`PixelBuffer::rgba16`], so luma is
//! always computed in the 16-bit domain and then narrowed if requested.

use log::debug;

use crate::buffer::{Layout, PixelBuffer, Sample};

/// BT.709 coefficients scaled by `LUMA_SCALE`; they sum to exactly
/// `LUMA_SCALE` so that neutral gray keeps its value.
const LUMA_R: u64 = 2126;
const LUMA_G: u64 = 7152;
const LUMA_B: u64 = 722;
const LUMA_SCALE: u64 = 10_000;

/// 16-bit to 8-bit divisor. 65535 / 255 is 257, so the quotient is clamped.
const GRAY8_DIVISOR: u16 = 255;

/// BT.709 luma of a 16-bit pixel, truncated.
#[inline]
pub fn luma16(px: [u16; 4]) -> u16 {
    let [r, g, b, _] = px;
    ((LUMA_R * r as u64 + LUMA_G * g as u64 + LUMA_B * b as u64) / LUMA_SCALE) as u16
}

fn map_pixels<T, U, F>(src: &PixelBuffer<T>, layout: Layout, f: F) -> PixelBuffer<U>
where
    T: Sample,
    U: Sample,
    F: Fn([u16; 4], &mut [U]),
{
    let bounds = src.bounds();
    let mut output = PixelBuffer::<U>::alloc(bounds, layout);
    let mut px = vec![U::default(); layout.channels()];
    let data = output.data_mut();

    for (row, y) in (bounds.min_y..bounds.max_y).enumerate() {
        for (col, x) in (bounds.min_x..bounds.max_x).enumerate() {
            if let Some(rgba) = src.rgba16(x, y) {
                f(rgba, &mut px);
                for (c, &v) in px.iter().enumerate() {
                    data[[row, col, c]] = v;
                }
            }
        }
    }

    output
}

/// Convert any buffer to 16-bit grayscale.
pub fn to_gray16<T: Sample>(src: &PixelBuffer<T>) -> PixelBuffer<u16> {
    debug!("to_gray16: {}x{} {:?}", src.width(), src.height(), src.layout());
    map_pixels(src, Layout::Gray, |rgba, out: &mut [u16]| {
        out[0] = luma16(rgba);
    })
}

/// Convert any buffer to 8-bit grayscale.
///
/// Luma is computed at 16 bits, divided by 255 and clamped to 255, so luma
/// above 65279 (including pure white) maps to 255.
pub fn to_gray8<T: Sample>(src: &PixelBuffer<T>) -> PixelBuffer<u8> {
    debug!("to_gray8: {}x{} {:?}", src.width(), src.height(), src.layout());
    map_pixels(src, Layout::Gray, |rgba, out: &mut [u8]| {
        out[0] = (luma16(rgba) / GRAY8_DIVISOR).min(u8::MAX as u16) as u8;
    })
}

/// Swap red and blue. Output is 16-bit RGBA with opaque alpha.
pub fn to_bgr<T: Sample>(src: &PixelBuffer<T>) -> PixelBuffer<u16> {
    debug!("to_bgr: {}x{} {:?}", src.width(), src.height(), src.layout());
    map_pixels(src, Layout::Rgba, |[r, g, b, _], out: &mut [u16]| {
        out.copy_from_slice(&[b, g, r, u16::MAX]);
    })
}
