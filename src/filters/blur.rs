//! Blur filters: Gaussian and box (mean).
//!
//! Both filters read a zero-padded `kernel_size x kernel_size` window around
//! each pixel, so pixels near the border come out darker than the interior.
//! Color channels are filtered independently; alpha is written opaque.
//!
//! Samples are widened to 16 bits before filtering and the result is stored
//! at 16 bits, so 8-bit input keeps sub-level detail.

use log::debug;

use super::core::{map_color_channels, Execution, GaussianKernel, KernelSize, Neighborhood};
use crate::buffer::{PixelBuffer, Sample};
use crate::error::CvResult;

/// Apply Gaussian blur.
///
/// # Arguments
/// * `src` - Image of any layout, 8 or 16 bits
/// * `sigma` - Standard deviation of the Gaussian, must be positive
/// * `kernel_size` - Odd window side length
///
/// # Returns
/// Blurred 16-bit image with the same bounds and layout
pub fn gaussian_blur<T: Sample>(
    src: &PixelBuffer<T>,
    sigma: f64,
    kernel_size: usize,
) -> CvResult<PixelBuffer<u16>> {
    gaussian_blur_with(src, sigma, kernel_size, Execution::Sequential)
}

/// [`gaussian_blur`] with an explicit execution strategy.
pub fn gaussian_blur_with<T: Sample>(
    src: &PixelBuffer<T>,
    sigma: f64,
    kernel_size: usize,
    execution: Execution,
) -> CvResult<PixelBuffer<u16>> {
    let size = KernelSize::new(kernel_size)?;
    let kernel = GaussianKernel::new(sigma, size)?;
    debug!(
        "gaussian_blur: {}x{} sigma={} kernel={}",
        src.width(),
        src.height(),
        sigma,
        kernel_size
    );

    let hood = Neighborhood::new(src, size);
    Ok(map_color_channels(src, execution, |x, y, c| {
        let sum: f64 = hood
            .samples(x, y, c)
            .map(|(kx, ky, v)| kernel.weight(kx, ky) * v.to_u16_range() as f64)
            .sum();
        u16::from_f64(sum)
    }))
}

/// Apply box blur.
///
/// Each output sample is the 16-bit sum of the window divided by
/// `kernel_size²`, truncating. Out-of-bounds positions count as zero.
pub fn mean_blur<T: Sample>(src: &PixelBuffer<T>, kernel_size: usize) -> CvResult<PixelBuffer<u16>> {
    mean_blur_with(src, kernel_size, Execution::Sequential)
}

/// [`mean_blur`] with an explicit execution strategy.
pub fn mean_blur_with<T: Sample>(
    src: &PixelBuffer<T>,
    kernel_size: usize,
    execution: Execution,
) -> CvResult<PixelBuffer<u16>> {
    let size = KernelSize::new(kernel_size)?;
    debug!(
        "mean_blur: {}x{} kernel={}",
        src.width(),
        src.height(),
        kernel_size
    );

    let area = size.area() as u64;
    let hood = Neighborhood::new(src, size);
    Ok(map_color_channels(src, execution, |x, y, c| {
        let sum: u64 = hood
            .samples(x, y, c)
            .map(|(_, _, v)| v.to_u16_range() as u64)
            .sum();
        u16::from_u64_saturating(sum / area)
    }))
}
