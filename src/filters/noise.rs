//! Median filter.
//!
//! Removes salt-and-pepper noise while preserving edges. Every color channel
//! is processed independently; alpha, if present, is written opaque.
//! Samples are widened to 16 bits and the result is stored at 16 bits.

use log::debug;

use super::core::{map_color_channels, Execution, KernelSize, Neighborhood};
use crate::buffer::{PixelBuffer, Sample};
use crate::error::CvResult;

/// Apply median filter.
///
/// Collects the `kernel_size²` window samples (zero outside the image), sorts
/// them and keeps rank `kernel_size² / 2`.
///
/// # Arguments
/// * `src` - Image of any layout, 8 or 16 bits
/// * `kernel_size` - Odd window side length
///
/// # Returns
/// Median-filtered 16-bit image with the same bounds and layout
pub fn median_blur<T: Sample>(
    src: &PixelBuffer<T>,
    kernel_size: usize,
) -> CvResult<PixelBuffer<u16>> {
    median_blur_with(src, kernel_size, Execution::Sequential)
}

/// [`median_blur`] with an explicit execution strategy.
pub fn median_blur_with<T: Sample>(
    src: &PixelBuffer<T>,
    kernel_size: usize,
    execution: Execution,
) -> CvResult<PixelBuffer<u16>> {
    let size = KernelSize::new(kernel_size)?;
    debug!(
        "median_blur: {}x{} kernel={}",
        src.width(),
        src.height(),
        kernel_size
    );

    let middle = size.area() / 2;
    let hood = Neighborhood::new(src, size);
    Ok(map_color_channels(src, execution, |x, y, c| {
        let mut values: Vec<u16> = hood
            .samples(x, y, c)
            .map(|(_, _, v)| v.to_u16_range())
            .collect();
        values.sort_unstable();
        values[middle]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Bounds, Layout};
    use crate::error::CvError;

    fn gray8(width: usize, height: usize, data: Vec<u8>) -> PixelBuffer<u8> {
        PixelBuffer::from_vec(Bounds::from_size(width, height), Layout::Gray, data).unwrap()
    }

    #[test]
    fn test_median_center_of_spike() {
        let mut data = vec![100u8; 25];
        data[12] = 200;
        let result = median_blur(&gray8(5, 5, data), 3).unwrap();
        assert_eq!(result.get(2, 2, 0), Some(100 * 257));

        let mut data = vec![100u16; 25];
        data[12] = 200;
        let img = PixelBuffer::from_vec(Bounds::from_size(5, 5), Layout::Gray, data).unwrap();
        assert_eq!(median_blur(&img, 3).unwrap().get(2, 2, 0), Some(100));
    }

    #[test]
    fn test_median_removes_salt_pepper() {
        let mut data = vec![128u16; 5 * 5 * 3];
        // Salt in red, pepper in blue, same pixel
        data[(2 * 5 + 2) * 3] = 65535;
        data[(2 * 5 + 2) * 3 + 2] = 0;
        let img = PixelBuffer::from_vec(Bounds::from_size(5, 5), Layout::Rgb, data).unwrap();
        let result = median_blur(&img, 3).unwrap();
        assert_eq!(result.get(2, 2, 0), Some(128));
        assert_eq!(result.get(2, 2, 2), Some(128));
    }

    #[test]
    fn test_median_border_zero_padding() {
        let img = PixelBuffer::from_vec(Bounds::from_size(4, 4), Layout::Gray, vec![50u16; 16])
            .unwrap();
        let result = median_blur(&img, 3).unwrap();
        // Interior: 9 real samples
        assert_eq!(result.get(1, 1, 0), Some(50));
        // Edge: 6 real, 3 zero -> rank 4 is still 50
        assert_eq!(result.get(1, 0, 0), Some(50));
        // Corner: 4 real, 5 zero -> rank 4 is zero
        assert_eq!(result.get(0, 0, 0), Some(0));
    }

    #[test]
    fn test_median_preserves_edge() {
        let data: Vec<u8> = (0..25).map(|i| if i % 5 < 2 { 0 } else { 255 }).collect();
        let result = median_blur(&gray8(5, 5, data), 3).unwrap();
        assert_eq!(result.get(0, 2, 0), Some(0));
        assert_eq!(result.get(1, 2, 0), Some(0));
        assert_eq!(result.get(2, 2, 0), Some(65535));
        assert_eq!(result.get(3, 2, 0), Some(65535));
    }

    #[test]
    fn test_median_kernel_size_one_is_identity() {
        // Opaque RGBA, so the forced alpha matches the input
        let data: Vec<u16> = (0..(3 * 4 * 4))
            .map(|i| if i % 4 == 3 { 65535 } else { (i * 3701 % 65536) as u16 })
            .collect();
        let img = PixelBuffer::from_vec(Bounds::new(9, 9, 12, 13), Layout::Rgba, data).unwrap();
        assert_eq!(median_blur(&img, 1).unwrap(), img);
    }

    #[test]
    fn test_median_kernel_size_one_widens_u8() {
        let data: Vec<u8> = (0..(3 * 4 * 4))
            .map(|i| if i % 4 == 3 { 255 } else { (i * 37 % 256) as u8 })
            .collect();
        let widened: Vec<u16> = data.iter().map(|&v| v as u16 * 257).collect();
        let bounds = Bounds::new(9, 9, 12, 13);
        let img = PixelBuffer::from_vec(bounds, Layout::Rgba, data).unwrap();
        let expected = PixelBuffer::from_vec(bounds, Layout::Rgba, widened).unwrap();
        assert_eq!(median_blur(&img, 1).unwrap(), expected);
    }

    #[test]
    fn test_median_rejects_even_kernel() {
        let img = gray8(2, 2, vec![1, 2, 3, 4]);
        assert_eq!(median_blur(&img, 2).unwrap_err(), CvError::InvalidKernelSize(2));
        assert_eq!(median_blur(&img, 0).unwrap_err(), CvError::InvalidKernelSize(0));
    }

    #[test]
    fn test_median_parallel_matches_sequential() {
        let data: Vec<u8> = (0..(13 * 9)).map(|i| (i * 91 % 256) as u8).collect();
        let img = gray8(13, 9, data);
        assert_eq!(
            median_blur_with(&img, 5, Execution::Parallel).unwrap(),
            median_blur(&img, 5).unwrap()
        );
    }
}
