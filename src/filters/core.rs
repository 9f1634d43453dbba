//! Core utilities for the neighborhood filters.
//!
//! This module provides shared functionality used by multiple filters:
//! - Kernel size validation
//! - Zero-padded neighborhood iteration
//! - Gaussian kernel generation
//! - The row driver and its execution strategy

use std::f64::consts::PI;

use log::trace;
use ndarray::{Array2, ArrayViewMut2, Axis};
use rayon::prelude::*;

use crate::buffer::{PixelBuffer, Sample};
use crate::error::{CvError, CvResult};

/// Side length of a square kernel. Always odd and positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernelSize(usize);

impl KernelSize {
    /// Sizes must be odd, fit an `i32` coordinate offset, and have an area
    /// representable as `usize`.
    pub fn new(size: usize) -> CvResult<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(CvError::InvalidKernelSize(size));
        }
        if i32::try_from(size).is_err() || size.checked_mul(size).is_none() {
            return Err(CvError::InvalidKernelSize(size));
        }
        Ok(KernelSize(size))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Distance from the center to the window edge, `size / 2`.
    pub fn radius(self) -> usize {
        self.0 / 2
    }

    /// Number of samples in the window.
    pub fn area(self) -> usize {
        self.0 * self.0
    }
}

impl TryFrom<usize> for KernelSize {
    type Error = CvError;

    fn try_from(size: usize) -> CvResult<Self> {
        KernelSize::new(size)
    }
}

/// How the row driver schedules output rows.
///
/// Both strategies produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    #[default]
    Sequential,
    /// Rows are distributed over the rayon thread pool.
    Parallel,
}

// ============================================================================
// Neighborhood iteration
// ============================================================================

/// Kernel-sized window over a source buffer.
///
/// Positions outside the source bounds read as the zero sample. This darkens
/// output near the borders and is the defined behavior, not an error.
pub struct Neighborhood<'a, T: Sample> {
    src: &'a PixelBuffer<T>,
    kernel: KernelSize,
}

impl<'a, T: Sample> Neighborhood<'a, T> {
    pub fn new(src: &'a PixelBuffer<T>, kernel: KernelSize) -> Self {
        Neighborhood { src, kernel }
    }

    /// Samples of `channel` around `(x, y)` as `(kx, ky, value)`, row-major.
    pub fn samples(&self, x: i32, y: i32, channel: usize) -> NeighborhoodSamples<'a, T> {
        NeighborhoodSamples {
            src: self.src,
            origin_x: x as i64 - self.kernel.radius() as i64,
            origin_y: y as i64 - self.kernel.radius() as i64,
            channel,
            size: self.kernel.get(),
            kx: 0,
            ky: 0,
        }
    }
}

pub struct NeighborhoodSamples<'a, T: Sample> {
    src: &'a PixelBuffer<T>,
    origin_x: i64,
    origin_y: i64,
    channel: usize,
    size: usize,
    kx: usize,
    ky: usize,
}

impl<T: Sample> Iterator for NeighborhoodSamples<'_, T> {
    type Item = (usize, usize, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.ky >= self.size {
            return None;
        }
        let (kx, ky) = (self.kx, self.ky);
        let sx = i32::try_from(self.origin_x + kx as i64).ok();
        let sy = i32::try_from(self.origin_y + ky as i64).ok();
        let value = match (sx, sy) {
            (Some(sx), Some(sy)) => self.src.get(sx, sy, self.channel).unwrap_or_default(),
            _ => T::default(),
        };

        self.kx += 1;
        if self.kx == self.size {
            self.kx = 0;
            self.ky += 1;
        }
        Some((kx, ky, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.size - self.ky.min(self.size)) * self.size - self.kx;
        (remaining, Some(remaining))
    }
}

impl<T: Sample> ExactSizeIterator for NeighborhoodSamples<'_, T> {}

// ============================================================================
// Gaussian kernel
// ============================================================================

/// Normalized 2D Gaussian weights, indexed `[ky, kx]`.
#[derive(Debug, Clone)]
pub struct GaussianKernel {
    size: KernelSize,
    weights: Array2<f64>,
}

impl GaussianKernel {
    /// Sample `exp(-(dx² + dy²) / 2σ²) / 2πσ²` over the window and rescale so
    /// the truncated support sums to 1.
    pub fn new(sigma: f64, size: KernelSize) -> CvResult<Self> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(CvError::InvalidSigma(sigma));
        }

        let n = size.get();
        let c = size.radius() as f64;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let scale = 1.0 / (PI * two_sigma_sq);

        let mut weights = Array2::from_shape_fn((n, n), |(ky, kx)| {
            let dy = ky as f64 - c;
            let dx = kx as f64 - c;
            scale * (-(dx * dx + dy * dy) / two_sigma_sq).exp()
        });

        let total = weights.sum();
        if !(total.is_finite() && total > 0.0) {
            // sigma so extreme that the weights under/overflow
            return Err(CvError::InvalidSigma(sigma));
        }
        weights.mapv_inplace(|w| w / total);

        Ok(GaussianKernel { size, weights })
    }

    pub fn size(&self) -> KernelSize {
        self.size
    }

    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[[ky, kx]]
    }

    pub fn sum(&self) -> f64 {
        self.weights.sum()
    }
}

// ============================================================================
// Row driver
// ============================================================================

/// Build an output buffer with the bounds and layout of `src` by evaluating
/// `op(x, y, channel)` for every color channel of every pixel.
///
/// Alpha, when the layout has it, is written fully opaque.
pub(crate) fn map_color_channels<T, U, F>(
    src: &PixelBuffer<T>,
    execution: Execution,
    op: F,
) -> PixelBuffer<U>
where
    T: Sample,
    U: Sample,
    F: Fn(i32, i32, usize) -> U + Sync,
{
    let bounds = src.bounds();
    let layout = src.layout();
    let color_channels = layout.color_channels();
    let mut output = PixelBuffer::<U>::alloc(bounds, layout);

    let fill_row = |row_idx: usize, mut row: ArrayViewMut2<U>| {
        let y = bounds.min_y + row_idx as i32;
        for (col_idx, mut px) in row.axis_iter_mut(Axis(0)).enumerate() {
            let x = bounds.min_x + col_idx as i32;
            for c in 0..color_channels {
                px[c] = op(x, y, c);
            }
            if layout.has_alpha() {
                px[3] = U::MAX;
            }
        }
    };

    trace!(
        "Running {:?} over {} rows of {} pixels",
        execution,
        bounds.height(),
        bounds.width()
    );

    let rows = output.data_mut().axis_iter_mut(Axis(0));
    match execution {
        Execution::Sequential => rows
            .enumerate()
            .for_each(|(row_idx, row)| fill_row(row_idx, row)),
        Execution::Parallel => rows
            .into_par_iter()
            .enumerate()
            .for_each(|(row_idx, row)| fill_row(row_idx, row)),
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Bounds, Layout};

    #[test]
    fn test_kernel_size_validation() {
        assert_eq!(KernelSize::new(0), Err(CvError::InvalidKernelSize(0)));
        assert_eq!(KernelSize::new(4), Err(CvError::InvalidKernelSize(4)));
        let k = KernelSize::try_from(5).unwrap();
        assert_eq!(k.radius(), 2);
        assert_eq!(k.area(), 25);
    }

    #[test]
    fn test_kernel_size_rejects_huge_odd_sizes() {
        assert_eq!(
            KernelSize::new(usize::MAX),
            Err(CvError::InvalidKernelSize(usize::MAX))
        );
        let too_wide = i32::MAX as usize + 2;
        assert_eq!(KernelSize::new(too_wide), Err(CvError::InvalidKernelSize(too_wide)));
    }

    #[test]
    fn test_gaussian_kernel_sums_to_one() {
        for &sigma in &[0.3, 1.0, 1.5, 4.0, 25.0] {
            for &size in &[1, 3, 5, 9, 15] {
                let kernel = GaussianKernel::new(sigma, KernelSize::new(size).unwrap()).unwrap();
                assert!(
                    (kernel.sum() - 1.0).abs() < 1e-9,
                    "sigma={} size={} sum={}",
                    sigma,
                    size,
                    kernel.sum()
                );
            }
        }
    }

    #[test]
    fn test_gaussian_kernel_is_symmetric_and_peaked() {
        let kernel = GaussianKernel::new(1.0, KernelSize::new(5).unwrap()).unwrap();
        let center = kernel.weight(2, 2);
        for ky in 0..5 {
            for kx in 0..5 {
                assert!(kernel.weight(kx, ky) <= center);
                assert!((kernel.weight(kx, ky) - kernel.weight(4 - kx, ky)).abs() < 1e-15);
                assert!((kernel.weight(kx, ky) - kernel.weight(ky, kx)).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_gaussian_kernel_rejects_bad_sigma() {
        let size = KernelSize::new(3).unwrap();
        assert_eq!(GaussianKernel::new(0.0, size).unwrap_err(), CvError::InvalidSigma(0.0));
        assert!(GaussianKernel::new(-1.0, size).is_err());
        assert!(GaussianKernel::new(f64::NAN, size).is_err());
        assert!(GaussianKernel::new(f64::INFINITY, size).is_err());
    }

    #[test]
    fn test_neighborhood_zero_pads_outside_bounds() {
        let img = PixelBuffer::<u8>::from_vec(
            Bounds::new(1, 1, 3, 3),
            Layout::Gray,
            vec![10, 20, 30, 40],
        )
        .unwrap();
        let hood = Neighborhood::new(&img, KernelSize::new(3).unwrap());

        let samples: Vec<_> = hood.samples(1, 1, 0).collect();
        assert_eq!(samples.len(), 9);
        let values: Vec<u8> = samples.iter().map(|&(_, _, v)| v).collect();
        assert_eq!(values, vec![0, 0, 0, 0, 10, 20, 0, 30, 40]);

        // Row-major kernel positions
        assert_eq!(samples[0].0, 0);
        assert_eq!(samples[0].1, 0);
        assert_eq!(samples[5].0, 2);
        assert_eq!(samples[5].1, 1);
    }

    #[test]
    fn test_neighborhood_size_hint() {
        let img = PixelBuffer::<u16>::new(Bounds::from_size(4, 4), Layout::Rgb).unwrap();
        let hood = Neighborhood::new(&img, KernelSize::new(5).unwrap());
        let mut it = hood.samples(0, 0, 2);
        assert_eq!(it.len(), 25);
        it.next();
        it.next();
        assert_eq!(it.len(), 23);
        assert_eq!(it.count(), 23);
    }

    #[test]
    fn test_map_color_channels_forces_opaque_alpha() {
        let img = PixelBuffer::<u16>::from_vec(
            Bounds::new(-1, 0, 1, 1),
            Layout::Rgba,
            vec![1, 2, 3, 4, 5, 6, 7, 8],
        )
        .unwrap();
        let out = map_color_channels(&img, Execution::Sequential, |x, y, c| {
            img.get(x, y, c).unwrap_or_default() + 1
        });
        assert_eq!(out.bounds(), img.bounds());
        assert_eq!(
            out.as_array().iter().copied().collect::<Vec<_>>(),
            vec![2, 3, 4, 65535, 6, 7, 8, 65535]
        );
    }

    #[test]
    fn test_map_color_channels_parallel_matches_sequential() {
        let data: Vec<u8> = (0..(17 * 11 * 3)).map(|i| (i * 7 % 251) as u8).collect();
        let img = PixelBuffer::from_vec(Bounds::new(3, 5, 20, 16), Layout::Rgb, data).unwrap();
        let op = |x: i32, y: i32, c: usize| {
            img.get(x, y, c).unwrap_or_default() ^ ((x + y) as u8)
        };
        let seq = map_color_channels(&img, Execution::Sequential, op);
        let par = map_color_channels(&img, Execution::Parallel, op);
        assert_eq!(seq, par);
    }
}
