//! pixelcv
//!
//! Pixel-level image processing: color space conversion, fixed and Otsu
//! binarization, and Gaussian, median and mean filters. Optional Python
//! bindings via PyO3 (feature `python`).
//!
//! ## Image Format
//! Every operation consumes a [`PixelBuffer`] and returns a new one with the
//! same bounds:
//! - **Grayscale**: [`Layout::Gray`] - single channel
//! - **RGB**: [`Layout::Rgb`] - 3 color channels
//! - **RGBA**: [`Layout::Rgba`] - 3 color channels + alpha
//!
//! Both bit depths are supported:
//! - `u8`: 8-bit per channel (0-255)
//! - `u16`: 16-bit per channel (0-65535), the working precision
//!
//! ## Borders
//! Neighborhood filters treat samples outside the image as zero, so results
//! near the edges are darker than the interior. They read samples at 16 bits
//! and always return a `u16` buffer.
//!
//! ## Example
//! ```
//! use pixelcv::{median_blur, otsu_binarize, PixelBuffer};
//!
//! let rgb = PixelBuffer::from_rgb8(2, 2, vec![0, 0, 0, 255, 255, 255, 255, 255, 255, 0, 0, 0])?;
//! let smoothed = median_blur(&rgb, 1)?;
//! let binary = otsu_binarize(&smoothed);
//! assert_eq!(binary.get(1, 0, 0), Some(255));
//! # Ok::<(), pixelcv::CvError>(())
//! ```

pub mod buffer;
pub mod error;
pub mod filters;

pub use buffer::{Bounds, Layout, PixelBuffer, Sample};
pub use error::{CvError, CvResult};
pub use filters::blur::{gaussian_blur, gaussian_blur_with, mean_blur, mean_blur_with};
pub use filters::core::{Execution, GaussianKernel, KernelSize, Neighborhood};
pub use filters::grayscale::{to_bgr, to_gray16, to_gray8};
pub use filters::noise::{median_blur, median_blur_with};
pub use filters::threshold::{binarize, histogram, otsu_binarize, otsu_threshold, BLACK, WHITE};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{Element, IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::{PixelBuffer, Sample};
    use crate::error::CvError;
    use crate::filters::core::Execution;
    use crate::filters::{blur, grayscale, noise, threshold};

    impl From<CvError> for PyErr {
        fn from(err: CvError) -> PyErr {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_buffer<T: Sample + Element>(image: &PyReadonlyArray3<'_, T>) -> PyResult<PixelBuffer<T>> {
        Ok(PixelBuffer::from_array((0, 0), image.as_array().to_owned())?)
    }

    fn execution(parallel: bool) -> Execution {
        if parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        }
    }

    // ========================================================================
    // Color Conversion
    // ========================================================================

    /// Convert a u8 image (1, 3 or 4 channels) to 8-bit grayscale (H, W, 1).
    #[pyfunction]
    pub fn to_gray8<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let src = to_buffer(&image)?;
        Ok(grayscale::to_gray8(&src).into_array().into_pyarray(py))
    }

    /// Convert a u8 image to 16-bit grayscale (H, W, 1).
    #[pyfunction]
    pub fn to_gray16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        Ok(grayscale::to_gray16(&src).into_array().into_pyarray(py))
    }

    /// Swap red and blue. Output is 16-bit RGBA (H, W, 4), alpha opaque.
    #[pyfunction]
    pub fn to_bgr<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        Ok(grayscale::to_bgr(&src).into_array().into_pyarray(py))
    }

    // ========================================================================
    // Thresholding
    // ========================================================================

    /// Binarize at a fixed cut point: values below `threshold` become 0, others 255.
    #[pyfunction]
    pub fn binarize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: u8,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let src = to_buffer(&image)?;
        Ok(threshold::binarize(&src, threshold).into_array().into_pyarray(py))
    }

    /// Otsu cut point of a u8 image.
    #[pyfunction]
    pub fn otsu_threshold<'py>(image: PyReadonlyArray3<'py, u8>) -> PyResult<u8> {
        let src = to_buffer(&image)?;
        Ok(threshold::otsu_threshold(&src))
    }

    /// Binarize at the Otsu cut point.
    #[pyfunction]
    pub fn otsu_binarize<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let src = to_buffer(&image)?;
        Ok(threshold::otsu_binarize(&src).into_array().into_pyarray(py))
    }

    // ========================================================================
    // Neighborhood Filters - u8
    // ========================================================================

    /// Gaussian blur of a u8 image.
    ///
    /// # Arguments
    /// * `image` - Image (H, W, 1|3|4) as u8
    /// * `sigma` - Standard deviation of the Gaussian
    /// * `kernel_size` - Odd window side length
    /// * `parallel` - Distribute rows over worker threads
    #[pyfunction]
    #[pyo3(signature = (image, sigma, kernel_size, parallel=false))]
    pub fn gaussian_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma: f64,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = blur::gaussian_blur_with(&src, sigma, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Median filter of a u8 image. The result is widened to u16.
    #[pyfunction]
    #[pyo3(signature = (image, kernel_size, parallel=false))]
    pub fn median_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = noise::median_blur_with(&src, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Box blur of a u8 image. The result is widened to u16.
    #[pyfunction]
    #[pyo3(signature = (image, kernel_size, parallel=false))]
    pub fn mean_blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = blur::mean_blur_with(&src, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    // ========================================================================
    // Neighborhood Filters - u16
    // ========================================================================

    /// Gaussian blur of a u16 image.
    #[pyfunction]
    #[pyo3(signature = (image, sigma, kernel_size, parallel=false))]
    pub fn gaussian_blur_16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u16>,
        sigma: f64,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = blur::gaussian_blur_with(&src, sigma, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Median filter of a u16 image.
    #[pyfunction]
    #[pyo3(signature = (image, kernel_size, parallel=false))]
    pub fn median_blur_16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u16>,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = noise::median_blur_with(&src, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Box blur of a u16 image.
    #[pyfunction]
    #[pyo3(signature = (image, kernel_size, parallel=false))]
    pub fn mean_blur_16<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u16>,
        kernel_size: usize,
        parallel: bool,
    ) -> PyResult<Bound<'py, PyArray3<u16>>> {
        let src = to_buffer(&image)?;
        let result = blur::mean_blur_with(&src, kernel_size, execution(parallel))?;
        Ok(result.into_array().into_pyarray(py))
    }

    #[pymodule]
    pub fn pixelcv(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Color conversion
        m.add_function(wrap_pyfunction!(to_gray8, m)?)?;
        m.add_function(wrap_pyfunction!(to_gray16, m)?)?;
        m.add_function(wrap_pyfunction!(to_bgr, m)?)?;

        // Thresholding
        m.add_function(wrap_pyfunction!(binarize, m)?)?;
        m.add_function(wrap_pyfunction!(otsu_threshold, m)?)?;
        m.add_function(wrap_pyfunction!(otsu_binarize, m)?)?;

        // Neighborhood filters
        m.add_function(wrap_pyfunction!(gaussian_blur, m)?)?;
        m.add_function(wrap_pyfunction!(median_blur, m)?)?;
        m.add_function(wrap_pyfunction!(mean_blur, m)?)?;
        m.add_function(wrap_pyfunction!(gaussian_blur_16, m)?)?;
        m.add_function(wrap_pyfunction!(median_blur_16, m)?)?;
        m.add_function(wrap_pyfunction!(mean_blur_16, m)?)?;

        Ok(())
    }
}
