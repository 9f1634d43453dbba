//! Filter modules for pixel-level image processing.
//!
//! ## Supported Formats
//!
//! All filters accept [`PixelBuffer`](crate::buffer::PixelBuffer)s with 1, 3,
//! or 4 channels, at 8 or 16 bits per sample:
//!
//! | Format | Layout | Type | Description |
//! |--------|--------|------|-------------|
//! | Gray8 | Gray | u8 | Single luminance channel, 0-255 |
//! | Gray16 | Gray | u16 | Single luminance channel, 0-65535 |
//! | RGB8 / RGBA8 | Rgb / Rgba | u8 | Decoder input, 0-255 |
//! | RGB16 / RGBA16 | Rgb / Rgba | u16 | Working precision, 0-65535 |
//!
//! ## Architecture
//!
//! All filters follow these principles:
//! - **Pure** - Input is never modified, output has identical bounds
//! - **Zero-padded borders** - Samples outside the image read as zero
//! - **Opaque alpha** - Neighborhood filters write alpha at full opacity
//! - **16-bit output** - Neighborhood filters widen samples and return u16
//! - **Optional parallelism** - `*_with` variants take an [`Execution`](core::Execution)
//!
//! ## Filter Categories
//!
//! - **Color**: to_gray16, to_gray8, to_bgr
//! - **Threshold**: binarize, otsu_threshold, otsu_binarize
//! - **Blur**: gaussian_blur, mean_blur
//! - **Noise**: median_blur

pub mod core;
pub mod grayscale;
pub mod threshold;
pub mod blur;
pub mod noise;
