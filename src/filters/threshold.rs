//! Binarization: fixed threshold and Otsu's method.
//!
//! All thresholding runs on 8-bit grayscale. Non-gray input is reduced with
//! [`to_gray8`] first. A threshold is a cut point: samples strictly below it
//! become [`BLACK`], everything else [`WHITE`].

use std::borrow::Cow;

use log::{debug, trace};

use crate::buffer::{Layout, PixelBuffer, Sample};
use crate::filters::grayscale::to_gray8;

pub const BLACK: u8 = 0;
pub const WHITE: u8 = 255;

fn as_gray8(src: &PixelBuffer<u8>) -> Cow<'_, PixelBuffer<u8>> {
    match src.layout() {
        Layout::Gray => Cow::Borrowed(src),
        _ => Cow::Owned(to_gray8(src)),
    }
}

/// Apply a fixed binary threshold.
///
/// # Arguments
/// * `src` - 8-bit image; RGB/RGBA is converted to luminosity first
/// * `threshold` - Cut point (0-255). Values below it are black.
///
/// # Returns
/// Gray image containing only `BLACK` and `WHITE`
pub fn binarize(src: &PixelBuffer<u8>, threshold: u8) -> PixelBuffer<u8> {
    debug!("binarize: {}x{} threshold={}", src.width(), src.height(), threshold);
    let mut output = as_gray8(src).into_owned();
    output
        .data_mut()
        .mapv_inplace(|v| if v < threshold { BLACK } else { WHITE });
    output
}

/// Pixel count per 8-bit gray level.
pub fn histogram(src: &PixelBuffer<u8>) -> [u64; 256] {
    let gray = as_gray8(src);
    let mut hist = [0u64; 256];
    for &v in gray.as_array().iter() {
        hist[v as usize] += 1;
    }
    hist
}

/// Otsu search over a histogram.
///
/// Candidate `t` splits the levels into `<= t` and `> t`. Candidates leaving
/// either class empty are skipped. Returns the first `t` with the largest
/// between-class variance, with that variance.
///
/// `t` is the last level of the dark class, not a cut point: the matching
/// `binarize` threshold is `t + 1`, as returned by [`otsu_threshold`].
pub(crate) fn otsu_search(hist: &[u64; 256]) -> Option<(u8, f64)> {
    let total: u64 = hist.iter().sum();
    let total_sum: u64 = hist
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();

    let mut n0 = 0u64;
    let mut sum0 = 0u64;
    let mut best: Option<(u8, f64)> = None;

    for t in 0..255usize {
        n0 += hist[t];
        sum0 += t as u64 * hist[t];
        let n1 = total - n0;
        if n0 == 0 || n1 == 0 {
            continue;
        }

        let m0 = sum0 as f64 / n0 as f64;
        let m1 = (total_sum - sum0) as f64 / n1 as f64;
        let weight = (n0 as f64 * n1 as f64) / (total as f64 * total as f64);
        let sigma = weight * (m0 - m1) * (m0 - m1);

        if best.map_or(true, |(_, best_sigma)| sigma > best_sigma) {
            best = Some((t as u8, sigma));
        }
    }

    best
}

/// Compute the Otsu cut point of an 8-bit image.
///
/// The returned value is one above the last level of the dark class, so
/// `binarize(src, otsu_threshold(src))` reproduces the Otsu partition. An
/// image with a single gray level has no valid split and yields 0.
pub fn otsu_threshold(src: &PixelBuffer<u8>) -> u8 {
    let hist = histogram(src);
    match otsu_search(&hist) {
        Some((t, sigma)) => {
            trace!("otsu: best split at {} (sigma={})", t, sigma);
            t + 1
        }
        None => {
            trace!("otsu: single gray level, no split");
            0
        }
    }
}

/// Convert to 8-bit gray, find the Otsu threshold and binarize at it.
pub fn otsu_binarize<T: Sample>(src: &PixelBuffer<T>) -> PixelBuffer<u8> {
    let gray = to_gray8(src);
    let threshold = otsu_threshold(&gray);
    debug!("otsu_binarize: {}x{} threshold={}", src.width(), src.height(), threshold);
    binarize(&gray, threshold)
}
