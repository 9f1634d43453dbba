//! Pixel buffer shared by all converters and filters.
//!
//! ## Supported Formats
//!
//! | Variant | Sample | Layout | Description |
//! |---------|--------|--------|-------------|
//! | Gray8 | u8 | Gray | Single luminance channel, 0-255 |
//! | Gray16 | u16 | Gray | Single luminance channel, 0-65535 |
//! | RGB8 | u8 | Rgb / Rgba | Decoder input, 0-255 |
//! | RGB16 | u16 | Rgb / Rgba | Working precision, 0-65535 |
//!
//! Samples are stored as an `(height, width, channels)` array. Coordinates are
//! absolute: a buffer may start at any origin, and every access is checked
//! against its half-open bounds.

use ndarray::{Array3, ArrayView3};

use crate::error::{CvError, CvResult};

/// Channel sample type. Implemented for `u8` and `u16` only.
pub trait Sample: Copy + Default + Ord + Send + Sync + std::fmt::Debug + 'static {
    const MAX: Self;

    fn to_u64(self) -> u64;

    /// Truncates toward zero and saturates at the sample range.
    fn from_f64(v: f64) -> Self;

    fn from_u64_saturating(v: u64) -> Self;

    /// Sample rescaled to the 16-bit range (0-65535).
    fn to_u16_range(self) -> u16;
}

impl Sample for u8 {
    const MAX: Self = u8::MAX;

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as u8
    }

    #[inline]
    fn from_u64_saturating(v: u64) -> Self {
        v.min(u8::MAX as u64) as u8
    }

    #[inline]
    fn to_u16_range(self) -> u16 {
        // 0xFF * 257 == 0xFFFF
        self as u16 * 257
    }
}

impl Sample for u16 {
    const MAX: Self = u16::MAX;

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as u16
    }

    #[inline]
    fn from_u64_saturating(v: u64) -> Self {
        v.min(u16::MAX as u64) as u16
    }

    #[inline]
    fn to_u16_range(self) -> u16 {
        self
    }
}

/// Channel arrangement of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    Gray,
    Rgb,
    #[default]
    Rgba,
}

impl Layout {
    pub fn from_channels(channels: usize) -> CvResult<Self> {
        match channels {
            1 => Ok(Layout::Gray),
            3 => Ok(Layout::Rgb),
            4 => Ok(Layout::Rgba),
            n => Err(CvError::UnsupportedChannels(n)),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            Layout::Gray => 1,
            Layout::Rgb => 3,
            Layout::Rgba => 4,
        }
    }

    /// Channels that carry color, i.e. everything except alpha.
    pub fn color_channels(self) -> usize {
        match self {
            Layout::Rgba => 3,
            other => other.channels(),
        }
    }

    pub fn has_alpha(self) -> bool {
        self == Layout::Rgba
    }
}

/// Half-open rectangle `[min_x, max_x) x [min_y, max_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Bounds { min_x, min_y, max_x, max_y }
    }

    /// Zero-based bounds of the given size.
    pub fn from_size(width: usize, height: usize) -> Self {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        Bounds::new(0, 0, w, h)
    }

    pub fn width(&self) -> usize {
        (self.max_x as i64 - self.min_x as i64).max(0) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y as i64 - self.min_y as i64).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    fn check_area(&self) -> CvResult<(usize, usize)> {
        if self.is_empty() {
            return Err(CvError::EmptyImage {
                width: self.max_x as i64 - self.min_x as i64,
                height: self.max_y as i64 - self.min_y as i64,
            });
        }
        Ok((self.width(), self.height()))
    }
}

/// Rectangular grid of pixels with absolute coordinates.
///
/// Buffers are built once (by a decoder, a converter or a filter) and treated
/// as immutable afterwards: every operation returns a fresh buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer<T: Sample> {
    bounds: Bounds,
    layout: Layout,
    data: Array3<T>,
}

impl<T: Sample> PixelBuffer<T> {
    /// Zero-filled buffer covering `bounds`.
    pub fn new(bounds: Bounds, layout: Layout) -> CvResult<Self> {
        let (width, height) = bounds.check_area()?;
        Ok(PixelBuffer {
            bounds,
            layout,
            data: Array3::from_elem((height, width, layout.channels()), T::default()),
        })
    }

    /// Buffer from row-major interleaved samples.
    pub fn from_vec(bounds: Bounds, layout: Layout, data: Vec<T>) -> CvResult<Self> {
        let (width, height) = bounds.check_area()?;
        let expected = width * height * layout.channels();
        if data.len() != expected {
            return Err(CvError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        let actual = data.len();
        let data = Array3::from_shape_vec((height, width, layout.channels()), data)
            .map_err(|_| CvError::DataLength { expected, actual })?;
        Ok(PixelBuffer { bounds, layout, data })
    }

    /// Adopt an `(height, width, channels)` array placed at `origin`.
    pub fn from_array(origin: (i32, i32), data: Array3<T>) -> CvResult<Self> {
        let (height, width, channels) = data.dim();
        let layout = Layout::from_channels(channels)?;
        let bounds = Bounds::new(
            origin.0,
            origin.1,
            origin.0.saturating_add(i32::try_from(width).unwrap_or(i32::MAX)),
            origin.1.saturating_add(i32::try_from(height).unwrap_or(i32::MAX)),
        );
        bounds.check_area()?;
        Ok(PixelBuffer { bounds, layout, data })
    }

    pub fn into_array(self) -> Array3<T> {
        self.data
    }

    pub fn as_array(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn width(&self) -> usize {
        self.bounds.width()
    }

    pub fn height(&self) -> usize {
        self.bounds.height()
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Array indices `(row, col)` of an absolute coordinate.
    #[inline]
    pub(crate) fn index(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        Some((
            (y as i64 - self.bounds.min_y as i64) as usize,
            (x as i64 - self.bounds.min_x as i64) as usize,
        ))
    }

    /// Bounds-checked sample read.
    #[inline]
    pub fn get(&self, x: i32, y: i32, channel: usize) -> Option<T> {
        let (row, col) = self.index(x, y)?;
        self.data.get([row, col, channel]).copied()
    }

    /// Bounds-checked sample write.
    pub fn put(&mut self, x: i32, y: i32, channel: usize, value: T) -> CvResult<()> {
        let (row, col) = self.index(x, y).ok_or(CvError::OutOfBounds { x, y })?;
        let channels = self.channels();
        let slot = self
            .data
            .get_mut([row, col, channel])
            .ok_or(CvError::ChannelOutOfRange { channel, channels })?;
        *slot = value;
        Ok(())
    }

    /// Pixel as 16-bit RGBA, whatever the stored variant.
    ///
    /// Gray is replicated into R, G and B; layouts without alpha read as opaque.
    pub fn rgba16(&self, x: i32, y: i32) -> Option<[u16; 4]> {
        let (row, col) = self.index(x, y)?;
        let px = |c: usize| self.data[[row, col, c]].to_u16_range();
        Some(match self.layout {
            Layout::Gray => {
                let v = px(0);
                [v, v, v, u16::MAX]
            }
            Layout::Rgb => [px(0), px(1), px(2), u16::MAX],
            Layout::Rgba => [px(0), px(1), px(2), px(3)],
        })
    }

    /// Zero-filled buffer for an area already known to be non-empty.
    pub(crate) fn alloc(bounds: Bounds, layout: Layout) -> Self {
        PixelBuffer {
            bounds,
            layout,
            data: Array3::from_elem(
                (bounds.height(), bounds.width(), layout.channels()),
                T::default(),
            ),
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array3<T> {
        &mut self.data
    }
}

impl PixelBuffer<u8> {
    /// 8-bit RGB pixels as handed over by an image decoder, origin at (0, 0).
    pub fn from_rgb8(width: usize, height: usize, data: Vec<u8>) -> CvResult<Self> {
        PixelBuffer::from_vec(Bounds::from_size(width, height), Layout::Rgb, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_area() {
        let err = PixelBuffer::<u8>::new(Bounds::new(0, 0, 0, 5), Layout::Gray).unwrap_err();
        assert_eq!(err, CvError::EmptyImage { width: 0, height: 5 });

        let err = PixelBuffer::<u16>::new(Bounds::new(4, 4, 2, 8), Layout::Rgb).unwrap_err();
        assert!(matches!(err, CvError::EmptyImage { width: -2, .. }));
    }

    #[test]
    fn test_from_vec_checks_length() {
        let err = PixelBuffer::<u8>::from_vec(Bounds::from_size(2, 2), Layout::Rgb, vec![0; 11])
            .unwrap_err();
        assert_eq!(err, CvError::DataLength { expected: 12, actual: 11 });
    }

    #[test]
    fn test_offset_origin_access() {
        let mut img = PixelBuffer::<u16>::new(Bounds::new(10, -3, 13, 0), Layout::Gray).unwrap();
        assert_eq!(img.width(), 3);
        assert_eq!(img.height(), 3);

        img.put(12, -1, 0, 500).unwrap();
        assert_eq!(img.get(12, -1, 0), Some(500));
        assert_eq!(img.as_array()[[2, 2, 0]], 500);

        // Half-open bounds
        assert_eq!(img.get(13, -1, 0), None);
        assert_eq!(img.get(10, 0, 0), None);
        assert_eq!(img.get(9, -3, 0), None);
        assert!(matches!(img.put(0, 0, 0, 1), Err(CvError::OutOfBounds { x: 0, y: 0 })));
        assert!(matches!(
            img.put(10, -3, 1, 1),
            Err(CvError::ChannelOutOfRange { channel: 1, channels: 1 })
        ));
    }

    #[test]
    fn test_rgba16_normalizes_variants() {
        let rgb8 = PixelBuffer::from_rgb8(1, 1, vec![255, 128, 0]).unwrap();
        assert_eq!(rgb8.rgba16(0, 0), Some([65535, 128 * 257, 0, 65535]));

        let gray16 =
            PixelBuffer::<u16>::from_vec(Bounds::from_size(1, 1), Layout::Gray, vec![1234]).unwrap();
        assert_eq!(gray16.rgba16(0, 0), Some([1234, 1234, 1234, 65535]));

        let rgba16 = PixelBuffer::<u16>::from_vec(
            Bounds::from_size(1, 1),
            Layout::Rgba,
            vec![1, 2, 3, 4],
        )
        .unwrap();
        assert_eq!(rgba16.rgba16(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(rgba16.rgba16(1, 0), None);
    }

    #[test]
    fn test_from_array_infers_layout() {
        let arr = Array3::<u8>::zeros((2, 3, 4));
        let img = PixelBuffer::from_array((5, 7), arr).unwrap();
        assert_eq!(img.layout(), Layout::Rgba);
        assert_eq!(img.bounds(), Bounds::new(5, 7, 8, 9));

        let arr = Array3::<u8>::zeros((2, 3, 2));
        assert_eq!(
            PixelBuffer::from_array((0, 0), arr).unwrap_err(),
            CvError::UnsupportedChannels(2)
        );
    }

    #[test]
    fn test_layout_channels() {
        assert_eq!(Layout::Rgba.color_channels(), 3);
        assert_eq!(Layout::Rgb.color_channels(), 3);
        assert_eq!(Layout::Gray.color_channels(), 1);
        assert!(Layout::Rgba.has_alpha());
        assert!(!Layout::Rgb.has_alpha());
    }
}
