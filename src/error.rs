//! Error type shared by every operation in the crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CvError {
    #[error("kernel size must be a positive odd number, got {0}")]
    InvalidKernelSize(usize),
    #[error("sigma must be a positive finite number, got {0}")]
    InvalidSigma(f64),
    #[error("image must have a positive area, got {width}x{height}")]
    EmptyImage { width: i64, height: i64 },
    #[error("pixel data has {actual} samples, expected {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("unsupported channel count {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),
    #[error("coordinate ({x}, {y}) is outside the image bounds")]
    OutOfBounds { x: i32, y: i32 },
    #[error("channel {channel} is out of range for a {channels}-channel image")]
    ChannelOutOfRange { channel: usize, channels: usize },
}

pub type CvResult<T> = Result<T, CvError>;
