//! Owned pixel data for one rendered frame.

use thiserror::Error;

/// Channel counts a frame may carry across the engine boundary.
pub const SUPPORTED_CHANNELS: std::ops::RangeInclusive<u8> = 1..=4;

/// Why a frame handed over by a producer was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame pixel data is empty")]
    EmptyPixelData,

    #[error("frame has zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    #[error("channel count {0} is outside the supported range 1..=4")]
    ChannelCountOutOfRange(u8),

    #[error(
        "pixel data holds {actual} bytes but {width}x{height}x{channels} requires {expected}"
    )]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },
}

/// One complete image emitted by the engine.
///
/// A value of this type is always internally consistent: both
/// constructors check dimensions, channel count and byte length before a
/// buffer can exist, and nothing is mutable afterwards. Ownership moves
/// from the producer's copy into the channel and on to the display path;
/// the pixels are never shared between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl FrameBuffer {
    /// Builds a frame from an already-owned byte vector.
    pub fn from_vec(
        bytes: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, FrameError> {
        Self::validate(bytes.len(), width, height, channels)?;
        Ok(Self {
            bytes,
            width,
            height,
            channels,
        })
    }

    /// Copies borrowed pixels into a new frame.
    ///
    /// The caller may free or reuse its buffer as soon as this returns.
    pub fn copy_from(
        bytes: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<Self, FrameError> {
        Self::validate(bytes.len(), width, height, channels)?;
        Ok(Self {
            bytes: bytes.to_vec(),
            width,
            height,
            channels,
        })
    }

    fn validate(len: usize, width: u32, height: u32, channels: u8) -> Result<(), FrameError> {
        if len == 0 {
            return Err(FrameError::EmptyPixelData);
        }
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimension { width, height });
        }
        if !SUPPORTED_CHANNELS.contains(&channels) {
            return Err(FrameError::ChannelCountOutOfRange(channels));
        }
        let expected = width as usize * height as usize * channels as usize;
        if len != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                channels,
                expected,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of pixels (width × height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
