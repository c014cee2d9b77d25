//! Buffer pixel formats and view element types.
//!
//! The two sides of a [`DualImage`](crate::DualImage) describe pixels with
//! unrelated taxonomies:
//!
//! - [`BufferFormat`] - what the owning [`PixelBuffer`](crate::PixelBuffer)
//!   stores (packed 32-bit ARGB, 24-bit RGB, grayscale, ...)
//! - [`MatType`] - what the [`MatView`](crate::MatView) reports: an integer
//!   code combining a [`MatDepth`] and a channel count
//!
//! Both carry stable integer codes that are written verbatim to the
//! serialized stream.
//!
//! # Usage
//!
//! ```rust
//! use pixtwin_core::format::{BufferFormat, MatDepth, MatType};
//!
//! assert_eq!(BufferFormat::Rgb888.bytes_per_pixel(), 3);
//!
//! let t = MatType::new(MatDepth::U8, 3);
//! assert_eq!(t, MatType::U8C3);
//! assert_eq!(t.code(), 16);
//! assert_eq!(t.elem_size(), 3);
//! ```

use std::fmt;

/// Pixel format of an owning buffer.
///
/// Codes are fixed because they are part of the serialized stream. Only a
/// subset has a view counterpart, see [`crate::registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum BufferFormat {
    /// No format; the state of an empty buffer.
    #[default]
    Invalid = 0,
    /// 1 bit per pixel, MSB first.
    Mono = 1,
    /// 1 bit per pixel, LSB first.
    MonoLsb = 2,
    /// 8-bit palette index.
    Indexed8 = 3,
    /// 32-bit `0xffRRGGBB`, native endian.
    Rgb32 = 4,
    /// 32-bit `0xAARRGGBB`, native endian.
    Argb32 = 5,
    /// 32-bit premultiplied `0xAARRGGBB`, native endian.
    Argb32Premultiplied = 6,
    /// 16-bit 5-6-5 RGB.
    Rgb16 = 7,
    /// 24-bit, bytes `R, G, B`.
    Rgb888 = 13,
    /// 32-bit, bytes `R, G, B, 0xff`.
    Rgbx8888 = 16,
    /// 32-bit, bytes `R, G, B, A`.
    Rgba8888 = 17,
    /// 8-bit alpha only.
    Alpha8 = 23,
    /// 8-bit grayscale.
    Grayscale8 = 24,
    /// 16-bit grayscale, native endian.
    Grayscale16 = 28,
    /// 24-bit, bytes `B, G, R`.
    Bgr888 = 29,
}

impl BufferFormat {
    /// All formats, in code order.
    pub const ALL: [BufferFormat; 15] = [
        Self::Invalid,
        Self::Mono,
        Self::MonoLsb,
        Self::Indexed8,
        Self::Rgb32,
        Self::Argb32,
        Self::Argb32Premultiplied,
        Self::Rgb16,
        Self::Rgb888,
        Self::Rgbx8888,
        Self::Rgba8888,
        Self::Alpha8,
        Self::Grayscale8,
        Self::Grayscale16,
        Self::Bgr888,
    ];

    /// Stable integer code.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up a format by its integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.code() == code)
    }

    /// Bits per pixel. Returns 0 for `Invalid`.
    #[inline]
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Invalid => 0,
            Self::Mono | Self::MonoLsb => 1,
            Self::Indexed8 | Self::Alpha8 | Self::Grayscale8 => 8,
            Self::Rgb16 | Self::Grayscale16 => 16,
            Self::Rgb888 | Self::Bgr888 => 24,
            Self::Rgb32
            | Self::Argb32
            | Self::Argb32Premultiplied
            | Self::Rgbx8888
            | Self::Rgba8888 => 32,
        }
    }

    /// Bytes per pixel, rounded up for sub-byte formats.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        self.bits_per_pixel().div_ceil(8)
    }

    /// Bytes needed for `width` pixels, rounded up to a 4-byte boundary.
    #[inline]
    pub const fn bytes_per_line(self, width: u32) -> usize {
        let bits = width as usize * self.bits_per_pixel();
        bits.div_ceil(32) * 4
    }

    /// Whether the format has an alpha channel.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::Argb32 | Self::Argb32Premultiplied | Self::Rgba8888 | Self::Alpha8
        )
    }

    /// Whether the format is the `Invalid` placeholder.
    #[inline]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Whether `other` stores pixels with the same byte layout.
    ///
    /// `Alpha8` and `Grayscale8` hold one unsigned byte per pixel and can be
    /// reinterpreted into each other without touching the data.
    pub fn is_memory_compatible(self, other: BufferFormat) -> bool {
        if self == other {
            return true;
        }
        matches!(
            (self, other),
            (Self::Alpha8, Self::Grayscale8)
                | (Self::Grayscale8, Self::Alpha8)
                | (Self::Rgb32, Self::Argb32)
                | (Self::Argb32, Self::Rgb32)
        )
    }
}

impl fmt::Display for BufferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Element depth of a matrix view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum MatDepth {
    /// 8-bit unsigned.
    U8 = 0,
    /// 8-bit signed.
    I8 = 1,
    /// 16-bit unsigned.
    U16 = 2,
    /// 16-bit signed.
    I16 = 3,
    /// 32-bit signed.
    I32 = 4,
    /// 32-bit float.
    F32 = 5,
    /// 64-bit float.
    F64 = 6,
    /// 16-bit half float.
    F16 = 7,
}

impl MatDepth {
    /// Bytes per channel value.
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 | Self::F16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    const fn from_bits(bits: i32) -> Self {
        match bits & 7 {
            0 => Self::U8,
            1 => Self::I8,
            2 => Self::U16,
            3 => Self::I16,
            4 => Self::I32,
            5 => Self::F32,
            6 => Self::F64,
            _ => Self::F16,
        }
    }
}

/// Element type of a matrix view.
///
/// Encodes depth in the low three bits and `channels - 1` above them, so
/// `U8C3` is `0 + (2 << 3) = 16`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatType(i32);

impl MatType {
    /// Largest channel count a type can describe.
    pub const MAX_CHANNELS: usize = 512;

    /// Type carried by a view bound to an unmapped buffer format.
    pub const INVALID: MatType = MatType(-1);
    /// One 8-bit unsigned channel.
    pub const U8C1: MatType = MatType(0);
    /// Two 8-bit unsigned channels.
    pub const U8C2: MatType = MatType(8);
    /// Three 8-bit unsigned channels.
    pub const U8C3: MatType = MatType(16);
    /// Four 8-bit unsigned channels.
    pub const U8C4: MatType = MatType(24);
    /// One 16-bit unsigned channel.
    pub const U16C1: MatType = MatType(2);
    /// Three 16-bit unsigned channels.
    pub const U16C3: MatType = MatType(18);
    /// One 32-bit float channel.
    pub const F32C1: MatType = MatType(5);
    /// Three 32-bit float channels.
    pub const F32C3: MatType = MatType(21);

    /// Builds a type from depth and channel count.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0 or above [`MAX_CHANNELS`](Self::MAX_CHANNELS).
    pub const fn new(depth: MatDepth, channels: usize) -> Self {
        assert!(channels >= 1 && channels <= Self::MAX_CHANNELS);
        MatType(depth as i32 + (((channels - 1) as i32) << 3))
    }

    /// Wraps a raw type code.
    ///
    /// Returns `None` for codes that do not describe a depth and channel
    /// count.
    pub fn from_code(code: i32) -> Option<Self> {
        if code == Self::INVALID.0 {
            return Some(Self::INVALID);
        }
        if code < 0 || ((code >> 3) as usize) >= Self::MAX_CHANNELS {
            return None;
        }
        Some(MatType(code))
    }

    /// Raw type code.
    #[inline]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether this is the [`INVALID`](Self::INVALID) marker.
    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.0 < 0
    }

    /// Channel depth. `U8` for the invalid marker.
    #[inline]
    pub const fn depth(self) -> MatDepth {
        if self.is_invalid() {
            return MatDepth::U8;
        }
        MatDepth::from_bits(self.0)
    }

    /// Number of channels. 0 for the invalid marker.
    #[inline]
    pub const fn channels(self) -> usize {
        if self.is_invalid() {
            return 0;
        }
        ((self.0 >> 3) + 1) as usize
    }

    /// Bytes per element (all channels of one pixel).
    #[inline]
    pub const fn elem_size(self) -> usize {
        self.depth().size() * self.channels()
    }
}

impl Default for MatType {
    fn default() -> Self {
        Self::U8C1
    }
}

impl fmt::Debug for MatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return write!(f, "MatType(INVALID)");
        }
        write!(f, "MatType({:?}C{})", self.depth(), self.channels())
    }
}

impl fmt::Display for MatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            return f.write_str("invalid");
        }
        write!(f, "{:?}C{}", self.depth(), self.channels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_format_codes_round_trip() {
        for format in BufferFormat::ALL {
            assert_eq!(BufferFormat::from_code(format.code()), Some(format));
        }
        assert_eq!(BufferFormat::from_code(99), None);
    }

    #[test]
    fn test_bytes_per_line_is_word_aligned() {
        assert_eq!(BufferFormat::Grayscale8.bytes_per_line(15), 16);
        assert_eq!(BufferFormat::Rgb888.bytes_per_line(5), 16);
        assert_eq!(BufferFormat::Argb32.bytes_per_line(5), 20);
        assert_eq!(BufferFormat::Grayscale16.bytes_per_line(3), 8);
        assert_eq!(BufferFormat::Mono.bytes_per_line(33), 8);
    }

    #[test]
    fn test_mat_type_encoding() {
        assert_eq!(MatType::new(MatDepth::U8, 1), MatType::U8C1);
        assert_eq!(MatType::new(MatDepth::U8, 4).code(), 24);
        assert_eq!(MatType::new(MatDepth::U16, 1), MatType::U16C1);
        assert_eq!(MatType::F32C3.depth(), MatDepth::F32);
        assert_eq!(MatType::F32C3.channels(), 3);
        assert_eq!(MatType::F32C3.elem_size(), 12);
    }

    #[test]
    fn test_mat_type_from_code() {
        assert_eq!(MatType::from_code(16), Some(MatType::U8C3));
        assert_eq!(MatType::from_code(-1), Some(MatType::INVALID));
        assert_eq!(MatType::from_code(-7), None);
        assert_eq!(MatType::INVALID.channels(), 0);
        assert_eq!(MatType::INVALID.elem_size(), 0);
    }

    #[test]
    fn test_has_alpha() {
        assert!(BufferFormat::Argb32.has_alpha());
        assert!(BufferFormat::Argb32Premultiplied.has_alpha());
        assert!(BufferFormat::Rgba8888.has_alpha());
        assert!(BufferFormat::Alpha8.has_alpha());
        assert!(!BufferFormat::Rgb32.has_alpha());
        assert!(!BufferFormat::Rgbx8888.has_alpha());
        assert!(!BufferFormat::Grayscale8.has_alpha());
    }

    #[test]
    fn test_memory_compatible() {
        assert!(BufferFormat::Alpha8.is_memory_compatible(BufferFormat::Grayscale8));
        assert!(!BufferFormat::Alpha8.is_memory_compatible(BufferFormat::Grayscale16));
    }
}
