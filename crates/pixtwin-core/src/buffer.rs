//! Owning pixel buffer.
//!
//! [`PixelBuffer`] is the allocating half of a [`DualImage`](crate::DualImage).
//! It owns a [`PixelStorage`] allocation and knows its width, height, row
//! stride and [`BufferFormat`].
//!
//! # Memory Layout
//!
//! Rows are stored top-to-bottom. Each row is `format.bytes_per_line(width)`
//! bytes, rounded up to a multiple of 4, so rows may carry padding:
//!
//! ```text
//! Grayscale8, width 5:  [g g g g g . . .]  <- Row 0 (stride 8)
//!                       [g g g g g . . .]  <- Row 1
//! ```
//!
//! 32-bit formats store one native-endian `u32` per pixel (`0xAARRGGBB`),
//! `Rgb888` stores bytes `R, G, B`, `Grayscale16` one native-endian `u16`.
//!
//! # Copies
//!
//! [`Clone`] always allocates fresh storage and copies every byte. Nothing in
//! this crate relies on sharing pixel data between buffers.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, Color, PixelBuffer};
//!
//! let mut buf = PixelBuffer::new(4, 3, BufferFormat::Rgb888);
//! buf.fill_color(Color::rgb(10, 20, 30));
//! assert_eq!(buf.pixel_color(3, 2), Some(Color::rgb(10, 20, 30)));
//!
//! let copy = buf.clone();
//! assert_eq!(copy, buf);
//! assert_ne!(copy.bits(), buf.bits());
//! ```

use crate::color::Color;
use crate::format::BufferFormat;
use crate::storage::{Bytes, BytesMut, PixelStorage};
use std::rc::Rc;
use tracing::{trace, warn};

/// How [`PixelBuffer::scaled`] treats the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AspectRatioMode {
    /// Scale to exactly the requested size.
    #[default]
    Ignore,
    /// Largest size that fits inside the request, keeping the ratio.
    Keep,
    /// Smallest size that covers the request, keeping the ratio.
    KeepByExpanding,
}

impl AspectRatioMode {
    /// Resolves the output size for a `src` image and a requested `dst`.
    pub fn resolve(self, src: (u32, u32), dst: (u32, u32)) -> (u32, u32) {
        let (sw, sh) = (src.0 as u64, src.1 as u64);
        let (dw, dh) = (dst.0 as u64, dst.1 as u64);
        if self == Self::Ignore || sw == 0 || sh == 0 || dw == 0 || dh == 0 {
            return dst;
        }
        let rw = dh * sw / sh;
        let use_height = match self {
            Self::Keep => rw <= dw,
            _ => rw >= dw,
        };
        let clamp = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);
        if use_height {
            (clamp(rw), dst.1)
        } else {
            (dst.0, clamp(dw * sh / sw))
        }
    }
}

/// Owned image buffer with runtime pixel format.
pub struct PixelBuffer {
    storage: Option<Rc<PixelStorage>>,
    width: u32,
    height: u32,
    stride: usize,
    format: BufferFormat,
}

impl PixelBuffer {
    /// Creates an empty buffer: no storage, zero size, `Invalid` format.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            storage: None,
            width: 0,
            height: 0,
            stride: 0,
            format: BufferFormat::Invalid,
        }
    }

    /// Allocates a zero-filled buffer.
    ///
    /// Returns the empty buffer when either dimension is zero, the format
    /// is `Invalid`, or the allocation would exceed [`MAX_BYTES`].
    /// `Rgb32` pixels start opaque black.
    pub fn new(width: u32, height: u32, format: BufferFormat) -> Self {
        if width == 0 || height == 0 || format.is_invalid() {
            return Self::empty();
        }
        let Some((stride, size)) = layout(width, height, format) else {
            warn!(width, height, ?format, "PixelBuffer::new: size out of range");
            return Self::empty();
        };
        trace!(width, height, ?format, stride, "PixelBuffer::new");
        let mut buf = Self {
            storage: Some(PixelStorage::zeroed(size)),
            width,
            height,
            stride,
            format,
        };
        if format == BufferFormat::Rgb32 {
            buf.fill(0xff00_0000);
        }
        buf
    }

    /// Adopts `data` as the pixel rows of a `width` x `height` buffer.
    ///
    /// `data` must hold exactly `height` rows of `format.bytes_per_line(width)`
    /// bytes. No opaque prefill happens for `Rgb32`; the caller owns every
    /// byte. Returns `None` on a length mismatch or an out-of-range size.
    pub(crate) fn from_rows(
        width: u32,
        height: u32,
        format: BufferFormat,
        data: Vec<u8>,
    ) -> Option<Self> {
        if width == 0 || height == 0 || format.is_invalid() {
            return data.is_empty().then(Self::empty);
        }
        let (stride, size) = layout(width, height, format)?;
        if data.len() != size {
            return None;
        }
        Some(Self {
            storage: Some(PixelStorage::from_vec(data)),
            width,
            height,
            stride,
            format,
        })
    }

    /// Returns the width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the pixel format.
    #[inline]
    pub fn format(&self) -> BufferFormat {
        self.format
    }

    /// Returns the bytes per row, padding included.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Total size of the pixel data in bytes.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.stride * self.height as usize
    }

    /// Returns `true` for a buffer without storage.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
    }

    /// Address of the first pixel byte, null for an empty buffer.
    #[inline]
    pub fn bits(&self) -> *const u8 {
        match &self.storage {
            Some(s) => s.ptr_at(0),
            None => std::ptr::null(),
        }
    }

    pub(crate) fn storage(&self) -> Option<&Rc<PixelStorage>> {
        self.storage.as_ref()
    }

    /// Borrows all pixel bytes, padding included.
    pub fn data(&self) -> Bytes<'_> {
        match &self.storage {
            Some(s) => Bytes::shared(s.range(0, self.size_in_bytes())),
            None => Bytes::empty(),
        }
    }

    /// Mutably borrows all pixel bytes, padding included.
    pub fn data_mut(&mut self) -> BytesMut<'_> {
        match &self.storage {
            Some(s) => BytesMut::shared(s.range_mut(0, self.size_in_bytes())),
            None => BytesMut::empty(),
        }
    }

    /// Borrows the full stride of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn scan_line(&self, y: u32) -> Bytes<'_> {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        match &self.storage {
            Some(s) => Bytes::shared(s.range(y as usize * self.stride, self.stride)),
            None => Bytes::empty(),
        }
    }

    /// Mutably borrows the full stride of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn scan_line_mut(&mut self, y: u32) -> BytesMut<'_> {
        assert!(y < self.height, "row {y} out of bounds (height {})", self.height);
        match &self.storage {
            Some(s) => BytesMut::shared(s.range_mut(y as usize * self.stride, self.stride)),
            None => BytesMut::empty(),
        }
    }

    /// Bytes of one row without padding.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        (self.width as usize * self.format.bits_per_pixel()).div_ceil(8)
    }

    /// Whether (x, y) lies inside the buffer.
    #[inline]
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Raw pixel value at (x, y), zero-extended to `u32`.
    ///
    /// Returns `None` out of bounds or for sub-byte formats.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        let bpp = self.byte_pixel_size()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let line = self.scan_line(y);
        let px = &line[x as usize * bpp..(x as usize + 1) * bpp];
        Some(match bpp {
            1 => px[0] as u32,
            2 => u16::from_ne_bytes([px[0], px[1]]) as u32,
            3 => u32::from_be_bytes([0, px[0], px[1], px[2]]),
            _ => u32::from_ne_bytes([px[0], px[1], px[2], px[3]]),
        })
    }

    /// Color at (x, y), or `None` out of bounds or for formats without
    /// per-pixel color (`Mono`, `MonoLsb`, `Indexed8`).
    pub fn pixel_color(&self, x: u32, y: u32) -> Option<Color> {
        let bpp = self.byte_pixel_size()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let line = self.scan_line(y);
        decode_pixel(self.format, &line[x as usize * bpp..(x as usize + 1) * bpp])
    }

    /// Writes `color` at (x, y). Out-of-range coordinates are ignored.
    pub fn set_pixel_color(&mut self, x: u32, y: u32, color: Color) {
        let Some(bpp) = self.byte_pixel_size() else {
            warn!(format = ?self.format, "set_pixel_color: format has no per-pixel color");
            return;
        };
        if x >= self.width || y >= self.height {
            warn!(x, y, width = self.width, height = self.height, "set_pixel_color: coordinate out of range");
            return;
        }
        let format = self.format;
        let mut line = self.scan_line_mut(y);
        encode_pixel(format, color, &mut line[x as usize * bpp..(x as usize + 1) * bpp]);
    }

    /// Fills every pixel with a raw pixel value.
    ///
    /// The value is truncated to the pixel size: 8-bit formats use the low
    /// byte, 16-bit formats the low 16 bits, 32-bit packed formats the whole
    /// value. 24-bit and byte-ordered 32-bit formats read it as `0xAARRGGBB`
    /// (24-bit ignores alpha). 1-bit formats use the lowest bit.
    pub fn fill(&mut self, value: u32) {
        let pattern: Vec<u8> = match self.format {
            BufferFormat::Invalid => return,
            BufferFormat::Mono | BufferFormat::MonoLsb => {
                let byte = if value & 1 == 1 { 0xff } else { 0x00 };
                self.data_mut().fill(byte);
                return;
            }
            BufferFormat::Indexed8 | BufferFormat::Alpha8 | BufferFormat::Grayscale8 => {
                vec![value as u8]
            }
            BufferFormat::Rgb16 | BufferFormat::Grayscale16 => (value as u16).to_ne_bytes().to_vec(),
            BufferFormat::Rgb32 => (value | 0xff00_0000).to_ne_bytes().to_vec(),
            BufferFormat::Argb32 | BufferFormat::Argb32Premultiplied => value.to_ne_bytes().to_vec(),
            format @ (BufferFormat::Rgb888
            | BufferFormat::Bgr888
            | BufferFormat::Rgbx8888
            | BufferFormat::Rgba8888) => {
                let mut px = vec![0u8; format.bytes_per_pixel()];
                encode_pixel(format, Color::from_argb32(value), &mut px);
                px
            }
        };
        self.fill_pattern(&pattern);
    }

    /// Fills every pixel with `color`, converted to the buffer format.
    pub fn fill_color(&mut self, color: Color) {
        let Some(bpp) = self.byte_pixel_size() else {
            if !self.is_empty() {
                self.fill(u32::from(color.gray() >= 128));
            }
            return;
        };
        let mut px = vec![0u8; bpp];
        encode_pixel(self.format, color, &mut px);
        self.fill_pattern(&px);
    }

    fn fill_pattern(&mut self, pattern: &[u8]) {
        let row_len = self.width as usize * pattern.len();
        let stride = self.stride;
        if stride == 0 {
            return;
        }
        let mut data = self.data_mut();
        for row in data.chunks_exact_mut(stride) {
            for px in row[..row_len].chunks_exact_mut(pattern.len()) {
                px.copy_from_slice(pattern);
            }
        }
    }

    /// Returns a copy converted to `format`.
    ///
    /// Returns the empty buffer when this buffer is empty, when `format` is
    /// `Invalid`, or when either side is a palette or 1-bit format.
    pub fn convert_to(&self, format: BufferFormat) -> PixelBuffer {
        if format == self.format {
            return self.clone();
        }
        if self.is_empty() || format.is_invalid() {
            return Self::empty();
        }
        let (Some(src_bpp), Some(dst_bpp)) = (self.byte_pixel_size(), byte_pixel_size(format)) else {
            warn!(from = ?self.format, to = ?format, "convert_to: unsupported conversion");
            return Self::empty();
        };
        trace!(from = ?self.format, to = ?format, "PixelBuffer::convert_to");
        let mut out = PixelBuffer::new(self.width, self.height, format);
        if out.is_empty() {
            return out;
        }
        let width = self.width as usize;
        for y in 0..self.height {
            let src = self.scan_line(y);
            let mut dst = out.scan_line_mut(y);
            for x in 0..width {
                let color = decode_pixel(self.format, &src[x * src_bpp..(x + 1) * src_bpp])
                    .unwrap_or_default();
                encode_pixel(format, color, &mut dst[x * dst_bpp..(x + 1) * dst_bpp]);
            }
        }
        out
    }

    /// Relabels the pixel data with a memory-compatible format.
    ///
    /// The bytes are moved, not converted. Returns `None` when the formats
    /// do not share a byte layout.
    pub fn reinterpret(self, format: BufferFormat) -> Option<PixelBuffer> {
        if !self.format.is_memory_compatible(format) {
            return None;
        }
        Some(PixelBuffer { format, ..self })
    }

    /// Returns a nearest-neighbour scaled copy.
    ///
    /// Returns the empty buffer for empty input, a zero target size, or
    /// 1-bit formats.
    pub fn scaled(&self, width: u32, height: u32, mode: AspectRatioMode) -> PixelBuffer {
        let (dw, dh) = mode.resolve(self.dimensions(), (width, height));
        if self.is_empty() || dw == 0 || dh == 0 {
            return Self::empty();
        }
        let Some(bpp) = self.byte_pixel_size() else {
            warn!(format = ?self.format, "scaled: unsupported format");
            return Self::empty();
        };
        trace!(from_w = self.width, from_h = self.height, dw, dh, "PixelBuffer::scaled");
        let mut out = PixelBuffer::new(dw, dh, self.format);
        if out.is_empty() {
            return out;
        }
        for y in 0..dh {
            let sy = (y as u64 * self.height as u64 / dh as u64) as u32;
            let src = self.scan_line(sy);
            let mut dst = out.scan_line_mut(y);
            for x in 0..dw as usize {
                let sx = x * self.width as usize / dw as usize;
                dst[x * bpp..(x + 1) * bpp].copy_from_slice(&src[sx * bpp..(sx + 1) * bpp]);
            }
        }
        out
    }

    fn byte_pixel_size(&self) -> Option<usize> {
        byte_pixel_size(self.format)
    }
}

/// Largest allocation a [`PixelBuffer`] will make, in bytes.
pub const MAX_BYTES: usize = i32::MAX as usize;

/// Row stride and total byte size, or `None` past [`MAX_BYTES`].
fn layout(width: u32, height: u32, format: BufferFormat) -> Option<(usize, usize)> {
    let bits = (width as usize).checked_mul(format.bits_per_pixel())?;
    let stride = bits.div_ceil(32).checked_mul(4)?;
    let size = stride.checked_mul(height as usize)?;
    (size <= MAX_BYTES).then_some((stride, size))
}

fn byte_pixel_size(format: BufferFormat) -> Option<usize> {
    match format {
        BufferFormat::Invalid
        | BufferFormat::Mono
        | BufferFormat::MonoLsb
        | BufferFormat::Indexed8 => None,
        other => Some(other.bytes_per_pixel()),
    }
}

fn decode_pixel(format: BufferFormat, px: &[u8]) -> Option<Color> {
    let word = || u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
    let half = || u16::from_ne_bytes([px[0], px[1]]);
    Some(match format {
        BufferFormat::Rgb32 => {
            let mut c = Color::from_argb32(word());
            c.a = 255;
            c
        }
        BufferFormat::Argb32 => Color::from_argb32(word()),
        BufferFormat::Argb32Premultiplied => Color::from_argb32(word()).unpremultiplied(),
        BufferFormat::Rgb16 => {
            let v = half();
            let (r, g, b) = ((v >> 11) as u8, ((v >> 5) & 0x3f) as u8, (v & 0x1f) as u8);
            Color::rgb((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
        }
        BufferFormat::Rgb888 => Color::rgb(px[0], px[1], px[2]),
        BufferFormat::Bgr888 => Color::rgb(px[2], px[1], px[0]),
        BufferFormat::Rgbx8888 => Color::rgb(px[0], px[1], px[2]),
        BufferFormat::Rgba8888 => Color::rgba(px[0], px[1], px[2], px[3]),
        BufferFormat::Alpha8 => Color::rgba(0, 0, 0, px[0]),
        BufferFormat::Grayscale8 => Color::rgb(px[0], px[0], px[0]),
        BufferFormat::Grayscale16 => {
            let v = (half() >> 8) as u8;
            Color::rgb(v, v, v)
        }
        BufferFormat::Invalid
        | BufferFormat::Mono
        | BufferFormat::MonoLsb
        | BufferFormat::Indexed8 => return None,
    })
}

fn encode_pixel(format: BufferFormat, color: Color, px: &mut [u8]) {
    match format {
        BufferFormat::Rgb32 => px.copy_from_slice(&(color.to_argb32() | 0xff00_0000).to_ne_bytes()),
        BufferFormat::Argb32 => px.copy_from_slice(&color.to_argb32().to_ne_bytes()),
        BufferFormat::Argb32Premultiplied => {
            px.copy_from_slice(&color.premultiplied().to_argb32().to_ne_bytes())
        }
        BufferFormat::Rgb16 => {
            let v = ((color.r as u16 >> 3) << 11) | ((color.g as u16 >> 2) << 5) | (color.b as u16 >> 3);
            px.copy_from_slice(&v.to_ne_bytes());
        }
        BufferFormat::Rgb888 => px.copy_from_slice(&[color.r, color.g, color.b]),
        BufferFormat::Bgr888 => px.copy_from_slice(&[color.b, color.g, color.r]),
        BufferFormat::Rgbx8888 => px.copy_from_slice(&[color.r, color.g, color.b, 0xff]),
        BufferFormat::Rgba8888 => px.copy_from_slice(&[color.r, color.g, color.b, color.a]),
        BufferFormat::Alpha8 => px[0] = color.a,
        BufferFormat::Grayscale8 => px[0] = color.gray(),
        BufferFormat::Grayscale16 => px.copy_from_slice(&(color.gray() as u16 * 257).to_ne_bytes()),
        BufferFormat::Invalid
        | BufferFormat::Mono
        | BufferFormat::MonoLsb
        | BufferFormat::Indexed8 => {}
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for PixelBuffer {
    /// Deep copy into a fresh allocation.
    fn clone(&self) -> Self {
        let storage = self
            .storage
            .as_ref()
            .map(|s| PixelStorage::from_vec(s.range(0, self.size_in_bytes()).to_vec()));
        Self {
            storage,
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        }
    }
}

impl PartialEq for PixelBuffer {
    /// Compares size, format and visible pixel bytes.
    ///
    /// Row padding is ignored, and so is the unused byte of `Rgb32`.
    fn eq(&self, other: &Self) -> bool {
        if self.dimensions() != other.dimensions() || self.format != other.format {
            return false;
        }
        let row_bytes = self.row_bytes();
        for y in 0..self.height {
            let (a, b) = (self.scan_line(y), other.scan_line(y));
            let (a, b) = (&a[..row_bytes], &b[..row_bytes]);
            let equal = if self.format == BufferFormat::Rgb32 {
                a.chunks_exact(4).zip(b.chunks_exact(4)).all(|(p, q)| {
                    let mask = 0x00ff_ffff;
                    u32::from_ne_bytes([p[0], p[1], p[2], p[3]]) & mask
                        == u32::from_ne_bytes([q[0], q[1], q[2], q[3]]) & mask
                })
            } else {
                a == b
            };
            if !equal {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .field("bits", &self.bits())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_empty() {
        let buf = PixelBuffer::new(15, 10, BufferFormat::Grayscale8);
        assert_eq!(buf.dimensions(), (15, 10));
        assert_eq!(buf.stride(), 16);
        assert_eq!(buf.size_in_bytes(), 160);
        assert!(!buf.bits().is_null());

        for empty in [
            PixelBuffer::new(0, 10, BufferFormat::Grayscale8),
            PixelBuffer::new(10, 10, BufferFormat::Invalid),
            PixelBuffer::empty(),
        ] {
            assert!(empty.is_empty());
            assert!(empty.bits().is_null());
            assert_eq!(empty.format(), BufferFormat::Invalid);
        }
    }

    #[test]
    fn test_new_rejects_oversized_dimensions() {
        // Overflows usize on 64-bit targets.
        assert!(PixelBuffer::new(u32::MAX, u32::MAX / 2, BufferFormat::Argb32).is_empty());
        // Representable, but past MAX_BYTES.
        assert!(PixelBuffer::new(1 << 16, 1 << 14, BufferFormat::Argb32).is_empty());
        assert!(!PixelBuffer::new(1 << 10, 1 << 10, BufferFormat::Argb32).is_empty());
    }

    #[test]
    fn test_from_rows() {
        let buf = PixelBuffer::from_rows(3, 2, BufferFormat::Rgb32, vec![0u8; 24]).unwrap();
        // No opaque prefill: the bytes are taken as given.
        assert_eq!(buf.pixel(0, 0), Some(0));
        assert_eq!(buf.stride(), 12);

        assert!(PixelBuffer::from_rows(3, 2, BufferFormat::Rgb32, vec![0u8; 23]).is_none());
        assert!(PixelBuffer::from_rows(0, 2, BufferFormat::Rgb32, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_scaled_to_oversized_target_is_empty() {
        let buf = PixelBuffer::new(2, 1, BufferFormat::Argb32);
        assert!(buf.scaled(u32::MAX, 1, AspectRatioMode::KeepByExpanding).is_empty());
    }

    #[test]
    fn test_fill_and_pixel() {
        let mut buf = PixelBuffer::new(4, 7, BufferFormat::Grayscale8);
        buf.fill(134);
        assert_eq!(buf.pixel(3, 6), Some(134));
        assert_eq!(buf.pixel_color(0, 0).map(|c| c.gray()), Some(134));
        assert_eq!(buf.pixel(4, 0), None);
    }

    #[test]
    fn test_rgb32_keeps_alpha_opaque() {
        let mut buf = PixelBuffer::new(2, 2, BufferFormat::Rgb32);
        assert_eq!(buf.pixel(0, 0), Some(0xff00_0000));
        buf.fill(0x0012_3456);
        assert_eq!(buf.pixel(1, 1), Some(0xff12_3456));
        assert_eq!(buf.pixel_color(1, 1), Some(Color::rgb(0x12, 0x34, 0x56)));
    }

    #[test]
    fn test_rgb888_byte_order() {
        let mut buf = PixelBuffer::new(3, 1, BufferFormat::Rgb888);
        buf.set_pixel_color(1, 0, Color::rgb(1, 2, 3));
        assert_eq!(&buf.scan_line(0)[3..6], &[1, 2, 3]);
    }

    #[test]
    fn test_set_pixel_out_of_range_is_ignored() {
        let mut buf = PixelBuffer::new(2, 2, BufferFormat::Grayscale8);
        let before = buf.clone();
        buf.set_pixel_color(5, 5, Color::rgb(255, 255, 255));
        assert_eq!(buf, before);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = PixelBuffer::new(3, 3, BufferFormat::Argb32);
        a.fill(0x8010_2030);
        let mut b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a.bits(), b.bits());
        b.fill(0);
        assert_ne!(a, b);
        assert_eq!(a.pixel(0, 0), Some(0x8010_2030));
    }

    #[test]
    fn test_eq_ignores_padding_and_rgb32_alpha() {
        let mut a = PixelBuffer::new(3, 2, BufferFormat::Grayscale8);
        let b = PixelBuffer::new(3, 2, BufferFormat::Grayscale8);
        a.data_mut()[3] = 77; // padding byte of row 0
        assert_eq!(a, b);

        let mut c = PixelBuffer::new(1, 1, BufferFormat::Rgb32);
        let d = PixelBuffer::new(1, 1, BufferFormat::Rgb32);
        c.data_mut().copy_from_slice(&0x0000_0000u32.to_ne_bytes());
        assert_eq!(c, d);
    }

    #[test]
    fn test_eq_checks_format() {
        let a = PixelBuffer::new(2, 2, BufferFormat::Alpha8);
        let b = PixelBuffer::new(2, 2, BufferFormat::Grayscale8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_convert_rgb888_to_gray() {
        let mut buf = PixelBuffer::new(2, 2, BufferFormat::Rgb888);
        buf.fill_color(Color::rgb(100, 100, 100));
        let gray = buf.convert_to(BufferFormat::Grayscale8);
        assert_eq!(gray.format(), BufferFormat::Grayscale8);
        assert_eq!(gray.pixel(1, 1), Some(100));

        let gray16 = gray.convert_to(BufferFormat::Grayscale16);
        assert_eq!(gray16.pixel(0, 0), Some(100 * 257));
    }

    #[test]
    fn test_convert_unsupported_is_empty() {
        let buf = PixelBuffer::new(2, 2, BufferFormat::Rgb888);
        assert!(buf.convert_to(BufferFormat::Indexed8).is_empty());
        assert!(buf.convert_to(BufferFormat::Invalid).is_empty());
    }

    #[test]
    fn test_reinterpret() {
        let mut buf = PixelBuffer::new(2, 2, BufferFormat::Grayscale8);
        buf.fill(42);
        let bits = buf.bits();
        let alpha = buf.reinterpret(BufferFormat::Alpha8).unwrap();
        assert_eq!(alpha.bits(), bits);
        assert_eq!(alpha.pixel_color(0, 0).map(|c| c.a), Some(42));
        assert!(alpha.reinterpret(BufferFormat::Rgb888).is_none());
    }

    #[test]
    fn test_scaled_nearest() {
        let mut buf = PixelBuffer::new(2, 1, BufferFormat::Grayscale8);
        buf.set_pixel_color(1, 0, Color::rgb(200, 200, 200));
        let up = buf.scaled(4, 2, AspectRatioMode::Ignore);
        assert_eq!(up.dimensions(), (4, 2));
        assert_eq!(up.pixel(1, 1), Some(0));
        assert_eq!(up.pixel(2, 1), Some(200));
        assert!(buf.scaled(0, 5, AspectRatioMode::Ignore).is_empty());
    }

    #[test]
    fn test_aspect_ratio_modes() {
        assert_eq!(AspectRatioMode::Ignore.resolve((200, 100), (50, 50)), (50, 50));
        assert_eq!(AspectRatioMode::Keep.resolve((200, 100), (50, 50)), (50, 25));
        assert_eq!(AspectRatioMode::KeepByExpanding.resolve((200, 100), (50, 50)), (100, 50));
    }

    #[test]
    fn test_aspect_ratio_clamps_to_u32() {
        let expanding = AspectRatioMode::KeepByExpanding;
        assert_eq!(expanding.resolve((u32::MAX, 1), (10, 10)), (u32::MAX, 10));
        assert_eq!(expanding.resolve((1, u32::MAX), (10, 10)), (10, u32::MAX));
    }
}
