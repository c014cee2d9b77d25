//! Binary stream format for [`DualImage`].
//!
//! All integers are big-endian.
//!
//! ```text
//! i32  buffer format code
//! i32  view rows
//! i32  view cols
//! i32  view type code
//! --- buffer codec ---
//! i32  width
//! i32  height
//! i32  sample kind (0 null, 1 gray8, 2 gray16, 3 rgb8, 4 xrgb32, 5 argb32)
//! ...  height rows of width samples
//! ```
//!
//! The buffer codec has fewer sample kinds than there are buffer formats.
//! `Alpha8` is written as gray8 and comes back as `Grayscale8`; formats
//! without a kind are converted to rgb8 or argb32 on the way out. The leading
//! format code restores the original format on the way in, by relabeling the
//! bytes when the layouts match and by converting otherwise. 1-bit and
//! palette buffers have no conversion and are written as the null image.
//!
//! The view is rebuilt over the decoded buffer from the stored rows, cols and
//! type, with the buffer stride as step, so an image that was bound when
//! written is bound after reading.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, DualImage};
//!
//! let mut img = DualImage::with_size(3, 2, BufferFormat::Alpha8);
//! img.fill(0x7f);
//!
//! let bytes = img.to_bytes().unwrap();
//! let back = DualImage::from_bytes(&bytes).unwrap();
//! assert_eq!(back.format(), BufferFormat::Alpha8);
//! assert_eq!(back, img);
//! ```

use crate::buffer::PixelBuffer;
use crate::dual::DualImage;
use crate::error::{Error, Result};
use crate::format::{BufferFormat, MatType};
use crate::view::MatView;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Largest pixel count accepted from a stream.
pub const MAX_PIXELS: u64 = 1 << 28;

/// Per-pixel encoding used by the buffer codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
enum SampleKind {
    Null = 0,
    Gray8 = 1,
    Gray16 = 2,
    Rgb8 = 3,
    Xrgb32 = 4,
    Argb32 = 5,
}

impl SampleKind {
    fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Null,
            1 => Self::Gray8,
            2 => Self::Gray16,
            3 => Self::Rgb8,
            4 => Self::Xrgb32,
            5 => Self::Argb32,
            _ => return None,
        })
    }

    /// Kind written for `format`, plus the format the data must be in.
    fn for_format(format: BufferFormat) -> (Self, BufferFormat) {
        match format {
            BufferFormat::Alpha8 | BufferFormat::Grayscale8 => (Self::Gray8, format),
            BufferFormat::Grayscale16 => (Self::Gray16, format),
            BufferFormat::Rgb888 => (Self::Rgb8, format),
            BufferFormat::Rgb32 => (Self::Xrgb32, format),
            BufferFormat::Argb32 => (Self::Argb32, format),
            BufferFormat::Invalid
            | BufferFormat::Mono
            | BufferFormat::MonoLsb
            | BufferFormat::Indexed8 => (Self::Null, BufferFormat::Invalid),
            other if other.has_alpha() => (Self::Argb32, BufferFormat::Argb32),
            _ => (Self::Rgb8, BufferFormat::Rgb888),
        }
    }

    fn buffer_format(self) -> BufferFormat {
        match self {
            Self::Null => BufferFormat::Invalid,
            Self::Gray8 => BufferFormat::Grayscale8,
            Self::Gray16 => BufferFormat::Grayscale16,
            Self::Rgb8 => BufferFormat::Rgb888,
            Self::Xrgb32 => BufferFormat::Rgb32,
            Self::Argb32 => BufferFormat::Argb32,
        }
    }
}

fn write_buffer<W: Write>(w: &mut W, buffer: &PixelBuffer) -> Result<()> {
    let (kind, wire_format) = SampleKind::for_format(buffer.format());
    let converted;
    let buffer = if wire_format == buffer.format() || buffer.is_empty() {
        buffer
    } else {
        converted = buffer.convert_to(wire_format);
        &converted
    };
    if buffer.is_empty() || kind == SampleKind::Null {
        w.write_i32::<BigEndian>(0)?;
        w.write_i32::<BigEndian>(0)?;
        w.write_i32::<BigEndian>(SampleKind::Null as i32)?;
        return Ok(());
    }

    w.write_i32::<BigEndian>(stream_dim(buffer.width(), "width")?)?;
    w.write_i32::<BigEndian>(stream_dim(buffer.height(), "height")?)?;
    w.write_i32::<BigEndian>(kind as i32)?;

    let row_bytes = buffer.row_bytes();
    for y in 0..buffer.height() {
        let line = buffer.scan_line(y);
        let line = &line[..row_bytes];
        match kind {
            SampleKind::Gray8 | SampleKind::Rgb8 => w.write_all(line)?,
            SampleKind::Gray16 => {
                for px in line.chunks_exact(2) {
                    w.write_u16::<BigEndian>(u16::from_ne_bytes([px[0], px[1]]))?;
                }
            }
            SampleKind::Xrgb32 | SampleKind::Argb32 => {
                for px in line.chunks_exact(4) {
                    w.write_u32::<BigEndian>(u32::from_ne_bytes([px[0], px[1], px[2], px[3]]))?;
                }
            }
            SampleKind::Null => {}
        }
    }
    Ok(())
}

fn read_buffer<R: Read>(r: &mut R) -> Result<PixelBuffer> {
    let width = r.read_i32::<BigEndian>()?;
    let height = r.read_i32::<BigEndian>()?;
    let code = r.read_i32::<BigEndian>()?;
    let kind = SampleKind::from_code(code)
        .ok_or_else(|| Error::invalid_stream(format!("unknown sample kind {code}")))?;
    if kind == SampleKind::Null {
        return Ok(PixelBuffer::empty());
    }
    if width <= 0 || height <= 0 {
        return Err(Error::invalid_stream(format!("bad image size {width}x{height}")));
    }
    if width as u64 * height as u64 > MAX_PIXELS {
        return Err(Error::invalid_stream(format!("image too large: {width}x{height}")));
    }

    let (width, height) = (width as u32, height as u32);
    let format = kind.buffer_format();
    let stride = format.bytes_per_line(width);
    let row_bytes = width as usize * format.bytes_per_pixel();

    // Rows are appended as they arrive; truncated input fails before the
    // full image is committed.
    let mut data = Vec::new();
    for _ in 0..height {
        let start = data.len();
        data.resize(start + stride, 0);
        let line = &mut data[start..start + row_bytes];
        match kind {
            SampleKind::Gray8 | SampleKind::Rgb8 => r.read_exact(line)?,
            SampleKind::Gray16 => {
                for px in line.chunks_exact_mut(2) {
                    px.copy_from_slice(&r.read_u16::<BigEndian>()?.to_ne_bytes());
                }
            }
            SampleKind::Xrgb32 => {
                for px in line.chunks_exact_mut(4) {
                    let v = r.read_u32::<BigEndian>()? | 0xff00_0000;
                    px.copy_from_slice(&v.to_ne_bytes());
                }
            }
            SampleKind::Argb32 => {
                for px in line.chunks_exact_mut(4) {
                    px.copy_from_slice(&r.read_u32::<BigEndian>()?.to_ne_bytes());
                }
            }
            SampleKind::Null => {}
        }
    }
    PixelBuffer::from_rows(width, height, format, data)
        .ok_or_else(|| Error::invalid_stream(format!("image too large: {width}x{height}")))
}

/// Brings a decoded buffer back to the format it was written from.
fn restore_format(buffer: PixelBuffer, original: BufferFormat) -> PixelBuffer {
    if buffer.is_empty() || buffer.format() == original {
        return buffer;
    }
    if buffer.format().is_memory_compatible(original) {
        trace!(from = ?buffer.format(), to = ?original, "restore_format: reinterpret");
        return buffer.reinterpret(original).unwrap_or_default();
    }
    trace!(from = ?buffer.format(), to = ?original, "restore_format: convert");
    buffer.convert_to(original)
}

/// Rebuilds a view over `buffer` if the stored geometry fits its storage.
fn restore_view(buffer: &PixelBuffer, rows: u32, cols: u32, mat_type: MatType) -> MatView {
    let Some(storage) = buffer.storage() else {
        return MatView::empty();
    };
    if rows == 0 || cols == 0 || mat_type.is_invalid() {
        return MatView::empty();
    }
    let step = buffer.stride();
    let row_bytes = cols as usize * mat_type.elem_size();
    let span = step * (rows as usize - 1) + row_bytes;
    if row_bytes > step || span > buffer.size_in_bytes() {
        debug!(rows, cols, %mat_type, "restore_view: geometry does not fit buffer, view left empty");
        return MatView::empty();
    }
    MatView::aliasing(storage.clone(), 0, rows, cols, mat_type, step)
}

fn stream_dim(v: u32, what: &str) -> Result<i32> {
    i32::try_from(v).map_err(|_| Error::invalid_stream(format!("{what} {v} exceed the stream range")))
}

fn read_dim<R: Read>(r: &mut R, what: &str) -> Result<u32> {
    let v = r.read_i32::<BigEndian>()?;
    u32::try_from(v).map_err(|_| Error::invalid_stream(format!("negative {what}: {v}")))
}

impl DualImage {
    /// Writes the image to `w`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        trace!(format = ?self.format(), "DualImage::write_to");
        w.write_i32::<BigEndian>(self.buffer.format().code())?;
        w.write_i32::<BigEndian>(stream_dim(self.view.rows(), "view rows")?)?;
        w.write_i32::<BigEndian>(stream_dim(self.view.cols(), "view cols")?)?;
        w.write_i32::<BigEndian>(self.view.mat_type().code())?;
        write_buffer(w, &self.buffer)
    }

    /// Reads an image written by [`write_to`](Self::write_to).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStream`] for unknown codes or impossible sizes
    /// - [`Error::Io`] for truncated input
    pub fn read_from<R: Read>(r: &mut R) -> Result<DualImage> {
        let code = r.read_i32::<BigEndian>()?;
        let original = BufferFormat::from_code(code)
            .ok_or_else(|| Error::invalid_stream(format!("unknown buffer format {code}")))?;
        let rows = read_dim(r, "rows")?;
        let cols = read_dim(r, "cols")?;
        let type_code = r.read_i32::<BigEndian>()?;
        let mat_type = MatType::from_code(type_code)
            .ok_or_else(|| Error::invalid_stream(format!("unknown view type {type_code}")))?;

        let buffer = restore_format(read_buffer(r)?, original);
        let view = restore_view(&buffer, rows, cols, mat_type);
        trace!(format = ?buffer.format(), rows, cols, %mat_type, "DualImage::read_from");
        Ok(DualImage { buffer, view })
    }

    /// Serializes into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(28 + self.bytes());
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Deserializes from a byte slice.
    pub fn from_bytes(mut data: &[u8]) -> Result<DualImage> {
        Self::read_from(&mut data)
    }

    /// Writes the image to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "saving image");
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    /// Reads an image from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DualImage> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading image");
        let mut r = BufReader::new(File::open(path)?);
        Self::read_from(&mut r)
    }
}
