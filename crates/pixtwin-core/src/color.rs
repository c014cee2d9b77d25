//! Colors and channel-order conversion.
//!
//! Buffers always store color channels in RGB order. Matrix code commonly
//! stores 3-channel data as BGR instead, and nothing in a [`MatView`] records
//! which one it holds. Callers therefore declare the order of the views they
//! pass in with [`MatColorOrder`], and [`to_canonical_order`] brings them to
//! RGB before any buffer is built from them.
//!
//! Only 3-channel views are reordered. 1-channel data has no order, and for
//! 4-channel data the alpha position differs between the two worlds as well
//! (`0xAARRGGBB` words vs `B, G, R, A` bytes), so no swap can reconcile it:
//! 4-channel views pass through unchanged.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::color::{to_canonical_order, MatColorOrder};
//! use pixtwin_core::{MatType, MatView};
//!
//! let bgr = MatView::from_slice(1, 1, MatType::U8C3, &[30, 50, 100]).unwrap();
//! let rgb = to_canonical_order(&bgr, MatColorOrder::Bgr);
//! assert_eq!(rgb.to_packed_bytes(), vec![100, 50, 30]);
//! ```

use crate::error::{Error, Result};
use crate::format::MatType;
use crate::view::MatView;
use std::ops::Deref;
use tracing::{debug, trace};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with alpha.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks `0xAARRGGBB`.
    #[inline]
    pub const fn from_argb32(v: u32) -> Self {
        Self {
            a: (v >> 24) as u8,
            r: (v >> 16) as u8,
            g: (v >> 8) as u8,
            b: v as u8,
        }
    }

    /// Packs into `0xAARRGGBB`.
    #[inline]
    pub const fn to_argb32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Weighted gray value, `(11r + 16g + 5b) / 32`.
    #[inline]
    pub const fn gray(self) -> u8 {
        ((self.r as u32 * 11 + self.g as u32 * 16 + self.b as u32 * 5) / 32) as u8
    }

    /// Scales the color channels by alpha.
    pub fn premultiplied(self) -> Self {
        let mul = |c: u8| ((c as u32 * self.a as u32 + 127) / 255) as u8;
        Self::rgba(mul(self.r), mul(self.g), mul(self.b), self.a)
    }

    /// Inverse of [`premultiplied`](Self::premultiplied).
    pub fn unpremultiplied(self) -> Self {
        if self.a == 0 {
            return Self::rgba(0, 0, 0, 0);
        }
        let div = |c: u8| ((c as u32 * 255 + self.a as u32 / 2) / self.a as u32).min(255) as u8;
        Self::rgba(div(self.r), div(self.g), div(self.b), self.a)
    }
}

/// Parses `#RRGGBB`, `#AARRGGBB`, or the same without `#`.
impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let value = u32::from_str_radix(hex, 16).map_err(|_| Error::format_invalid(s))?;
        match hex.len() {
            6 => Ok(Color::from_argb32(0xff00_0000 | value)),
            8 => Ok(Color::from_argb32(value)),
            _ => Err(Error::format_invalid(s)),
        }
    }
}

/// Four-component value in the matrix library's channel order.
pub type Scalar = [f64; 4];

/// Channel order of 3-channel view data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatColorOrder {
    /// Red first; the canonical order.
    #[default]
    Rgb,
    /// Blue first.
    Bgr,
}

/// A view in canonical (RGB) order.
///
/// Borrows the source when it needed no conversion, owns a converted copy
/// otherwise. Dereferences to [`MatView`] either way.
#[derive(Debug)]
pub enum CanonicalView<'a> {
    /// Source was already canonical.
    Borrowed(&'a MatView),
    /// Channels were reordered into a new allocation.
    Converted(MatView),
}

impl CanonicalView<'_> {
    /// Whether a converted copy was made.
    #[inline]
    pub fn is_converted(&self) -> bool {
        matches!(self, Self::Converted(_))
    }

    /// Takes ownership, copying when borrowed.
    pub fn into_owned(self) -> MatView {
        match self {
            Self::Borrowed(view) => view.deep_clone(),
            Self::Converted(view) => view,
        }
    }
}

impl Deref for CanonicalView<'_> {
    type Target = MatView;

    fn deref(&self) -> &MatView {
        match self {
            Self::Borrowed(view) => view,
            Self::Converted(view) => view,
        }
    }
}

/// Brings `view` into RGB order given its `declared` order.
///
/// Only 3-channel views declared [`MatColorOrder::Bgr`] are converted, with
/// channels 0 and 2 swapped for any element depth. Everything else is
/// borrowed unchanged.
pub fn to_canonical_order(view: &MatView, declared: MatColorOrder) -> CanonicalView<'_> {
    if declared != MatColorOrder::Bgr || view.channels() != 3 || view.is_empty() {
        return CanonicalView::Borrowed(view);
    }
    trace!(rows = view.rows(), cols = view.cols(), "to_canonical_order: BGR -> RGB");
    let mut converted = view.deep_clone();
    converted.swap_channels(0, 2);
    CanonicalView::Converted(converted)
}

/// Writes a copy of `source` with red and blue exchanged into `dest`.
///
/// `declared` documents the source order; the swap is its own inverse, so
/// both orders exchange the channels.
///
/// # Errors
///
/// [`Error::FormatInvalid`] unless `source` is `U8C3`. `dest` is left
/// untouched on failure.
pub fn swap_red_blue(source: &MatView, dest: &mut MatView, declared: MatColorOrder) -> Result<()> {
    if source.mat_type() != MatType::U8C3 {
        debug!(mat_type = %source.mat_type(), "swap_red_blue: not U8C3");
        return Err(Error::format_invalid(source.mat_type()));
    }
    trace!(?declared, "swap_red_blue");
    *dest = to_canonical_order(source, MatColorOrder::Bgr).into_owned();
    Ok(())
}

/// Converts `color` into a scalar in the `order` channel layout.
///
/// The fourth component is always zero.
pub fn color_to_scalar(color: Color, order: MatColorOrder) -> Scalar {
    let (r, g, b) = (color.r as f64, color.g as f64, color.b as f64);
    match order {
        MatColorOrder::Rgb => [r, g, b, 0.0],
        MatColorOrder::Bgr => [b, g, r, 0.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_packing() {
        let c = Color::from_argb32(0x8012_3456);
        assert_eq!(c, Color::rgba(0x12, 0x34, 0x56, 0x80));
        assert_eq!(c.to_argb32(), 0x8012_3456);
        assert_eq!(Color::WHITE.gray(), 255);
        assert_eq!(Color::rgb(100, 100, 100).gray(), 100);
    }

    #[test]
    fn test_premultiply() {
        let c = Color::rgba(200, 100, 0, 128).premultiplied();
        assert_eq!(c, Color::rgba(100, 50, 0, 128));
        assert_eq!(Color::rgba(9, 9, 9, 0).unpremultiplied(), Color::rgba(0, 0, 0, 0));
        assert_eq!(Color::rgb(1, 2, 3).premultiplied(), Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_color_from_str() {
        assert_eq!("#102030".parse::<Color>().unwrap(), Color::rgb(0x10, 0x20, 0x30));
        assert_eq!("80102030".parse::<Color>().unwrap().a, 0x80);
        assert!("#1020".parse::<Color>().is_err());
        assert!("zzzzzz".parse::<Color>().is_err());
    }

    #[test]
    fn test_canonical_passthrough() {
        let gray = MatView::from_slice(1, 1, MatType::U8C1, &[5]).unwrap();
        let out = to_canonical_order(&gray, MatColorOrder::Bgr);
        assert!(!out.is_converted());
        assert_eq!(out.data_ptr(), gray.data_ptr());

        let rgba = MatView::from_slice(1, 1, MatType::U8C4, &[1, 2, 3, 4]).unwrap();
        let out = to_canonical_order(&rgba, MatColorOrder::Bgr);
        assert_eq!(out.to_packed_bytes(), vec![1, 2, 3, 4]);

        let rgb = MatView::from_slice(1, 1, MatType::U8C3, &[1, 2, 3]).unwrap();
        assert!(!to_canonical_order(&rgb, MatColorOrder::Rgb).is_converted());
    }

    #[test]
    fn test_canonical_bgr_converts_copy() {
        let bgr = MatView::from_slice(1, 2, MatType::U8C3, &[30, 50, 100, 1, 2, 3]).unwrap();
        let out = to_canonical_order(&bgr, MatColorOrder::Bgr);
        assert!(out.is_converted());
        assert_eq!(out.to_packed_bytes(), vec![100, 50, 30, 3, 2, 1]);
        assert_eq!(bgr.to_packed_bytes(), vec![30, 50, 100, 1, 2, 3]);
    }

    #[test]
    fn test_canonical_into_owned() {
        let rgb = MatView::from_slice(1, 1, MatType::U8C3, &[1, 2, 3]).unwrap();
        let owned = to_canonical_order(&rgb, MatColorOrder::Rgb).into_owned();
        assert_ne!(owned.data_ptr(), rgb.data_ptr());
        assert_eq!(owned.to_packed_bytes(), vec![1, 2, 3]);

        let owned = to_canonical_order(&rgb, MatColorOrder::Bgr).into_owned();
        assert_eq!(owned.to_packed_bytes(), vec![3, 2, 1]);
    }

    #[test]
    fn test_swap_red_blue() {
        let src = MatView::from_slice(1, 1, MatType::U8C3, &[1, 2, 3]).unwrap();
        let mut dst = MatView::empty();
        swap_red_blue(&src, &mut dst, MatColorOrder::Rgb).unwrap();
        assert_eq!(dst.to_packed_bytes(), vec![3, 2, 1]);
        swap_red_blue(&src, &mut dst, MatColorOrder::Bgr).unwrap();
        assert_eq!(dst.to_packed_bytes(), vec![3, 2, 1]);
    }

    #[test]
    fn test_swap_red_blue_rejects_other_types() {
        let src = MatView::new(1, 1, MatType::U8C4);
        let mut dst = MatView::from_slice(1, 1, MatType::U8C1, &[9]).unwrap();
        let err = swap_red_blue(&src, &mut dst, MatColorOrder::Bgr).unwrap_err();
        assert!(err.is_format_error());
        assert_eq!(dst.to_packed_bytes(), vec![9]);
    }

    #[test]
    fn test_color_to_scalar() {
        let c = Color::rgb(10, 20, 30);
        assert_eq!(color_to_scalar(c, MatColorOrder::Rgb), [10.0, 20.0, 30.0, 0.0]);
        assert_eq!(color_to_scalar(c, MatColorOrder::Bgr), [30.0, 20.0, 10.0, 0.0]);
    }
}
