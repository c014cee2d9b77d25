//! Re-establishing the binding after the two sides diverged.
//!
//! Either side can be treated as authoritative:
//!
//! - [`DualImage::rebind_view`] rebuilds the view from the buffer
//! - [`DualImage::rebind_buffer`] rebuilds the buffer from the view
//!
//! When the authoritative side has a format without a counterpart, the
//! [`RebindPolicy`] decides what is discarded before the error is returned.
//!
//! # Example
//!
//! ```rust
//! use pixtwin_core::{BufferFormat, DualImage, MatColorOrder, RebindPolicy};
//!
//! let mut img = DualImage::with_size(8, 8, BufferFormat::Rgb888);
//! img.view_mut().release();
//! assert!(!img.is_view_bound());
//!
//! img.rebind_view(RebindPolicy::ClearBoth).unwrap();
//! assert!(img.is_view_bound());
//!
//! img.rebind_buffer(RebindPolicy::KeepAuthoritative, MatColorOrder::Rgb).unwrap();
//! assert!(img.is_view_bound());
//! ```

use crate::bind::{bind, unbind};
use crate::color::{to_canonical_order, MatColorOrder};
use crate::dual::DualImage;
use crate::error::{Error, Result};
use crate::registry;
use crate::view::MatView;
use std::fmt;
use tracing::{debug, trace};

/// What to discard when a rebind cannot succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RebindPolicy {
    /// Clear both the buffer and the view.
    #[default]
    ClearBoth,
    /// Keep the authoritative side intact, clear only the side being rebuilt.
    KeepAuthoritative,
}

/// Which side a rebind rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RebindDirection {
    /// The buffer is authoritative; the view is rebuilt.
    ViewFromBuffer,
    /// The view is authoritative; the buffer is rebuilt.
    BufferFromView,
}

impl fmt::Display for RebindDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ViewFromBuffer => "view from buffer",
            Self::BufferFromView => "buffer from view",
        })
    }
}

/// Settings for [`DualImage::rebind_buffer_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RebindOptions {
    /// Failure policy.
    pub policy: RebindPolicy,
    /// Declared channel order of the view.
    pub color_order: MatColorOrder,
}

impl RebindOptions {
    /// Sets the failure policy.
    pub fn with_policy(mut self, policy: RebindPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the declared view channel order.
    pub fn with_color_order(mut self, color_order: MatColorOrder) -> Self {
        self.color_order = color_order;
        self
    }
}

impl DualImage {
    /// Rebuilds the view from the buffer.
    ///
    /// # Errors
    ///
    /// [`Error::DivergenceUnrecoverable`] when the buffer format has no view
    /// counterpart. By then the view is cleared, and with
    /// [`RebindPolicy::ClearBoth`] the buffer is cleared too.
    pub fn rebind_view(&mut self, policy: RebindPolicy) -> Result<()> {
        if registry::is_valid_buffer_format(self.buffer.format()) {
            trace!(format = ?self.buffer.format(), "rebind_view");
            self.view = bind(&self.buffer);
            return Ok(());
        }
        debug!(format = ?self.buffer.format(), ?policy, "rebind_view: unmapped buffer format");
        self.view.release();
        if policy == RebindPolicy::ClearBoth {
            self.clear();
        }
        Err(Error::divergence(RebindDirection::ViewFromBuffer, policy))
    }

    /// Rebuilds the buffer from the view, then binds the view to it.
    ///
    /// The view is first brought to RGB order according to `declared`. An
    /// empty view with a mapped type leaves both sides empty.
    ///
    /// # Errors
    ///
    /// [`Error::DivergenceUnrecoverable`] when the view type has no buffer
    /// counterpart. By then the buffer is cleared, and with
    /// [`RebindPolicy::ClearBoth`] the view is cleared too.
    pub fn rebind_buffer(&mut self, policy: RebindPolicy, declared: MatColorOrder) -> Result<()> {
        if registry::is_valid_view_format(self.view.mat_type()) {
            trace!(mat_type = %self.view.mat_type(), ?declared, "rebind_buffer");
            let rebuilt = unbind(&to_canonical_order(&self.view, declared));
            match rebuilt {
                Some(buffer) => {
                    self.buffer = buffer;
                    self.view = bind(&self.buffer);
                }
                None => self.clear(),
            }
            return Ok(());
        }
        debug!(mat_type = %self.view.mat_type(), ?policy, "rebind_buffer: unmapped view type");
        self.buffer = Default::default();
        if policy == RebindPolicy::ClearBoth {
            self.view = MatView::empty();
        }
        Err(Error::divergence(RebindDirection::BufferFromView, policy))
    }

    /// [`rebind_buffer`](Self::rebind_buffer) with bundled options.
    #[inline]
    pub fn rebind_buffer_with(&mut self, options: RebindOptions) -> Result<()> {
        self.rebind_buffer(options.policy, options.color_order)
    }
}
