//! Coordinate mapping between the rendered surface and logical canvas space.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Fixed logical canvas width. Item positions are stored relative to this
/// width no matter how large the surface renders on screen.
pub const LOGICAL_WIDTH: f64 = 450.0;

/// Minimum logical canvas height.
pub const MIN_HEIGHT: f64 = 400.0;

/// Maximum logical canvas height.
pub const MAX_HEIGHT: f64 = 1500.0;

/// Logical canvas height a fresh composition starts with.
pub const DEFAULT_HEIGHT: f64 = 650.0;

/// Conversion factor from a charm's physical width to logical units.
pub const PIXELS_PER_CM: f64 = 45.0;

/// Viewport maps pointer/display coordinates onto the logical canvas.
///
/// The canvas renders at whatever width its container provides; the
/// viewport tracks the observed display rectangle and derives the scale
/// from it, so interaction stays correct at any rendered size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// On-screen rectangle the canvas currently occupies, if laid out.
    display_rect: Option<Rect>,
    /// Logical canvas size the display rect maps onto.
    logical_size: Size,
    /// Uniform render scale (rendered width / logical width).
    scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            display_rect: None,
            logical_size: Size::new(LOGICAL_WIDTH, DEFAULT_HEIGHT),
            scale: 1.0,
        }
    }
}

impl Viewport {
    /// Create a viewport with the default logical size and no layout yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the observed display rectangle of the canvas.
    ///
    /// A rectangle with zero or negative width means the surface has not
    /// been laid out yet; the update is skipped so the scale never comes
    /// from a division by zero.
    pub fn set_display_rect(&mut self, rect: Rect) {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            log::debug!("viewport not laid out yet, keeping previous geometry");
            return;
        }
        self.scale = rect.width() / self.logical_size.width;
        self.display_rect = Some(rect);
    }

    /// Update the logical canvas height (width is fixed).
    pub fn set_logical_height(&mut self, height: f64) {
        self.logical_size = Size::new(LOGICAL_WIDTH, height);
    }

    /// Current logical canvas size.
    pub fn logical_size(&self) -> Size {
        self.logical_size
    }

    /// Uniform render scale, derived from the last observed layout.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether the surface geometry has been measured.
    pub fn is_measured(&self) -> bool {
        self.display_rect.is_some()
    }

    /// Convert a screen-space point to logical canvas coordinates.
    ///
    /// Returns `None` while the surface geometry is unavailable.
    pub fn screen_to_logical(&self, screen: Point) -> Option<Point> {
        let rect = self.display_rect?;
        let scale_x = self.logical_size.width / rect.width();
        let scale_y = self.logical_size.height / rect.height();
        Some(Point::new(
            (screen.x - rect.x0) * scale_x,
            (screen.y - rect.y0) * scale_y,
        ))
    }

    /// Convert a logical canvas point back to screen space.
    pub fn logical_to_screen(&self, logical: Point) -> Option<Point> {
        let rect = self.display_rect?;
        let scale_x = rect.width() / self.logical_size.width;
        let scale_y = rect.height() / self.logical_size.height;
        Some(Point::new(
            rect.x0 + logical.x * scale_x,
            rect.y0 + logical.y * scale_y,
        ))
    }

    /// The logical canvas rectangle (origin at 0,0).
    pub fn logical_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.logical_size.width, self.logical_size.height)
    }
}
