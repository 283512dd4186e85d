//! Panel elements and pixel-space geometry.

pub mod button;
pub mod panel;

pub use button::{ButtonColors, ButtonState, PanelButton};
pub use panel::{ElementKind, PanelElement};

use wristpanel_core::Uv;

/// Handle to an element of a panel.
pub type ElementId = u64;

/// Pixel position on the panel, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// Column.
    pub x: u32,
    /// Row.
    pub y: u32,
}

impl PixelPoint {
    /// Create a point.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Map a UV coordinate onto a `width × height` pixel grid.
    pub fn from_uv(uv: Uv, width: u32, height: u32) -> Self {
        let (x, y) = uv.to_pixel(width, height);
        Self { x, y }
    }
}

/// Axis-aligned pixel rectangle. Contains `x..x+width` × `y..y+height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the right-most column.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether `point` lies inside.
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}
