//! Panel element: a rectangle with a gesture region tag and optional button.

use super::{PanelButton, PixelPoint, PixelRect};
use crate::layout::RegionKind;

/// What an element is.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Solid fill.
    Fill {
        /// RGBA8 color.
        color: [u8; 4],
    },
    /// Interactive button.
    Button(PanelButton),
}

/// One rectangle on the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelElement {
    /// Area covered, in panel pixels.
    pub rect: PixelRect,
    /// Gesture region the element marks.
    pub region: RegionKind,
    /// Content.
    pub kind: ElementKind,
}

impl PanelElement {
    /// A plain colored rectangle.
    pub fn fill(rect: PixelRect, color: [u8; 4]) -> Self {
        Self {
            rect,
            region: RegionKind::Content,
            kind: ElementKind::Fill { color },
        }
    }

    /// A button.
    pub fn button(rect: PixelRect, button: PanelButton) -> Self {
        Self {
            rect,
            region: RegionKind::Content,
            kind: ElementKind::Button(button),
        }
    }

    /// Builder: tag the element as a gesture region.
    pub fn with_region(mut self, region: RegionKind) -> Self {
        self.region = region;
        self
    }

    /// Whether the element is drawn and hit-testable.
    pub fn is_visible(&self) -> bool {
        match &self.kind {
            ElementKind::Fill { .. } => true,
            ElementKind::Button(button) => button.visible,
        }
    }

    /// Whether `point` falls on this element.
    pub fn contains(&self, point: PixelPoint) -> bool {
        self.is_visible() && self.rect.contains(point)
    }

    /// Fill color for the current state.
    pub fn color(&self) -> [u8; 4] {
        match &self.kind {
            ElementKind::Fill { color } => *color,
            ElementKind::Button(button) => button.current_color(),
        }
    }

    /// The button, if this element is one.
    pub fn as_button(&self) -> Option<&PanelButton> {
        match &self.kind {
            ElementKind::Button(button) => Some(button),
            ElementKind::Fill { .. } => None,
        }
    }

    /// Mutable access to the button, if this element is one.
    pub fn as_button_mut(&mut self) -> Option<&mut PanelButton> {
        match &mut self.kind {
            ElementKind::Button(button) => Some(button),
            ElementKind::Fill { .. } => None,
        }
    }
}
