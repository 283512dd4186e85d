//! Contract between the pointer pipeline and a renderable panel.

use wristpanel_render::PanelImage;

use crate::components::{ElementId, PixelPoint};
use crate::layout::RegionLayout;

/// Pointer event delivered to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Trigger went down.
    Press,
    /// Pointer moved (sent every sample while over the panel).
    Move,
    /// Trigger went up.
    Release,
    /// Press and release landed on the same element.
    Activate,
}

/// Something the host application should react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// An element was clicked.
    Activated {
        /// Element that was clicked.
        element: ElementId,
        /// Its callback id, if it has one.
        callback_id: Option<u32>,
    },
}

/// A hit-testable, renderable panel.
pub trait PanelSurface {
    /// Pixel size of rendered images.
    fn size(&self) -> (u32, u32);

    /// Whether the visual state changed since the last `render`.
    fn is_dirty(&self) -> bool;

    /// Draw the current state and clear the dirty flag.
    fn render(&mut self) -> PanelImage;

    /// Top-most interactive element under `point`.
    fn hit_test(&self, point: PixelPoint) -> Option<ElementId>;

    /// Deliver a pointer event.
    fn dispatch(&mut self, kind: PointerEventKind, point: PixelPoint) -> Option<PanelAction>;

    /// UV extents of the tagged gesture regions.
    fn regions(&self) -> RegionLayout;

    /// Move the drawn cursor; `None` hides it and clears hover.
    fn set_cursor(&mut self, point: Option<PixelPoint>);
}
