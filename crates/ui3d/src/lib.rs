#![warn(missing_docs)]
//! Panel surface and pointer interaction for a world-space control panel.
//!
//! The panel is a flat square in 3D space. Pointer rays from a tracked hand
//! are intersected with it ([`raycast_panel`]), hits are classified into
//! gesture regions ([`RegionLayout`]) and ordinary hits are turned into
//! press/move/release/activate events on a [`PanelSurface`] by a
//! [`PointerDispatcher`].
//!
//! # Example
//!
//! ```rust
//! use wristpanel_core::{PointerSample, Uv};
//! use wristpanel_ui3d::{PanelManager, PanelSurface, PointerDispatcher, RegionLayout};
//!
//! let mut panel = PanelManager::control_panel(800, 800, &RegionLayout::default());
//! let mut dispatcher = PointerDispatcher::new();
//!
//! dispatcher.handle(&mut panel, PointerSample::new(Some(Uv::new(0.5, 0.5)), false));
//! if panel.is_dirty() {
//!     let image = panel.render();
//!     assert_eq!(image.dimensions(), (800, 800));
//! }
//! ```

pub mod components;
pub mod interaction;
pub mod layout;
pub mod manager;
pub mod render;
pub mod surface;

pub use components::{
    ButtonColors, ButtonState, ElementId, ElementKind, PanelButton, PanelElement, PixelPoint,
    PixelRect,
};
pub use interaction::{
    panel_world_transform, pointer_ray, raycast_panel, DispatchStats, PanelHit, PointerDispatcher,
    Ray, DEFAULT_AIM_OFFSET, PARALLEL_EPSILON,
};
pub use layout::{RegionKind, RegionLayout};
pub use manager::{PanelManager, RECORD_CALLBACK, SEND_CALLBACK};
pub use surface::{PanelAction, PanelSurface, PointerEventKind};
