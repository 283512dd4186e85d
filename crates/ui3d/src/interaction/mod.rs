//! Pointer interaction: raycasting the panel and turning per-tick samples
//! into panel events.

mod dispatch;
mod raycaster;

pub use dispatch::{DispatchStats, PointerDispatcher};
pub use raycaster::{
    panel_world_transform, pointer_ray, raycast_panel, PanelHit, Ray, DEFAULT_AIM_OFFSET,
    PARALLEL_EPSILON,
};
