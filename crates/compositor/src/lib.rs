#![warn(missing_docs)]
//! Compositor runtime capability contract.
//!
//! The engine never talks to a VR SDK directly. It drives a
//! [`CompositorRuntime`], which covers exactly what the overlay needs:
//! session lifetime, one overlay object, device poses, controller buttons and
//! role lookup. [`SimulatedRuntime`] implements the contract in memory for
//! headless sessions and tests.

mod error;
mod runtime;
mod sim;

pub use error::CompositorError;
pub use runtime::{
    ColorSpace, CompositorEvent, CompositorRuntime, InputMethod, OverlayHandle, TextureApi,
    TextureDescriptor, TrackedPose, TrackingOrigin,
};
pub use sim::{OverlaySnapshot, RigHandle, SimulatedRuntime};
