#![warn(missing_docs)]
//! Panel images and the upload path that hands them to the compositor.
//!
//! The UI side produces [`PanelImage`]s. The worker owns an [`UploadBridge`],
//! which flips each image into texture orientation, writes it through a
//! [`TextureBackend`] and registers the texture with the overlay.

mod backend;
mod bridge;
#[cfg(feature = "gpu")]
mod gpu;
mod panel_image;

pub use backend::{
    ContextGuard, GpuTexture, MemoryBackend, MemoryTextureProbe, TextureBackend, UploadError,
};
pub use bridge::{UploadBridge, UploadOutcome};
#[cfg(feature = "gpu")]
pub use gpu::WgpuBackend;
pub use panel_image::PanelImage;
