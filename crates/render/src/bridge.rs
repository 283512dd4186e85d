use tracing::{debug, info};
use wristpanel_compositor::{ColorSpace, CompositorRuntime, OverlayHandle};

use crate::{GpuTexture, PanelImage, TextureBackend, UploadError};

/// What happened to one upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Pixels written and the texture registered with the overlay.
    Uploaded,
    /// Context not current on this thread; retry on the next render.
    Skipped,
}

/// Owns the panel texture and pushes panel images to the compositor.
pub struct UploadBridge {
    backend: Box<dyn TextureBackend>,
    texture: Option<GpuTexture>,
    uploads: u64,
}

impl UploadBridge {
    /// Wrap a backend. No texture is allocated until [`UploadBridge::create`].
    pub fn new(backend: Box<dyn TextureBackend>) -> Self {
        Self {
            backend,
            texture: None,
            uploads: 0,
        }
    }

    /// Bind the graphics context to the calling thread and allocate the
    /// panel texture. Calling it again with a live texture is a no-op.
    pub fn create(&mut self, width: u32, height: u32) -> Result<(), UploadError> {
        self.backend.make_current()?;
        if self.texture.is_some() {
            return Ok(());
        }
        let texture = self.backend.create_texture(width, height)?;
        info!(texture = texture.id, width, height, "Panel texture allocated");
        self.texture = Some(texture);
        Ok(())
    }

    /// Mirror `image`, write it into the panel texture and register the
    /// texture with `overlay`.
    pub fn upload(
        &mut self,
        runtime: &mut dyn CompositorRuntime,
        overlay: OverlayHandle,
        image: &PanelImage,
    ) -> Result<UploadOutcome, UploadError> {
        let texture = self.texture.ok_or(UploadError::NoTexture)?;
        let mirrored = image.mirrored_vertically();
        match self.backend.write_texture(&texture, &mirrored) {
            Ok(()) => {}
            Err(err) if err.is_transient() => {
                debug!(%err, "Skipping panel upload");
                return Ok(UploadOutcome::Skipped);
            }
            Err(err) => return Err(err),
        }
        let descriptor = texture.descriptor(self.backend.api(), ColorSpace::Auto);
        runtime.set_texture(overlay, &descriptor)?;
        self.uploads += 1;
        Ok(UploadOutcome::Uploaded)
    }

    /// Free the panel texture. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(texture) = self.texture.take() {
            self.backend.destroy_texture(texture);
            debug!(texture = texture.id, "Panel texture released");
        }
    }

    /// The live texture, if any.
    pub fn texture(&self) -> Option<GpuTexture> {
        self.texture
    }

    /// Number of completed uploads.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl Drop for UploadBridge {
    fn drop(&mut self) {
        self.release();
    }
}
