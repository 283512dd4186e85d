use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, ThreadId};

use thiserror::Error;
use wristpanel_compositor::{ColorSpace, CompositorError, TextureApi, TextureDescriptor};

use crate::PanelImage;

/// Errors raised while moving panel pixels to the compositor.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The graphics context is not bound to the calling thread.
    #[error("graphics context is not current on this thread")]
    ContextNotCurrent,
    /// No texture has been created yet (or it was released).
    #[error("no panel texture allocated")]
    NoTexture,
    /// The texture id was not issued by this backend.
    #[error("unknown texture {0}")]
    UnknownTexture(u64),
    /// The image does not match the texture size.
    #[error("image is {got:?} but texture is {expected:?}")]
    SizeMismatch {
        /// Texture size.
        expected: (u32, u32),
        /// Image size.
        got: (u32, u32),
    },
    /// The graphics device failed.
    #[error("graphics device error: {0}")]
    Device(String),
    /// The compositor rejected the texture registration.
    #[error("compositor rejected texture: {0}")]
    Compositor(#[from] CompositorError),
}

impl UploadError {
    /// Errors that go away on their own; the upload is retried on the next
    /// render request.
    pub fn is_transient(&self) -> bool {
        matches!(self, UploadError::ContextNotCurrent)
    }

    /// Whether the compositor session is gone.
    pub fn is_fatal(&self) -> bool {
        matches!(self, UploadError::Compositor(err) if err.is_fatal())
    }
}

/// Records which thread a graphics context is current on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextGuard {
    owner: ThreadId,
}

impl ContextGuard {
    /// Bind to the calling thread.
    pub fn bind_current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    /// Whether the calling thread is the owner.
    pub fn is_current(&self) -> bool {
        self.owner == thread::current().id()
    }

    /// `Ok` only when `guard` exists and is current on the calling thread.
    pub fn ensure(guard: Option<&ContextGuard>) -> Result<(), UploadError> {
        match guard {
            Some(guard) if guard.is_current() => Ok(()),
            _ => Err(UploadError::ContextNotCurrent),
        }
    }
}

/// Texture allocated by a [`TextureBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuTexture {
    /// Backend-specific id.
    pub id: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl GpuTexture {
    /// Registration record for the compositor.
    pub fn descriptor(&self, api: TextureApi, color_space: ColorSpace) -> TextureDescriptor {
        TextureDescriptor {
            texture_id: self.id,
            api,
            color_space,
            width: self.width,
            height: self.height,
        }
    }

    pub(crate) fn check_size(&self, image: &PanelImage) -> Result<(), UploadError> {
        let got = image.dimensions();
        if got != (self.width, self.height) {
            return Err(UploadError::SizeMismatch {
                expected: (self.width, self.height),
                got,
            });
        }
        Ok(())
    }
}

/// Graphics API that owns the panel texture.
///
/// Every call except `make_current` and `destroy_texture` must come from the
/// thread the context was last made current on.
pub trait TextureBackend: Send {
    /// API reported to the compositor.
    fn api(&self) -> TextureApi;

    /// Bind the context to the calling thread.
    fn make_current(&mut self) -> Result<(), UploadError>;

    /// Allocate a texture.
    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuTexture, UploadError>;

    /// Overwrite a texture's contents.
    fn write_texture(&mut self, texture: &GpuTexture, image: &PanelImage) -> Result<(), UploadError>;

    /// Free a texture. Unknown ids are ignored.
    fn destroy_texture(&mut self, texture: GpuTexture);
}

#[derive(Debug, Default)]
struct MemoryTextures {
    next_id: u64,
    textures: HashMap<u64, PanelImage>,
    writes: u64,
}

/// CPU-side texture backend for simulated sessions.
#[derive(Debug)]
pub struct MemoryBackend {
    context: Option<ContextGuard>,
    store: Arc<Mutex<MemoryTextures>>,
}

/// Read access to a [`MemoryBackend`]'s textures from another thread.
#[derive(Debug, Clone)]
pub struct MemoryTextureProbe {
    store: Arc<Mutex<MemoryTextures>>,
}

impl MemoryBackend {
    /// New backend with no context bound, plus a probe into its textures.
    pub fn new() -> (Self, MemoryTextureProbe) {
        let store = Arc::new(Mutex::new(MemoryTextures {
            next_id: 1,
            ..MemoryTextures::default()
        }));
        (
            Self {
                context: None,
                store: Arc::clone(&store),
            },
            MemoryTextureProbe { store },
        )
    }

    fn store(&self) -> std::sync::MutexGuard<'_, MemoryTextures> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TextureBackend for MemoryBackend {
    fn api(&self) -> TextureApi {
        TextureApi::Cpu
    }

    fn make_current(&mut self) -> Result<(), UploadError> {
        self.context = Some(ContextGuard::bind_current());
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuTexture, UploadError> {
        ContextGuard::ensure(self.context.as_ref())?;
        let mut store = self.store();
        let id = store.next_id;
        store.next_id += 1;
        store.textures.insert(id, PanelImage::new(width, height));
        Ok(GpuTexture { id, width, height })
    }

    fn write_texture(&mut self, texture: &GpuTexture, image: &PanelImage) -> Result<(), UploadError> {
        ContextGuard::ensure(self.context.as_ref())?;
        texture.check_size(image)?;
        let mut store = self.store();
        let slot = store
            .textures
            .get_mut(&texture.id)
            .ok_or(UploadError::UnknownTexture(texture.id))?;
        *slot = image.clone();
        store.writes += 1;
        Ok(())
    }

    fn destroy_texture(&mut self, texture: GpuTexture) {
        self.store().textures.remove(&texture.id);
    }
}

impl MemoryTextureProbe {
    fn store(&self) -> std::sync::MutexGuard<'_, MemoryTextures> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Contents of a texture as stored (already in texture orientation).
    pub fn texture(&self, id: u64) -> Option<PanelImage> {
        self.store().textures.get(&id).cloned()
    }

    /// Number of live textures.
    pub fn live_textures(&self) -> usize {
        self.store().textures.len()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u64 {
        self.store().writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_backend_refuses_work() {
        let (mut backend, _probe) = MemoryBackend::new();
        let err = backend.create_texture(4, 4).unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn writes_land_in_texture() {
        let (mut backend, probe) = MemoryBackend::new();
        backend.make_current().unwrap();
        let texture = backend.create_texture(2, 2).unwrap();
        let image = PanelImage::filled(2, 2, [1, 2, 3, 4]);
        backend.write_texture(&texture, &image).unwrap();
        assert_eq!(probe.texture(texture.id), Some(image));
        assert_eq!(probe.write_count(), 1);

        backend.destroy_texture(texture);
        assert_eq!(probe.live_textures(), 0);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let (mut backend, _probe) = MemoryBackend::new();
        backend.make_current().unwrap();
        let texture = backend.create_texture(4, 4).unwrap();
        let err = backend
            .write_texture(&texture, &PanelImage::new(2, 2))
            .unwrap_err();
        assert!(matches!(
            err,
            UploadError::SizeMismatch {
                expected: (4, 4),
                got: (2, 2)
            }
        ));
        assert!(!err.is_transient());
    }

    #[test]
    fn guard_is_thread_bound() {
        let guard = ContextGuard::bind_current();
        assert!(guard.is_current());
        let elsewhere = std::thread::spawn(move || guard.is_current()).join().unwrap();
        assert!(!elsewhere);
    }

    #[test]
    fn session_loss_is_fatal() {
        let err = UploadError::from(CompositorError::SessionLost);
        assert!(err.is_fatal());
        assert!(!UploadError::NoTexture.is_fatal());
    }
}
