use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::info;
use wristpanel_compositor::TextureApi;

use crate::{ContextGuard, GpuTexture, PanelImage, TextureBackend, UploadError};

/// Texture backend on a headless wgpu device.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: HashMap<u64, wgpu::Texture>,
    next_id: u64,
    context: Option<ContextGuard>,
}

impl WgpuBackend {
    /// Open the default adapter without a surface.
    pub fn new_headless() -> Result<Self> {
        pollster::block_on(Self::request())
    }

    async fn request() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("wristpanel device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .context("Failed to open GPU device")?;

        let info = adapter.get_info();
        info!(adapter = %info.name, backend = ?info.backend, "Panel texture device ready");

        Ok(Self {
            device,
            queue,
            textures: HashMap::new(),
            next_id: 1,
            context: None,
        })
    }
}

impl TextureBackend for WgpuBackend {
    fn api(&self) -> TextureApi {
        TextureApi::Wgpu
    }

    fn make_current(&mut self) -> Result<(), UploadError> {
        self.context = Some(ContextGuard::bind_current());
        Ok(())
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<GpuTexture, UploadError> {
        ContextGuard::ensure(self.context.as_ref())?;
        if width == 0 || height == 0 {
            return Err(UploadError::Device(format!(
                "invalid texture size {width}x{height}"
            )));
        }
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Panel Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let id = self.next_id;
        self.next_id += 1;
        self.textures.insert(id, texture);
        Ok(GpuTexture { id, width, height })
    }

    fn write_texture(&mut self, texture: &GpuTexture, image: &PanelImage) -> Result<(), UploadError> {
        ContextGuard::ensure(self.context.as_ref())?;
        texture.check_size(image)?;
        let target = self
            .textures
            .get(&texture.id)
            .ok_or(UploadError::UnknownTexture(texture.id))?;

        let (width, height) = image.dimensions();
        let row_bytes = width as usize * 4;
        let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
        let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;

        let padded;
        let bytes: &[u8] = if padded_row_bytes == row_bytes {
            image.as_raw()
        } else {
            let pixels = image.as_raw();
            let mut buffer = vec![0u8; padded_row_bytes * height as usize];
            for row in 0..height as usize {
                let src = row * row_bytes;
                let dst = row * padded_row_bytes;
                buffer[dst..dst + row_bytes].copy_from_slice(&pixels[src..src + row_bytes]);
            }
            padded = buffer;
            &padded
        };

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytes,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(padded_row_bytes as u32),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::empty());
        Ok(())
    }

    fn destroy_texture(&mut self, texture: GpuTexture) {
        if let Some(texture) = self.textures.remove(&texture.id) {
            texture.destroy();
        }
    }
}
