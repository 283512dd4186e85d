use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{imageops, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

/// RGBA8 snapshot of the panel, origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelImage {
    pixels: RgbaImage,
}

impl PanelImage {
    /// Fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Image filled with one color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(color)),
        }
    }

    /// Wrap tightly packed RGBA8 bytes. Returns `None` if the length is wrong.
    pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, bytes).map(|pixels| Self { pixels })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Color at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Set one pixel. Out-of-bounds writes are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if let Some(pixel) = self.pixels.get_pixel_mut_checked(x, y) {
            *pixel = Rgba(color);
        }
    }

    /// Fill an axis-aligned rectangle, clipped to the image.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.width());
        let y_end = y.saturating_add(height).min(self.height());
        for py in y..y_end {
            for px in x..x_end {
                self.pixels.put_pixel(px, py, Rgba(color));
            }
        }
    }

    /// Tightly packed RGBA8 bytes, row-major from the top row.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Copy with rows in reverse order.
    ///
    /// Panel images have their origin at the top-left; compositor textures
    /// sample from the bottom-left.
    pub fn mirrored_vertically(&self) -> Self {
        Self {
            pixels: imageops::flip_vertical(&self.pixels),
        }
    }

    /// Write the image to disk as a PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let encoder =
            PngEncoder::new_with_quality(file, CompressionType::Fast, FilterType::NoFilter);
        encoder
            .write_image(
                self.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .context("failed to encode panel png")?;
        Ok(())
    }
}

impl From<RgbaImage> for PanelImage {
    fn from(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}
