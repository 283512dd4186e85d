//! Software rasterization of panel elements.

use wristpanel_render::PanelImage;

use crate::components::{PanelElement, PixelPoint, PixelRect};

/// Cursor color (RGBA8).
pub const CURSOR_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Cursor half-extent in pixels.
pub const CURSOR_RADIUS: u32 = 6;

/// Fill an element's rectangle with its current color.
pub fn draw_element(image: &mut PanelImage, element: &PanelElement) {
    if !element.is_visible() {
        return;
    }
    let rect = element.rect;
    image.fill_rect(rect.x, rect.y, rect.width, rect.height, element.color());
    if element.as_button().is_some() {
        draw_border(image, rect, 2, [20, 20, 24, 255]);
    }
}

/// Outline a rectangle from the inside.
pub fn draw_border(image: &mut PanelImage, rect: PixelRect, thickness: u32, color: [u8; 4]) {
    let t = thickness.min(rect.width / 2).min(rect.height / 2);
    if t == 0 {
        return;
    }
    image.fill_rect(rect.x, rect.y, rect.width, t, color);
    image.fill_rect(rect.x, rect.bottom() - t, rect.width, t, color);
    image.fill_rect(rect.x, rect.y, t, rect.height, color);
    image.fill_rect(rect.right() - t, rect.y, t, rect.height, color);
}

/// Filled disc centered on `point`, clipped to the image.
pub fn draw_cursor(image: &mut PanelImage, point: PixelPoint, radius: u32, color: [u8; 4]) {
    let r = radius as i64;
    let (cx, cy) = (point.x as i64, point.y as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 {
                image.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
