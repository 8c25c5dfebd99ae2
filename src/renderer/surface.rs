use image::{Rgba, RgbaImage, imageops};

use crate::geometry::{Color, Rect};

/// CPU-side RGBA framebuffer at the game's logical resolution.
///
/// Scenes draw into it during `render`; the [`super::Renderer`] uploads it to
/// the GPU once per tick. Drawing outside the bounds is clipped.
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Zero dimensions are bumped to 1 so presentation always has a texture.
    pub fn new(width: u32, height: u32) -> Self {
        Self { pixels: RgbaImage::new(width.max(1), height.max(1)) }
    }

    pub fn width(&self) -> u32 { self.pixels.width() }
    pub fn height(&self) -> u32 { self.pixels.height() }

    pub fn image(&self) -> &RgbaImage { &self.pixels }

    /// Raw RGBA8 bytes, row-major, no padding.
    pub fn as_bytes(&self) -> &[u8] { self.pixels.as_raw() }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        (x < self.width() && y < self.height()).then(|| *self.pixels.get_pixel(x, y))
    }

    pub fn clear(&mut self, color: Color) {
        let px = color.to_rgba8();
        for p in self.pixels.pixels_mut() {
            *p = px;
        }
    }

    /// Overwrite `rect` with `color` (no blending).
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let px = color.to_rgba8();
        let x0 = rect.x.max(0) as u32;
        let y0 = rect.y.max(0) as u32;
        let x1 = rect.right().clamp(0, self.width() as i32) as u32;
        let y1 = rect.bottom().clamp(0, self.height() as i32) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.pixels.put_pixel(x, y, px);
            }
        }
    }

    /// Alpha-blend `img` with its top-left corner at `(x, y)`.
    pub fn blit(&mut self, img: &RgbaImage, x: i32, y: i32) {
        imageops::overlay(&mut self.pixels, img, x as i64, y as i64);
    }

    /// Alpha-blend `img` so it is centered inside `bounds`.
    pub fn blit_centered(&mut self, img: &RgbaImage, bounds: Rect) {
        let (cx, cy) = bounds.center();
        let r = Rect::centered_on(cx, cy, img.width(), img.height());
        self.blit(img, r.x, r.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped_to_bounds() {
        let mut s = Surface::new(4, 4);
        s.fill_rect(Rect::new(-2, 2, 10, 10), Color::WHITE);
        assert_eq!(s.pixel(0, 1), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(s.pixel(3, 3), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(s.pixel(4, 4), None);
    }

    #[test]
    fn zero_size_surface_still_has_a_pixel() {
        let s = Surface::new(0, 0);
        assert_eq!((s.width(), s.height()), (1, 1));
    }

    #[test]
    fn blit_centered_places_image_in_middle() {
        let mut s = Surface::new(10, 10);
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        s.blit_centered(&img, Rect::new(0, 0, 10, 10));
        assert_eq!(s.pixel(4, 4), Some(Rgba([9, 9, 9, 255])));
        assert_eq!(s.pixel(5, 5), Some(Rgba([9, 9, 9, 255])));
        assert_eq!(s.pixel(3, 3), Some(Rgba([0, 0, 0, 0])));
    }
}
