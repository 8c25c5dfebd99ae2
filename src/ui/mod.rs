use glam::Vec2;
use image::RgbaImage;

use crate::geometry::{Color, Rect};
use crate::renderer::{Surface, TextRasterizer};

/// A line (or block) of text with a cached raster and a bounding box centred
/// on `anchor`.
///
/// The raster is rebuilt whenever content, size, family or color change and
/// on every [`TextLabel::rescale`]; drawing only blits the cache.
#[derive(Clone, Debug)]
pub struct TextLabel {
    content: String,
    anchor: Vec2,
    font_size: u32,
    font_family: String,
    color: Color,
    /// Free-form payload for game code (e.g. a menu action id).
    pub aux: Option<serde_json::Value>,
    image: RgbaImage,
    bounds: Rect,
}

impl TextLabel {
    pub fn new(
        content: impl Into<String>,
        anchor: Vec2,
        font_size: u32,
        font_family: impl Into<String>,
        color: Color,
        aux: Option<serde_json::Value>,
        fonts: &dyn TextRasterizer,
    ) -> Self {
        let mut label = Self {
            content: content.into(),
            anchor,
            font_size,
            font_family: font_family.into(),
            color,
            aux,
            image: RgbaImage::new(1, 1),
            bounds: Rect::default(),
        };
        label.render(fonts);
        label
    }

    pub fn content(&self) -> &str { &self.content }
    pub fn anchor(&self) -> Vec2 { self.anchor }
    pub fn font_size(&self) -> u32 { self.font_size }
    pub fn font_family(&self) -> &str { &self.font_family }
    pub fn color(&self) -> Color { self.color }
    pub fn bounds(&self) -> Rect { self.bounds }
    pub fn image(&self) -> &RgbaImage { &self.image }

    /// Re-rasterize only when `content` differs from the current text.
    pub fn set_content(&mut self, content: &str, fonts: &dyn TextRasterizer) {
        if self.content != content {
            self.content = content.to_owned();
            self.render(fonts);
        }
    }

    pub fn set_font_size(&mut self, font_size: u32, fonts: &dyn TextRasterizer) {
        self.font_size = font_size;
        self.render(fonts);
    }

    pub fn set_font_family(&mut self, family: &str, fonts: &dyn TextRasterizer) {
        self.font_family = family.to_owned();
        self.render(fonts);
    }

    pub fn set_color(&mut self, color: Color, fonts: &dyn TextRasterizer) {
        self.color = color;
        self.render(fonts);
    }

    /// Moving the anchor keeps the raster and only re-centres the box.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.anchor = anchor;
        self.recenter();
    }

    /// Scale a label laid out at one resolution to another.
    ///
    /// The anchor becomes `(x * sx, y * sy)` truncated to whole pixels, and
    /// the font size `round(size * max(sx, sy))`.
    pub fn rescale(&mut self, sx: f32, sy: f32, fonts: &dyn TextRasterizer) {
        self.anchor = Vec2::new((self.anchor.x * sx).trunc(), (self.anchor.y * sy).trunc());
        self.font_size = (self.font_size as f32 * sx.max(sy)).round() as u32;
        self.render(fonts);
    }

    pub fn draw(&self, surface: &mut Surface) {
        surface.blit(&self.image, self.bounds.x, self.bounds.y);
    }

    fn render(&mut self, fonts: &dyn TextRasterizer) {
        self.image = fonts.render(&self.content, self.color, &self.font_family, self.font_size);
        self.recenter();
    }

    fn recenter(&mut self) {
        self.bounds = Rect::centered_on(
            self.anchor.x.round() as i32,
            self.anchor.y.round() as i32,
            self.image.width(),
            self.image.height(),
        );
    }
}
