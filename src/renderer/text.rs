use std::collections::HashMap;
use std::path::Path;

use image::{RgbaImage, imageops};
use serde::Deserialize;

use crate::error::Result;
use crate::geometry::Color;

// ── TextRasterizer ────────────────────────────────────────────────────────────

/// Turns a string into a tightly sized RGBA image.
///
/// `size` is the line height in pixels. Implementations must return an image
/// of at least 1 × 1 so callers can always compute a bounding box.
pub trait TextRasterizer {
    fn render(&self, text: &str, color: Color, family: &str, size: u32) -> RgbaImage;
}

// ── Glyph ────────────────────────────────────────────────────────────────────

/// Metrics for a single character in the bitmap font atlas.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub id: char,
    /// Top-left pixel of the glyph region in the atlas.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Offset applied when drawing (may be negative).
    pub x_offset: i32,
    pub y_offset: i32,
    /// How far to advance the cursor after drawing this glyph.
    pub x_advance: u32,
}

// ── Font ─────────────────────────────────────────────────────────────────────

/// Glyph metrics of a bitmap font, loaded from a JSON descriptor.
pub struct Font {
    pub glyphs: HashMap<char, Glyph>,
    /// Vertical distance between successive baselines in pixels.
    pub line_height: u32,
    pub texture_width: u32,
    pub texture_height: u32,
}

impl Font {
    /// Parse the descriptor format:
    ///
    /// ```json
    /// { "line_height": 24, "texture_width": 512, "texture_height": 512,
    ///   "glyphs": [ { "id": 65, "x": 0, "y": 0, "width": 14, "height": 20,
    ///                 "x_offset": 1, "y_offset": 2, "x_advance": 16 } ] }
    /// ```
    ///
    /// Code points that are not Unicode scalar values are skipped.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: RawFont = serde_json::from_str(json)?;

        let glyphs = raw
            .glyphs
            .into_iter()
            .filter_map(|g| {
                char::from_u32(g.id).map(|ch| {
                    (ch, Glyph {
                        id: ch,
                        x: g.x,
                        y: g.y,
                        width: g.width,
                        height: g.height,
                        x_offset: g.x_offset,
                        y_offset: g.y_offset,
                        x_advance: g.x_advance,
                    })
                })
            })
            .collect();

        Ok(Self {
            glyphs,
            line_height: raw.line_height,
            texture_width: raw.texture_width,
            texture_height: raw.texture_height,
        })
    }

    /// Unscaled pixel size of `text`: widest line × number of lines.
    /// Unknown characters take no space.
    pub fn measure(&self, text: &str) -> (u32, u32) {
        let widest = text
            .split('\n')
            .map(|line| {
                line.chars()
                    .filter_map(|c| self.glyphs.get(&c))
                    .map(|g| g.x_advance)
                    .sum::<u32>()
            })
            .max()
            .unwrap_or(0);
        let lines = text.split('\n').count() as u32;
        (widest, lines * self.line_height)
    }
}

#[derive(Deserialize)]
struct RawGlyph {
    /// Unicode code point (e.g. 65 for 'A').
    id: u32,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    x_offset: i32,
    y_offset: i32,
    x_advance: u32,
}

#[derive(Deserialize)]
struct RawFont {
    line_height: u32,
    texture_width: u32,
    texture_height: u32,
    glyphs: Vec<RawGlyph>,
}

// ── BitmapFont ────────────────────────────────────────────────────────────────

/// Glyph metrics plus the atlas they index into.
///
/// Atlas glyphs are expected white-on-transparent; rendering tints them by
/// multiplying with the requested color.
pub struct BitmapFont {
    pub font: Font,
    atlas: RgbaImage,
}

impl BitmapFont {
    pub fn new(font: Font, atlas: RgbaImage) -> Self {
        Self { font, atlas }
    }

    /// Load `<stem>.json` metrics and the PNG atlas next to it.
    pub fn load(json_path: &Path, png_path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(json_path)?;
        let font = Font::from_json(&json)?;
        let atlas = image::open(png_path)?.to_rgba8();
        Ok(Self::new(font, atlas))
    }

    /// Rasterize `text` with a line height of `size` pixels.
    pub fn rasterize(&self, text: &str, color: Color, size: u32) -> RgbaImage {
        let font = &self.font;
        if font.line_height == 0 {
            return RgbaImage::new(1, 1);
        }
        let scale = size as f32 / font.line_height as f32;
        let (w, h) = font.measure(text);
        let mut canvas = RgbaImage::new(
            ((w as f32 * scale).ceil() as u32).max(1),
            ((h as f32 * scale).ceil() as u32).max(1),
        );

        let tint = color.0;
        let mut cursor_x = 0.0f32;
        let mut cursor_y = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = 0.0;
                cursor_y += font.line_height as f32 * scale;
                continue;
            }
            let Some(g) = font.glyphs.get(&ch) else { continue };

            let gw = (g.width as f32 * scale).round() as u32;
            let gh = (g.height as f32 * scale).round() as u32;
            if gw > 0 && gh > 0 {
                let src = imageops::crop_imm(&self.atlas, g.x, g.y, g.width, g.height).to_image();
                let mut glyph = imageops::resize(&src, gw, gh, imageops::FilterType::Nearest);
                for p in glyph.pixels_mut() {
                    for (c, t) in p.0.iter_mut().zip(tint) {
                        *c = (*c as f32 * t).round() as u8;
                    }
                }
                imageops::overlay(
                    &mut canvas,
                    &glyph,
                    (cursor_x + g.x_offset as f32 * scale).round() as i64,
                    (cursor_y + g.y_offset as f32 * scale).round() as i64,
                );
            }
            cursor_x += g.x_advance as f32 * scale;
        }
        canvas
    }
}

// ── FontBook ──────────────────────────────────────────────────────────────────

/// Family-name → font lookup, the crate's [`TextRasterizer`].
///
/// Family names are case-insensitive. Unknown families use the first font
/// registered. With no fonts at all, text renders as a transparent box of
/// estimated size so layout still works.
#[derive(Default)]
pub struct FontBook {
    fonts: HashMap<String, BitmapFont>,
    default_family: Option<String>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, family: &str, font: BitmapFont) {
        let key = family.to_lowercase();
        if self.default_family.is_none() {
            self.default_family = Some(key.clone());
        }
        self.fonts.insert(key, font);
    }

    pub fn len(&self) -> usize { self.fonts.len() }
    pub fn is_empty(&self) -> bool { self.fonts.is_empty() }

    pub fn get(&self, family: &str) -> Option<&BitmapFont> {
        self.fonts.get(&family.to_lowercase()).or_else(|| {
            self.default_family.as_ref().and_then(|d| self.fonts.get(d))
        })
    }

    /// Register every `<family>.json` in `folder` that has a matching
    /// `<family>.png`. Fonts that fail to load are logged and skipped.
    /// Files are visited in name order so the default family is stable.
    pub fn load_folder(folder: impl AsRef<Path>) -> Result<Self> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("font folder {} not found", folder.display()),
            )
            .into());
        }

        let mut book = Self::new();
        for entry in walkdir::WalkDir::new(folder)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let json_path = entry.path();
            if json_path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(family) = json_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let png_path = json_path.with_extension("png");
            match BitmapFont::load(json_path, &png_path) {
                Ok(font) => {
                    tracing::debug!(family, "loaded font");
                    book.insert(family, font);
                }
                Err(e) => tracing::warn!(path = %json_path.display(), "skipping font: {e}"),
            }
        }
        Ok(book)
    }
}

/// Size of `text` when no font is available: 0.6 em per character, one line
/// height per line.
pub fn estimate_size(text: &str, size: u32) -> (u32, u32) {
    let widest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let lines = text.split('\n').count() as u32;
    ((widest * size * 3).div_ceil(5).max(1), (lines * size).max(1))
}

impl TextRasterizer for FontBook {
    fn render(&self, text: &str, color: Color, family: &str, size: u32) -> RgbaImage {
        match self.get(family) {
            Some(font) => font.rasterize(text, color, size),
            None => {
                let (w, h) = estimate_size(text, size);
                RgbaImage::new(w, h)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Two 2×2 white glyphs, 'A' and 'B', line height 2.
    fn tiny_font() -> BitmapFont {
        let json = r#"{
            "line_height": 2, "texture_width": 4, "texture_height": 2,
            "glyphs": [
                { "id": 65, "x": 0, "y": 0, "width": 2, "height": 2,
                  "x_offset": 0, "y_offset": 0, "x_advance": 2 },
                { "id": 66, "x": 2, "y": 0, "width": 2, "height": 2,
                  "x_offset": 0, "y_offset": 0, "x_advance": 2 }
            ]
        }"#;
        let atlas = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));
        BitmapFont::new(Font::from_json(json).unwrap(), atlas)
    }

    #[test]
    fn measure_counts_advances_and_lines() {
        let f = tiny_font();
        assert_eq!(f.font.measure("AB"), (4, 2));
        assert_eq!(f.font.measure("A\nAB"), (4, 4));
        assert_eq!(f.font.measure("A?"), (2, 2));
    }

    #[test]
    fn rasterize_scales_to_requested_size() {
        let img = tiny_font().rasterize("AB", Color::WHITE, 4);
        assert_eq!(img.dimensions(), (8, 4));
    }

    #[test]
    fn rasterize_tints_glyphs() {
        let img = tiny_font().rasterize("A", Color::LIGHT_RED, 2);
        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn unknown_family_falls_back_to_first_font() {
        let mut book = FontBook::new();
        book.insert("Impact", tiny_font());
        assert!(book.get("impact").is_some());
        assert!(book.get("comic sans").is_some());
        assert_eq!(book.render("AB", Color::WHITE, "nope", 2).dimensions(), (4, 2));
    }

    #[test]
    fn empty_book_estimates_box() {
        let img = FontBook::new().render("abcd", Color::WHITE, "impact", 20);
        assert_eq!(img.dimensions(), (48, 20));
    }
}
