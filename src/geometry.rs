// ── Color ──────────────────────────────────────────────────────────────────

/// Linear RGBA color with components in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const WHITE: Self = Self::rgb8(255, 255, 255);
    pub const BLACK: Self = Self::rgb8(0, 0, 0);
    pub const GREY: Self = Self::rgb8(125, 125, 125);
    pub const DARK_GREY: Self = Self::rgb8(52, 52, 52);
    pub const DARK_RED: Self = Self::rgb8(139, 0, 0);
    pub const RED: Self = Self::rgb8(194, 57, 33);
    pub const LIGHT_RED: Self = Self::rgb8(255, 0, 0);
    pub const LIGHT_PINK: Self = Self::rgb8(255, 182, 193);
    pub const ORANGE: Self = Self::rgb8(255, 165, 0);
    pub const YELLOW: Self = Self::rgb8(235, 195, 65);
    pub const LIME_GREEN: Self = Self::rgb8(50, 205, 50);
    pub const DARK_GREEN: Self = Self::rgb8(1, 100, 32);
    pub const BLUE: Self = Self::rgb8(30, 144, 255);
    pub const CYAN: Self = Self::rgb8(47, 237, 237);
    pub const PURPLE: Self = Self::rgb8(181, 60, 177);
    pub const BROWN: Self = Self::rgb8(150, 75, 0);
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);

    /// Opaque color from 8-bit channels.
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    pub fn to_rgba8(self) -> image::Rgba<u8> {
        let [r, g, b, a] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        image::Rgba([r, g, b, a])
    }
}

// ── Rect ───────────────────────────────────────────────────────────────────

/// Axis-aligned pixel rectangle. `x`, `y` is the top-left corner.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// A `w × h` rectangle whose center is `(cx, cy)`.
    ///
    /// For odd sizes the extra pixel goes right / down, so the center of a
    /// 3-pixel-wide rect at `cx = 10` spans `9..12`.
    pub fn centered_on(cx: i32, cy: i32, w: u32, h: u32) -> Self {
        Self {
            x: cx - (w / 2) as i32,
            y: cy - (h / 2) as i32,
            w,
            h,
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + (self.w / 2) as i32, self.y + (self.h / 2) as i32)
    }

    pub fn right(&self) -> i32 { self.x + self.w as i32 }
    pub fn bottom(&self) -> i32 { self.y + self.h as i32 }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_reports_same_center() {
        let r = Rect::centered_on(640, 648, 120, 24);
        assert_eq!(r.center(), (640, 648));
        assert_eq!(r.x, 580);
        assert_eq!(r.y, 636);
    }

    #[test]
    fn odd_width_extends_right() {
        let r = Rect::centered_on(10, 10, 3, 3);
        assert_eq!((r.x, r.right()), (9, 12));
        assert!(r.contains(11, 11));
        assert!(!r.contains(12, 11));
    }

    #[test]
    fn rgb8_round_trips_through_to_rgba8() {
        assert_eq!(Color::YELLOW.to_rgba8(), image::Rgba([235, 195, 65, 255]));
        assert_eq!(Color::TRANSPARENT.to_rgba8(), image::Rgba([0, 0, 0, 0]));
    }
}
