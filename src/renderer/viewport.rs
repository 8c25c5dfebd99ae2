// ── Letterbox viewport math ───────────────────────────────────────────────────
//
// The framebuffer is drawn at the logical resolution; when the window has a
// different shape it is scaled uniformly and centred, leaving black bars.

/// Axis-aligned rectangle in physical pixels, ready for `set_viewport`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest rectangle with the aspect ratio of `logical` that fits inside
/// `physical`, centred on both axes.
///
/// ```text
/// scale = min(pw / lw, ph / lh)
/// x     = (pw - lw * scale) / 2
/// y     = (ph - lh * scale) / 2
/// ```
///
/// A zero logical dimension yields a zero-sized viewport at the origin.
pub fn letterbox_viewport(physical: (u32, u32), logical: (u32, u32)) -> Viewport {
    let (lw, lh) = logical;
    if lw == 0 || lh == 0 {
        return Viewport { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
    }

    let (pw, ph) = (physical.0 as f32, physical.1 as f32);
    let scale = (pw / lw as f32).min(ph / lh as f32);
    let width = lw as f32 * scale;
    let height = lh as f32 * scale;

    Viewport {
        x: (pw - width) / 2.0,
        y: (ph - height) / 2.0,
        width,
        height,
    }
}
