use crate::models::surface::Surface;

/// Draws short, already formatted strings into a surface.
///
/// `(x, y)` is the bottom-left corner of the first line in bottom-up surface
/// coordinates; each `\n` moves one line down.
pub trait TextRenderer {
    fn render_text(&mut self, surface: &mut Surface<'_>, x: u32, y: u32, text: &str);
}

/// A text draw request produced by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOverlay {
    pub x: u32,
    pub y: u32,
    pub text: String,
}

/// Discards all text. Useful for headless rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoText;

impl TextRenderer for NoText {
    fn render_text(&mut self, _surface: &mut Surface<'_>, _x: u32, _y: u32, _text: &str) {}
}
