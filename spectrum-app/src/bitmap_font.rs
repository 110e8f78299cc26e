//! Minimal 5x7 bitmap font for the frame overlays.

use spectrum_core::{Surface, TextRenderer};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const LINE_HEIGHT: u32 = 20;
const TAB_ADVANCE: u32 = 10;
const SPACE_ADVANCE: u32 = 8;

/// Draws text as scaled 5x7 glyphs, each on a solid background cell.
#[derive(Debug, Clone, Copy)]
pub struct BitmapFont {
    scale: u32,
    ink: u32,
    paper: u32,
}

impl BitmapFont {
    pub fn new() -> Self {
        Self {
            scale: 2,
            ink: 0x0000_0000,
            paper: 0x00ff_ffff,
        }
    }

    /// Horizontal advance of one glyph cell (5 px plus 1 px spacing, scaled).
    fn advance(&self) -> u32 {
        (GLYPH_WIDTH + 1) * self.scale
    }

    fn draw_glyph(&self, surface: &mut Surface<'_>, x: u32, baseline: u32, rows: [u8; 7]) {
        let (width, height) = (surface.width(), surface.height());
        for cell_y in 0..GLYPH_HEIGHT * self.scale {
            let y = baseline + cell_y;
            if y >= height {
                break;
            }
            // Glyph rows are stored top first.
            let bits = rows[(GLYPH_HEIGHT - 1 - cell_y / self.scale) as usize];
            for cell_x in 0..self.advance() {
                let px = x + cell_x;
                if px >= width {
                    break;
                }
                let column = cell_x / self.scale;
                let lit = column < GLYPH_WIDTH && bits & (1 << (GLYPH_WIDTH - 1 - column)) != 0;
                surface.set_pixel(px, y, if lit { self.ink } else { self.paper });
            }
        }
    }
}

impl Default for BitmapFont {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer for BitmapFont {
    fn render_text(&mut self, surface: &mut Surface<'_>, x: u32, y: u32, text: &str) {
        for (line_index, line) in text.split('\n').enumerate() {
            let Some(baseline) = y.checked_sub(line_index as u32 * LINE_HEIGHT) else {
                break;
            };
            let mut pen = x;
            for ch in line.chars() {
                if pen >= surface.width() {
                    break;
                }
                pen += match ch {
                    '\t' => TAB_ADVANCE,
                    ' ' => SPACE_ADVANCE,
                    _ => {
                        self.draw_glyph(surface, pen, baseline, glyph(ch.to_ascii_uppercase()));
                        self.advance()
                    }
                };
            }
        }
    }
}

/// 5-bit rows, top first, most significant bit leftmost. Unknown
/// characters get an empty cell.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        _ => [0; 7],
    }
}
