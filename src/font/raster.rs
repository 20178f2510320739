//! Per-cell glyph compositor
//!
//! Paints grid cells into the framebuffer: background fill, glyph
//! rasterization through the font table, and per-channel alpha blending
//! of foreground over background.

use crate::fb::Framebuffer;
use crate::terminal::grid::Grid;

use super::table::{CellMetrics, FontTable};

/// Repaint the whole grid. The cursor cell is drawn with foreground and
/// background swapped when the cursor is visible.
pub fn render_grid(fb: &mut Framebuffer, fonts: &FontTable, metrics: &CellMetrics, grid: &Grid) {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let cell = grid.cell(row, col);
            let at_cursor =
                grid.cursor_visible && row == grid.cursor_y && col == grid.cursor_x;
            let (fg, bg) = if at_cursor {
                (cell.bg, cell.fg)
            } else {
                (cell.fg, cell.bg)
            };
            render_cell(
                fb,
                fonts,
                metrics,
                (col * metrics.cell_w) as i32,
                (row * metrics.cell_h) as i32,
                cell.ch,
                fg,
                bg,
            );
        }
    }
}

/// Paint one cell at pixel position (x, y).
#[allow(clippy::too_many_arguments)]
pub fn render_cell(
    fb: &mut Framebuffer,
    fonts: &FontTable,
    metrics: &CellMetrics,
    x: i32,
    y: i32,
    ch: char,
    fg: u32,
    bg: u32,
) {
    fb.fill_rect(x, y, metrics.cell_w, metrics.cell_h, bg);

    if ch == '\0' || ch == ' ' {
        return;
    }

    let font = fonts.choose(ch);
    let (glyph, bitmap) = font.rasterize(ch, metrics.size_px);
    if glyph.width == 0 || glyph.height == 0 {
        return;
    }

    // fontdue's ymin is the bitmap bottom relative to the baseline (y-up)
    let gx = x + glyph.xmin;
    let gy = y + metrics.baseline - glyph.height as i32 - glyph.ymin;
    draw_bitmap(fb, gx, gy, &bitmap, glyph.width, glyph.height, fg, bg);
}

/// Composite an alpha bitmap onto the framebuffer.
fn draw_bitmap(
    fb: &mut Framebuffer,
    x: i32,
    y: i32,
    bitmap: &[u8],
    width: usize,
    height: usize,
    fg: u32,
    bg: u32,
) {
    for row in 0..height {
        for col in 0..width {
            let alpha = bitmap[row * width + col];
            // Fully transparent: background already drawn
            if alpha == 0 {
                continue;
            }
            let color = if alpha == 255 {
                fg
            } else {
                blend(fg, bg, alpha)
            };
            fb.put_pixel(x + col as i32, y + row as i32, color);
        }
    }
}

/// Linear per-channel blend of fg over bg at the given coverage.
#[inline]
fn blend(fg: u32, bg: u32, alpha: u8) -> u32 {
    let a = alpha as u32;
    let na = 255 - a;

    let r = (((fg >> 16) & 0xFF) * a + ((bg >> 16) & 0xFF) * na) / 255;
    let g = (((fg >> 8) & 0xFF) * a + ((bg >> 8) & 0xFF) * na) / 255;
    let b = ((fg & 0xFF) * a + (bg & 0xFF) * na) / 255;

    (r << 16) | (g << 8) | b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_endpoints() {
        assert_eq!(blend(0xFFFFFF, 0x000000, 255), 0xFFFFFF);
        assert_eq!(blend(0xFFFFFF, 0x000000, 0), 0x000000);
    }

    #[test]
    fn test_blend_midpoint_per_channel() {
        // 50% white over black lands just below half intensity
        let c = blend(0xFFFFFF, 0x000000, 128);
        assert_eq!(c, 0x808080);
        // Channels blend independently
        let c = blend(0xFF0000, 0x0000FF, 128);
        assert_eq!((c >> 16) & 0xFF, 0x80);
        assert_eq!(c & 0xFF, 0x7F);
    }
}
