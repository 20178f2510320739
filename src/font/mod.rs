//! Font loading and glyph rendering
//!
//! A small table of TrueType fonts (one primary plus script fallbacks)
//! rasterized with fontdue, and the per-cell compositor that paints
//! glyphs into the framebuffer.

pub mod raster;
pub mod table;

pub use raster::render_grid;
pub use table::{CellMetrics, FontTable};
