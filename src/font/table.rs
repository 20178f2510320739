//! Font table and cell metrics
//!
//! Loads the primary font plus up to three fallbacks and derives the fixed
//! cell geometry from the primary. Fallbacks are tried in order per
//! codepoint; a font that fails to load is skipped, only the primary is
//! mandatory.

use anyhow::{anyhow, Context, Result};
use fontdue::{Font, FontSettings};
use log::{info, warn};

use crate::constants::MAX_FONTS;

/// One loaded font with a human-readable label for logs
pub struct FontEntry {
    pub font: Font,
    pub label: String,
}

/// Ordered font table; index 0 is the primary and the metrics source.
pub struct FontTable {
    entries: Vec<FontEntry>,
}

impl FontTable {
    /// Load the primary font and whichever fallbacks parse, capped at
    /// [`MAX_FONTS`] entries total.
    pub fn load(primary_path: &str, fallback_paths: &[String]) -> Result<Self> {
        let primary = Self::load_entry(primary_path)
            .with_context(|| format!("Failed to load primary font {}", primary_path))?;
        let mut entries = vec![primary];

        for path in fallback_paths {
            if entries.len() >= MAX_FONTS {
                break;
            }
            match Self::load_entry(path) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping fallback font {}: {:#}", path, e),
            }
        }

        info!(
            "Loaded {} font(s): {}",
            entries.len(),
            entries
                .iter()
                .map(|e| e.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self { entries })
    }

    fn load_entry(path: &str) -> Result<FontEntry> {
        let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| anyhow!("Not a parseable TrueType font: {}", e))?;
        let label = std::path::Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        Ok(FontEntry { font, label })
    }

    #[inline]
    pub fn primary(&self) -> &Font {
        &self.entries[0].font
    }

    /// First font in table order with a real glyph for the codepoint;
    /// the primary when none covers it (missing-glyph box or blank).
    pub fn choose(&self, ch: char) -> &Font {
        self.entries
            .iter()
            .find(|e| e.font.lookup_glyph_index(ch) != 0)
            .map(|e| &e.font)
            .unwrap_or_else(|| self.primary())
    }
}

/// Fixed cell geometry, derived once from the primary font.
#[derive(Debug, Clone, Copy)]
pub struct CellMetrics {
    /// Rasterization size in pixels
    pub size_px: f32,
    /// Cell width in pixels (max ASCII advance + 1px spacing)
    pub cell_w: usize,
    /// Cell height in pixels (ascent - descent + 2px leading)
    pub cell_h: usize,
    /// Baseline offset from the cell top
    pub baseline: i32,
}

impl CellMetrics {
    /// Compute metrics from the table's primary font at `size_px`.
    pub fn from_primary(table: &FontTable, size_px: f32) -> Result<Self> {
        let metrics = table
            .primary()
            .horizontal_line_metrics(size_px)
            .context("Primary font has no horizontal line metrics")?;

        let baseline = metrics.ascent.round() as i32;
        let cell_h = (metrics.ascent - metrics.descent).round() as usize + 2;

        // Widest advance across printable ASCII decides the cell width
        let mut max_advance = 0.0f32;
        for byte in 0x20u8..=0x7E {
            let advance = table.primary().metrics(byte as char, size_px).advance_width;
            max_advance = max_advance.max(advance);
        }
        let cell_w = max_advance.round() as usize + 1;

        info!(
            "Cell metrics: {}x{} px, baseline {} (font size {})",
            cell_w, cell_h, baseline, size_px
        );
        Ok(Self {
            size_px,
            cell_w,
            cell_h,
            baseline,
        })
    }
}
