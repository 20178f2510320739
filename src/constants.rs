//! Global constants for fbterm
//!
//! Consolidates grid limits, font bounds, and event-loop timing constants
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Grid Limits
// ============================================================================

/// Minimum number of terminal columns
pub const MIN_TERM_COLS: usize = 40;

/// Maximum number of terminal columns
pub const MAX_TERM_COLS: usize = 500;

/// Minimum number of terminal rows
pub const MIN_TERM_ROWS: usize = 10;

/// Maximum number of terminal rows
pub const MAX_TERM_ROWS: usize = 200;

/// Pixel margin left around the character grid
pub const SCREEN_MARGIN_PX: usize = 4;

// ============================================================================
// Fonts
// ============================================================================

/// Maximum number of loaded fonts (one primary + fallbacks)
pub const MAX_FONTS: usize = 4;

/// Minimum font size (pixels)
pub const MIN_FONT_SIZE: f32 = 6.0;

/// Maximum font size (pixels)
pub const MAX_FONT_SIZE: f32 = 72.0;

/// Default font size (pixels)
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

// ============================================================================
// Event Loop
// ============================================================================

/// Upper bound on one multiplexer wait in milliseconds (~60 fps pacing)
pub const FRAME_INTERVAL_MS: u16 = 16;

/// PTY / stdin read buffer size
pub const READ_BUF_SIZE: usize = 4096;

/// Quit hotkey byte on stdin (Ctrl+Q)
pub const QUIT_BYTE: u8 = 0x11;
