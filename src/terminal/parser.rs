//! VT escape sequence parser
//!
//! Byte-at-a-time state machine that decodes UTF-8 text and ANSI/VT
//! control sequences, applying the results to a [`Grid`]. Device queries
//! (DSR/CPR/DA) append their replies to a caller-supplied response buffer.
//!
//! ## References
//! - ECMA-48: Control Functions for Coded Character Sets
//! - VT100/VT220: <https://vt100.net/docs/>
//! - Xterm Control Sequences: <https://invisible-island.net/xterm/ctlseqs/ctlseqs.html>

use std::io::Write;

use log::trace;

use super::grid::{palette_color, Grid, DEFAULT_BG, DEFAULT_FG};

/// Maximum number of CSI parameters kept per sequence
pub const MAX_PARAMS: usize = 16;

/// Maximum number of CSI intermediate bytes kept per sequence
const MAX_INTERMEDIATES: usize = 2;

/// Convert a CSI parameter to usize with a default value.
/// CSI parameters treat 0 as "default" (usually 1).
#[inline]
const fn param_or_default(param: u16, default: usize) -> usize {
    if param == 0 {
        default
    } else {
        param as usize
    }
}

/// In-flight CSI sequence: parameter slots, private-mode marker, and
/// (ignored) intermediate bytes.
#[derive(Debug, Clone, Copy, Default)]
struct CsiSequence {
    params: [u16; MAX_PARAMS],
    /// Number of parameter slots begun so far (0 = none yet)
    count: usize,
    /// Set by a `?` parameter byte (DEC private sequences)
    private: bool,
    intermediates: [u8; MAX_INTERMEDIATES],
    intermediate_count: usize,
}

impl CsiSequence {
    fn digit(&mut self, d: u8) {
        if self.count == 0 {
            self.count = 1;
        }
        let slot = &mut self.params[(self.count - 1).min(MAX_PARAMS - 1)];
        *slot = slot.saturating_mul(10).saturating_add(u16::from(d));
    }

    fn next_param(&mut self) {
        // A leading separator leaves an empty default first slot
        if self.count == 0 {
            self.count = 2;
        } else if self.count < MAX_PARAMS {
            self.count += 1;
        }
    }

    fn intermediate(&mut self, byte: u8) {
        if self.intermediate_count < MAX_INTERMEDIATES {
            self.intermediates[self.intermediate_count] = byte;
            self.intermediate_count += 1;
        }
    }

    fn params(&self) -> &[u16] {
        &self.params[..self.count]
    }
}

/// Parser state
enum State {
    /// Printable text and C0 controls
    Normal,
    /// After ESC
    Escape,
    /// After ESC (; the charset designator byte is discarded
    Charset,
    /// Inside a CSI sequence
    Csi(CsiSequence),
    /// Inside an OSC string (body discarded)
    Osc,
}

/// Escape-sequence and UTF-8 decoder.
///
/// Feed bytes one at a time with [`Parser::advance`]; grid mutations happen
/// on complete sequences only, so a frame painted mid-sequence never shows a
/// half-applied command.
pub struct Parser {
    state: State,
    utf8_buf: [u8; 4],
    utf8_len: usize,
    utf8_expected: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Normal,
            utf8_buf: [0; 4],
            utf8_len: 0,
            utf8_expected: 0,
        }
    }

    /// Process one byte from the PTY, mutating `grid` and appending any
    /// device reply to `responses`. Never fails; unknown or malformed
    /// sequences are absorbed with a best-effort return to normal state.
    pub fn advance(&mut self, grid: &mut Grid, byte: u8, responses: &mut Vec<u8>) {
        match &mut self.state {
            State::Normal => self.normal_byte(grid, byte),
            State::Escape => {
                self.state = match byte {
                    b'[' => State::Csi(CsiSequence::default()),
                    b']' => State::Osc,
                    b'(' => State::Charset,
                    _ => State::Normal,
                };
            }
            State::Charset => {
                // Designator byte (e.g. the B of ESC ( B) is dropped
                self.state = State::Normal;
            }
            State::Csi(seq) => match byte {
                b'0'..=b'9' => seq.digit(byte - b'0'),
                b';' => seq.next_param(),
                b'?' => seq.private = true,
                0x20..=0x2F => seq.intermediate(byte),
                0x40..=0x7E => {
                    let seq = *seq;
                    self.state = State::Normal;
                    csi_dispatch(grid, &seq, byte, responses);
                }
                _ => {
                    trace!("Aborting CSI sequence on byte 0x{:02x}", byte);
                    self.state = State::Normal;
                }
            },
            State::Osc => match byte {
                0x07 => self.state = State::Normal,
                0x1B => self.state = State::Escape,
                _ => {}
            },
        }
    }

    /// Normal-state byte: C0 controls act immediately, everything else
    /// runs through the UTF-8 accumulator.
    fn normal_byte(&mut self, grid: &mut Grid, byte: u8) {
        match byte {
            0x1B => {
                self.utf8_len = 0;
                self.state = State::Escape;
            }
            b'\n' => {
                self.utf8_len = 0;
                grid.linefeed();
            }
            b'\r' => {
                self.utf8_len = 0;
                grid.carriage_return();
            }
            0x08 => {
                self.utf8_len = 0;
                grid.backspace();
            }
            b'\t' => {
                self.utf8_len = 0;
                grid.tab();
            }
            0x00..=0x1F => {
                trace!("Ignoring control character 0x{:02x}", byte);
            }
            _ => self.utf8_byte(grid, byte),
        }
    }

    fn utf8_byte(&mut self, grid: &mut Grid, byte: u8) {
        if self.utf8_len == 0 {
            self.utf8_expected = match byte {
                0x00..=0x7F => 1,
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => {
                    // Stray continuation or invalid lead byte
                    grid.put_char('\u{FFFD}');
                    return;
                }
            };
        } else if byte & 0xC0 != 0x80 {
            // Sequence broken mid-way; substitute and restart on this byte
            self.utf8_len = 0;
            grid.put_char('\u{FFFD}');
            self.utf8_byte(grid, byte);
            return;
        }

        self.utf8_buf[self.utf8_len] = byte;
        self.utf8_len += 1;

        if self.utf8_len >= self.utf8_expected {
            let cp = decode_utf8(&self.utf8_buf[..self.utf8_len]);
            grid.put_char(cp.unwrap_or('\u{FFFD}'));
            self.utf8_len = 0;
        }
    }
}

/// Apply one complete CSI sequence to the grid, emitting any device reply.
fn csi_dispatch(grid: &mut Grid, seq: &CsiSequence, final_byte: u8, responses: &mut Vec<u8>) {
    let params = seq.params();
    let param0 = params.first().copied().unwrap_or(0);

    match final_byte {
        // === Cursor movement ===
        b'H' | b'f' => {
            // CUP - Cursor Position (row ; col, 1-based, default 1;1)
            let row = param_or_default(param0, 1);
            let col = params
                .get(1)
                .map(|&p| param_or_default(p, 1))
                .unwrap_or(1);
            grid.move_cursor_to(row, col);
        }
        b'A' => grid.move_cursor_up(param_or_default(param0, 1)),
        b'B' => grid.move_cursor_down(param_or_default(param0, 1)),
        b'C' => grid.move_cursor_forward(param_or_default(param0, 1)),
        b'D' => grid.move_cursor_backward(param_or_default(param0, 1)),
        b'G' => {
            // CHA - Cursor Horizontal Absolute
            grid.move_cursor_to(grid.cursor_y + 1, param_or_default(param0, 1));
        }
        b'd' => {
            // VPA - Vertical Position Absolute
            grid.move_cursor_to(param_or_default(param0, 1), grid.cursor_x + 1);
        }

        // === Erase ===
        b'J' => grid.erase_in_display(param0),
        b'K' => grid.erase_in_line(param0),

        // === Scrolling ===
        b'S' => grid.scroll_up(param_or_default(param0, 1)),
        b'T' => grid.scroll_down(param_or_default(param0, 1)),

        // === Line / character editing ===
        b'L' => grid.insert_lines(param_or_default(param0, 1)),
        b'M' => grid.delete_lines(param_or_default(param0, 1)),
        b'@' => grid.insert_chars(param_or_default(param0, 1)),
        b'P' => grid.delete_chars(param_or_default(param0, 1)),
        b'X' => grid.erase_chars(param_or_default(param0, 1)),

        // === Scroll region ===
        b'r' => {
            // DECSTBM - top ; bottom, 1-based, default whole screen
            let top = param_or_default(param0, 1) - 1;
            let bottom = params
                .get(1)
                .map(|&p| param_or_default(p, grid.rows()))
                .unwrap_or(grid.rows())
                - 1;
            grid.set_scroll_region(top, bottom);
        }

        // === Attributes ===
        b'm' => apply_sgr(grid, params),

        // === Modes ===
        b'h' | b'l' => {
            if seq.private {
                let enable = final_byte == b'h';
                for &p in params {
                    match p {
                        25 => grid.cursor_visible = enable,
                        // Alternate screen variants accepted and ignored
                        47 | 1047 | 1049 => {}
                        _ => trace!("Ignoring private mode {}", p),
                    }
                }
            }
        }

        // === Device queries ===
        b'n' => match param0 {
            5 => responses.extend_from_slice(b"\x1b[0n"),
            6 => {
                let _ = write!(
                    responses,
                    "\x1b[{};{}R",
                    grid.cursor_y + 1,
                    grid.cursor_x + 1
                );
            }
            _ => {}
        },
        b'c' => responses.extend_from_slice(b"\x1b[?1;2c"),

        _ => {
            trace!(
                "Unhandled CSI final byte {:?} (params {:?})",
                final_byte as char,
                params
            );
        }
    }
}

/// Apply SGR parameters to the grid pen. An empty parameter list resets.
fn apply_sgr(grid: &mut Grid, params: &[u16]) {
    if params.is_empty() {
        grid.reset_attrs();
        return;
    }

    let mut i = 0;
    while i < params.len() {
        match params[i] {
            0 => grid.reset_attrs(),
            1 => grid.set_bold(true),
            22 => grid.set_bold(false),
            30..=37 => grid.set_fg(palette_color((params[i] - 30) as u8)),
            39 => grid.set_fg(DEFAULT_FG),
            40..=47 => grid.set_bg(palette_color((params[i] - 40) as u8)),
            49 => grid.set_bg(DEFAULT_BG),
            90..=97 => grid.set_fg(palette_color((params[i] - 90 + 8) as u8)),
            100..=107 => grid.set_bg(palette_color((params[i] - 100 + 8) as u8)),
            38 | 48 => {
                let is_fg = params[i] == 38;
                if let Some((color, consumed)) = extended_color(&params[i + 1..]) {
                    if is_fg {
                        grid.set_fg(color);
                    } else {
                        grid.set_bg(color);
                    }
                    i += consumed;
                }
            }
            _ => trace!("Ignoring SGR parameter {}", params[i]),
        }
        i += 1;
    }
}

/// Decode an extended color argument list (after a 38 or 48): `5;n` for a
/// palette index, `2;r;g;b` for direct color. Returns the color and the
/// number of parameters consumed.
fn extended_color(args: &[u16]) -> Option<(u32, usize)> {
    match args.first()? {
        5 => {
            let idx = (*args.get(1)?).min(255) as u8;
            Some((palette_color(idx), 2))
        }
        2 => {
            let r = (*args.get(1)?).min(255) as u32;
            let g = (*args.get(2)?).min(255) as u32;
            let b = (*args.get(3)?).min(255) as u32;
            Some(((r << 16) | (g << 8) | b, 4))
        }
        _ => None,
    }
}

/// Decode a complete, length-validated UTF-8 sequence into a scalar value.
fn decode_utf8(bytes: &[u8]) -> Option<char> {
    let cp = match bytes.len() {
        1 => u32::from(bytes[0]),
        2 => (u32::from(bytes[0] & 0x1F) << 6) | u32::from(bytes[1] & 0x3F),
        3 => {
            (u32::from(bytes[0] & 0x0F) << 12)
                | (u32::from(bytes[1] & 0x3F) << 6)
                | u32::from(bytes[2] & 0x3F)
        }
        4 => {
            (u32::from(bytes[0] & 0x07) << 18)
                | (u32::from(bytes[1] & 0x3F) << 12)
                | (u32::from(bytes[2] & 0x3F) << 6)
                | u32::from(bytes[3] & 0x3F)
        }
        _ => return None,
    };
    char::from_u32(cp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::grid::{Cell, DEFAULT_BG, DEFAULT_FG};

    struct Harness {
        grid: Grid,
        parser: Parser,
        responses: Vec<u8>,
    }

    impl Harness {
        fn new(cols: usize, rows: usize) -> Self {
            Self {
                grid: Grid::new(cols, rows),
                parser: Parser::new(),
                responses: Vec::new(),
            }
        }

        fn feed(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.parser.advance(&mut self.grid, b, &mut self.responses);
            }
        }
    }

    fn harness() -> Harness {
        Harness::new(80, 24)
    }

    #[test]
    fn test_plain_text_and_newline() {
        let mut h = harness();
        h.feed(b"hi\n");
        assert_eq!(h.grid.cell(0, 0).ch, 'h');
        assert_eq!(h.grid.cell(0, 1).ch, 'i');
        // Kernel ONLCR is expected to pair \n with \r; bare \n only feeds
        assert_eq!(h.grid.cursor_y, 1);
        h.feed(b"\r");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (0, 1));
    }

    #[test]
    fn test_clear_and_home() {
        let mut h = harness();
        h.feed(b"junk text");
        h.feed(b"\x1b[2J\x1b[H");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (0, 0));
        for row in 0..24 {
            for col in 0..80 {
                assert_eq!(h.grid.cell(row, col).ch, ' ');
            }
        }
    }

    #[test]
    fn test_sgr_color_and_reset() {
        let mut h = harness();
        h.feed(b"\x1b[31mX\x1b[0mY");
        let x = h.grid.cell(0, 0);
        assert_eq!(x.ch, 'X');
        assert_eq!(x.fg, 0xCD0000);
        let y = h.grid.cell(0, 1);
        assert_eq!(y.ch, 'Y');
        assert_eq!(y.fg, 0xFFFFFF);
    }

    #[test]
    fn test_sgr_reset_is_idempotent() {
        let mut h = harness();
        h.feed(b"\x1b[1;33;44m");
        h.feed(b"\x1b[0m\x1b[0m");
        assert_eq!(h.grid.fg, DEFAULT_FG);
        assert_eq!(h.grid.bg, DEFAULT_BG);
        assert!(!h.grid.bold);
    }

    #[test]
    fn test_sgr_bold_bright_and_defaults() {
        let mut h = harness();
        h.feed(b"\x1b[1;91m");
        assert!(h.grid.bold);
        assert_eq!(h.grid.fg, palette_color(9));
        h.feed(b"\x1b[22;39;104m");
        assert!(!h.grid.bold);
        assert_eq!(h.grid.fg, DEFAULT_FG);
        assert_eq!(h.grid.bg, palette_color(12));
    }

    #[test]
    fn test_sgr_extended_colors() {
        let mut h = harness();
        h.feed(b"\x1b[38;5;196m");
        assert_eq!(h.grid.fg, palette_color(196));
        h.feed(b"\x1b[48;2;1;2;3m");
        assert_eq!(h.grid.bg, 0x010203);
        // Trailing simple parameter after an extended one still applies
        h.feed(b"\x1b[38;5;21;1m");
        assert_eq!(h.grid.fg, palette_color(21));
        assert!(h.grid.bold);
    }

    #[test]
    fn test_cursor_position_clamped() {
        let mut h = harness();
        h.feed(b"\x1b[10;20H");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (19, 9));
        h.feed(b"\x1b[999;999H");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (79, 23));
        h.feed(b"\x1b[H\x1b[H");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (0, 0));
    }

    #[test]
    fn test_leading_semicolon_defaults_first_param() {
        let mut h = harness();
        h.feed(b"\x1b[;5H");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (4, 0));
    }

    #[test]
    fn test_relative_movement() {
        let mut h = harness();
        h.feed(b"\x1b[5;5H\x1b[2A\x1b[3C");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (7, 2));
        h.feed(b"\x1b[B\x1b[D");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (6, 3));
        h.feed(b"\x1b[7G\x1b[2d");
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (6, 1));
    }

    #[test]
    fn test_split_sequence_matches_whole() {
        let seq = b"\x1b[3;7H\x1b[31mhello\x1b[0m";
        let mut whole = harness();
        whole.feed(seq);

        for split in 1..seq.len() {
            let mut h = harness();
            h.feed(&seq[..split]);
            h.feed(&seq[split..]);
            assert_eq!(
                (h.grid.cursor_x, h.grid.cursor_y),
                (whole.grid.cursor_x, whole.grid.cursor_y),
                "split at {}",
                split
            );
            for col in 0..80 {
                assert_eq!(h.grid.cell(2, col), whole.grid.cell(2, col), "split at {}", split);
            }
        }
    }

    #[test]
    fn test_device_status_report() {
        let mut h = harness();
        h.feed(b"\x1b[5n");
        assert_eq!(h.responses, b"\x1b[0n");
        h.responses.clear();

        // Cursor at (x=3, y=5) zero-based reports 1-based row;col
        h.feed(b"\x1b[6;4H\x1b[6n");
        assert_eq!(h.responses, b"\x1b[6;4R");
    }

    #[test]
    fn test_device_attributes() {
        let mut h = harness();
        h.feed(b"\x1b[c");
        assert_eq!(h.responses, b"\x1b[?1;2c");
    }

    #[test]
    fn test_cursor_visibility_modes() {
        let mut h = harness();
        assert!(h.grid.cursor_visible);
        h.feed(b"\x1b[?25l");
        assert!(!h.grid.cursor_visible);
        h.feed(b"\x1b[?25h");
        assert!(h.grid.cursor_visible);
        // Alternate-screen and unknown private modes are absorbed
        h.feed(b"\x1b[?1049h\x1b[?2004h");
        assert!(h.grid.cursor_visible);
        // Non-private h/l does not touch visibility
        h.feed(b"\x1b[25l");
        assert!(h.grid.cursor_visible);
    }

    #[test]
    fn test_scroll_region_and_newline() {
        let mut h = Harness::new(10, 6);
        for row in 0..6u8 {
            h.feed(format!("\x1b[{};1H{}", row + 1, row).as_bytes());
        }
        h.feed(b"\x1b[2;4r");
        h.feed(b"\x1b[4;1H\n");
        assert_eq!(h.grid.cursor_y, 3);
        assert_eq!(h.grid.cell(0, 0).ch, '0');
        assert_eq!(h.grid.cell(1, 0).ch, '2');
        assert_eq!(h.grid.cell(2, 0).ch, '3');
        assert_eq!(h.grid.cell(3, 0).ch, ' ');
        assert_eq!(h.grid.cell(4, 0).ch, '4');
    }

    #[test]
    fn test_utf8_multibyte_single_cell() {
        let mut h = harness();
        h.feed(&[0xF0, 0x9F, 0x98, 0x80]); // U+1F600
        assert_eq!(h.grid.cell(0, 0).ch, '\u{1F600}');
        assert_eq!((h.grid.cursor_x, h.grid.cursor_y), (1, 0));
    }

    #[test]
    fn test_utf8_two_and_three_byte() {
        let mut h = harness();
        h.feed("é日".as_bytes());
        assert_eq!(h.grid.cell(0, 0).ch, 'é');
        assert_eq!(h.grid.cell(0, 1).ch, '日');
        assert_eq!(h.grid.cursor_x, 2);
    }

    #[test]
    fn test_utf8_stray_continuation_replaced() {
        let mut h = harness();
        h.feed(&[0x80, b'a']);
        assert_eq!(h.grid.cell(0, 0).ch, '\u{FFFD}');
        assert_eq!(h.grid.cell(0, 1).ch, 'a');
    }

    #[test]
    fn test_utf8_broken_sequence_replaced() {
        let mut h = harness();
        // 2-byte lead followed by ASCII: replacement, then the ASCII byte
        h.feed(&[0xC3, b'A']);
        assert_eq!(h.grid.cell(0, 0).ch, '\u{FFFD}');
        assert_eq!(h.grid.cell(0, 1).ch, 'A');
    }

    #[test]
    fn test_control_byte_resets_utf8_accumulator() {
        let mut h = harness();
        h.feed(&[0xE3, 0x81, b'\n', 0xE3, 0x81, 0x82]); // interrupted, then あ
        assert_eq!(h.grid.cell(1, 0).ch, 'あ');
    }

    #[test]
    fn test_codepoint_count_matches_cells_written() {
        let mut h = harness();
        let text = "abcé日本\u{1F600}xyz";
        h.feed(text.as_bytes());
        assert_eq!(h.grid.cursor_x, text.chars().count());
    }

    #[test]
    fn test_osc_body_discarded() {
        let mut h = harness();
        h.feed(b"\x1b]0;window title\x07after");
        let line: String = (0..5).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "after");
    }

    #[test]
    fn test_osc_st_terminator() {
        let mut h = harness();
        h.feed(b"\x1b]0;title\x1b\\ok");
        let line: String = (0..2).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "ok");
    }

    #[test]
    fn test_charset_designator_discarded() {
        let mut h = harness();
        h.feed(b"\x1b(Bhi");
        assert_eq!(h.grid.cell(0, 0).ch, 'h');
        assert_eq!(h.grid.cell(0, 1).ch, 'i');
    }

    #[test]
    fn test_unknown_escape_and_csi_absorbed() {
        let mut h = harness();
        h.feed(b"\x1b=\x1b[99z\x1b[?12;25hok");
        assert_eq!(h.grid.cell(0, 0).ch, 'o');
        assert_eq!(h.grid.cell(0, 1).ch, 'k');
        assert_eq!(h.grid.cursor_x, 2);
    }

    #[test]
    fn test_param_overflow_absorbed() {
        let mut h = harness();
        // 20 parameters, final aborted into the 16-slot array without panic
        h.feed(b"\x1b[1;2;3;4;5;6;7;8;9;10;11;12;13;14;15;16;17;18;19;20mok");
        assert_eq!(h.grid.cell(0, 0).ch, 'o');
    }

    #[test]
    fn test_insert_delete_erase_chars_dispatch() {
        let mut h = Harness::new(8, 2);
        h.feed(b"abcdefgh\x1b[1;3H\x1b[2@");
        let line: String = (0..8).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "ab  cdef");
        h.feed(b"\x1b[2P");
        let line: String = (0..8).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "abcdef  ");
        h.feed(b"\x1b[1;1H\x1b[2X");
        let line: String = (0..8).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "  cdef  ");
    }

    #[test]
    fn test_erase_line_modes() {
        let mut h = Harness::new(8, 2);
        h.feed(b"abcdefgh\x1b[1;4H\x1b[1K");
        let line: String = (0..8).map(|c| h.grid.cell(0, c).ch).collect();
        assert_eq!(line, "    efgh");
        h.feed(b"\x1b[K");
        assert!((0..8).all(|c| h.grid.cell(0, c).ch == ' '));
        // mode 2 wipes the whole row regardless of cursor
        let mut h = Harness::new(8, 2);
        h.feed(b"abcdefgh\x1b[1;4H\x1b[2K");
        assert!((0..8).all(|c| h.grid.cell(0, c).ch == ' '));
    }

    #[test]
    fn test_erased_cells_carry_current_pen() {
        let mut h = harness();
        h.feed(b"\x1b[41mtext\x1b[2J");
        let cell: &Cell = h.grid.cell(10, 10);
        assert_eq!(cell.ch, ' ');
        assert_eq!(cell.bg, palette_color(1));
    }

    #[test]
    fn test_scroll_up_down_dispatch() {
        let mut h = Harness::new(10, 4);
        h.feed(b"top");
        h.feed(b"\x1b[2S");
        assert_eq!(h.grid.cell(0, 0).ch, ' ');
        h.feed(b"\x1b[1;1Hx\x1b[T");
        assert_eq!(h.grid.cell(1, 0).ch, 'x');
        assert_eq!(h.grid.cell(0, 0).ch, ' ');
    }
}
