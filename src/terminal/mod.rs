//! Terminal emulation
//!
//! Core module integrating the PTY, the VT parser, and the character grid
//! to form the terminal emulator.

pub mod grid;
pub mod parser;
pub mod pty;

use anyhow::Result;
use log::warn;
use std::os::fd::BorrowedFd;

use crate::constants::READ_BUF_SIZE;

use grid::Grid;
use parser::Parser;
use pty::{Pty, PtyRead};

/// Terminal emulator: grid state, escape parser, and the shell's PTY.
pub struct Terminal {
    pub grid: Grid,
    parser: Parser,
    pty: Pty,
    /// Device-query replies pending for the shell
    responses: Vec<u8>,
}

impl Terminal {
    /// Initialize the grid and spawn the shell on a fresh PTY.
    pub fn new(cols: usize, rows: usize, shell: &str) -> Result<Self> {
        let pty = Pty::spawn(cols as u16, rows as u16, "xterm-256color", shell)?;
        Ok(Self {
            grid: Grid::new(cols, rows),
            parser: Parser::new(),
            pty,
            responses: Vec::new(),
        })
    }

    /// Feed shell output bytes to the parser in read order. Replies the
    /// parser produced for a byte are flushed to the master before the
    /// next byte is processed, preserving query/reply ordering.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.parser
                .advance(&mut self.grid, byte, &mut self.responses);
            if !self.responses.is_empty() {
                self.flush_responses();
            }
        }
    }

    fn flush_responses(&mut self) {
        match self.pty.write(&self.responses) {
            Ok(n) if n < self.responses.len() => {
                warn!(
                    "Short reply write to PTY ({} of {} bytes)",
                    n,
                    self.responses.len()
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to write reply to PTY: {}", e),
        }
        self.responses.clear();
    }

    /// Drain one read's worth of shell output into the grid.
    ///
    /// [`PtyRead::WouldBlock`] means the master is empty for this wake;
    /// [`PtyRead::Eof`] and hard errors both mean the session should end.
    pub fn process_pty_output(&mut self) -> Result<PtyRead> {
        let mut buf = [0u8; READ_BUF_SIZE];
        let outcome = self.pty.read(&mut buf)?;
        if let PtyRead::Data(n) = outcome {
            self.feed(&buf[..n]);
        }
        Ok(outcome)
    }

    /// Forward keyboard bytes verbatim to the shell
    pub fn write_input(&mut self, bytes: &[u8]) -> Result<usize> {
        self.pty.write(bytes)
    }

    /// Master fd for the event-loop multiplexer
    pub fn master(&self) -> BorrowedFd<'_> {
        self.pty.master()
    }

    /// Check if the shell process is alive
    pub fn is_alive(&self) -> bool {
        self.pty.is_alive()
    }
}
