//! PTY (pseudo-terminal) management
//!
//! Creates the PTY pair with forkpty and spawns the user's shell in the
//! child process. The slave keeps kernel-default line discipline (canonical
//! mode, echo); applications switch to raw mode themselves as needed.

#![allow(dead_code)]

use std::ffi::CString;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};

use anyhow::{anyhow, Result};
use log::debug;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::pty::{forkpty, ForkptyResult, Winsize};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execvp, ForkResult, Pid};

/// Outcome of one non-blocking read from the master side.
///
/// End-of-file is its own case rather than a zero count: the event loop
/// treats it as a shutdown trigger, independent of the quit hotkey and of
/// SIGCHLD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtyRead {
    /// Bytes were copied into the buffer
    Data(usize),
    /// No output pending right now
    WouldBlock,
    /// The slave side is gone; the session is over
    Eof,
}

/// The shell end of the emulator: master fd plus the child's pid.
pub struct Pty {
    master: OwnedFd,
    child_pid: Pid,
}

impl Pty {
    /// Allocate a PTY sized to `cols` x `rows` and exec the shell on the
    /// slave side. An empty `shell` falls back to `$SHELL`, then /bin/sh.
    /// `term_env` becomes the child's TERM.
    pub fn spawn(cols: u16, rows: u16, term_env: &str, shell: &str) -> Result<Self> {
        let winsize = Winsize {
            ws_row: rows,
            ws_col: cols,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        let ForkptyResult {
            master,
            fork_result,
        } = unsafe { forkpty(Some(&winsize), None)? };

        match fork_result {
            ForkResult::Child => {
                std::env::set_var("TERM", term_env);

                let shell = if shell.is_empty() {
                    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
                } else {
                    shell.to_string()
                };
                let prog = CString::new(shell.as_str()).expect("shell path contains NUL");
                match execvp(&prog, &[&prog]) {
                    Ok(never) => match never {},
                    Err(e) => panic!("exec {} failed: {}", shell, e),
                }
            }
            ForkResult::Parent { child } => {
                // The event loop must never stall on the shell: reads from
                // the master have to fail fast when nothing is pending.
                let fd = master.as_raw_fd();
                let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL)?);
                fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))?;

                debug!("Shell child {} on PTY master fd {}", child, fd);
                Ok(Self {
                    master,
                    child_pid: child,
                })
            }
        }
    }

    /// One non-blocking read of shell output.
    ///
    /// A zero-length read means the slave side closed. On Linux a vanished
    /// slave can also surface as EIO; both are reported as [`PtyRead::Eof`]
    /// so the caller shuts down the same way for either.
    pub fn read(&self, buf: &mut [u8]) -> Result<PtyRead> {
        match nix::unistd::read(self.master.as_raw_fd(), buf) {
            Ok(0) => Ok(PtyRead::Eof),
            Ok(n) => Ok(PtyRead::Data(n)),
            Err(Errno::EAGAIN) => Ok(PtyRead::WouldBlock),
            Err(Errno::EIO) => Ok(PtyRead::Eof),
            Err(e) => Err(anyhow!("reading shell output failed: {}", e)),
        }
    }

    /// Send input bytes to the shell.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        nix::unistd::write(&self.master, data)
            .map_err(|e| anyhow!("writing shell input failed: {}", e))
    }

    /// Master fd for the event-loop multiplexer
    pub fn master(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }

    /// Whether the shell child is still running.
    pub fn is_alive(&self) -> bool {
        matches!(
            waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)),
            Ok(WaitStatus::StillAlive)
        )
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Hang up on the shell, then collect it so no zombie outlives us
        let _ = kill(self.child_pid, Signal::SIGHUP);
        let _ = waitpid(self.child_pid, None);
    }
}
