//! Outer-console session management
//!
//! Guards the controlling terminal the emulator itself runs on: stdin is
//! switched to raw non-blocking mode and the console cursor is hidden for
//! the session, both restored on drop. Also installs the SIGCHLD latch the
//! event loop polls to notice shell exit.

use std::io::Write;
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use log::{info, warn};
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};

static CHILD_EXITED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigchld(_signo: libc::c_int) {
    CHILD_EXITED.store(true, Ordering::Relaxed);
}

/// Latch SIGCHLD into a flag the main loop can poll.
pub fn install_sigchld_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_sigchld),
        SaFlags::empty(),
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGCHLD, &action) }.context("Failed to install SIGCHLD handler")?;
    Ok(())
}

/// True once the shell child has been reported dead.
pub fn child_exited() -> bool {
    CHILD_EXITED.load(Ordering::Relaxed)
}

/// RAII guard over the outer console.
///
/// While alive: stdin is raw and non-blocking so every keystroke arrives
/// immediately, and the console's own cursor is hidden so it cannot blink
/// through the framebuffer. Dropping the guard restores both.
pub struct ConsoleGuard {
    saved_termios: Termios,
    saved_flags: i32,
}

impl ConsoleGuard {
    pub fn acquire() -> Result<Self> {
        let stdin = std::io::stdin();
        let saved_termios = tcgetattr(&stdin).context("Failed to read stdin termios")?;

        let mut raw = saved_termios.clone();
        cfmakeraw(&mut raw);
        tcsetattr(&stdin, SetArg::TCSANOW, &raw).context("Failed to set stdin raw mode")?;

        let fd = stdin.as_raw_fd();
        let saved_flags = nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_GETFL)?;
        let mut flags = nix::fcntl::OFlag::from_bits_truncate(saved_flags);
        flags.insert(nix::fcntl::OFlag::O_NONBLOCK);
        nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_SETFL(flags))?;

        // Hide the console's own cursor while we own the screen
        print!("\x1b[?25l");
        let _ = std::io::stdout().flush();

        info!("Console session acquired (stdin raw, cursor hidden)");
        Ok(Self {
            saved_termios,
            saved_flags,
        })
    }
}

impl Drop for ConsoleGuard {
    fn drop(&mut self) {
        let stdin = std::io::stdin();
        if let Err(e) = tcsetattr(&stdin, SetArg::TCSANOW, &self.saved_termios) {
            warn!("Failed to restore stdin termios: {}", e);
        }
        let flags = nix::fcntl::OFlag::from_bits_truncate(self.saved_flags);
        if let Err(e) =
            nix::fcntl::fcntl(stdin.as_raw_fd(), nix::fcntl::FcntlArg::F_SETFL(flags))
        {
            warn!("Failed to restore stdin flags: {}", e);
        }

        print!("\x1b[?25h");
        let _ = std::io::stdout().flush();
    }
}
