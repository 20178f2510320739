//! fbterm - framebuffer terminal emulator
//!
//! Paints an ANSI/VT terminal straight into /dev/fb0 and drives an
//! interactive shell through a PTY. Runs on a bare Linux text console;
//! no windowing system involved.

mod config;
mod constants;
mod fb;
mod font;
mod session;
mod terminal;

use std::os::fd::AsFd;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

use constants::{
    DEFAULT_FONT_SIZE, FRAME_INTERVAL_MS, MAX_FONT_SIZE, MAX_TERM_COLS, MAX_TERM_ROWS,
    MIN_FONT_SIZE, MIN_TERM_COLS, MIN_TERM_ROWS, QUIT_BYTE, READ_BUF_SIZE, SCREEN_MARGIN_PX,
};
use fb::Framebuffer;
use font::{render_grid, CellMetrics, FontTable};
use terminal::grid::DEFAULT_BG;
use terminal::pty::PtyRead;
use terminal::Terminal;

fn print_help() {
    println!("fbterm - framebuffer terminal emulator");
    println!();
    println!("Usage: fbterm <font.ttf> [font_size]");
    println!("  font.ttf   Path to the primary TrueType font");
    println!(
        "  font_size  Font size in pixels, {}-{} (default: {})",
        MIN_FONT_SIZE, MAX_FONT_SIZE, DEFAULT_FONT_SIZE
    );
    println!();
    println!("Quit with Ctrl+Q. Fallback fonts, framebuffer device, and the");
    println!("shell can be set in ~/.config/fbterm/config.toml.");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("fbterm {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(font_path) = args.get(1) else {
        print_help();
        std::process::exit(1);
    };

    let font_size = match args.get(2) {
        Some(arg) => {
            let size: f32 = arg
                .parse()
                .with_context(|| format!("Invalid font size: {}", arg))?;
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
                bail!(
                    "Font size must be between {} and {}",
                    MIN_FONT_SIZE,
                    MAX_FONT_SIZE
                );
            }
            size
        }
        None => DEFAULT_FONT_SIZE,
    };

    info!("fbterm starting...");
    let cfg = config::Config::load();

    let mut fb = Framebuffer::open(&cfg.paths.framebuffer)
        .context("Cannot open framebuffer. fbterm must run on a text console.")?;

    let fonts = FontTable::load(font_path, &cfg.font.fallbacks)?;
    let metrics = CellMetrics::from_primary(&fonts, font_size)?;

    let cols = (fb.width().saturating_sub(SCREEN_MARGIN_PX) / metrics.cell_w)
        .clamp(MIN_TERM_COLS, MAX_TERM_COLS);
    let rows = (fb.height().saturating_sub(SCREEN_MARGIN_PX) / metrics.cell_h)
        .clamp(MIN_TERM_ROWS, MAX_TERM_ROWS);
    info!(
        "Terminal size: {}x{} (cell {}x{}, screen {}x{})",
        cols,
        rows,
        metrics.cell_w,
        metrics.cell_h,
        fb.width(),
        fb.height()
    );

    session::install_sigchld_handler()?;

    let mut term =
        Terminal::new(cols, rows, &cfg.terminal.shell).context("Failed to spawn shell")?;

    let _console = session::ConsoleGuard::acquire()
        .context("Failed to take over the console (is stdin a terminal?)")?;

    fb.clear(DEFAULT_BG);

    let stdin = std::io::stdin();
    let mut input_buf = [0u8; READ_BUF_SIZE];
    let mut needs_render = true;
    let mut running = true;

    info!("Terminal loop started");
    while running && !session::child_exited() && term.is_alive() {
        // Single bounded wait: wakes on keyboard input, shell output, or
        // the frame deadline, whichever comes first.
        let (stdin_ready, master_ready) = {
            let mut fds = [
                PollFd::new(stdin.as_fd(), PollFlags::POLLIN),
                PollFd::new(term.master(), PollFlags::POLLIN),
            ];
            match poll(&mut fds, PollTimeout::from(FRAME_INTERVAL_MS)) {
                Ok(_) => (
                    fds[0].revents().is_some_and(|r| !r.is_empty()),
                    fds[1].revents().is_some_and(|r| !r.is_empty()),
                ),
                Err(Errno::EINTR) => (false, false),
                Err(e) => return Err(e).context("poll failed"),
            }
        };

        // Keyboard input: check for the quit hotkey, forward the rest
        if stdin_ready {
            match nix::unistd::read(libc::STDIN_FILENO, &mut input_buf) {
                Ok(n) if n > 0 => {
                    if input_buf[..n].contains(&QUIT_BYTE) {
                        info!("Quit hotkey received");
                        running = false;
                    } else if let Err(e) = term.write_input(&input_buf[..n]) {
                        warn!("Dropped {} input bytes: {}", n, e);
                    }
                }
                Ok(_) => {}
                Err(Errno::EAGAIN) => {}
                Err(e) => warn!("stdin read error: {}", e),
            }
        }

        // Shell output: drain until the master would block. EOF on the
        // master ends the session on its own, without waiting on SIGCHLD.
        if master_ready {
            loop {
                match term.process_pty_output() {
                    Ok(PtyRead::Data(_)) => needs_render = true,
                    Ok(PtyRead::WouldBlock) => break,
                    Ok(PtyRead::Eof) => {
                        info!("Shell closed the PTY");
                        running = false;
                        break;
                    }
                    Err(e) => {
                        warn!("PTY error: {:#}", e);
                        running = false;
                        break;
                    }
                }
            }
        }

        if needs_render {
            render_grid(&mut fb, &fonts, &metrics, &term.grid);
            needs_render = false;
        }
    }

    info!("Shutting down");
    fb.clear(DEFAULT_BG);
    Ok(())
}
