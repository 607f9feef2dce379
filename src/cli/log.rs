//! Leveled stderr logging for the CLI.
//!
//! The display level is a crate-level atomic driven by `-q`/`-v`:
//! 0 = silent, 1 = errors only, 2 = normal (default), 3 = verbose,
//! 4 = debug. Colour follows the usual environment conventions
//! (`NO_COLOR`, `CLICOLOR_FORCE`, `CLICOLOR`) and falls back to terminal
//! detection on stderr; `--color`/`--no-color` override both.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Current display level; see the module docs for the ladder.
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

static COLOR_ENABLED: AtomicBool = AtomicBool::new(false);

/// Returns the current display level.
#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Sets the display level, clamped to the 0–4 ladder.
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level.min(4), Ordering::Relaxed);
}

/// One `-v` step.
pub fn increase_verbosity() {
    let level = display_level();
    if level < 4 {
        set_display_level(level + 1);
    }
}

/// One `-q` step.
pub fn decrease_verbosity() {
    let level = display_level();
    if level > 0 {
        set_display_level(level - 1);
    }
}

/// Detects the initial colour state from the environment and stderr.
pub fn setup_color() {
    let enabled = if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        false
    } else if std::env::var_os("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty()) {
        true
    } else if std::env::var("CLICOLOR").is_ok_and(|v| v.starts_with('0')) {
        false
    } else {
        std::io::stderr().is_terminal()
    };
    set_color(enabled);
}

/// Forces colour on or off (`--color` / `--no-color`).
pub fn set_color(enabled: bool) {
    COLOR_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns the `error:` prefix, coloured when enabled.
pub fn error_prefix() -> &'static str {
    if COLOR_ENABLED.load(Ordering::Relaxed) {
        "\x1b[1;31merror:\x1b[0m"
    } else {
        "error:"
    }
}

/// Error message to stderr; silenced only at level 0.
macro_rules! log_error {
    ($($arg:tt)*) => {
        if $crate::cli::log::display_level() >= 1 {
            eprintln!("{} {}", $crate::cli::log::error_prefix(), format_args!($($arg)*));
        }
    };
}

/// Status output at the normal level and above.
macro_rules! log_info {
    ($($arg:tt)*) => {
        if $crate::cli::log::display_level() >= 2 {
            eprintln!($($arg)*);
        }
    };
}

/// Per-file progress at the verbose level and above.
macro_rules! log_verbose {
    ($($arg:tt)*) => {
        if $crate::cli::log::display_level() >= 3 {
            eprintln!($($arg)*);
        }
    };
}

/// Diagnostics at the debug level.
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::cli::log::display_level() >= 4 {
            eprintln!($($arg)*);
        }
    };
}

pub(crate) use {log_debug, log_error, log_info, log_verbose};
