// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! Logging setup shared by the repotree crates.
//!
//! Usage:
//! - Set REPOTREE_LOG=off (default) - no logs
//! - Set REPOTREE_LOG=info - tree mutations and loaded sources
//! - Set REPOTREE_LOG=debug - fetches, path recomputation, finalization

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable holding the log level.
pub const LOG_ENV: &str = "REPOTREE_LOG";

static INIT: Once = Once::new();

/// Log levels accepted by [`init_with_level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a level name. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    fn emit_level(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

/// Initialize diagnostics based on the REPOTREE_LOG environment variable.
///
/// Safe to call multiple times; only the first call has an effect.
pub fn init_diagnostics() {
    let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
    let level = match LogLevel::parse(&raw) {
        Some(level) => level,
        None => {
            // Bootstrap warning, the emitter is not set up yet
            eprintln!("Warning: Unknown {LOG_ENV} value '{raw}', using 'info'");
            LogLevel::Info
        }
    };
    init_with_level(level);
}

/// Initialize diagnostics with an explicit level, ignoring the environment.
pub fn init_with_level(level: LogLevel) {
    INIT.call_once(|| {
        let Some(min) = level.emit_level() else {
            return;
        };
        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        // The runtime lives for the whole process
        std::mem::forget(rt);
    });
}

/// Log basic operations (sources loaded, nodes inserted or removed).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (fetches, finalization, path updates).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (contract violations tolerated by the caller).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log error conditions (failed fetches, unreadable sources).
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
