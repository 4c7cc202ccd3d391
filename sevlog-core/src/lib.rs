//! # sevlog-core
//! Core severity-leveled logging engine: mask gating, record
//! decoration (color, timestamp, caller, thread), multi-line
//! tokenization, and dispatch to the terminal and the system log
//! facility.
//!
//! Most applications want the `sevlog` facade instead; this crate is
//! the engine it drives.
//!
//! ```rust
//! use sevlog_core::{InitOptions, SeverityLogger, SeverityMask, sev_inf};
//!
//! let logger = SeverityLogger::new();
//! logger
//!     .init(InitOptions {
//!         mask: SeverityMask::ALL,
//!         timestamp: true,
//!         ..Default::default()
//!     })
//!     .expect("buffer allocation failed");
//! sev_inf!(logger, "hello {}", "world").unwrap();
//! ```

mod buffer;
mod caller;
mod config;
mod decor;
mod engine;
mod error;
mod lifecycle;
mod severity;
mod sink;
mod syslog;
mod tokenize;

pub use buffer::{BufferStrategy, RecordBuffer, SharedBuffer, ThreadLocalBuffer};
pub use caller::{BacktraceResolver, CallerResolver, FixedResolver, normalize_caller};
pub use config::{InitOptions, SEVLOG_CONFIG, SevLogConfig};
pub use engine::SeverityLogger;
pub use error::{Error, Result};
pub use lifecycle::{LoggerGuard, install_signal_handler};
pub use severity::{Severity, SeverityMask};
pub use syslog::Priority as SyslogPriority;

/// Logs an error-level record on the given engine.
#[macro_export]
macro_rules! sev_err {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Severity::Error, format_args!($($arg)*))
    };
}

/// Logs an info-level record on the given engine.
#[macro_export]
macro_rules! sev_inf {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Severity::Info, format_args!($($arg)*))
    };
}

/// Logs a warning-level record on the given engine.
#[macro_export]
macro_rules! sev_wng {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Severity::Warning, format_args!($($arg)*))
    };
}

/// Logs a debug-level record on the given engine.
#[macro_export]
macro_rules! sev_dbg {
    ($logger:expr, $($arg:tt)*) => {
        $logger.log($crate::Severity::Debug, format_args!($($arg)*))
    };
}
