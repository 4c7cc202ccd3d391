//! # sevlog
//! Severity-leveled terminal/syslog logger with caller and thread
//! attribution.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! sevlog = "0.1.0"
//! ```
//!
//! ```rust
//! use sevlog::logger_config;
//!
//! let _guard = logger_config()
//!     .with_timestamp(true)
//!     .init_global()
//!     .expect("logger init failed");
//! log::info!("Hello, world!");
//! // guard shuts the logger down when dropped
//! ```
//!
//! ## Severity mask
//! Records pass through a four-bit mask (error, info, warning, debug;
//! debug is off by default). The mask can be swapped at any time:
//!
//! ```rust
//! use sevlog::{SeverityMask, logger_config};
//!
//! let _guard = logger_config()
//!     .with_mask(SeverityMask::ERR | SeverityMask::WNG)
//!     .init_global()
//!     .expect("logger init failed");
//! log::info!("dropped by the mask");
//! log::error!("still emitted");
//! ```
//!
//! ## Syslog forwarding
//! With `with_syslog(true)` every emitted line is additionally
//! submitted to the system log facility, severity-mapped
//! (error/info/warning/debug) and undecorated by color.

use std::sync::{Arc, LazyLock, Once};

use log::{Level, LevelFilter, Log};
use sevlog_core::{InitOptions, install_signal_handler};

pub use sevlog_core::{Error, LoggerGuard, Result, Severity, SeverityLogger, SeverityMask};

/// Global engine instance shared by every `log` macro call site.
static GLOBAL_LOGGER: LazyLock<Arc<SeverityLogger>> =
    LazyLock::new(|| Arc::new(SeverityLogger::new()));

/// Adapter routing `log` records into the global engine.
struct SevLogger;

fn severity_of(level: Level) -> Severity {
    match level {
        Level::Error => Severity::Error,
        Level::Warn => Severity::Warning,
        Level::Info => Severity::Info,
        Level::Debug | Level::Trace => Severity::Debug,
    }
}

impl Log for SevLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        GLOBAL_LOGGER.is_initialized()
            && GLOBAL_LOGGER.mask().allows(severity_of(metadata.level()))
    }

    fn log(&self, record: &log::Record) {
        let _ = GLOBAL_LOGGER.log(
            severity_of(record.level()),
            format_args!("{}", record.args()),
        );
    }

    fn flush(&self) {}
}

/// Builder for configuring and initializing the global logger.
pub struct ConfigBuilder {
    buffer_size: usize,
    mask: SeverityMask,
    timestamp: bool,
    caller: bool,
    thread_id: bool,
    syslog: bool,
    strip_leading_digits: bool,
    handle_signals: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            buffer_size: 0,
            mask: SeverityMask::default(),
            timestamp: false,
            caller: false,
            thread_id: false,
            syslog: false,
            strip_leading_digits: true,
            handle_signals: true,
        }
    }
}

impl ConfigBuilder {
    /// Sets the record buffer capacity; `0` keeps the default (10000,
    /// overridable through `SEVLOG_DEFAULT_BUFFER_SIZE`).
    pub fn with_buffer_size(self, buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..self
        }
    }

    /// Sets the severity mask.
    pub fn with_mask(self, mask: SeverityMask) -> Self {
        Self { mask, ..self }
    }

    /// Prefixes every record with the local time and date.
    pub fn with_timestamp(self, yes: bool) -> Self {
        Self {
            timestamp: yes,
            ..self
        }
    }

    /// Prefixes every record with the resolved caller module name.
    pub fn with_caller_name(self, yes: bool) -> Self {
        Self { caller: yes, ..self }
    }

    /// Prefixes every record with the calling thread's id.
    pub fn with_thread_id(self, yes: bool) -> Self {
        Self {
            thread_id: yes,
            ..self
        }
    }

    /// Forwards every record to the system log facility.
    pub fn with_syslog(self, yes: bool) -> Self {
        Self { syslog: yes, ..self }
    }

    /// Keeps or strips leading decimal digits in caller names
    /// (stripped by default).
    pub fn with_leading_digit_strip(self, yes: bool) -> Self {
        Self {
            strip_leading_digits: yes,
            ..self
        }
    }

    /// Skips installing the termination-signal watcher.
    pub fn no_signal_handler(self) -> Self {
        Self {
            handle_signals: false,
            ..self
        }
    }

    /// Initializes the global logger and installs the `log` facade.
    /// Returns a guard that shuts the logger down when dropped.
    pub fn init_global(self) -> Result<LoggerGuard> {
        let logger = &*GLOBAL_LOGGER;
        logger.set_strip_leading_digits(self.strip_leading_digits);
        logger.init(InitOptions {
            buffer_size: self.buffer_size,
            mask: self.mask,
            timestamp: self.timestamp,
            caller: self.caller,
            thread_id: self.thread_id,
            syslog: self.syslog,
        })?;

        static FACADE: Once = Once::new();
        FACADE.call_once(|| {
            // Level filtering happens in the engine mask; let every
            // record through the facade.
            if log::set_boxed_logger(Box::new(SevLogger)).is_ok() {
                log::set_max_level(LevelFilter::Trace);
            }
        });

        if self.handle_signals {
            // Best-effort, like the rest of the decoration features: a
            // failed watcher spawn degrades signal cleanup, not logging.
            let _ = install_signal_handler(logger);
        }

        Ok(LoggerGuard::new(Arc::clone(logger)))
    }
}

/// Returns a default [`ConfigBuilder`] for the global logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

/// Direct access to the global engine, for callers that want the
/// numeric result of [`SeverityLogger::log`] or the runtime setters.
pub fn global() -> &'static Arc<SeverityLogger> {
    &GLOBAL_LOGGER
}
