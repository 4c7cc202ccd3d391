//! Ties engine teardown to process exit and termination signals.
//!
//! Signals are not handled inside a signal context: a dedicated
//! watcher thread blocks on the delivered-signal iterator, logs a
//! warning naming the signal, runs the engine's one-shot cleanup and
//! then re-raises the default disposition. Normal exit goes through
//! [`LoggerGuard`], whose drop runs the same cleanup; the engine's
//! atomic state keeps the two paths from double-freeing.

use std::io;
use std::sync::Arc;
#[cfg(unix)]
use std::sync::atomic::{AtomicBool, Ordering};

use crate::buffer::BufferStrategy;
use crate::engine::SeverityLogger;
#[cfg(unix)]
use crate::severity::Severity;

/// Signals are process-wide, so at most one watcher thread may exist.
#[cfg(unix)]
static WATCHER_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Keeps the engine alive and cleans it up when dropped.
#[must_use = "LoggerGuard must be kept alive; dropping it shuts the logger down"]
pub struct LoggerGuard<S: BufferStrategy + 'static = crate::buffer::SharedBuffer> {
    logger: Arc<SeverityLogger<S>>,
}

impl<S: BufferStrategy + 'static> LoggerGuard<S> {
    pub fn new(logger: Arc<SeverityLogger<S>>) -> Self {
        Self { logger }
    }
}

impl<S: BufferStrategy + 'static> Drop for LoggerGuard<S> {
    fn drop(&mut self) {
        self.logger.cleanup();
    }
}

/// Spawns the watcher thread for interrupt, terminate, hangup and quit.
///
/// The first successful install wins; later calls are no-ops, so a
/// signal never produces duplicate warning lines.
#[cfg(unix)]
pub fn install_signal_handler<S: BufferStrategy + 'static>(
    logger: &Arc<SeverityLogger<S>>,
) -> io::Result<()> {
    if WATCHER_INSTALLED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }
    let spawned = spawn_watcher(logger);
    if spawned.is_err() {
        // Leave the slot open for a retry.
        WATCHER_INSTALLED.store(false, Ordering::Release);
    }
    spawned
}

#[cfg(unix)]
fn spawn_watcher<S: BufferStrategy + 'static>(
    logger: &Arc<SeverityLogger<S>>,
) -> io::Result<()> {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGQUIT])?;
    let logger = Arc::clone(logger);
    std::thread::Builder::new()
        .name("sevlog-signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                let _ = logger.log(
                    Severity::Warning,
                    format_args!("Received <{}> signal.", signal_name(signal)),
                );
                logger.cleanup();
                let _ = signal_hook::low_level::emulate_default_handler(signal);
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub fn install_signal_handler<S: BufferStrategy + 'static>(
    _logger: &Arc<SeverityLogger<S>>,
) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn signal_name(signal: i32) -> &'static str {
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        SIGHUP => "SIGHUP",
        SIGQUIT => "SIGQUIT",
        _ => "UNKNOWN",
    }
}
