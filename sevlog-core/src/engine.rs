use std::fmt::{self, Write as _};
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use parking_lot::Mutex;

use crate::buffer::{BufferStrategy, SharedBuffer};
use crate::caller::{BacktraceResolver, CallerResolver, normalize_caller};
use crate::config::InitOptions;
use crate::decor::Decoration;
use crate::error::{Error, Result};
use crate::severity::{Severity, SeverityMask};
use crate::sink::{self, SyslogSink, TerminalSink};
use crate::syslog;

const STATE_UNINITIALIZED: u8 = 0;
const STATE_INITIALIZED: u8 = 1;
const STATE_FREED: u8 = 2;

const MSG_INIT: &str = "severity logger has been properly initialized.";
const MSG_CLEANUP: &str = "freeing severity logger resources.";

/// Severity-leveled, decorated logging engine.
///
/// Each instance owns its whole configuration, so independent engines
/// can coexist and tests stay deterministic. The buffer ownership
/// model is a type parameter: [`SharedBuffer`] (default) serializes
/// callers through one locked buffer, [`ThreadLocalBuffer`] gives each
/// thread its own.
///
/// [`ThreadLocalBuffer`]: crate::buffer::ThreadLocalBuffer
pub struct SeverityLogger<S: BufferStrategy = SharedBuffer> {
    state: AtomicU8,
    mask: AtomicU8,
    timestamp: AtomicBool,
    caller: AtomicBool,
    thread_id: AtomicBool,
    syslog: AtomicBool,
    syslog_decorated: AtomicBool,
    strip_leading_digits: AtomicBool,
    buffer: S,
    resolver: Box<dyn CallerResolver>,
    terminal: Mutex<TerminalSink>,
    syslog_sink: Mutex<SyslogSink>,
}

impl SeverityLogger<SharedBuffer> {
    pub fn new() -> Self {
        Self::with_strategy(SharedBuffer::new())
    }
}

impl Default for SeverityLogger<SharedBuffer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: BufferStrategy> SeverityLogger<S> {
    pub fn with_strategy(buffer: S) -> Self {
        Self {
            state: AtomicU8::new(STATE_UNINITIALIZED),
            mask: AtomicU8::new(SeverityMask::default().bits()),
            timestamp: AtomicBool::new(false),
            caller: AtomicBool::new(false),
            thread_id: AtomicBool::new(false),
            syslog: AtomicBool::new(false),
            syslog_decorated: AtomicBool::new(true),
            strip_leading_digits: AtomicBool::new(true),
            buffer,
            resolver: Box::new(BacktraceResolver),
            terminal: Mutex::new(TerminalSink::stdout()),
            syslog_sink: Mutex::new(SyslogSink::system()),
        }
    }

    /// Replaces the caller identity provider.
    pub fn with_resolver(mut self, resolver: Box<dyn CallerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Redirects the terminal sink, e.g. into a capture buffer.
    pub fn with_terminal_writer(self, writer: Box<dyn Write + Send>) -> Self {
        *self.terminal.lock() = TerminalSink::from_writer(writer);
        self
    }

    /// Redirects syslog submissions, e.g. into a capture buffer. The
    /// default is the syslog(3) call path.
    pub fn with_syslog_submitter(
        self,
        submit: Box<dyn FnMut(syslog::Priority, &str) + Send>,
    ) -> Self {
        *self.syslog_sink.lock() = SyslogSink::from_submitter(submit);
        self
    }

    /// Configures everything at once and transitions the engine to
    /// initialized. The buffer allocation is the only fallible step.
    ///
    /// A debug-level self-log line confirms success (visible only when
    /// the new mask enables debug records).
    pub fn init(&self, opts: InitOptions) -> Result<()> {
        if self.state.load(Ordering::Acquire) == STATE_FREED {
            return Err(Error::Uninitialized);
        }
        self.set_buffer_size(opts.buffer_size)?;
        self.set_mask(opts.mask);
        self.set_print_timestamp(opts.timestamp);
        self.set_print_caller(opts.caller);
        self.set_print_thread_id(opts.thread_id);
        self.set_syslog(opts.syslog);
        self.state.store(STATE_INITIALIZED, Ordering::Release);
        let _ = self.log(Severity::Debug, format_args!("{MSG_INIT}"));
        Ok(())
    }

    /// Bit-packed variant of [`init`](Self::init); see
    /// [`InitOptions::from_packed`] for the layout.
    pub fn init_packed(&self, buffer_size: usize, packed: u8) -> Result<()> {
        self.init(InitOptions::from_packed(buffer_size, packed))
    }

    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_INITIALIZED
    }

    pub fn mask(&self) -> SeverityMask {
        SeverityMask::from_bits(self.mask.load(Ordering::Relaxed))
    }

    /// Stores the new mask unconditionally; takes effect on the next
    /// call.
    pub fn set_mask(&self, mask: SeverityMask) {
        self.mask.store(mask.bits(), Ordering::Relaxed);
    }

    /// Reallocates the record buffer; `0` selects the default size.
    /// Allocation failure is the engine's only fatal condition.
    pub fn set_buffer_size(&self, payload_size: usize) -> Result<()> {
        self.buffer.set_payload_size(payload_size)
    }

    pub fn set_print_timestamp(&self, enabled: bool) {
        self.timestamp.store(enabled, Ordering::Relaxed);
    }

    pub fn set_print_caller(&self, enabled: bool) {
        self.caller.store(enabled, Ordering::Relaxed);
    }

    pub fn set_print_thread_id(&self, enabled: bool) {
        self.thread_id.store(enabled, Ordering::Relaxed);
    }

    /// Enables or disables syslog forwarding, opening or closing the
    /// connection accordingly.
    pub fn set_syslog(&self, enabled: bool) {
        if enabled {
            syslog::open();
        } else {
            syslog::close();
        }
        self.syslog.store(enabled, Ordering::Relaxed);
    }

    /// Chooses whether syslog submissions carry the level/caller/thread
    /// prefix (on by default) or the bare payload.
    pub fn set_syslog_decoration(&self, enabled: bool) {
        self.syslog_decorated.store(enabled, Ordering::Relaxed);
    }

    /// Chooses whether leading decimal digits are stripped from
    /// resolved caller names (on by default).
    pub fn set_strip_leading_digits(&self, enabled: bool) {
        self.strip_leading_digits.store(enabled, Ordering::Relaxed);
    }

    /// Composes, renders, tokenizes and dispatches one record.
    ///
    /// Returns the number of payload bytes written after truncation,
    /// or the gating error: [`Error::Uninitialized`] before
    /// [`init`](Self::init), [`Error::Filtered`] when the mask drops
    /// the level.
    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) -> Result<usize> {
        if self.state.load(Ordering::Acquire) != STATE_INITIALIZED {
            return Err(Error::Uninitialized);
        }
        self.emit(severity, args)
    }

    /// Gated render-and-dispatch path, shared by [`log`](Self::log)
    /// and the teardown self-log (which runs after the state has
    /// already left `Initialized`).
    fn emit(&self, severity: Severity, args: fmt::Arguments<'_>) -> Result<usize> {
        if !self.mask().allows(severity) {
            return Err(Error::Filtered);
        }

        let decoration = self.compose(severity);
        let syslog_enabled = self.syslog.load(Ordering::Relaxed);
        let syslog_decorated = self.syslog_decorated.load(Ordering::Relaxed);

        self.buffer.with_buffer(|buf| {
            let rendered = buf.write_fmt(args);
            let written = buf.written().len();
            if rendered.is_err() {
                buf.clear();
                return Err(Error::Format(fmt::Error));
            }

            crate::tokenize::tokenize_crlf(buf.written_mut());
            {
                let mut syslog_sink = self.syslog_sink.lock();
                let mut terminal = self.terminal.lock();
                sink::dispatch(
                    buf.written(),
                    &decoration,
                    severity,
                    syslog_enabled,
                    syslog_decorated,
                    &mut syslog_sink,
                    &mut terminal,
                );
            }
            buf.clear();
            Ok(written)
        })?
    }

    fn compose(&self, severity: Severity) -> Decoration {
        let caller = if self.caller.load(Ordering::Relaxed) {
            let strip = self.strip_leading_digits.load(Ordering::Relaxed);
            self.resolver
                .resolve()
                .and_then(|raw| normalize_caller(&raw, strip))
        } else {
            None
        };
        Decoration::new(
            severity,
            self.timestamp.load(Ordering::Relaxed),
            caller,
            self.thread_id.load(Ordering::Relaxed),
        )
    }

    /// Releases the engine's resources exactly once.
    ///
    /// The very first action is the atomic transition into the freed
    /// state, so a second invocation — a duplicate signal, or a signal
    /// racing normal exit — returns immediately. The winner logs a
    /// debug teardown line, closes syslog if it was opened, and drops
    /// the buffer.
    pub fn cleanup(&self) {
        let previous = self.state.swap(STATE_FREED, Ordering::AcqRel);
        if previous == STATE_FREED {
            return;
        }
        if previous == STATE_INITIALIZED {
            let _ = self.emit(Severity::Debug, format_args!("{MSG_CLEANUP}"));
            if self.syslog.load(Ordering::Relaxed) {
                syslog::close();
            }
        }
        self.buffer.release();
    }
}

impl<S: BufferStrategy> Drop for SeverityLogger<S> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
