use std::io::{self, Write};

use colored::Colorize;

use crate::decor::Decoration;
use crate::severity::Severity;
use crate::syslog;
use crate::tokenize;

/// Terminal output destination.
///
/// Defaults to stdout; tests and embedders may inject any writer. Each
/// record is flushed immediately so nothing is lost on abrupt
/// termination. Write failures are swallowed: the terminal is a
/// best-effort sink, never a reason to fail the log call.
pub struct TerminalSink {
    out: Box<dyn Write + Send>,
}

impl TerminalSink {
    pub fn stdout() -> Self {
        Self::from_writer(Box::new(io::stdout()))
    }

    pub fn from_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    fn write_line(&mut self, prefix: &str, token: &str, color: colored::Color) {
        let line = format!("{prefix}{token}");
        let line = line.as_str().color(color);
        let _ = write!(self.out, "{line}\r\n");
        let _ = self.out.flush();
    }
}

/// System log destination.
///
/// Defaults to the syslog(3) call path; tests and embedders may inject
/// any submitter, same as [`TerminalSink::from_writer`].
pub struct SyslogSink {
    submit: Box<dyn FnMut(syslog::Priority, &str) + Send>,
}

impl SyslogSink {
    pub fn system() -> Self {
        Self::from_submitter(Box::new(syslog::message))
    }

    pub fn from_submitter(submit: Box<dyn FnMut(syslog::Priority, &str) + Send>) -> Self {
        Self { submit }
    }

    fn send(&mut self, priority: syslog::Priority, text: &str) {
        (self.submit)(priority, text);
    }
}

/// Fans one tokenized record out to the enabled sinks.
///
/// Syslog first (one submission per non-empty token, decoration-
/// prefixed when `syslog_decorated` is set), then the terminal
/// (always, fully decorated and colored).
pub fn dispatch(
    written: &[u8],
    decoration: &Decoration,
    severity: Severity,
    syslog_enabled: bool,
    syslog_decorated: bool,
    syslog_sink: &mut SyslogSink,
    terminal: &mut TerminalSink,
) {
    if syslog_enabled {
        let priority = syslog::priority_for(severity);
        let prefix = decoration.syslog_prefix();
        for token in tokenize::tokens(written) {
            if syslog_decorated {
                syslog_sink.send(priority, &format!("{prefix}{token}"));
            } else {
                syslog_sink.send(priority, token);
            }
        }
    }

    let prefix = decoration.terminal_prefix();
    for token in tokenize::tokens(written) {
        terminal.write_line(&prefix, token, decoration.color);
    }
}

/// Writer handle that stays readable after being boxed away.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedWriter {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Submitter that records every syslog submission it receives.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct RecordingSubmitter(
    std::sync::Arc<std::sync::Mutex<Vec<(syslog::Priority, String)>>>,
);

#[cfg(test)]
impl RecordingSubmitter {
    pub(crate) fn submitter(&self) -> Box<dyn FnMut(syslog::Priority, &str) + Send> {
        let entries = std::sync::Arc::clone(&self.0);
        Box::new(move |priority, text| {
            entries.lock().unwrap().push((priority, text.to_owned()));
        })
    }

    pub(crate) fn sink(&self) -> SyslogSink {
        SyslogSink::from_submitter(self.submitter())
    }

    pub(crate) fn entries(&self) -> Vec<(syslog::Priority, String)> {
        self.0.lock().unwrap().clone()
    }
}
