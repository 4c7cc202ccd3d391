use chrono::Local;
use colored::Color;

use crate::severity::Severity;

/// Per-call scratch fields making up the non-payload part of a record.
///
/// Fields are rendered once per call, then re-applied to every line
/// the payload tokenizes into, so multi-line records stay uniformly
/// decorated.
pub struct Decoration {
    pub color: Color,
    time: Option<String>,
    level: &'static str,
    caller: Option<String>,
    thread: Option<String>,
}

impl Decoration {
    pub fn new(
        severity: Severity,
        timestamp: bool,
        caller: Option<String>,
        thread_id: bool,
    ) -> Self {
        Self {
            color: severity.color(),
            time: timestamp.then(time_tag),
            level: severity.tag(),
            caller: caller.map(|name| format!("[{name}] ")),
            thread: thread_id.then(thread_tag),
        }
    }

    /// Prefix written before every terminal line:
    /// `[time] [LVL] [caller] [tid] `, fields present only when their
    /// flag was set and resolution succeeded.
    pub fn terminal_prefix(&self) -> String {
        let mut prefix = String::new();
        if let Some(time) = &self.time {
            prefix.push_str(time);
        }
        prefix.push_str(self.level);
        if let Some(caller) = &self.caller {
            prefix.push_str(caller);
        }
        if let Some(thread) = &self.thread {
            prefix.push_str(thread);
        }
        prefix
    }

    /// Prefix for syslog submissions: level, caller and thread tags,
    /// but no timestamp (the daemon stamps records itself) and no
    /// color.
    pub fn syslog_prefix(&self) -> String {
        let mut prefix = String::from(self.level);
        if let Some(caller) = &self.caller {
            prefix.push_str(caller);
        }
        if let Some(thread) = &self.thread {
            prefix.push_str(thread);
        }
        prefix
    }
}

/// Local wall-clock time and date, bracketed, in the locale-style `%c`
/// rendering.
fn time_tag() -> String {
    format!("[{}] ", Local::now().format("%c"))
}

#[cfg(unix)]
fn thread_tag() -> String {
    // SAFETY: pthread_self has no preconditions and never fails.
    let tid = unsafe { libc::pthread_self() } as usize;
    format!("[{tid:#x}] ")
}

#[cfg(not(unix))]
fn thread_tag() -> String {
    use std::hash::{DefaultHasher, Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    format!("[{:#x}] ", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_decoration_is_just_the_level_tag() {
        let deco = Decoration::new(Severity::Info, false, None, false);
        assert_eq!(deco.terminal_prefix(), "[INF] ");
        assert_eq!(deco.syslog_prefix(), "[INF] ");
    }

    #[test]
    fn field_order_is_time_level_caller_thread() {
        let deco = Decoration::new(Severity::Warning, true, Some("mymod".into()), true);
        let prefix = deco.terminal_prefix();
        let time = prefix.find('[').unwrap();
        let level = prefix.find("[WNG] ").unwrap();
        let caller = prefix.find("[mymod] ").unwrap();
        let thread = prefix.find("[0x").unwrap();
        assert!(time < level && level < caller && caller < thread);
    }

    #[test]
    fn syslog_prefix_has_no_timestamp() {
        let deco = Decoration::new(Severity::Error, true, Some("mymod".into()), false);
        assert_eq!(deco.syslog_prefix(), "[ERR] [mymod] ");
    }

    #[test]
    fn colors_are_distinct_per_level() {
        let colors = [
            Severity::Error.color(),
            Severity::Info.color(),
            Severity::Warning.color(),
            Severity::Debug.color(),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
