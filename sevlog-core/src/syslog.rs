//! Call interface to the system log facility.
//!
//! Uses libc `openlog`/`syslog`/`closelog` directly rather than a
//! dedicated syslog crate; only the POSIX call surface is needed. On
//! non-unix targets every function is a no-op so the engine compiles
//! with syslog forwarding permanently inert.

use crate::severity::Severity;

#[cfg(unix)]
pub type Priority = libc::c_int;
#[cfg(not(unix))]
pub type Priority = i32;

/// Maps a record severity to its syslog priority.
#[cfg(unix)]
pub fn priority_for(severity: Severity) -> Priority {
    match severity {
        Severity::Error => libc::LOG_ERR,
        Severity::Info => libc::LOG_INFO,
        Severity::Warning => libc::LOG_WARNING,
        Severity::Debug => libc::LOG_DEBUG,
    }
}

#[cfg(not(unix))]
pub fn priority_for(severity: Severity) -> Priority {
    severity.level() as Priority
}

/// Opens the connection to the system logger with the default user
/// facility, tagging entries with the process id.
#[cfg(unix)]
pub fn open() {
    // SAFETY: a null ident makes syslog derive the tag from the
    // program name; openlog has no other preconditions.
    unsafe { libc::openlog(std::ptr::null(), libc::LOG_PID, libc::LOG_USER) }
}

#[cfg(not(unix))]
pub fn open() {}

/// Closes the connection. Safe to call when it was never opened.
#[cfg(unix)]
pub fn close() {
    // SAFETY: closelog is always safe to call.
    unsafe { libc::closelog() }
}

#[cfg(not(unix))]
pub fn close() {}

/// Submits one line to the system logger at the given priority.
#[cfg(unix)]
pub fn message(priority: Priority, text: &str) {
    // syslog(3) interprets `%` in its format argument; passing the
    // payload through "%s" avoids format-string injection.
    let c_text = match std::ffi::CString::new(text) {
        Ok(s) => s,
        Err(_) => return,
    };
    const FORMAT: &[u8] = b"%s\0";
    // SAFETY: both pointers are valid NUL-terminated C strings, and
    // syslog is safe to call concurrently once openlog has completed.
    unsafe {
        libc::syslog(
            priority,
            FORMAT.as_ptr().cast::<libc::c_char>(),
            c_text.as_ptr(),
        );
    }
}

#[cfg(not(unix))]
pub fn message(_priority: Priority, _text: &str) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn priorities_follow_the_posix_mapping() {
        assert_eq!(priority_for(Severity::Error), libc::LOG_ERR);
        assert_eq!(priority_for(Severity::Info), libc::LOG_INFO);
        assert_eq!(priority_for(Severity::Warning), libc::LOG_WARNING);
        assert_eq!(priority_for(Severity::Debug), libc::LOG_DEBUG);
    }
}
