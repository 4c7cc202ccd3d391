//! Best-effort identification of the module that invoked a log call.
//!
//! Resolution walks the live stack and maps a fixed frame back to the
//! image (executable or shared object) it belongs to. Failures of any
//! kind degrade to "no caller tag"; they never fail the log call.

/// Frames captured per lookup. Enough to step over the engine's own
/// frames and land on the real caller.
const STACK_DEPTH: usize = 4;
/// Index of the frame attributed to the caller.
const STACK_FRAME: usize = 3;

/// Provider of a raw caller identity string.
///
/// Implementations may return `None` whenever resolution is not
/// possible; the engine then simply omits the caller tag.
pub trait CallerResolver: Send + Sync {
    fn resolve(&self) -> Option<String>;
}

/// Stack-walking resolver, the engine default.
///
/// Uses `backtrace(3)` to capture frame addresses and `dladdr(3)` to
/// map the chosen frame to its image path, rather than pulling in a
/// dedicated symbolication crate.
pub struct BacktraceResolver;

#[cfg(all(unix, not(target_env = "musl")))]
impl CallerResolver for BacktraceResolver {
    fn resolve(&self) -> Option<String> {
        use std::ffi::CStr;
        use std::os::raw::c_void;

        let mut frames = [std::ptr::null_mut::<c_void>(); STACK_DEPTH];
        // SAFETY: `frames` is a valid array of STACK_DEPTH frame slots.
        let depth =
            unsafe { libc::backtrace(frames.as_mut_ptr(), STACK_DEPTH as libc::c_int) } as usize;
        if depth <= STACK_FRAME {
            return None;
        }

        let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
        // SAFETY: the address came from backtrace(3); dladdr only reads it.
        if unsafe { libc::dladdr(frames[STACK_FRAME], &mut info) } == 0 || info.dli_fname.is_null()
        {
            return None;
        }
        // SAFETY: dli_fname points to a NUL-terminated path owned by the
        // loader for the lifetime of the mapped image.
        let path = unsafe { CStr::from_ptr(info.dli_fname) };
        Some(path.to_string_lossy().into_owned())
    }
}

#[cfg(not(all(unix, not(target_env = "musl"))))]
impl CallerResolver for BacktraceResolver {
    fn resolve(&self) -> Option<String> {
        None
    }
}

/// Resolver returning a fixed name. Useful for tests and for embedders
/// that already know their module identity.
pub struct FixedResolver(pub &'static str);

impl CallerResolver for FixedResolver {
    fn resolve(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// Reduces a raw image path to the short caller name shown in the
/// decoration.
///
/// Steps, in order: truncate at the first `'('` (drops address/offset
/// suffixes), keep the base filename, cut a shared-library suffix at
/// its first occurrence (`foo.so`, `foo.so.1`), strip the `lib` prefix
/// when such a suffix was found, and optionally strip leading decimal
/// digits (used by some build systems to force link order). Returns
/// `None` when nothing is left.
pub fn normalize_caller(raw: &str, strip_leading_digits: bool) -> Option<String> {
    let stem = raw.split('(').next().unwrap_or(raw);
    let base = stem.rsplit('/').next().unwrap_or(stem);
    let mut name = base;
    if let Some(idx) = name.find(".so") {
        name = &name[..idx];
        name = name.strip_prefix("lib").unwrap_or(name);
    }
    if strip_leading_digits {
        name = name.trim_start_matches(|c: char| c.is_ascii_digit());
    }
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_address_suffix_and_directory() {
        assert_eq!(
            normalize_caller("./target/debug/myapp(main+0x1e) [0x55]", false),
            Some("myapp".to_string())
        );
    }

    #[test]
    fn strips_shared_library_decorations() {
        assert_eq!(
            normalize_caller("/usr/lib/libwidget.so", false),
            Some("widget".to_string())
        );
        assert_eq!(
            normalize_caller("/usr/lib/libwidget.so.1.2", false),
            Some("widget".to_string())
        );
    }

    #[test]
    fn lib_prefix_survives_without_so_suffix() {
        assert_eq!(
            normalize_caller("/opt/bin/libtool", false),
            Some("libtool".to_string())
        );
    }

    #[test]
    fn leading_digits_strip_is_optional() {
        assert_eq!(
            normalize_caller("/usr/lib/lib03widget.so", true),
            Some("widget".to_string())
        );
        assert_eq!(
            normalize_caller("/usr/lib/lib03widget.so", false),
            Some("03widget".to_string())
        );
    }

    #[test]
    fn empty_results_become_none() {
        assert_eq!(normalize_caller("", true), None);
        assert_eq!(normalize_caller("/usr/lib/lib42.so", true), None);
    }

    #[test]
    fn fixed_resolver_echoes_its_name() {
        assert_eq!(FixedResolver("unit").resolve().as_deref(), Some("unit"));
    }

    #[cfg(all(unix, not(target_env = "musl")))]
    #[test]
    fn backtrace_resolver_finds_the_test_binary() {
        // Depth is tuned for real call sites; from a test harness frame
        // the resolved image is still this process or the libc runtime,
        // so only assert the best-effort contract: no panic, and any
        // result normalizes to a non-empty name.
        if let Some(raw) = BacktraceResolver.resolve() {
            assert!(normalize_caller(&raw, true).is_some() || raw.is_empty());
        }
    }
}
