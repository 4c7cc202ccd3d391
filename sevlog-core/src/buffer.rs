use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::ReentrantMutex;

use crate::config::SEVLOG_CONFIG;
use crate::error::{Error, Result};

/// Resolves the configured payload size, falling back to the
/// environment-derived default when the caller passed `0`.
pub(crate) fn effective_size(payload_size: usize) -> usize {
    if payload_size == 0 {
        SEVLOG_CONFIG.DEFAULT_BUFFER_SIZE
    } else {
        payload_size
    }
}

/// Reusable byte buffer holding one rendered record.
///
/// Allocated with one byte more than the payload capacity so the
/// written prefix is always zero-terminated, even at full payload.
/// Appends are bounded by the remaining capacity and silently
/// truncate; clearing zero-fills only the bytes that were written.
pub struct RecordBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl RecordBuffer {
    pub fn with_payload_size(payload_size: usize) -> Result<Self> {
        let payload_size = effective_size(payload_size);
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(payload_size + 1)?;
        bytes.resize(payload_size + 1, 0);
        Ok(Self { bytes, len: 0 })
    }

    /// Maximum payload this buffer can hold.
    pub fn payload_size(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn remaining(&self) -> usize {
        self.payload_size() - self.len
    }

    /// Replaces the allocation with a fresh zeroed one of the requested
    /// payload size. Only called between records, so no content moves.
    pub fn resize(&mut self, payload_size: usize) -> Result<()> {
        *self = Self::with_payload_size(payload_size)?;
        Ok(())
    }

    /// The written prefix, excluding the trailing terminator.
    pub fn written(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn written_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..self.len]
    }

    /// Appends at most `remaining()` bytes of `src`; returns how many
    /// were taken.
    pub fn append(&mut self, src: &[u8]) -> usize {
        let take = src.len().min(self.remaining());
        self.bytes[self.len..self.len + take].copy_from_slice(&src[..take]);
        self.len += take;
        take
    }

    /// Zero-fills the written prefix only and resets the length.
    pub fn clear(&mut self) {
        self.bytes[..self.len].fill(0);
        self.len = 0;
    }
}

impl fmt::Write for RecordBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut take = s.len().min(self.remaining());
        // Truncate on a character boundary so the buffer stays valid UTF-8.
        while take > 0 && !s.is_char_boundary(take) {
            take -= 1;
        }
        self.append(s[..take].as_bytes());
        Ok(())
    }
}

/// Ownership model for the record buffer.
///
/// Two implementations are provided: [`SharedBuffer`] serializes all
/// callers through one re-entrant lock held for the whole
/// compose-render-tokenize-dispatch-clear sequence, and
/// [`ThreadLocalBuffer`] gives every thread its own buffer with no
/// locking at all.
pub trait BufferStrategy: Send + Sync {
    /// Stores a new payload capacity; `0` selects the default. Buffers
    /// that already exist are reallocated (shared) or reallocated
    /// lazily on their owning thread's next record (thread-local).
    fn set_payload_size(&self, payload_size: usize) -> Result<()>;

    /// Runs `f` with exclusive access to a buffer of the configured
    /// size, allocating it on first use. Fails with
    /// [`Error::Uninitialized`] once the strategy has been released.
    fn with_buffer<R>(&self, f: impl FnOnce(&mut RecordBuffer) -> R) -> Result<R>;

    /// Drops the buffer allocation and marks the strategy released.
    /// Called once at engine teardown; a call that lost the race
    /// against teardown must not be able to reallocate.
    fn release(&self);
}

/// One process-wide buffer behind a re-entrant lock.
///
/// The lock is re-entrant so a teardown running on the owning thread
/// can never self-deadlock; one-time-free across threads is gated by
/// the engine's atomic state, not by this lock.
pub struct SharedBuffer {
    slot: ReentrantMutex<RefCell<Option<RecordBuffer>>>,
    payload_size: AtomicUsize,
    released: AtomicBool,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self {
            slot: ReentrantMutex::new(RefCell::new(None)),
            payload_size: AtomicUsize::new(effective_size(0)),
            released: AtomicBool::new(false),
        }
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferStrategy for SharedBuffer {
    fn set_payload_size(&self, payload_size: usize) -> Result<()> {
        let payload_size = effective_size(payload_size);
        self.payload_size.store(payload_size, Ordering::Relaxed);
        let slot = self.slot.lock();
        if let Some(buf) = slot.borrow_mut().as_mut() {
            buf.resize(payload_size)?;
        }
        Ok(())
    }

    fn with_buffer<R>(&self, f: impl FnOnce(&mut RecordBuffer) -> R) -> Result<R> {
        let slot = self.slot.lock();
        // Checked under the lock: a call that passed the engine's state
        // gate while teardown ran on another thread lands here after
        // release and must not reallocate.
        if self.released.load(Ordering::Acquire) {
            return Err(Error::Uninitialized);
        }
        let mut slot = slot.borrow_mut();
        if slot.is_none() {
            let payload_size = self.payload_size.load(Ordering::Relaxed);
            *slot = Some(RecordBuffer::with_payload_size(payload_size)?);
        }
        Ok(f(slot.as_mut().expect("buffer allocated above")))
    }

    fn release(&self) {
        let slot = self.slot.lock();
        self.released.store(true, Ordering::Release);
        *slot.borrow_mut() = None;
    }
}

thread_local! {
    static TLS_BUFFER: RefCell<Option<RecordBuffer>> = const { RefCell::new(None) };
}

/// One buffer per thread, no lock.
///
/// Buffers are allocated lazily on each thread's first record and
/// dropped with the thread. A payload-size change takes effect on the
/// owning thread's next record. Release frees the releasing thread's
/// buffer and marks the strategy so other threads stop using theirs;
/// those linger until their thread exits.
pub struct ThreadLocalBuffer {
    payload_size: AtomicUsize,
    released: AtomicBool,
}

impl ThreadLocalBuffer {
    pub fn new() -> Self {
        Self {
            payload_size: AtomicUsize::new(effective_size(0)),
            released: AtomicBool::new(false),
        }
    }
}

impl Default for ThreadLocalBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferStrategy for ThreadLocalBuffer {
    fn set_payload_size(&self, payload_size: usize) -> Result<()> {
        self.payload_size
            .store(effective_size(payload_size), Ordering::Relaxed);
        Ok(())
    }

    fn with_buffer<R>(&self, f: impl FnOnce(&mut RecordBuffer) -> R) -> Result<R> {
        if self.released.load(Ordering::Acquire) {
            return Err(Error::Uninitialized);
        }
        let payload_size = self.payload_size.load(Ordering::Relaxed);
        TLS_BUFFER.with(|cell| {
            let mut slot = cell.borrow_mut();
            match slot.as_mut() {
                Some(buf) if buf.payload_size() != payload_size => buf.resize(payload_size)?,
                Some(_) => {}
                None => *slot = Some(RecordBuffer::with_payload_size(payload_size)?),
            }
            Ok(f(slot.as_mut().expect("buffer allocated above")))
        })
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
        TLS_BUFFER.with(|cell| *cell.borrow_mut() = None);
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use super::*;

    #[test]
    fn append_is_bounded_and_zero_terminated() {
        let mut buf = RecordBuffer::with_payload_size(4).unwrap();
        assert_eq!(buf.append(b"abcdef"), 4);
        assert_eq!(buf.written(), b"abcd");
        assert_eq!(buf.remaining(), 0);
        // The terminator byte past the payload is untouched.
        assert_eq!(buf.bytes[4], 0);
    }

    #[test]
    fn write_fmt_truncates_silently() {
        let mut buf = RecordBuffer::with_payload_size(8).unwrap();
        write!(buf, "{}-{}", "hello", "world").unwrap();
        assert_eq!(buf.written(), b"hello-wo");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut buf = RecordBuffer::with_payload_size(5).unwrap();
        write!(buf, "ab\u{00e9}\u{00e9}").unwrap(); // 2 + 2 + 2 bytes
        assert_eq!(buf.written(), "ab\u{00e9}".as_bytes());
        assert!(std::str::from_utf8(buf.written()).is_ok());
    }

    #[test]
    fn clear_touches_only_written_bytes() {
        let mut buf = RecordBuffer::with_payload_size(16).unwrap();
        buf.append(b"abc");
        buf.clear();
        assert_eq!(buf.written(), b"");
        assert_eq!(buf.payload_size(), 16);
        // Usable again at full capacity.
        assert_eq!(buf.append(b"next"), 4);
        assert_eq!(buf.written(), b"next");
    }

    #[test]
    fn zero_payload_size_falls_back_to_default() {
        let buf = RecordBuffer::with_payload_size(0).unwrap();
        assert_eq!(buf.payload_size(), SEVLOG_CONFIG.DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn shared_buffer_resizes_in_place() {
        let shared = SharedBuffer::new();
        shared.set_payload_size(32).unwrap();
        shared
            .with_buffer(|buf| assert_eq!(buf.payload_size(), 32))
            .unwrap();
        shared.set_payload_size(64).unwrap();
        shared
            .with_buffer(|buf| assert_eq!(buf.payload_size(), 64))
            .unwrap();
        shared.release();
    }

    #[test]
    fn released_shared_buffer_rejects_new_records() {
        let shared = SharedBuffer::new();
        shared
            .with_buffer(|buf| {
                buf.append(b"x");
                buf.clear();
            })
            .unwrap();
        shared.release();
        let err = shared.with_buffer(|_| ()).unwrap_err();
        assert!(matches!(err, Error::Uninitialized));
        // A second release stays a no-op.
        shared.release();
        assert!(shared.with_buffer(|_| ()).is_err());
    }

    #[test]
    fn released_thread_local_buffer_rejects_all_threads() {
        let strategy = std::sync::Arc::new(ThreadLocalBuffer::new());
        strategy
            .with_buffer(|buf| {
                buf.append(b"x");
                buf.clear();
            })
            .unwrap();
        strategy.release();
        assert!(strategy.with_buffer(|_| ()).is_err());
        let remote = std::sync::Arc::clone(&strategy);
        std::thread::spawn(move || {
            assert!(remote.with_buffer(|_| ()).is_err());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn thread_local_buffers_do_not_alias() {
        let strategy = std::sync::Arc::new(ThreadLocalBuffer::new());
        strategy.set_payload_size(8).unwrap();
        strategy
            .with_buffer(|buf| {
                buf.append(b"main");
            })
            .unwrap();
        let remote = std::sync::Arc::clone(&strategy);
        std::thread::spawn(move || {
            remote
                .with_buffer(|buf| assert_eq!(buf.written(), b""))
                .unwrap();
        })
        .join()
        .unwrap();
        strategy
            .with_buffer(|buf| {
                assert_eq!(buf.written(), b"main");
                buf.clear();
            })
            .unwrap();
        strategy.release();
    }
}
