use std::sync::LazyLock;

use derive_from_env::FromEnv;

use crate::severity::SeverityMask;

#[derive(FromEnv)]
#[from_env(prefix = "SEVLOG")]
#[allow(non_snake_case)]
pub struct SevLogConfig {
    /// Payload capacity used when no explicit buffer size is configured.
    #[from_env(default = "10000")]
    pub DEFAULT_BUFFER_SIZE: usize,
}

pub static SEVLOG_CONFIG: LazyLock<SevLogConfig> =
    LazyLock::new(|| SevLogConfig::from_env().unwrap());

/// Full parameter set accepted by [`SeverityLogger::init`].
///
/// [`SeverityLogger::init`]: crate::SeverityLogger::init
#[derive(Clone, Copy, Debug)]
pub struct InitOptions {
    /// Payload capacity in bytes; `0` falls back to
    /// `SEVLOG_DEFAULT_BUFFER_SIZE` (default 10000).
    pub buffer_size: usize,
    pub mask: SeverityMask,
    pub timestamp: bool,
    pub caller: bool,
    pub thread_id: bool,
    pub syslog: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            buffer_size: 0,
            mask: SeverityMask::default(),
            timestamp: false,
            caller: false,
            thread_id: false,
            syslog: false,
        }
    }
}

impl InitOptions {
    /// Decodes the bit-packed init variant. Bits, high to low:
    /// 4-bit severity mask, timestamp, caller name, thread id, syslog.
    pub fn from_packed(buffer_size: usize, packed: u8) -> Self {
        Self {
            buffer_size,
            mask: SeverityMask::from_bits(packed >> 4),
            timestamp: packed & 0b0000_1000 != 0,
            caller: packed & 0b0000_0100 != 0,
            thread_id: packed & 0b0000_0010 != 0,
            syslog: packed & 0b0000_0001 != 0,
        }
    }
}
