use std::ops::{BitOr, BitOrAssign};

use colored::Color;

/// Severity of a single log record.
///
/// Each level owns one bit of a [`SeverityMask`]: bit `level - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Severity {
    Error = 1,
    Info = 2,
    Warning = 3,
    Debug = 4,
}

impl Severity {
    /// Maps a numeric level back to a severity. Anything outside `1..=4`
    /// yields `None`, so unknown levels never pass the mask gate.
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Error),
            2 => Some(Self::Info),
            3 => Some(Self::Warning),
            4 => Some(Self::Debug),
            _ => None,
        }
    }

    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Bracketed tag written at the head of every record.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Error => "[ERR] ",
            Self::Info => "[INF] ",
            Self::Warning => "[WNG] ",
            Self::Debug => "[DBG] ",
        }
    }

    /// Terminal color for this level. The mapping follows the classic
    /// ANSI palette offsets (30 + level): red, green, yellow, blue.
    pub const fn color(self) -> Color {
        match self {
            Self::Error => Color::Red,
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Debug => Color::Blue,
        }
    }
}

/// Bitmask selecting which severities are emitted.
///
/// Stored verbatim: setters perform no validation, so a caller may
/// silence everything with [`SeverityMask::OFF`] or enable all four
/// levels with [`SeverityMask::ALL`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeverityMask(u8);

impl SeverityMask {
    pub const OFF: Self = Self(0b0000);
    pub const ERR: Self = Self(0b0001);
    pub const INF: Self = Self(0b0010);
    pub const WNG: Self = Self(0b0100);
    pub const DBG: Self = Self(0b1000);
    /// Everything but debug. The engine's startup default.
    pub const EIW: Self = Self(0b0111);
    pub const ALL: Self = Self(0b1111);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Tests bit `level - 1`.
    pub const fn allows(self, severity: Severity) -> bool {
        self.0 & (1 << (severity.level() - 1)) != 0
    }
}

impl Default for SeverityMask {
    fn default() -> Self {
        Self::EIW
    }
}

impl BitOr for SeverityMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SeverityMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
