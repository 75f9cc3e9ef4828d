//! Fixed-point ease factor.
//!
//! The ease factor is stored as a whole number of hundredths so that the adjustments applied per
//! grade (0.2 and 0.15) are exact and the value can be persisted as an integer.

use crate::error::ValidationError;
use std::fmt;

/// Slack for binary representation error when scaling a decimal like 1.3 to hundredths.
const HUNDREDTHS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EaseFactor(u16);

impl EaseFactor {
    /// 1.3, the hardest a card can become.
    pub const MIN: EaseFactor = EaseFactor(130);

    /// 2.5, given to cards that have never been reviewed.
    pub const DEFAULT: EaseFactor = EaseFactor(250);

    /// Clamps to `MIN`.
    pub fn from_hundredths(hundredths: u16) -> Self {
        EaseFactor(hundredths.max(Self::MIN.0))
    }

    pub fn hundredths(self) -> u16 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Applies a signed change in hundredths. Never drops below `MIN` and has no upper bound
    /// other than saturation.
    pub fn adjust(self, delta: i16) -> Self {
        let adjusted = self.0.saturating_add_signed(delta);

        Self::from_hundredths(adjusted)
    }
}

impl Default for EaseFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for EaseFactor {
    type Error = ValidationError;

    /// Accepts whole hundredths only. Values with finer precision, values that aren't finite and
    /// values below 1.3 are corrupt scheduling state and are rejected rather than rounded or
    /// clamped.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let invalid = || ValidationError::EaseFactor {
            given: value,
            min: Self::MIN.as_f64(),
        };

        if !value.is_finite() {
            return Err(invalid());
        }

        let scaled = value * 100.0;
        let hundredths = scaled.round();
        if (scaled - hundredths).abs() > HUNDREDTHS_TOLERANCE {
            return Err(invalid());
        }

        if hundredths < f64::from(Self::MIN.0) || hundredths > f64::from(u16::MAX) {
            return Err(invalid());
        }

        Ok(EaseFactor(hundredths as u16))
    }
}

impl fmt::Display for EaseFactor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
