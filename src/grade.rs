use crate::error::ValidationError;
use std::fmt;

/// How well a card was recalled during a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Maps a raw grade to a `Grade`, treating anything outside 1..=4 as `Good`.
    ///
    /// Older callers relied on this fallback, so it's kept for the raw numeric entry point only.
    /// Use `Grade::try_from` when input comes from somewhere that can be rejected.
    pub fn from_raw(raw: i64) -> Self {
        u8::try_from(raw)
            .ok()
            .and_then(|raw| Grade::try_from(raw).ok())
            .unwrap_or_else(|| {
                log::warn!("unrecognized grade {raw}, scheduling as {}", Grade::Good);
                Grade::Good
            })
    }
}

impl TryFrom<u8> for Grade {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::Again),
            2 => Ok(Grade::Hard),
            3 => Ok(Grade::Good),
            4 => Ok(Grade::Easy),
            _ => Err(ValidationError::Grade(value.into())),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        };

        write!(f, "{name}")
    }
}
