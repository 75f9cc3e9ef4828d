use thiserror::Error;

/// Inputs rejected before they reach the scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("grade must be between 1 and 4, given {0}")]
    Grade(i64),

    #[error("interval must be between 0 and {max} days, given {given}")]
    Interval { given: i64, max: u16 },

    #[error("ease factor must be a whole number of hundredths of at least {min}, given {given}")]
    EaseFactor { given: f64, min: f64 },
}
