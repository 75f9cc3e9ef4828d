//! Interval engine.
//!
//! Maps a grade and the previous scheduling state of a card to the state after the review. The
//! engine is pure: it never reads the clock or storage, so callers are responsible for handing it
//! a freshly read state and for writing the result back under a single-writer discipline per
//! (card, learner).

use crate::ease::EaseFactor;
use crate::error::ValidationError;
use crate::grade::Grade;
use time::Date;
use time::Duration;

/// Longest interval, in days, a card can be scheduled for.
pub const MAX_INTERVAL_DAYS: u16 = 365;

const HARD_INTERVAL_PERCENT: u64 = 120;
const EASY_BONUS_PERCENT: u64 = 130;

const AGAIN_EASE_DELTA: i16 = -20;
const HARD_EASE_DELTA: i16 = -15;
const EASY_EASE_DELTA: i16 = 15;

/// Scheduling state of one card for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingState {
    /// Whole days until the next review. `0` is reserved for a card that has never been reviewed
    /// and is never produced by the engine.
    pub interval_days: u16,
    pub ease_factor: EaseFactor,
}

/// Result of `calculate_next_review`, in the units callers persist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextReview {
    pub next_interval: u16,
    pub new_ease_factor: f64,
}

impl SchedulingState {
    /// State assumed for a card the first time it's reviewed.
    pub const NEW: SchedulingState = SchedulingState {
        interval_days: 0,
        ease_factor: EaseFactor::DEFAULT,
    };

    pub fn is_new(&self) -> bool {
        self.interval_days == 0
    }

    /// The date the card should next be reviewed when it was reviewed on `today`. New cards have
    /// no review date.
    pub fn next_review_date(&self, today: Date) -> Option<Date> {
        if self.is_new() {
            return None;
        }

        Some(today.saturating_add(Duration::days(self.interval_days.into())))
    }
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self::NEW
    }
}

/// Computes the state following a review graded `grade`.
pub fn next_state(state: SchedulingState, grade: Grade) -> SchedulingState {
    let previous = u64::from(state.interval_days);
    let ease = u64::from(state.ease_factor.hundredths());

    let (next, ease_delta) = match grade {
        Grade::Again => (1, AGAIN_EASE_DELTA),
        Grade::Hard => (
            (previous * HARD_INTERVAL_PERCENT).div_ceil(100),
            HARD_EASE_DELTA,
        ),
        Grade::Good => ((previous * ease).div_ceil(100), 0),
        Grade::Easy => (
            (previous * ease * EASY_BONUS_PERCENT).div_ceil(100 * 100),
            EASY_EASE_DELTA,
        ),
    };

    // A first review resets the interval whatever the grade, but the ease still moves with it.
    let next = if state.is_new() { 1 } else { next };

    let interval_days = next.clamp(1, MAX_INTERVAL_DAYS.into()) as u16;

    SchedulingState {
        interval_days,
        ease_factor: state.ease_factor.adjust(ease_delta),
    }
}

/// Raw numeric entry point for callers holding values straight from storage.
///
/// `previous_interval` of `0` means the card has never been reviewed. Grades outside 1..=4 are
/// scheduled as `Good`.
///
/// Rejected inputs:
/// - a negative `previous_interval`
/// - a `previous_interval` above `MAX_INTERVAL_DAYS`. No review can produce one, so it can
///   only come from corrupt state.
/// - an `ease_factor` that isn't finite, is below 1.3, or isn't a whole number of hundredths.
///   Rounding it instead would shift the interval away from the ceil of the real product.
pub fn calculate_next_review(
    grade: i64,
    previous_interval: i64,
    ease_factor: f64,
) -> Result<NextReview, ValidationError> {
    let interval_days = u16::try_from(previous_interval)
        .ok()
        .filter(|days| *days <= MAX_INTERVAL_DAYS)
        .ok_or(ValidationError::Interval {
            given: previous_interval,
            max: MAX_INTERVAL_DAYS,
        })?;

    let state = SchedulingState {
        interval_days,
        ease_factor: EaseFactor::try_from(ease_factor)?,
    };

    let next = next_state(state, Grade::from_raw(grade));

    Ok(NextReview {
        next_interval: next.interval_days,
        new_ease_factor: next.ease_factor.as_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn state(interval_days: u16, ease_hundredths: u16) -> SchedulingState {
        SchedulingState {
            interval_days,
            ease_factor: EaseFactor::from_hundredths(ease_hundredths),
        }
    }

    fn review(grade: i64, previous_interval: i64, ease_factor: f64) -> NextReview {
        calculate_next_review(grade, previous_interval, ease_factor).unwrap()
    }

    fn next_review(next_interval: u16, new_ease_factor: f64) -> NextReview {
        NextReview {
            next_interval,
            new_ease_factor,
        }
    }

    #[test]
    fn three_good_reviews_from_new() {
        let first = review(3, 0, 2.5);
        assert_eq!(first, next_review(1, 2.5));

        let second = review(3, first.next_interval.into(), first.new_ease_factor);
        assert_eq!(second, next_review(3, 2.5));

        let third = review(3, second.next_interval.into(), second.new_ease_factor);
        assert_eq!(third, next_review(8, 2.5));
    }

    #[test]
    fn again_on_new_card() {
        assert_eq!(review(1, 0, 2.5), next_review(1, 2.3));
    }

    #[test]
    fn easy_on_new_card_still_raises_ease() {
        assert_eq!(review(4, 0, 2.5), next_review(1, 2.65));
    }

    #[test]
    fn hard_rounds_up() {
        assert_eq!(review(2, 7, 2.5), next_review(9, 2.35));
    }

    #[test]
    fn easy_is_capped_at_a_year() {
        assert_eq!(review(4, 300, 4.0), next_review(365, 4.15));
    }

    #[test]
    fn again_at_ease_floor() {
        assert_eq!(review(1, 5, 1.3), next_review(1, 1.3));
    }

    #[test]
    fn again_resets_long_interval() {
        let next = next_state(state(200, 310), Grade::Again);

        assert_eq!(next, state(1, 290));
    }

    #[test]
    fn hard_on_one_day_interval() {
        assert_eq!(next_state(state(1, 250), Grade::Hard), state(2, 235));
    }

    #[test]
    fn good_multiplies_by_ease() {
        assert_eq!(next_state(state(10, 130), Grade::Good), state(13, 130));
        assert_eq!(next_state(state(7, 255), Grade::Good), state(18, 255));
    }

    #[test]
    fn exact_products_are_not_rounded_up() {
        assert_eq!(next_state(state(10, 250), Grade::Good), state(25, 250));
        assert_eq!(next_state(state(100, 120), Grade::Hard).interval_days, 120);
        assert_eq!(next_state(state(10, 200), Grade::Easy), state(26, 215));
        // 25.0 * 2.2 is 55.00000000000001 in floating point.
        assert_eq!(next_state(state(25, 220), Grade::Good), state(55, 220));
    }

    #[test]
    fn unrecognized_grade_is_scheduled_as_good() {
        assert_eq!(review(0, 10, 2.5), review(3, 10, 2.5));
        assert_eq!(review(9, 10, 2.5), review(3, 10, 2.5));
        assert_eq!(review(-1, 0, 2.5), next_review(1, 2.5));
    }

    #[test]
    fn rejects_invalid_interval() {
        assert_eq!(
            calculate_next_review(3, -1, 2.5),
            Err(ValidationError::Interval {
                given: -1,
                max: MAX_INTERVAL_DAYS
            })
        );
        assert!(calculate_next_review(3, 366, 2.5).is_err());
        assert!(calculate_next_review(3, 365, 2.5).is_ok());
    }

    #[test]
    fn rejects_invalid_ease_factor() {
        assert!(calculate_next_review(3, 4, f64::NAN).is_err());
        assert!(calculate_next_review(3, 4, f64::NEG_INFINITY).is_err());
        assert!(calculate_next_review(3, 4, 1.0).is_err());
    }

    #[test]
    fn rejects_ease_factor_finer_than_hundredths() {
        assert_eq!(
            calculate_next_review(3, 100, 2.004),
            Err(ValidationError::EaseFactor {
                given: 2.004,
                min: 1.3
            })
        );
        assert!(calculate_next_review(3, 200, 2.555).is_err());
        assert_eq!(review(3, 100, 2.01), next_review(201, 2.01));
    }

    #[test]
    fn results_stay_in_bounds() {
        for interval_days in 0..=MAX_INTERVAL_DAYS {
            for ease in [130, 131, 175, 250, 333, 400, 1000] {
                for grade in Grade::ALL {
                    let next = next_state(state(interval_days, ease), grade);

                    assert!(next.ease_factor >= EaseFactor::MIN);
                    assert!((1..=MAX_INTERVAL_DAYS).contains(&next.interval_days));

                    if interval_days == 0 || grade == Grade::Again {
                        assert_eq!(next.interval_days, 1);
                    }
                }
            }
        }
    }

    #[test]
    fn harder_grades_never_schedule_further_out() {
        for interval_days in 1..=MAX_INTERVAL_DAYS {
            for ease in [130, 150, 250, 300, 420] {
                let from = state(interval_days, ease);

                let hard = next_state(from, Grade::Hard).interval_days;
                let good = next_state(from, Grade::Good).interval_days;
                let easy = next_state(from, Grade::Easy).interval_days;

                assert!(hard <= good, "{from:?}: hard {hard} > good {good}");
                assert!(good <= easy, "{from:?}: good {good} > easy {easy}");
            }
        }
    }

    #[test]
    fn is_deterministic() {
        let from = state(42, 265);

        assert_eq!(next_state(from, Grade::Easy), next_state(from, Grade::Easy));
    }

    #[test]
    fn next_review_date() {
        let today = date!(2024 - 02 - 27);

        assert_eq!(SchedulingState::NEW.next_review_date(today), None);
        assert_eq!(
            state(3, 250).next_review_date(today),
            Some(date!(2024 - 03 - 01))
        );
    }
}
