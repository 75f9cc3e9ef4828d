//! Due-set selection.
//!
//! Due status is decided on UTC calendar dates. Both the stored review date and the reference
//! instant are truncated to a date before comparing, so a card scheduled for today is due at any
//! hour of the day regardless of the server's timezone.

use time::Date;
use time::OffsetDateTime;
use time::UtcOffset;

/// Anything with an optional next review date.
pub trait Scheduled {
    /// `None` when the card has never been scheduled.
    fn next_review(&self) -> Option<Date>;
}

impl Scheduled for Option<Date> {
    fn next_review(&self) -> Option<Date> {
        *self
    }
}

impl Scheduled for Option<OffsetDateTime> {
    fn next_review(&self) -> Option<Date> {
        self.map(utc_date)
    }
}

impl<T: Scheduled> Scheduled for &T {
    fn next_review(&self) -> Option<Date> {
        (**self).next_review()
    }
}

/// The UTC calendar date of `instant`.
pub fn utc_date(instant: OffsetDateTime) -> Date {
    instant.to_offset(UtcOffset::UTC).date()
}

pub fn is_due(next_review: Option<Date>, today: Date) -> bool {
    match next_review {
        Some(date) => date <= today,
        None => true,
    }
}

/// Keeps the cards due as of `reference`, in their original order.
pub fn select_due<T, I>(cards: I, reference: OffsetDateTime) -> Vec<T>
where
    T: Scheduled,
    I: IntoIterator<Item = T>,
{
    let today = utc_date(reference);

    cards
        .into_iter()
        .filter(|card| is_due(card.next_review(), today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::macros::datetime;

    #[derive(Debug, PartialEq)]
    struct Card {
        id: u64,
        next_review: Option<Date>,
    }

    impl Scheduled for Card {
        fn next_review(&self) -> Option<Date> {
            self.next_review
        }
    }

    fn card(id: u64, next_review: Option<Date>) -> Card {
        Card { id, next_review }
    }

    #[test]
    fn never_scheduled_is_always_due() {
        assert!(is_due(None, Date::MIN));
        assert!(is_due(None, date!(2024 - 05 - 01)));
    }

    #[test]
    fn past_and_present_are_due() {
        let today = date!(2024 - 05 - 01);

        assert!(is_due(Some(date!(2024 - 04 - 30)), today));
        assert!(is_due(Some(today), today));
        assert!(!is_due(Some(date!(2024 - 05 - 02)), today));
    }

    #[test]
    fn time_of_day_is_ignored() {
        let reviewed = Some(datetime!(2024-05-01 23:59:59 UTC));

        assert_eq!(select_due([reviewed], datetime!(2024-05-01 00:00:00 UTC)).len(), 1);
        assert_eq!(select_due([reviewed], datetime!(2024-04-30 23:59:59 UTC)).len(), 0);
    }

    #[test]
    fn compares_in_utc() {
        // 2024-05-02 01:00 in UTC+3 is still 2024-05-01 in UTC.
        let reference = datetime!(2024-05-02 01:00:00 +3);
        let tomorrow_utc = Some(date!(2024 - 05 - 02));

        assert_eq!(utc_date(reference), date!(2024 - 05 - 01));
        assert!(select_due([tomorrow_utc], reference).is_empty());

        let scheduled = Some(datetime!(2024-05-01 22:00:00 -4));
        assert!(select_due([scheduled], datetime!(2024-05-01 12:00:00 UTC)).is_empty());
    }

    #[test]
    fn selects_membership_in_order() {
        let cards = vec![
            card(1, Some(date!(2024 - 05 - 03))),
            card(2, None),
            card(3, Some(date!(2024 - 04 - 01))),
            card(4, Some(date!(2024 - 05 - 02))),
            card(5, Some(date!(2024 - 05 - 01))),
        ];

        let due = select_due(&cards, datetime!(2024-05-01 09:30:00 UTC));

        let ids: Vec<u64> = due.iter().map(|card| card.id).collect();
        assert_eq!(ids, [2, 3, 5]);
    }

    #[test]
    fn empty() {
        let cards: Vec<Card> = vec![];

        assert!(select_due(cards, datetime!(2024-05-01 00:00:00 UTC)).is_empty());
    }
}
