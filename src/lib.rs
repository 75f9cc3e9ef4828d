pub mod clock;
pub mod due;
pub mod ease;
pub mod error;
pub mod grade;
pub mod schedule;

pub use crate::ease::EaseFactor;
pub use crate::error::ValidationError;
pub use crate::grade::Grade;
pub use crate::schedule::SchedulingState;

use crate::due::Scheduled;
use anyhow::Result;
use anyhow::bail;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::config::DbConfig;
use rusqlite::named_params;
use rusqlite::params;
use rusqlite::types::Type;
use std::path::Path;
use time::Date;
use time::Duration;
use time::OffsetDateTime;

const ACCURACY_WINDOW_DAYS: i64 = 30;

pub struct Srs {
    conn: Connection,
}

#[derive(Debug)]
pub struct Deck {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: u64,
    pub deck_id: u64,
    pub front: String,
    pub back: String,
}

#[derive(Debug)]
pub struct CardPreview {
    pub id: u64,
    pub front: String,
    pub next_review: Option<Date>,
}

/// Outcome of a single review, after it has been stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Review {
    pub previous: SchedulingState,
    pub state: SchedulingState,
    pub next_review: Date,
}

#[derive(Debug)]
pub struct GlobalStats {
    pub total: u32,
    pub new: u32,
    pub due_today: u32,
    /// Includes the cards already due today.
    pub due_by_tomorrow: u32,
}

#[derive(Debug)]
pub struct DeckStats {
    pub name: String,
    pub cards: u32,
    pub new: u32,
    pub correct: u32,
    pub wrong: u32,
    pub average_ease: Option<f64>,
}

#[derive(Debug)]
struct DueCard {
    deck_name: String,
    card: Card,
    next_review: Option<Date>,
}

impl Scheduled for DueCard {
    fn next_review(&self) -> Option<Date> {
        self.next_review
    }
}

impl Srs {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        Self::with_connection(conn)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;

        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(include_str!("schema.sql"))?;

        Ok(())
    }

    pub fn decks(&self) -> Result<Vec<Deck>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM Deck ORDER BY id")?;

        let iter = stmt.query_map([], |row| {
            Ok(Deck {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let r: Result<_, rusqlite::Error> = iter.collect();

        Ok(r?)
    }

    pub fn get_deck(&self, id: u64) -> Result<Deck> {
        Ok(self
            .conn
            .query_row("SELECT id, name FROM Deck WHERE id = ?", [id], |row| {
                Ok(Deck {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?)
    }

    pub fn create_deck(&mut self, name: &str, now: OffsetDateTime) -> Result<u64> {
        if name.is_empty() {
            bail!("deck name can't be empty");
        }

        let id = self.conn.query_row(
            "INSERT INTO Deck(name, creationTimestamp) VALUES (?, ?) RETURNING id",
            params![name, millis(now)],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    pub fn delete_deck(&mut self, id: u64) -> Result<()> {
        self.conn.execute("DELETE FROM Deck WHERE id = ?", [id])?;

        Ok(())
    }

    pub fn get_card(&self, id: u64) -> Result<Card> {
        Ok(self.conn.query_row(
            "SELECT id, deckId, front, back FROM Card WHERE id = ?",
            [id],
            |row| {
                Ok(Card {
                    id: row.get(0)?,
                    deck_id: row.get(1)?,
                    front: row.get(2)?,
                    back: row.get(3)?,
                })
            },
        )?)
    }

    pub fn create_card(
        &mut self,
        deck_id: u64,
        front: &str,
        back: &str,
        now: OffsetDateTime,
    ) -> Result<u64> {
        let front = front.trim();
        if front.is_empty() {
            bail!("Front of card can't be empty");
        }

        let id = self.conn.query_row(
            "INSERT INTO Card(deckId, front, back, creationTimestamp) VALUES (?, ?, ?, ?) RETURNING id",
            params![deck_id, front, back.trim(), millis(now)],
            |row| row.get(0),
        )?;

        Ok(id)
    }

    pub fn delete_card(&mut self, id: u64) -> Result<()> {
        self.conn.execute("DELETE FROM Card WHERE id = ?", [id])?;

        Ok(())
    }

    pub fn card_previews(&self, learner: &str) -> Result<Vec<CardPreview>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT Card.id, front, nextReviewDay
            FROM Card
            LEFT JOIN Schedule ON Card.id = Schedule.cardId AND Schedule.learner = ?
            ORDER BY creationTimestamp DESC, Card.id DESC
            ",
        )?;

        let iter = stmt.query_map([learner], |row| {
            Ok(CardPreview {
                id: row.get(0)?,
                front: row.get(1)?,
                next_review: julian_day(row, 2)?,
            })
        })?;

        let r: Result<_, rusqlite::Error> = iter.collect();

        Ok(r?)
    }

    /// Cards due for `learner` as of `now`, grouped by deck. Cards within a deck are shuffled.
    pub fn cards_to_review(
        &self,
        learner: &str,
        deck_id: Option<u64>,
        now: OffsetDateTime,
    ) -> Result<Vec<(String, Vec<Card>)>> {
        let cards = self.scheduled_cards(learner, deck_id)?;

        let due = due::select_due(cards, now);

        log::debug!("{} cards due for {learner}", due.len());

        Ok(group_by_deck(due, &mut fastrand::Rng::new()))
    }

    /// Every card visible to `learner` along with its next review date, in one query.
    fn scheduled_cards(&self, learner: &str, deck_id: Option<u64>) -> Result<Vec<DueCard>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT Deck.name, Card.id, Card.deckId, Card.front, Card.back, Schedule.nextReviewDay
            FROM Card
            JOIN Deck ON Card.deckId = Deck.id
            LEFT JOIN Schedule ON Card.id = Schedule.cardId AND Schedule.learner = :learner
            WHERE :deckId IS NULL OR Card.deckId = :deckId
            ORDER BY Card.deckId, Card.id
            ",
        )?;

        let iter = stmt.query_map(
            named_params! {":learner": learner, ":deckId": deck_id},
            |row| {
                Ok(DueCard {
                    deck_name: row.get(0)?,
                    card: Card {
                        id: row.get(1)?,
                        deck_id: row.get(2)?,
                        front: row.get(3)?,
                        back: row.get(4)?,
                    },
                    next_review: julian_day(row, 5)?,
                })
            },
        )?;

        let r: Result<_, rusqlite::Error> = iter.collect();

        Ok(r?)
    }

    /// Records a review of `card_id` by `learner` and reschedules the card.
    ///
    /// The read of the previous state and the write of the next one happen in a single immediate
    /// transaction, so concurrent reviews of the same card by the same learner are serialized.
    pub fn answer(
        &mut self,
        card_id: u64,
        learner: &str,
        grade: Grade,
        now: OffsetDateTime,
    ) -> Result<Review> {
        let today = due::utc_date(now);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = tx
            .query_row(
                "SELECT intervalDays, easeFactor FROM Schedule WHERE cardId = ? AND learner = ?",
                params![card_id, learner],
                |row| {
                    Ok(SchedulingState {
                        interval_days: row.get(0)?,
                        ease_factor: EaseFactor::from_hundredths(row.get(1)?),
                    })
                },
            )
            .optional()?
            .unwrap_or(SchedulingState::NEW);

        let state = schedule::next_state(previous, grade);

        let Some(next_review) = state.next_review_date(today) else {
            bail!("card {card_id} was left unscheduled after a review");
        };

        tx.execute(
            "
            INSERT INTO Schedule(cardId, learner, intervalDays, easeFactor, nextReviewDay)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(cardId, learner) DO UPDATE SET
                intervalDays = excluded.intervalDays,
                easeFactor = excluded.easeFactor,
                nextReviewDay = excluded.nextReviewDay
            ",
            params![
                card_id,
                learner,
                state.interval_days,
                state.ease_factor.hundredths(),
                next_review.to_julian_day(),
            ],
        )?;

        tx.execute(
            "
            INSERT INTO Answer(cardId, learner, grade, intervalDays, easeFactor, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                card_id,
                learner,
                grade.value(),
                state.interval_days,
                state.ease_factor.hundredths(),
                millis(now),
            ],
        )?;

        tx.commit()?;

        log::debug!(
            "card {card_id} graded {grade} by {learner}: {} days at {} -> {} days at {}, next review {next_review}",
            previous.interval_days,
            previous.ease_factor,
            state.interval_days,
            state.ease_factor,
        );

        Ok(Review {
            previous,
            state,
            next_review,
        })
    }

    /// Forgets the scheduling state of `card_id` for `learner`, making it new again. Review
    /// history is kept. Returns whether there was anything to forget.
    pub fn reset_card(&mut self, card_id: u64, learner: &str) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM Schedule WHERE cardId = ? AND learner = ?",
            params![card_id, learner],
        )?;

        Ok(deleted > 0)
    }

    pub fn stats(&self, learner: &str, now: OffsetDateTime) -> Result<(GlobalStats, Vec<DeckStats>)> {
        let cards = self.scheduled_cards(learner, None)?;

        let new = cards.iter().filter(|card| card.next_review.is_none()).count();
        let due_today = due::select_due(&cards, now).len();
        let due_by_tomorrow = due::select_due(&cards, now + Duration::days(1)).len();

        let global_stats = GlobalStats {
            total: cards.len().try_into()?,
            new: new.try_into()?,
            due_today: due_today.try_into()?,
            due_by_tomorrow: due_by_tomorrow.try_into()?,
        };

        let accuracy_since = millis(now - Duration::days(ACCURACY_WINDOW_DAYS));

        let mut stmt = self.conn.prepare(
            "
            SELECT
                name,

                (SELECT COUNT(*)
                FROM Card
                WHERE Card.deckId = d.id) AS cards,

                (SELECT COUNT(*)
                FROM Card LEFT JOIN Schedule ON Card.id = Schedule.cardId AND Schedule.learner = :learner
                WHERE Card.deckId = d.id AND Schedule.cardId IS NULL) AS new,

                (SELECT COUNT(*)
                FROM Card JOIN Answer ON Card.id = Answer.cardId
                WHERE Card.deckId = d.id AND Answer.learner = :learner AND grade > 1 AND Answer.timestamp > :accuracySince) AS correct,

                (SELECT COUNT(*)
                FROM Card JOIN Answer ON Card.id = Answer.cardId
                WHERE Card.deckId = d.id AND Answer.learner = :learner AND grade = 1 AND Answer.timestamp > :accuracySince) AS wrong,

                (SELECT AVG(easeFactor)
                FROM Card JOIN Schedule ON Card.id = Schedule.cardId
                WHERE Card.deckId = d.id AND Schedule.learner = :learner) AS averageEase
            FROM Deck AS d
            ORDER BY name
            ",
        )?;

        let iter = stmt.query_map(
            named_params! {":learner": learner, ":accuracySince": accuracy_since},
            |row| {
                let average_ease: Option<f64> = row.get(5)?;

                Ok(DeckStats {
                    name: row.get(0)?,
                    cards: row.get(1)?,
                    new: row.get(2)?,
                    correct: row.get(3)?,
                    wrong: row.get(4)?,
                    average_ease: average_ease.map(|hundredths| hundredths / 100.0),
                })
            },
        )?;

        let deck_stats: Result<_, rusqlite::Error> = iter.collect();

        Ok((global_stats, deck_stats?))
    }
}

fn millis(instant: OffsetDateTime) -> i64 {
    instant.unix_timestamp() * 1000
}

fn julian_day(row: &Row, idx: usize) -> rusqlite::Result<Option<Date>> {
    let day: Option<i32> = row.get(idx)?;

    day.map(|day| {
        Date::from_julian_day(day)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
    })
    .transpose()
}

/// Splits cards sorted by deck into one shuffled group per deck.
fn group_by_deck(cards: Vec<DueCard>, rng: &mut fastrand::Rng) -> Vec<(String, Vec<Card>)> {
    let mut cards_by_deck: Vec<(String, Vec<Card>)> = vec![];
    let mut current_deck_id = None;

    for DueCard {
        deck_name, card, ..
    } in cards
    {
        if current_deck_id != Some(card.deck_id) {
            current_deck_id = Some(card.deck_id);
            cards_by_deck.push((deck_name, vec![]));
        }

        if let Some((_, cards)) = cards_by_deck.last_mut() {
            cards.push(card);
        }
    }

    for (_, cards) in cards_by_deck.iter_mut() {
        rng.shuffle(cards);
    }

    cards_by_deck
}
