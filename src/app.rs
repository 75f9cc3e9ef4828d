use crate::prompt;
use crate::stats;
use anyhow::Result;
use srs_sm2::Card;
use srs_sm2::Grade;
use srs_sm2::Srs;
use srs_sm2::clock::Clock;
use srs_sm2::due;
use time::Date;

pub struct App<C: Clock> {
    srs: Srs,
    learner: String,
    clock: C,
}

impl<C: Clock> App<C> {
    pub fn new(srs: Srs, learner: String, clock: C) -> Self {
        Self {
            srs,
            learner,
            clock,
        }
    }

    pub fn add(&mut self, deck_id: u64, front: &str, back: &str) -> Result<()> {
        let deck_name = self.srs.get_deck(deck_id)?.name;

        let card_id = self.srs.create_card(deck_id, front, back, self.clock.now())?;

        println!("Added card {card_id} to {deck_name}");
        Ok(())
    }

    pub fn cards(&self) -> Result<()> {
        let today = self.clock.today();

        for card in self.srs.card_previews(&self.learner)? {
            let front = card.front.replace('\n', " ");

            println!(
                "{} [{}] {front}",
                card.id,
                review_label(card.next_review, today)
            );
        }

        Ok(())
    }

    pub fn create_deck(&mut self, name: &str) -> Result<()> {
        let id = self.srs.create_deck(name, self.clock.now())?;

        println!("Created {name} ({id})");
        Ok(())
    }

    pub fn decks(&self) -> Result<()> {
        for deck in self.srs.decks()? {
            println!("{} {}", deck.id, deck.name);
        }

        Ok(())
    }

    pub fn delete(&mut self, card_id: u64) -> Result<()> {
        let front = self.srs.get_card(card_id)?.front;

        if prompt::confirm(format!(
            "Are you sure you want to delete '{}'?",
            front.replace('\n', " ")
        ))? {
            self.srs.delete_card(card_id)?;
            println!("... deleted.");
        }

        Ok(())
    }

    pub fn delete_deck(&mut self, deck_id: u64) -> Result<()> {
        let name = self.srs.get_deck(deck_id)?.name;

        if prompt::confirm(format!(
            "Are you sure you want to delete '{name}' and all of its cards?"
        ))? {
            self.srs.delete_deck(deck_id)?;
            println!("... deleted.");
        }

        Ok(())
    }

    pub fn due(&self, deck_id: Option<u64>) -> Result<()> {
        let cards = self
            .srs
            .cards_to_review(&self.learner, deck_id, self.clock.now())?;

        if cards.is_empty() {
            println!("Nothing to review");
        }

        for (deck_name, cards) in cards {
            println!("{deck_name}: {}", cards.len());
        }

        Ok(())
    }

    pub fn init(&mut self) -> Result<()> {
        self.srs.init()
    }

    pub fn reset(&mut self, card_id: u64) -> Result<()> {
        let front = self.srs.get_card(card_id)?.front;

        if self.srs.reset_card(card_id, &self.learner)? {
            println!("Reset '{}'", front.replace('\n', " "));
        } else {
            println!("'{}' hasn't been reviewed yet", front.replace('\n', " "));
        }

        Ok(())
    }

    pub fn review(&mut self, deck_id: Option<u64>) -> Result<()> {
        let cards = self
            .srs
            .cards_to_review(&self.learner, deck_id, self.clock.now())?;

        println!(
            "{} cards to review",
            cards.iter().flat_map(|(_, cc)| cc).count()
        );

        for (deck_name, cards) in cards {
            let num_cards = cards.len();

            println!("\n{num_cards} cards to review in {deck_name}\n");

            let mut num_recalled = 0;

            for card in cards {
                let grade = self.review_card(&card)?;
                if grade != Grade::Again {
                    num_recalled += 1;
                }

                let review = self
                    .srs
                    .answer(card.id, &self.learner, grade, self.clock.now())?;

                println!(
                    "Next review in {} {} ({})\n",
                    review.state.interval_days,
                    if review.state.interval_days == 1 {
                        "day"
                    } else {
                        "days"
                    },
                    review.next_review,
                );
            }

            println!("Recalled {num_recalled}/{num_cards}");
        }

        println!("Finished review");

        Ok(())
    }

    fn review_card(&self, card: &Card) -> Result<Grade> {
        println!("{}\n", &card.front);

        prompt::any("Press any key to show answer")?;

        println!("{}", "-".repeat(79));

        println!("{}\n", &card.back);

        prompt::grade("Again (1)  Hard (2)  Good (3)  Easy (4): ")
    }

    pub fn stats(&self) -> Result<()> {
        let (global_stats, deck_stats) = self.srs.stats(&self.learner, self.clock.now())?;

        println!("{}", stats::Global(&global_stats));

        for stat in deck_stats.iter() {
            println!();
            println!("{}", stats::Deck(stat));
        }

        Ok(())
    }
}

fn review_label(next_review: Option<Date>, today: Date) -> String {
    match next_review {
        None => "new".to_string(),
        Some(_) if due::is_due(next_review, today) => "due".to_string(),
        Some(date) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn labels() {
        let today = date!(2024 - 03 - 10);

        assert_eq!(review_label(None, today), "new");
        assert_eq!(review_label(Some(date!(2024 - 03 - 09)), today), "due");
        assert_eq!(review_label(Some(today), today), "due");
        assert_eq!(review_label(Some(date!(2024 - 03 - 11)), today), "2024-03-11");
    }
}
