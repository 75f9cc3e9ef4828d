use srs_sm2::DeckStats;
use srs_sm2::GlobalStats;
use std::fmt;

pub struct Global<'a>(pub &'a GlobalStats);

pub struct Deck<'a>(pub &'a DeckStats);

impl fmt::Display for Global<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stats = self.0;

        writeln!(f, "{} cards, {} new", stats.total, stats.new)?;
        writeln!(f, "Due today: {}", stats.due_today)?;
        write!(f, "Due by tomorrow: {}", stats.due_by_tomorrow)
    }
}

impl fmt::Display for Deck<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stats = self.0;

        writeln!(f, "{}", stats.name)?;
        writeln!(f, "  {} cards, {} new", stats.cards, stats.new)?;

        if let Some(ease) = stats.average_ease {
            writeln!(f, "  Average ease: {ease:.2}")?;
        }

        let num_answered = stats.correct + stats.wrong;

        write!(
            f,
            "  Past month recall: {:.0}% ({} / {num_answered})",
            if num_answered > 0 {
                stats.correct as f32 / num_answered as f32 * 100.0
            } else {
                100.0
            },
            stats.correct,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global() {
        let stats = GlobalStats {
            total: 12,
            new: 3,
            due_today: 5,
            due_by_tomorrow: 7,
        };

        assert_eq!(
            Global(&stats).to_string(),
            "12 cards, 3 new\nDue today: 5\nDue by tomorrow: 7"
        );
    }

    #[test]
    fn deck() {
        let stats = DeckStats {
            name: "Kanji".to_string(),
            cards: 4,
            new: 1,
            correct: 3,
            wrong: 1,
            average_ease: Some(2.4),
        };

        assert_eq!(
            Deck(&stats).to_string(),
            "Kanji\n  4 cards, 1 new\n  Average ease: 2.40\n  Past month recall: 75% (3 / 4)"
        );
    }

    #[test]
    fn deck_without_answers() {
        let stats = DeckStats {
            name: "Verbs".to_string(),
            cards: 2,
            new: 2,
            correct: 0,
            wrong: 0,
            average_ease: None,
        };

        assert_eq!(
            Deck(&stats).to_string(),
            "Verbs\n  2 cards, 2 new\n  Past month recall: 100% (0 / 0)"
        );
    }
}
