//! Coarse move advice for the artificial player.

use crate::cards::Card;
use crate::evaluator::{calculate_hand, choose_best_hand, EvalError, HandCategory, TieBreakRule};
use crate::hand::HoleCards;
use rand::Rng;

/// What the oracle recommends; agents map this onto concrete stake actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suggestion {
    Aggressive,
    Passive,
    Fold,
}

/// How strong the current holding looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Brave,
    Cautious,
}

/// Thresholds on a uniform draw from `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestionWeights {
    /// Draws below this fold.
    pub fold_below: u8,
    /// Draws below this (and not folding) play passively; the rest are aggressive.
    pub passive_below: u8,
}

impl SuggestionWeights {
    pub const CAUTIOUS: Self = Self { fold_below: 30, passive_below: 90 };
    pub const BRAVE: Self = Self { fold_below: 10, passive_below: 50 };

    pub fn pick(&self, draw: u8) -> Suggestion {
        if draw < self.fold_below {
            Suggestion::Fold
        } else if draw < self.passive_below {
            Suggestion::Passive
        } else {
            Suggestion::Aggressive
        }
    }
}

/// Hands at or above this category make the oracle brave.
pub const BRAVE_FROM: HandCategory = HandCategory::Straight;

#[derive(Debug, Clone, Copy, Default)]
pub struct Oracle {
    rule: TieBreakRule,
}

impl Oracle {
    pub fn new(rule: TieBreakRule) -> Self {
        Self { rule }
    }

    /// Judge the holding by how many community cards are out.
    ///
    /// Pre-flop there is nothing to go on. On the flop the five known cards are
    /// ranked, on the turn every six-card subset is tried, on the river the best
    /// hand is chosen.
    pub fn assess(&self, hole: &HoleCards, community: &[Card]) -> Result<Outlook, EvalError> {
        let mut cards = community.to_vec();
        cards.extend(hole.as_array());
        let strong = match community.len() {
            0 => false,
            3 => calculate_hand(&cards)?.category() >= BRAVE_FROM,
            4 => {
                let mut any = false;
                for skip in 0..cards.len() {
                    let subset: Vec<Card> = cards
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != skip)
                        .map(|(_, c)| *c)
                        .collect();
                    if calculate_hand(&subset)?.category() >= BRAVE_FROM {
                        any = true;
                        break;
                    }
                }
                any
            }
            _ => choose_best_hand(hole, community, self.rule)?.category() >= BRAVE_FROM,
        };
        Ok(if strong { Outlook::Brave } else { Outlook::Cautious })
    }

    pub fn suggest_move<R: Rng>(
        &self,
        hole: &HoleCards,
        community: &[Card],
        rng: &mut R,
    ) -> Suggestion {
        let outlook = self.assess(hole, community).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "hand assessment failed, playing cautious");
            Outlook::Cautious
        });
        Self::suggest_for(outlook, rng)
    }

    pub fn suggest_for<R: Rng>(outlook: Outlook, rng: &mut R) -> Suggestion {
        let weights = match outlook {
            Outlook::Brave => SuggestionWeights::BRAVE,
            Outlook::Cautious => SuggestionWeights::CAUTIOUS,
        };
        weights.pick(rng.random_range(1..=100))
    }
}
