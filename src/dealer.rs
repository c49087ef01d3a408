//! Card supply for a hand.

use crate::cards::Card;
use crate::deck::Deck;
use crate::hand::HoleCards;
use async_trait::async_trait;
use std::time::Duration;

/// Source of hole cards and community tranches.
///
/// The orchestrator awaits `deal_community` before starting the next betting
/// round, so an implementation may pause for an animation or a network peer.
#[async_trait]
pub trait Dealer: Send {
    /// Next `count` community cards. Fewer than `count` means the supply ran out.
    async fn deal_community(&mut self, count: usize) -> Vec<Card>;

    fn deal_hole(&mut self) -> Option<HoleCards>;
}

/// Deals from a [`Deck`], optionally pausing before each community tranche.
#[derive(Debug, Clone)]
pub struct DeckDealer {
    deck: Deck,
    delay: Duration,
}

impl DeckDealer {
    pub fn new(deck: Deck) -> Self {
        Self { deck, delay: Duration::ZERO }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn remaining(&self) -> usize {
        self.deck.len()
    }
}

#[async_trait]
impl Dealer for DeckDealer {
    async fn deal_community(&mut self, count: usize) -> Vec<Card> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.deck.draw_n(count)
    }

    fn deal_hole(&mut self) -> Option<HoleCards> {
        self.deck.deal_hole()
    }
}
