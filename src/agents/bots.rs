use crate::cards::Card;
use crate::evaluator::TieBreakRule;
use crate::oracle::{Oracle, Outlook};
use crate::player::{play_suggestion, Agent, AgentKind};
use crate::stake::Stake;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Oracle-driven seat with a fixed thinking pause before each action.
#[derive(Debug, Clone)]
pub struct ArtificialPlayer {
    oracle: Oracle,
    rng: ChaCha8Rng,
    think: Duration,
}

impl ArtificialPlayer {
    pub fn new(seed: u64, think: Duration) -> Self {
        Self { oracle: Oracle::default(), rng: ChaCha8Rng::seed_from_u64(seed), think }
    }

    /// Use `rule` when the oracle picks a best hand on the river.
    pub fn with_tie_break(mut self, rule: TieBreakRule) -> Self {
        self.oracle = Oracle::new(rule);
        self
    }
}

#[async_trait]
impl Agent for ArtificialPlayer {
    async fn step(&mut self, seat: usize, stake: &mut dyn Stake, community: &[Card]) {
        if !self.think.is_zero() {
            tokio::time::sleep(self.think).await;
        }
        let suggestion = match stake.player(seat).and_then(|p| p.hole()) {
            Some(hole) => self.oracle.suggest_move(&hole, community, &mut self.rng),
            None => {
                tracing::warn!(seat, "no hole cards, playing cautious");
                Oracle::suggest_for(Outlook::Cautious, &mut self.rng)
            }
        };
        let done = play_suggestion(stake, seat, suggestion);
        tracing::debug!(seat, ?suggestion, applied = done.label(), "bot acted");
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }

    fn begin_hand(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}
