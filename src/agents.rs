//! Agents: the artificial player and a human seat fed by external signals.

use crate::cards::Card;
use crate::oracle::Suggestion;
use crate::player::{play_suggestion, Agent, AgentKind};
use crate::stake::Stake;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

mod bots;

pub use bots::ArtificialPlayer;

/// Signals a human can raise while it is their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum HumanAction {
    Fold,
    /// Check if possible, otherwise call.
    Call,
    /// Bet if possible, otherwise raise.
    Raise,
}

impl HumanAction {
    fn suggestion(self) -> Suggestion {
        match self {
            HumanAction::Fold => Suggestion::Fold,
            HumanAction::Call => Suggestion::Passive,
            HumanAction::Raise => Suggestion::Aggressive,
        }
    }
}

/// Handle held by the UI side of a [`HumanPlayer`].
#[derive(Debug, Clone)]
pub struct HumanInput {
    tx: UnboundedSender<HumanAction>,
}

impl HumanInput {
    /// Returns `false` once the player has been dropped.
    pub fn send(&self, action: HumanAction) -> bool {
        self.tx.send(action).is_ok()
    }

    pub fn fold(&self) -> bool {
        self.send(HumanAction::Fold)
    }

    pub fn call(&self) -> bool {
        self.send(HumanAction::Call)
    }

    pub fn raise(&self) -> bool {
        self.send(HumanAction::Raise)
    }
}

/// A seat that waits for a [`HumanInput`] signal, folding when none arrives in time.
#[derive(Debug)]
pub struct HumanPlayer {
    rx: UnboundedReceiver<HumanAction>,
    timeout: Duration,
}

impl HumanPlayer {
    pub fn new(timeout: Duration) -> (Self, HumanInput) {
        let (tx, rx) = unbounded_channel();
        (Self { rx, timeout }, HumanInput { tx })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drop signals left over from this turn so the next one starts clean.
    fn reset(&mut self) {
        while self.rx.try_recv().is_ok() {}
    }
}

#[async_trait]
impl Agent for HumanPlayer {
    async fn step(&mut self, seat: usize, stake: &mut dyn Stake, _community: &[Card]) {
        let action = match tokio::time::timeout(self.timeout, self.rx.recv()).await {
            Ok(Some(action)) => action,
            Ok(None) => {
                tracing::warn!(seat, "input closed, folding");
                HumanAction::Fold
            }
            Err(_) => {
                tracing::warn!(seat, timeout_ms = self.timeout.as_millis() as u64, "time's up, folding");
                HumanAction::Fold
            }
        };
        let done = play_suggestion(stake, seat, action.suggestion());
        tracing::debug!(seat, requested = ?action, applied = done.label(), "human acted");
        self.reset();
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ActionVerb;
    use crate::player::Player;
    use crate::stake::{BettingRules, FixedLimitStake};

    fn stake() -> FixedLimitStake {
        let mut s =
            FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20), Player::new(1, 20)]);
        s.initialize_round(false);
        s
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_folds() {
        let (mut human, _input) = HumanPlayer::new(Duration::from_secs(120));
        let mut s = stake();
        human.step(0, &mut s, &[]).await;
        assert!(!s.players()[0].active());
        assert_eq!(s.history().last().map(|r| r.verb), Some(ActionVerb::Fold));
    }

    #[tokio::test(start_paused = true)]
    async fn raise_signal_bets_when_unopened() {
        let (mut human, input) = HumanPlayer::new(Duration::from_secs(5));
        let mut s = stake();
        assert!(input.raise());
        human.step(0, &mut s, &[]).await;
        assert_eq!(s.history().last().map(|r| r.verb), Some(ActionVerb::Bet));
        assert_eq!(s.pot(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn extra_signals_do_not_leak_into_next_turn() {
        let (mut human, input) = HumanPlayer::new(Duration::from_secs(5));
        let mut s = stake();
        input.call();
        input.raise();
        human.step(0, &mut s, &[]).await;
        assert_eq!(s.history().last().map(|r| r.verb), Some(ActionVerb::Check));
        human.step(0, &mut s, &[]).await;
        assert_eq!(s.history().last().map(|r| r.verb), Some(ActionVerb::Fold));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_folds() {
        let (mut human, input) = HumanPlayer::new(Duration::from_secs(5));
        drop(input);
        let mut s = stake();
        human.step(1, &mut s, &[]).await;
        assert!(!s.players()[1].active());
    }
}
