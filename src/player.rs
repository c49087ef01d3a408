//! Seat records and the decision seam used to drive them.

use crate::cards::Card;
use crate::events::ActionVerb;
use crate::hand::HoleCards;
use crate::oracle::Suggestion;
use crate::stake::{ActionError, Stake};
use async_trait::async_trait;

/// Money and flags for one seat, owned by the stake for the length of a hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub(crate) index: usize,
    pub(crate) money: u64,
    pub(crate) round_bet: u64,
    pub(crate) contributed: u64,
    pub(crate) live: bool,
    pub(crate) active: bool,
    pub(crate) hole: Option<HoleCards>,
}

impl Player {
    pub fn new(index: usize, money: u64) -> Self {
        Self {
            index,
            money,
            round_bet: 0,
            contributed: 0,
            live: false,
            active: true,
            hole: None,
        }
    }

    /// Seat identity, stable across turn-order rotations.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn money(&self) -> u64 {
        self.money
    }

    /// Money put in during the current betting round.
    pub fn current_round_bet(&self) -> u64 {
        self.round_bet
    }

    /// Money put in during the whole hand.
    pub fn contributed(&self) -> u64 {
        self.contributed
    }

    /// Must still respond to the latest bet or raise.
    pub fn live(&self) -> bool {
        self.live
    }

    /// Still in the hand (has not folded).
    pub fn active(&self) -> bool {
        self.active
    }

    pub fn hole(&self) -> Option<HoleCards> {
        self.hole
    }

    /// Take `amount` out of the stack. Leaves the player untouched on failure.
    pub(crate) fn collect_money(&mut self, amount: u64) -> Result<(), ActionError> {
        if amount > self.money {
            return Err(ActionError::InsufficientFunds { needed: amount, available: self.money });
        }
        self.money -= amount;
        self.contributed += amount;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Bot,
}

/// Decision procedure for one seat.
///
/// `step` is awaited to completion before the next seat acts, so the stake is
/// never touched by two agents at once.
#[async_trait]
pub trait Agent: Send {
    /// Act once for `seat` by calling into `stake`.
    async fn step(&mut self, seat: usize, stake: &mut dyn Stake, community: &[Card]);

    fn kind(&self) -> AgentKind;

    /// Called before each hand with a seed derived from the hand's RNG.
    fn begin_hand(&mut self, _seed: u64) {}
}

/// Apply a suggestion through the fallback chain and return what was done.
///
/// Aggressive tries bet then raise, passive tries check then call, and every
/// chain ends in a fold, which cannot fail for a seated player.
pub fn play_suggestion(stake: &mut dyn Stake, seat: usize, suggestion: Suggestion) -> ActionVerb {
    let attempts: &[ActionVerb] = match suggestion {
        Suggestion::Aggressive => &[ActionVerb::Bet, ActionVerb::Raise],
        Suggestion::Passive => &[ActionVerb::Check, ActionVerb::Call],
        Suggestion::Fold => &[],
    };
    let size = stake.bet_size();
    for &verb in attempts {
        let res = match verb {
            ActionVerb::Bet => stake.bet(size, seat),
            ActionVerb::Raise => stake.raise(size, seat),
            ActionVerb::Check => stake.check(seat),
            _ => stake.call(seat),
        };
        match res {
            Ok(()) => return verb,
            Err(e) => tracing::trace!(seat, action = verb.label(), error = %e, "action rejected"),
        }
    }
    if let Err(e) = stake.fold(seat) {
        tracing::warn!(seat, error = %e, "fold rejected");
    }
    ActionVerb::Fold
}
