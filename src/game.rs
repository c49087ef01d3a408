//! Hand orchestration: blinds, the four betting streets, and the showdown.

use crate::cards::Card;
use crate::dealer::Dealer;
use crate::evaluator::{choose_best_hand, compare_hands, EvalError, HandValue, TieBreakRule};
use crate::events::{EventSink, TableEvent};
use crate::hand::{Community, HandError, HoleCards};
use crate::player::Agent;
use crate::stake::{ActionError, Stake};
use std::cmp::Ordering;
use std::fmt;

/// Full passes over the table a single betting round may take.
pub const DEFAULT_FAIL_SAFE_PASSES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub fn label(self) -> &'static str {
        match self {
            Street::Preflop => "pre-flop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameError {
    #[error("betting failed: {0}")]
    Action(#[from] ActionError),
    #[error("invalid cards: {0}")]
    Hand(#[from] HandError),
    #[error("hand evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error("deck exhausted: needed {needed}, got {got}")]
    DeckExhausted { needed: usize, got: usize },
    #[error("no agent seated for player {0}")]
    AgentMissing(usize),
    #[error("player {0} has no hole cards")]
    HoleCardsMissing(usize),
}

/// How a betting round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    /// Everyone still in has matched the action.
    Settled,
    /// At most one player is left in the hand.
    HandOver,
    /// The fail-safe pass limit was hit.
    Aborted,
}

/// Best hands of the players who reached the showdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Showdown {
    /// Tied winners in turn order.
    pub winners: Vec<usize>,
    pub hands: Vec<(usize, HandValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandOutcome {
    Showdown(Showdown),
    Uncontested { winner: usize },
    /// Contributions were refunded.
    Aborted { street: Street },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    pub outcome: HandOutcome,
    /// Money returned to players when the pot was emptied, by player index.
    pub payouts: Vec<(usize, u64)>,
}

/// Runs one hand over a stake, a dealer and one agent per player.
///
/// `agents[i]` acts for the player whose [`index`](crate::player::Player::index) is `i`.
pub struct GameManager<S: Stake, D: Dealer> {
    stake: S,
    dealer: D,
    agents: Vec<Box<dyn Agent>>,
    community: Community,
    street: Street,
    fail_safe_passes: usize,
    tie_break: TieBreakRule,
    events: EventSink,
}

impl<S: Stake, D: Dealer> GameManager<S, D> {
    pub fn new(stake: S, dealer: D, agents: Vec<Box<dyn Agent>>) -> Self {
        Self {
            stake,
            dealer,
            agents,
            community: Community::new(),
            street: Street::Preflop,
            fail_safe_passes: DEFAULT_FAIL_SAFE_PASSES,
            tie_break: TieBreakRule::default(),
            events: EventSink::disabled(),
        }
    }

    pub fn with_fail_safe(mut self, passes: usize) -> Self {
        self.fail_safe_passes = passes;
        self
    }

    pub fn with_tie_break(mut self, rule: TieBreakRule) -> Self {
        self.tie_break = rule;
        self
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn stake(&self) -> &S {
        &self.stake
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn community(&self) -> &[Card] {
        self.community.as_slice()
    }

    /// Hand the agents back so they can sit at the next hand.
    pub fn into_agents(self) -> Vec<Box<dyn Agent>> {
        self.agents
    }

    /// Give `holes[i]` to the player with index `i`. No card may appear twice.
    pub fn assign_cards(&mut self, holes: &[HoleCards]) -> Result<(), GameError> {
        let mut seen: Vec<Card> = Vec::with_capacity(holes.len() * 2);
        for hole in holes {
            for card in hole.as_array() {
                if seen.contains(&card) {
                    return Err(HandError::DuplicateHoleCards.into());
                }
                seen.push(card);
            }
        }
        let indices: Vec<usize> = self.stake.players().iter().map(|p| p.index()).collect();
        for index in indices {
            let hole = holes.get(index).copied().ok_or(GameError::HoleCardsMissing(index))?;
            self.stake.assign_hole(index, hole)?;
        }
        Ok(())
    }

    /// Deal two cards to every player from the dealer.
    pub fn deal_hole_cards(&mut self) -> Result<(), GameError> {
        let count = self.stake.players().len();
        let mut holes = Vec::with_capacity(count);
        for _ in 0..count {
            let hole = self
                .dealer
                .deal_hole()
                .ok_or(GameError::DeckExhausted { needed: 2, got: 0 })?;
            holes.push(hole);
        }
        self.assign_cards(&holes)
    }

    /// Post the blinds and set the pre-flop turn order.
    ///
    /// Two rotations bring a heads-up table back to the small blind acting first.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.street = Street::Preflop;
        self.community = Community::new();
        self.stake.collect_starter_bets()?;
        self.rotate_players();
        self.rotate_players();
        tracing::info!(pot = self.stake.pot(), "blinds posted");
        self.events.emit(TableEvent::Community(Vec::new()));
        Ok(())
    }

    /// Play the hand from pre-flop betting to the payout.
    ///
    /// On error the pot is refunded before returning.
    pub async fn manage_game(&mut self) -> Result<HandResult, GameError> {
        match self.play_streets().await {
            Ok(result) => Ok(result),
            Err(e) => {
                tracing::error!(error = %e, street = %self.street, "hand failed, refunding");
                self.stake.refund();
                Err(e)
            }
        }
    }

    async fn play_streets(&mut self) -> Result<HandResult, GameError> {
        self.street = Street::Preflop;
        if self.betting_round().await? == RoundEnd::Aborted {
            return Ok(self.abort());
        }
        // first to act alternates after every betting round but the river
        self.rotate_players();

        let streets = [(Street::Flop, 3, false), (Street::Turn, 1, true), (Street::River, 1, true)];
        for (street, count, big_bets) in streets {
            if !self.stake.game_active() {
                break;
            }
            let cards = self.dealer.deal_community(count).await;
            if cards.len() < count {
                return Err(GameError::DeckExhausted { needed: count, got: cards.len() });
            }
            self.community.extend(&cards)?;
            self.events.emit(TableEvent::Community(self.community.as_slice().to_vec()));
            self.stake.initialize_round(big_bets);
            self.street = street;
            tracing::info!(%street, community = ?self.community.as_slice(), pot = self.stake.pot(), "street dealt");
            if self.betting_round().await? == RoundEnd::Aborted {
                return Ok(self.abort());
            }
            if street != Street::River {
                self.rotate_players();
            }
        }

        if !self.stake.game_active() {
            return self.award_uncontested();
        }
        self.street = Street::Showdown;
        let showdown = self.calculate_winner()?;
        let payouts = self.stake.settle(&showdown.winners)?;
        tracing::info!(winners = ?showdown.winners, ?payouts, "showdown");
        Ok(HandResult { outcome: HandOutcome::Showdown(showdown), payouts })
    }

    /// Let active players act in turn order until the round settles.
    pub async fn betting_round(&mut self) -> Result<RoundEnd, GameError> {
        let mut passes = 0;
        while self.stake.round_active() {
            if !self.stake.game_active() {
                return Ok(RoundEnd::HandOver);
            }
            if passes >= self.fail_safe_passes {
                tracing::error!(street = %self.street, passes, pot = self.stake.pot(), "betting round did not settle, aborting");
                return Ok(RoundEnd::Aborted);
            }
            passes += 1;

            let order: Vec<usize> =
                self.stake.players().iter().filter(|p| p.active()).map(|p| p.index()).collect();
            for seat in order {
                if !self.stake.player(seat).is_some_and(|p| p.active()) {
                    continue;
                }
                let agent = self.agents.get_mut(seat).ok_or(GameError::AgentMissing(seat))?;
                tracing::trace!(seat, kind = ?agent.kind(), street = %self.street, "awaiting action");
                agent.step(seat, &mut self.stake, self.community.as_slice()).await;
                if !self.stake.game_active() {
                    return Ok(RoundEnd::HandOver);
                }
                if !self.stake.round_active() {
                    return Ok(RoundEnd::Settled);
                }
            }
        }
        Ok(if self.stake.game_active() { RoundEnd::Settled } else { RoundEnd::HandOver })
    }

    pub fn rotate_players(&mut self) {
        self.stake.rotate_players();
        tracing::trace!(
            order = ?self.stake.players().iter().map(|p| p.index()).collect::<Vec<_>>(),
            "turn order"
        );
    }

    /// Rank every active player's best hand and pick the winners.
    ///
    /// Players comparing equal to the best hand share the win.
    pub fn calculate_winner(&self) -> Result<Showdown, GameError> {
        let mut hands = Vec::new();
        for p in self.stake.players().iter().filter(|p| p.active()) {
            let hole = p.hole().ok_or(GameError::HoleCardsMissing(p.index()))?;
            let value = choose_best_hand(&hole, self.community.as_slice(), self.tie_break)?;
            tracing::debug!(player = p.index(), hand = %value, "best hand");
            hands.push((p.index(), value));
        }

        let mut best: Option<&HandValue> = None;
        for (_, value) in &hands {
            best = match best {
                Some(b) if compare_hands(value, b, self.tie_break) != Ordering::Greater => Some(b),
                _ => Some(value),
            };
        }
        let winners = match best {
            Some(b) => hands
                .iter()
                .filter(|(_, v)| compare_hands(v, b, self.tie_break) == Ordering::Equal)
                .map(|(i, _)| *i)
                .collect(),
            None => Vec::new(),
        };
        Ok(Showdown { winners, hands })
    }

    fn award_uncontested(&mut self) -> Result<HandResult, GameError> {
        let winners: Vec<usize> =
            self.stake.players().iter().filter(|p| p.active()).map(|p| p.index()).collect();
        let [winner] = winners.as_slice() else {
            tracing::error!(?winners, street = %self.street, "no single player left, refunding");
            return Ok(self.abort());
        };
        let winner = *winner;
        let payouts = self.stake.settle(&[winner])?;
        tracing::info!(winner, street = %self.street, ?payouts, "pot taken uncontested");
        Ok(HandResult { outcome: HandOutcome::Uncontested { winner }, payouts })
    }

    fn abort(&mut self) -> HandResult {
        let payouts = self.stake.refund();
        HandResult { outcome: HandOutcome::Aborted { street: self.street }, payouts }
    }
}

impl<S: Stake + fmt::Debug, D: Dealer + fmt::Debug> fmt::Debug for GameManager<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameManager")
            .field("stake", &self.stake)
            .field("dealer", &self.dealer)
            .field("agents", &self.agents.len())
            .field("community", &self.community)
            .field("street", &self.street)
            .finish()
    }
}
