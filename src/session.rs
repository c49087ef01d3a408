//! Consecutive hands at one table, carrying money forward.

use crate::agents::ArtificialPlayer;
use crate::config::GameConfig;
use crate::dealer::DeckDealer;
use crate::deck::Deck;
use crate::events::EventSink;
use crate::game::{GameError, GameManager, HandOutcome, HandResult};
use crate::player::{Agent, Player};
use crate::stake::{FixedLimitStake, Stake};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Why [`Session::play`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StopReason {
    HandLimit,
    /// This player could no longer cover the big blind.
    Busted(usize),
    Failed(GameError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub hands_played: u64,
    pub showdowns: u64,
    pub uncontested: u64,
    pub aborted: u64,
    /// Final money by player index.
    pub money: Vec<u64>,
    pub stop: StopReason,
}

/// A table of agents playing hand after hand.
///
/// The button moves every hand; the player on the button posts the small
/// blind. Each hand draws from its own RNG stream of the session seed, so a
/// seed replays the whole session.
pub struct Session {
    config: GameConfig,
    agents: Vec<Box<dyn Agent>>,
    money: Vec<u64>,
    button: usize,
    hand_no: u64,
    seed: u64,
    events: EventSink,
}

impl Session {
    /// `agents[i]` plays as player `i`.
    pub fn new(config: GameConfig, agents: Vec<Box<dyn Agent>>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let money = vec![config.starting_money; agents.len()];
        Self { config, agents, money, button: 0, hand_no: 0, seed, events: EventSink::disabled() }
    }

    /// Two artificial players with the configured think delay.
    pub fn heads_up_bots(config: GameConfig) -> Self {
        let think = config.think_delay();
        let base = config.seed.unwrap_or_else(rand::random);
        let agents: Vec<Box<dyn Agent>> = (0..2u64)
            .map(|i| {
                let bot = ArtificialPlayer::new(base ^ i, think).with_tie_break(config.tie_break);
                Box::new(bot) as Box<dyn Agent>
            })
            .collect();
        let mut session = Self::new(config, agents);
        session.seed = base;
        session
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn money(&self) -> &[u64] {
        &self.money
    }

    pub fn button(&self) -> usize {
        self.button
    }

    pub fn hands_played(&self) -> u64 {
        self.hand_no
    }

    /// Play one hand and move the button.
    pub async fn play_hand(&mut self) -> Result<HandResult, GameError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(self.hand_no);
        let mut deck = Deck::standard();
        deck.shuffle_with(&mut rng);
        for agent in &mut self.agents {
            agent.begin_hand(rng.next_u64());
        }

        let n = self.money.len();
        let players: Vec<Player> =
            (0..n).map(|k| (self.button + k) % n).map(|i| Player::new(i, self.money[i])).collect();
        let stake = FixedLimitStake::new(self.config.rules, players).with_events(self.events.clone());
        let agents = std::mem::take(&mut self.agents);
        let mut gm = GameManager::new(stake, DeckDealer::new(deck), agents)
            .with_fail_safe(self.config.fail_safe_passes)
            .with_tie_break(self.config.tie_break)
            .with_events(self.events.clone());

        tracing::info!(hand = self.hand_no, button = self.button, money = ?self.money, "hand start");
        let result = match gm.deal_hole_cards().and_then(|()| gm.start_game()) {
            Ok(()) => gm.manage_game().await,
            Err(e) => Err(e),
        };

        for p in gm.stake().players() {
            self.money[p.index()] = p.money();
        }
        self.agents = gm.into_agents();
        self.hand_no += 1;
        self.button = (self.button + 1) % n.max(1);
        result
    }

    /// Play until `max_hands` have been played, a player is busted, or a hand fails.
    pub async fn play(&mut self, max_hands: Option<u64>) -> SessionSummary {
        let mut summary = SessionSummary {
            hands_played: 0,
            showdowns: 0,
            uncontested: 0,
            aborted: 0,
            money: Vec::new(),
            stop: StopReason::HandLimit,
        };
        tracing::info!(seed = self.seed, players = self.money.len(), "session start");
        loop {
            if max_hands.is_some_and(|m| summary.hands_played >= m) {
                break;
            }
            let big_blind = self.config.rules.big_blind;
            if let Some(broke) = self.money.iter().position(|&m| m < big_blind) {
                summary.stop = StopReason::Busted(broke);
                break;
            }
            match self.play_hand().await {
                Ok(result) => {
                    summary.hands_played += 1;
                    match result.outcome {
                        HandOutcome::Showdown(_) => summary.showdowns += 1,
                        HandOutcome::Uncontested { .. } => summary.uncontested += 1,
                        HandOutcome::Aborted { .. } => summary.aborted += 1,
                    }
                }
                Err(e) => {
                    summary.stop = StopReason::Failed(e);
                    break;
                }
            }
        }
        summary.money = self.money.clone();
        tracing::info!(hands = summary.hands_played, money = ?summary.money, stop = ?summary.stop, "session over");
        summary
    }
}
