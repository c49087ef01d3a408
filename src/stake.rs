//! Betting state machines.
//!
//! [`Stake`] is the capability the orchestrator and agents drive; the
//! fixed-limit structure is [`FixedLimitStake`]. Other structures (pot-limit,
//! no-limit) would be further implementors over the same [`BettingRules`].

use crate::events::{ActionRecord, ActionVerb, EventSink, TableEvent};
use crate::hand::HoleCards;
use crate::player::Player;
use serde::Deserialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("a bet already stands this round")]
    AlreadyOpened,
    #[error("raise cap of {max} reached")]
    RaiseCapReached { max: u32 },
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },
    #[error("no player with index {0}")]
    UnknownPlayer(usize),
    #[error("player {0} has folded")]
    PlayerFolded(usize),
    #[error("starter bets need two players, have {0}")]
    NotEnoughPlayers(usize),
}

/// Blind and bet sizes plus the raise cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BettingRules {
    pub small_blind: u64,
    pub big_blind: u64,
    /// Bet size pre-flop and on the flop.
    pub small_bet: u64,
    /// Bet size on the turn and river.
    pub big_bet: u64,
    /// Raises allowed per betting round.
    pub max_raises: u32,
}

impl Default for BettingRules {
    fn default() -> Self {
        Self { small_blind: 1, big_blind: 2, small_bet: 2, big_bet: 4, max_raises: 2 }
    }
}

impl BettingRules {
    pub fn bet_size(&self, big_bets: bool) -> u64 {
        if big_bets {
            self.big_bet
        } else {
            self.small_bet
        }
    }
}

/// Betting capability over the players of one hand.
///
/// Every action either applies fully and returns `Ok(())` or returns an error
/// with no state changed. Players are addressed by [`Player::index`]; the
/// order of [`Stake::players`] is the turn order, first entry acts first.
pub trait Stake: Send {
    fn rules(&self) -> &BettingRules;
    /// Size of a bet in the current round.
    fn bet_size(&self) -> u64;

    fn initialize_round(&mut self, big_bets: bool);
    fn collect_starter_bets(&mut self) -> Result<(), ActionError>;

    fn bet(&mut self, amount: u64, player: usize) -> Result<(), ActionError>;
    fn call(&mut self, player: usize) -> Result<(), ActionError>;
    fn raise(&mut self, amount: u64, player: usize) -> Result<(), ActionError>;
    fn check(&mut self, player: usize) -> Result<(), ActionError>;
    fn fold(&mut self, player: usize) -> Result<(), ActionError>;

    fn round_active(&self) -> bool;
    fn game_active(&self) -> bool;

    fn pot(&self) -> u64;
    fn highest_bet(&self) -> u64;
    fn players(&self) -> &[Player];
    fn player(&self, index: usize) -> Option<&Player> {
        self.players().iter().find(|p| p.index() == index)
    }
    fn history(&self) -> &[ActionRecord];

    /// Move the first player in turn order to the back.
    fn rotate_players(&mut self);
    fn assign_hole(&mut self, player: usize, hole: HoleCards) -> Result<(), ActionError>;

    /// Pay the pot to `winners`, split evenly with odd chips to the first
    /// listed. Returns the payouts and leaves the pot empty.
    fn settle(&mut self, winners: &[usize]) -> Result<Vec<(usize, u64)>, ActionError>;
    /// Return every player's contribution and empty the pot.
    fn refund(&mut self) -> Vec<(usize, u64)>;
}

/// Fixed-limit betting: bets and raises are one bet of the current tier,
/// raises are capped per round.
#[derive(Debug, Clone)]
pub struct FixedLimitStake {
    rules: BettingRules,
    players: Vec<Player>,
    pot: u64,
    highest_bet: u64,
    check_count: usize,
    raises: u32,
    opened: bool,
    big_bets: bool,
    history: Vec<ActionRecord>,
    events: EventSink,
}

impl FixedLimitStake {
    /// Players act in the given order; the first posts the small blind.
    pub fn new(rules: BettingRules, players: Vec<Player>) -> Self {
        Self {
            rules,
            players,
            pot: 0,
            highest_bet: 0,
            check_count: 0,
            raises: 0,
            opened: false,
            big_bets: false,
            history: Vec::new(),
            events: EventSink::disabled(),
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn opened(&self) -> bool {
        self.opened
    }

    pub fn raises(&self) -> u32 {
        self.raises
    }

    pub fn check_count(&self) -> usize {
        self.check_count
    }

    pub fn big_bets(&self) -> bool {
        self.big_bets
    }

    fn position(&self, index: usize) -> Result<usize, ActionError> {
        self.players
            .iter()
            .position(|p| p.index == index)
            .ok_or(ActionError::UnknownPlayer(index))
    }

    /// Position of a player that may still act.
    fn acting(&self, index: usize) -> Result<usize, ActionError> {
        let pos = self.position(index)?;
        if !self.players[pos].active {
            return Err(ActionError::PlayerFolded(index));
        }
        Ok(pos)
    }

    fn mark_others_live(&mut self, pos: usize) {
        for (i, p) in self.players.iter_mut().enumerate() {
            p.live = i != pos && p.active;
        }
    }

    fn record(&mut self, player: usize, verb: ActionVerb, amount: u64) {
        tracing::debug!(player, action = verb.label(), amount, pot = self.pot, "action applied");
        self.history.push(ActionRecord { player, verb, amount });
        self.events.emit(TableEvent::Action { player, verb });
        if amount > 0 {
            self.publish_money();
        }
    }

    fn publish_money(&self) {
        let mut stacks: Vec<(usize, u64)> = self.players.iter().map(|p| (p.index, p.money)).collect();
        stacks.sort_unstable();
        self.events.emit(TableEvent::Money { stacks, pot: self.pot });
    }
}

impl Stake for FixedLimitStake {
    fn rules(&self) -> &BettingRules {
        &self.rules
    }

    fn bet_size(&self) -> u64 {
        self.rules.bet_size(self.big_bets)
    }

    fn initialize_round(&mut self, big_bets: bool) {
        self.big_bets = big_bets;
        self.highest_bet = 0;
        self.check_count = 0;
        self.raises = 0;
        self.opened = false;
        for p in &mut self.players {
            p.live = false;
            p.round_bet = 0;
        }
    }

    fn collect_starter_bets(&mut self) -> Result<(), ActionError> {
        let (small, big) = (self.rules.small_blind, self.rules.big_blind);
        match self.players.as_slice() {
            [sb, bb, ..] => {
                if sb.money < small {
                    return Err(ActionError::InsufficientFunds { needed: small, available: sb.money });
                }
                if bb.money < big {
                    return Err(ActionError::InsufficientFunds { needed: big, available: bb.money });
                }
            }
            _ => return Err(ActionError::NotEnoughPlayers(self.players.len())),
        }

        self.initialize_round(false);
        self.players[0].collect_money(small)?;
        self.players[0].round_bet = small;
        self.players[1].collect_money(big)?;
        self.players[1].round_bet = big;
        self.pot += small + big;
        self.highest_bet = big;
        for p in &mut self.players {
            p.live = true;
            p.active = true;
        }
        // the big blind counts as the opening bet
        self.opened = true;

        let (sb_index, bb_index) = (self.players[0].index, self.players[1].index);
        self.record(sb_index, ActionVerb::SmallBlind, small);
        self.record(bb_index, ActionVerb::BigBlind, big);
        Ok(())
    }

    fn bet(&mut self, _amount: u64, player: usize) -> Result<(), ActionError> {
        let pos = self.acting(player)?;
        if self.opened {
            return Err(ActionError::AlreadyOpened);
        }
        let wager = self.bet_size();
        self.players[pos].collect_money(wager)?;
        self.pot += wager;
        self.mark_others_live(pos);
        let p = &mut self.players[pos];
        p.round_bet += wager;
        self.highest_bet = self.highest_bet.max(p.round_bet);
        self.opened = true;
        self.record(player, ActionVerb::Bet, wager);
        Ok(())
    }

    fn call(&mut self, player: usize) -> Result<(), ActionError> {
        let pos = self.acting(player)?;
        let difference = self.highest_bet.saturating_sub(self.players[pos].round_bet);
        self.players[pos].collect_money(difference)?;
        self.pot += difference;
        let p = &mut self.players[pos];
        p.round_bet = self.highest_bet;
        p.live = false;
        self.record(player, ActionVerb::Call, difference);
        Ok(())
    }

    fn raise(&mut self, _amount: u64, player: usize) -> Result<(), ActionError> {
        let pos = self.acting(player)?;
        if self.raises >= self.rules.max_raises {
            return Err(ActionError::RaiseCapReached { max: self.rules.max_raises });
        }
        let difference = self.highest_bet.saturating_sub(self.players[pos].round_bet);
        let wager = self.bet_size() + difference;
        self.players[pos].collect_money(wager)?;
        self.pot += wager;
        self.mark_others_live(pos);
        let p = &mut self.players[pos];
        p.round_bet += wager;
        self.highest_bet = p.round_bet;
        self.raises += 1;
        self.opened = true;
        self.record(player, ActionVerb::Raise, wager);
        Ok(())
    }

    fn check(&mut self, player: usize) -> Result<(), ActionError> {
        self.acting(player)?;
        if self.opened {
            return Err(ActionError::AlreadyOpened);
        }
        self.check_count += 1;
        self.record(player, ActionVerb::Check, 0);
        Ok(())
    }

    fn fold(&mut self, player: usize) -> Result<(), ActionError> {
        let pos = self.position(player)?;
        let p = &mut self.players[pos];
        p.live = false;
        p.active = false;
        self.record(player, ActionVerb::Fold, 0);
        Ok(())
    }

    fn round_active(&self) -> bool {
        let any_live = self.players.iter().any(|p| p.live);
        if self.opened {
            any_live
        } else {
            self.check_count < self.players.len()
        }
    }

    fn game_active(&self) -> bool {
        self.players.iter().filter(|p| p.active).count() > 1
    }

    fn pot(&self) -> u64 {
        self.pot
    }

    fn highest_bet(&self) -> u64 {
        self.highest_bet
    }

    fn players(&self) -> &[Player] {
        &self.players
    }

    fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    fn rotate_players(&mut self) {
        if !self.players.is_empty() {
            self.players.rotate_left(1);
        }
    }

    fn assign_hole(&mut self, player: usize, hole: HoleCards) -> Result<(), ActionError> {
        let pos = self.position(player)?;
        self.players[pos].hole = Some(hole);
        Ok(())
    }

    fn settle(&mut self, winners: &[usize]) -> Result<Vec<(usize, u64)>, ActionError> {
        let positions = winners.iter().map(|&w| self.position(w)).collect::<Result<Vec<_>, _>>()?;
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let share = self.pot / positions.len() as u64;
        let mut odd = self.pot % positions.len() as u64;
        let mut payouts = Vec::with_capacity(positions.len());
        for pos in positions {
            let amount = share + std::mem::take(&mut odd);
            let p = &mut self.players[pos];
            p.money += amount;
            payouts.push((p.index, amount));
        }
        self.pot = 0;
        self.publish_money();
        self.events.emit(TableEvent::Payout(payouts.clone()));
        Ok(payouts)
    }

    fn refund(&mut self) -> Vec<(usize, u64)> {
        let payouts: Vec<(usize, u64)> = self
            .players
            .iter_mut()
            .map(|p| {
                let amount = std::mem::take(&mut p.contributed);
                p.money += amount;
                (p.index, amount)
            })
            .collect();
        self.pot = 0;
        self.publish_money();
        self.events.emit(TableEvent::Payout(payouts.clone()));
        payouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heads_up(money: u64) -> FixedLimitStake {
        FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, money), Player::new(1, money)])
    }

    #[test]
    fn blinds_open_the_round_and_make_both_live() {
        let mut s = heads_up(20);
        s.collect_starter_bets().unwrap();
        assert!(s.opened());
        assert!(s.players().iter().all(|p| p.live() && p.active()));
        assert_eq!(s.highest_bet(), 2);
        assert_eq!(s.check(1), Err(ActionError::AlreadyOpened));
    }

    #[test]
    fn blinds_need_funds() {
        let mut s =
            FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20), Player::new(1, 1)]);
        assert_eq!(
            s.collect_starter_bets(),
            Err(ActionError::InsufficientFunds { needed: 2, available: 1 })
        );
        assert_eq!(s.pot(), 0);
        assert_eq!(s.players()[0].money(), 20);

        let mut lonely = FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20)]);
        assert_eq!(lonely.collect_starter_bets(), Err(ActionError::NotEnoughPlayers(1)));
    }

    #[test]
    fn big_blind_closes_preflop_by_calling_for_nothing() {
        let mut s = heads_up(20);
        s.collect_starter_bets().unwrap();
        s.call(0).unwrap();
        assert!(s.round_active());
        s.call(1).unwrap();
        assert!(!s.round_active());
        assert_eq!(s.pot(), 4);
        assert_eq!(s.history().last().map(|r| r.amount), Some(0));
    }

    #[test]
    fn bet_uses_tier_size_and_ignores_amount() {
        let mut s = heads_up(20);
        s.initialize_round(true);
        s.bet(999, 1).unwrap();
        assert_eq!(s.pot(), 4);
        assert_eq!(s.players()[1].current_round_bet(), 4);
        assert!(s.players()[0].live());
        assert!(!s.players()[1].live());
        assert_eq!(s.bet(4, 0), Err(ActionError::AlreadyOpened));
    }

    #[test]
    fn raise_matches_then_adds_one_bet() {
        let mut s = heads_up(20);
        s.initialize_round(false);
        s.bet(0, 0).unwrap();
        s.raise(0, 1).unwrap();
        assert_eq!(s.players()[1].current_round_bet(), 4);
        assert_eq!(s.highest_bet(), 4);
        assert_eq!(s.pot(), 6);
        assert!(s.players()[0].live());
        s.call(0).unwrap();
        assert!(!s.round_active());
        assert_eq!(s.pot(), 8);
    }

    #[test]
    fn insufficient_funds_leave_state_unchanged() {
        let mut s =
            FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20), Player::new(1, 3)]);
        s.initialize_round(false);
        s.bet(0, 0).unwrap();
        s.raise(0, 1).unwrap_err();
        assert_eq!(s.pot(), 2);
        assert_eq!(s.raises(), 0);
        assert!(s.players()[1].live());
        s.call(1).unwrap();
    }

    #[test]
    fn folded_players_cannot_act() {
        let mut s = heads_up(20);
        s.initialize_round(false);
        s.fold(1).unwrap();
        assert_eq!(s.check(1), Err(ActionError::PlayerFolded(1)));
        assert_eq!(s.call(1), Err(ActionError::PlayerFolded(1)));
        assert!(!s.game_active());
        assert_eq!(s.fold(7), Err(ActionError::UnknownPlayer(7)));
    }

    #[test]
    fn rotate_moves_first_to_back() {
        let mut s = heads_up(20);
        s.rotate_players();
        let order: Vec<usize> = s.players().iter().map(|p| p.index()).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn settle_splits_with_odd_chip_to_first() {
        let mut s = heads_up(20);
        s.collect_starter_bets().unwrap();
        let payouts = s.settle(&[1, 0]).unwrap();
        assert_eq!(payouts, vec![(1, 2), (0, 1)]);
        assert_eq!(s.pot(), 0);
        assert_eq!(s.players()[0].money() + s.players()[1].money(), 40);
    }

    #[test]
    fn refund_returns_contributions() {
        let mut s = heads_up(20);
        s.collect_starter_bets().unwrap();
        s.raise(0, 0).unwrap();
        let payouts = s.refund();
        assert_eq!(payouts, vec![(0, 4), (1, 2)]);
        assert!(s.players().iter().all(|p| p.money() == 20));
        assert_eq!(s.pot(), 0);
    }
}
