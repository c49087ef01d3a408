use async_trait::async_trait;
use holdem_limit::cards::{parse_cards, Card};
use holdem_limit::dealer::Dealer;
use holdem_limit::events::{self, ActionVerb, TableEvent};
use holdem_limit::game::{GameManager, HandOutcome, Street};
use holdem_limit::hand::HoleCards;
use holdem_limit::oracle::Suggestion;
use holdem_limit::player::{play_suggestion, Agent, AgentKind, Player};
use holdem_limit::stake::{BettingRules, FixedLimitStake, Stake};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type TurnLog = Arc<Mutex<Vec<(usize, usize)>>>;

/// Plays queued suggestions, then passive; logs (seat, community cards seen).
struct Scripted {
    plan: VecDeque<Suggestion>,
    log: TurnLog,
}

#[async_trait]
impl Agent for Scripted {
    async fn step(&mut self, seat: usize, stake: &mut dyn Stake, community: &[Card]) {
        if let Ok(mut log) = self.log.lock() {
            log.push((seat, community.len()));
        }
        let next = self.plan.pop_front().unwrap_or(Suggestion::Passive);
        play_suggestion(stake, seat, next);
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }
}

struct FixedDealer {
    community: VecDeque<Card>,
}

#[async_trait]
impl Dealer for FixedDealer {
    async fn deal_community(&mut self, count: usize) -> Vec<Card> {
        (0..count).filter_map(|_| self.community.pop_front()).collect()
    }

    fn deal_hole(&mut self) -> Option<HoleCards> {
        None
    }
}

struct Table {
    gm: GameManager<FixedLimitStake, FixedDealer>,
    log: TurnLog,
}

fn table(holes: [&str; 2], board: &str, plans: [Vec<Suggestion>; 2]) -> Table {
    let log: TurnLog = Arc::default();
    let agents: Vec<Box<dyn Agent>> = plans
        .into_iter()
        .map(|plan| Box::new(Scripted { plan: plan.into(), log: log.clone() }) as Box<dyn Agent>)
        .collect();
    let stake =
        FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20), Player::new(1, 20)]);
    let dealer = FixedDealer { community: parse_cards(board).unwrap().into() };
    let mut gm = GameManager::new(stake, dealer, agents);
    let holes: Vec<HoleCards> = holes.iter().map(|h| h.parse().unwrap()).collect();
    gm.assign_cards(&holes).unwrap();
    Table { gm, log }
}

fn money(gm: &GameManager<FixedLimitStake, FixedDealer>, index: usize) -> u64 {
    gm.stake().player(index).map(|p| p.money()).unwrap_or_default()
}

#[tokio::test]
async fn passive_hand_alternates_the_first_actor_every_street() {
    let Table { mut gm, log } =
        table(["Kc Kd", "2c 7d"], "Ks 9h 4c 3s Jd", [Vec::new(), Vec::new()]);
    gm.start_game().unwrap();
    let result = gm.manage_game().await.unwrap();

    let HandOutcome::Showdown(showdown) = &result.outcome else {
        panic!("expected showdown, got {:?}", result.outcome);
    };
    assert_eq!(showdown.winners, vec![0]);
    assert_eq!(result.payouts, vec![(0, 4)]);
    assert_eq!(money(&gm, 0), 22);
    assert_eq!(money(&gm, 1), 18);
    assert_eq!(gm.street(), Street::Showdown);
    assert_eq!(gm.community().len(), 5);

    let turns = log.lock().unwrap().clone();
    // pre-flop 0 first, flop 1, turn 0, river 1
    assert_eq!(turns, vec![(0, 0), (1, 0), (1, 3), (0, 3), (0, 4), (1, 4), (1, 5), (0, 5)]);
}

#[tokio::test]
async fn fold_pre_flop_awards_the_pot_without_dealing() {
    let Table { mut gm, .. } =
        table(["Kc Kd", "2c 7d"], "Ks 9h 4c 3s Jd", [Vec::new(), vec![Suggestion::Fold]]);
    gm.start_game().unwrap();
    let result = gm.manage_game().await.unwrap();

    assert_eq!(result.outcome, HandOutcome::Uncontested { winner: 0 });
    assert_eq!(result.payouts, vec![(0, 4)]);
    assert!(gm.community().is_empty());
    assert_eq!(money(&gm, 0) + money(&gm, 1), 40);
}

#[tokio::test]
async fn turn_bets_use_the_big_bet() {
    let plan = vec![Suggestion::Passive, Suggestion::Passive, Suggestion::Aggressive];
    let Table { mut gm, .. } = table(["Kc Kd", "2c 7d"], "Ks 9h 4c 3s Jd", [Vec::new(), plan]);
    gm.start_game().unwrap();
    gm.manage_game().await.unwrap();

    let bet = gm.stake().history().iter().find(|r| r.verb == ActionVerb::Bet).copied().unwrap();
    assert_eq!((bet.player, bet.amount), (1, 4));
    assert_eq!(money(&gm, 0), 20 - 6 + 12);
}

#[tokio::test]
async fn aggression_at_the_raise_cap_falls_back_to_fold() {
    let always = vec![Suggestion::Aggressive; 8];
    let Table { mut gm, .. } = table(["Kc Kd", "2c 7d"], "Ks 9h 4c 3s Jd", [always.clone(), always]);
    gm.start_game().unwrap();
    let result = gm.manage_game().await.unwrap();

    let verbs: Vec<ActionVerb> = gm.stake().history().iter().map(|r| r.verb).collect();
    assert_eq!(
        verbs,
        vec![
            ActionVerb::SmallBlind,
            ActionVerb::BigBlind,
            ActionVerb::Raise,
            ActionVerb::Raise,
            ActionVerb::Fold,
        ]
    );
    assert_eq!(result.outcome, HandOutcome::Uncontested { winner: 1 });
    assert_eq!(money(&gm, 1), 24);
}

#[tokio::test]
async fn shared_board_splits_the_pot() {
    let Table { mut gm, .. } =
        table(["2c 3d", "4h 5d"], "8s 9s Ts Js Qs", [Vec::new(), Vec::new()]);
    gm.start_game().unwrap();
    let result = gm.manage_game().await.unwrap();

    let HandOutcome::Showdown(showdown) = &result.outcome else {
        panic!("expected showdown, got {:?}", result.outcome);
    };
    assert_eq!(showdown.winners, vec![1, 0]);
    assert_eq!(result.payouts, vec![(1, 2), (0, 2)]);
}

#[tokio::test]
async fn short_board_is_an_error_and_refunds() {
    let Table { mut gm, .. } = table(["Kc Kd", "2c 7d"], "Ks 9h", [Vec::new(), Vec::new()]);
    gm.start_game().unwrap();
    assert!(gm.manage_game().await.is_err());
    assert_eq!(gm.stake().pot(), 0);
    assert_eq!((money(&gm, 0), money(&gm, 1)), (20, 20));
}

#[tokio::test]
async fn display_events_follow_the_hand() {
    let (sink, mut rx) = events::channel();
    let agents: Vec<Box<dyn Agent>> = (0..2)
        .map(|_| Box::new(Scripted { plan: VecDeque::new(), log: Arc::default() }) as Box<dyn Agent>)
        .collect();
    let stake =
        FixedLimitStake::new(BettingRules::default(), vec![Player::new(0, 20), Player::new(1, 20)])
            .with_events(sink.clone());
    let dealer = FixedDealer { community: parse_cards("Ks 9h 4c 3s Jd").unwrap().into() };
    let mut gm = GameManager::new(stake, dealer, agents).with_events(sink);
    gm.assign_cards(&["Kc Kd".parse().unwrap(), "2c 7d".parse().unwrap()]).unwrap();
    gm.start_game().unwrap();
    gm.manage_game().await.unwrap();
    drop(gm);

    let mut boards = Vec::new();
    let mut payouts = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            TableEvent::Community(cards) => boards.push(cards.len()),
            TableEvent::Payout(p) => payouts.push(p),
            _ => {}
        }
    }
    assert_eq!(boards, vec![0, 3, 4, 5]);
    assert_eq!(payouts, vec![vec![(0, 4)]]);
}
