//! holdem-limit: heads-up fixed-limit Texas Hold'em
//!
//! Goals:
//! - Hand evaluation over 5 to 7 cards with pluggable tie-break ordering
//! - A fixed-limit betting state machine where every action applies fully or not at all
//! - Async orchestration of agents (artificial or human) over a seeded deck
//!
//! ## Quick start: rank a hand
//! ```
//! use holdem_limit::cards::parse_cards;
//! use holdem_limit::evaluator::{calculate_hand, choose_best_hand, HandCategory, TieBreakRule};
//! use holdem_limit::hand::HoleCards;
//!
//! let five = parse_cards("9h 9d 9s Kc Kd").unwrap();
//! assert_eq!(calculate_hand(&five).unwrap().category(), HandCategory::FullHouse);
//!
//! let hole: HoleCards = "Qh Jh".parse().unwrap();
//! let community = parse_cards("9h Th Kh 2c 3d").unwrap();
//! let best = choose_best_hand(&hole, &community, TieBreakRule::Lexicographic).unwrap();
//! assert_eq!(best.category(), HandCategory::StraightFlush);
//! ```
//!
//! ## Playing
//! Run a bot-vs-bot session, or take seat 0 yourself:
//! ```sh
//! cargo run --bin holdem-limit -- --hands 20 --seed 7
//! cargo run --bin holdem-limit -- --human
//! ```

pub mod agents;
pub mod cards;
pub mod config;
pub mod dealer;
pub mod deck;
pub mod evaluator;
pub mod events;
pub mod game;
pub mod hand;
pub mod logging;
pub mod oracle;
pub mod player;
pub mod session;
pub mod stake;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
