//! Display notifications for whatever renders the table.
//!
//! Nothing in the engine waits on these; a missing or dropped receiver is fine.

use crate::cards::Card;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ActionVerb {
    SmallBlind,
    BigBlind,
    Bet,
    Call,
    Raise,
    Check,
    Fold,
}

impl ActionVerb {
    pub fn label(self) -> &'static str {
        match self {
            ActionVerb::SmallBlind => "SB",
            ActionVerb::BigBlind => "BB",
            ActionVerb::Bet => "BET",
            ActionVerb::Call => "CALL",
            ActionVerb::Raise => "RAISE",
            ActionVerb::Check => "CHECK",
            ActionVerb::Fold => "FOLD",
        }
    }
}

/// One accepted action, in the order the stake applied it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRecord {
    pub player: usize,
    pub verb: ActionVerb,
    /// Money moved into the pot by this action.
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableEvent {
    /// Stacks by player index, plus the pot.
    Money { stacks: Vec<(usize, u64)>, pot: u64 },
    Action { player: usize, verb: ActionVerb },
    /// All community cards revealed so far.
    Community(Vec<Card>),
    /// Pot payouts at the end of a hand, by player index.
    Payout(Vec<(usize, u64)>),
}

#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<TableEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<TableEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: TableEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                tracing::trace!("table event receiver dropped");
            }
        }
    }
}

/// Create a connected sink/receiver pair.
pub fn channel() -> (EventSink, UnboundedReceiver<TableEvent>) {
    let (tx, rx) = unbounded_channel();
    (EventSink::new(tx), rx)
}
