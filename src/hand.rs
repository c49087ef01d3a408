use crate::cards::{parse_cards, Card};
use std::collections::HashSet;
use std::str::FromStr;

/// Most community cards a hand ever shows.
pub const MAX_COMMUNITY: usize = 5;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HandError {
    #[error("duplicate cards in hole cards")]
    DuplicateHoleCards,
    #[error("too many community cards: {0}")]
    TooManyCommunityCards(usize),
    #[error("duplicate community cards")]
    DuplicateCommunityCards,
    #[error("hole cards overlap with community cards")]
    Overlap,
    #[error("expected exactly two hole cards, got {0}")]
    HoleCount(usize),
    #[error("card parse error: {0}")]
    CardParse(String),
}

/// A player's two private hole cards, assigned once per hand.
///
/// ```
/// use holdem_limit::cards::{Card, Rank, Suit};
/// use holdem_limit::hand::HoleCards;
///
/// let hole = HoleCards::try_new(
///     Card::new(Rank::Ace, Suit::Spades),
///     Card::new(Rank::King, Suit::Spades),
/// ).unwrap();
/// assert_eq!(hole.as_array().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleCards(Card, Card);

impl HoleCards {
    pub fn try_new(a: Card, b: Card) -> Result<Self, HandError> {
        if a == b {
            return Err(HandError::DuplicateHoleCards);
        }
        Ok(Self(a, b))
    }

    pub fn from_slice(slice: &[Card]) -> Result<Self, HandError> {
        match slice {
            [a, b] => Self::try_new(*a, *b),
            _ => Err(HandError::HoleCount(slice.len())),
        }
    }

    pub fn first(&self) -> Card {
        self.0
    }

    pub fn second(&self) -> Card {
        self.1
    }

    pub fn as_array(&self) -> [Card; 2] {
        [self.0, self.1]
    }
}

impl FromStr for HoleCards {
    type Err = HandError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::CardParse(e.to_string()))?;
        Self::from_slice(&cards)
    }
}

/// Shared cards revealed over the flop, turn and river.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Community {
    cards: Vec<Card>,
}

impl Community {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_new(cards: Vec<Card>) -> Result<Self, HandError> {
        check_community(&cards)?;
        Ok(Self { cards })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }

    /// Append a dealt tranche, rejecting it whole if the result would be invalid.
    pub fn extend(&mut self, tranche: &[Card]) -> Result<(), HandError> {
        let mut next = self.cards.clone();
        next.extend_from_slice(tranche);
        check_community(&next)?;
        self.cards = next;
        Ok(())
    }
}

impl FromStr for Community {
    type Err = HandError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = parse_cards(s).map_err(|e| HandError::CardParse(e.to_string()))?;
        Community::try_new(cards)
    }
}

fn check_community(cards: &[Card]) -> Result<(), HandError> {
    if cards.len() > MAX_COMMUNITY {
        return Err(HandError::TooManyCommunityCards(cards.len()));
    }
    let set: HashSet<Card> = cards.iter().copied().collect();
    if set.len() != cards.len() {
        return Err(HandError::DuplicateCommunityCards);
    }
    Ok(())
}

/// Validate that hole cards and community cards can coexist in one deal.
///
/// ```
/// use holdem_limit::cards::parse_cards;
/// use holdem_limit::hand::{validate_deal, HoleCards};
///
/// let hole: HoleCards = "As Ks".parse().unwrap();
/// let community = parse_cards("2c 3c 4c").unwrap();
/// validate_deal(&hole, &community).unwrap();
/// ```
pub fn validate_deal(hole: &HoleCards, community: &[Card]) -> Result<(), HandError> {
    check_community(community)?;
    if hole.first() == hole.second() {
        return Err(HandError::DuplicateHoleCards);
    }
    if community.contains(&hole.first()) || community.contains(&hole.second()) {
        return Err(HandError::Overlap);
    }
    Ok(())
}
