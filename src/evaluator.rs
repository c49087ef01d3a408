use crate::cards::{Card, Rank};
use crate::hand::{validate_deal, HandError, HoleCards, MAX_COMMUNITY};
use core::cmp::Ordering;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Poker hand category from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum HandCategory {
    Nothing = 0,
    OnePair = 1,
    TwoPairs = 2,
    /// Three of a kind.
    Drill = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    /// Four of a kind.
    Poker = 7,
    StraightFlush = 8,
}

impl HandCategory {
    pub const fn label(self) -> &'static str {
        match self {
            HandCategory::Nothing => "Nothing",
            HandCategory::OnePair => "One pair",
            HandCategory::TwoPairs => "Two pairs",
            HandCategory::Drill => "Drill",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full house",
            HandCategory::Poker => "Poker",
            HandCategory::StraightFlush => "Straight flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category plus ordered tie-break values.
///
/// The derived ordering compares the category first and then the tie-break
/// values lexicographically, which is what [`TieBreakRule::Lexicographic`] uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue {
    category: HandCategory,
    tie_break: Vec<u8>,
}

impl HandValue {
    pub fn new(category: HandCategory, tie_break: Vec<u8>) -> Self {
        Self { category, tie_break }
    }

    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// Rank values (ace = 1) in the order they are compared.
    pub fn tie_break(&self) -> &[u8] {
        &self.tie_break
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category.label())?;
        for &v in &self.tie_break {
            match Rank::from_value(v) {
                Some(rank) => write!(f, " {}", rank.to_char())?,
                None => write!(f, " {v}")?,
            }
        }
        Ok(())
    }
}

/// How two hands of the same category are ranked against each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    /// Strict lexicographic order over the tie-break values.
    #[default]
    Lexicographic,
    /// Legacy ordering kept for replaying old game histories: the first hand
    /// wins as soon as any of its values beats the other's at the same index,
    /// even if an earlier index was lower. Not antisymmetric.
    FirstExceeding,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("expected 5 to 7 cards, got {0}")]
    CardCount(usize),
    #[error("card {0} appears more than once")]
    DuplicateCard(Card),
    #[error("best hand selection needs 5 community cards, got {0}")]
    CommunitySize(usize),
    #[error("invalid hand: {0}")]
    InvalidHand(#[from] HandError),
}

/// Rank 5 to 7 cards into a category with tie-break data.
///
/// A straight or flush needs every card to qualify, and values are strictly
/// consecutive with the ace counting as one, so `A 2 3 4 5` is a straight
/// and `T J Q K A` is not.
///
/// ```
/// use holdem_limit::cards::parse_cards;
/// use holdem_limit::evaluator::{calculate_hand, HandCategory};
///
/// let value = calculate_hand(&parse_cards("Qc Qd 9h 3s 2c").unwrap()).unwrap();
/// assert_eq!(value.category(), HandCategory::OnePair);
/// assert_eq!(value.tie_break(), &[12, 9, 3, 2]);
/// ```
pub fn calculate_hand(cards: &[Card]) -> Result<HandValue, EvalError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(EvalError::CardCount(cards.len()));
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for &c in cards {
        if !seen.insert(c) {
            return Err(EvalError::DuplicateCard(c));
        }
    }

    let mut values: Vec<u8> = cards.iter().map(|c| c.value()).collect();
    values.sort_unstable();
    let high = values[values.len() - 1];
    let is_straight = values.windows(2).all(|w| w[1] == w[0] + 1);
    let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
    let desc: Vec<u8> = values.iter().rev().copied().collect();

    if is_straight && is_flush {
        return Ok(HandValue::new(HandCategory::StraightFlush, vec![high]));
    }
    if is_straight {
        return Ok(HandValue::new(HandCategory::Straight, vec![high]));
    }
    if is_flush {
        return Ok(HandValue::new(HandCategory::Flush, desc));
    }

    let mut counts = [0u8; 14];
    for &v in &values {
        counts[v as usize] += 1;
    }
    // (count, value), biggest group first and higher value first within a size
    let mut groups: Vec<(u8, u8)> =
        (1u8..=13).rev().filter(|&v| counts[v as usize] > 0).map(|v| (counts[v as usize], v)).collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let (top_count, top) = groups[0];
    let (second_count, second) = groups.get(1).copied().unwrap_or((0, 0));
    let kickers = |used: &[u8], n: usize| -> Vec<u8> {
        desc.iter().copied().filter(|v| !used.contains(v)).take(n).collect()
    };

    let value = match (top_count, second_count) {
        (4, _) => {
            let mut tb = vec![top];
            tb.extend(kickers(&[top], 1));
            HandValue::new(HandCategory::Poker, tb)
        }
        (3, c) if c >= 2 => HandValue::new(HandCategory::FullHouse, vec![top, second]),
        (3, _) => {
            let mut tb = vec![top];
            tb.extend(kickers(&[top], 2));
            HandValue::new(HandCategory::Drill, tb)
        }
        (2, 2) => {
            let mut tb = vec![top, second];
            tb.extend(kickers(&[top, second], 1));
            HandValue::new(HandCategory::TwoPairs, tb)
        }
        (2, _) => {
            let mut tb = vec![top];
            tb.extend(kickers(&[top], 3));
            HandValue::new(HandCategory::OnePair, tb)
        }
        _ => HandValue::new(HandCategory::Nothing, desc.clone()),
    };
    Ok(value)
}

/// Compare two hands: category first, then tie-break values under `rule`.
///
/// ```
/// use holdem_limit::evaluator::{compare_hands, HandCategory, HandValue, TieBreakRule};
/// use std::cmp::Ordering;
///
/// let a = HandValue::new(HandCategory::TwoPairs, vec![5, 9]);
/// let b = HandValue::new(HandCategory::TwoPairs, vec![6, 1]);
/// assert_eq!(compare_hands(&a, &b, TieBreakRule::Lexicographic), Ordering::Less);
/// assert_eq!(compare_hands(&a, &b, TieBreakRule::FirstExceeding), Ordering::Greater);
/// ```
pub fn compare_hands(a: &HandValue, b: &HandValue, rule: TieBreakRule) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match rule {
        TieBreakRule::Lexicographic => a.tie_break.cmp(&b.tie_break),
        TieBreakRule::FirstExceeding => {
            let pairs = || a.tie_break.iter().zip(b.tie_break.iter());
            if pairs().any(|(x, y)| x > y) {
                Ordering::Greater
            } else if pairs().any(|(x, y)| y > x) {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        }
    }
}

/// Pick the best hand reachable from two hole cards and five community cards.
///
/// Candidates, in order: the community cards alone; each hole card in place of
/// each community card; both hole cards in place of each ordered pair of
/// distinct community cards. A candidate replaces the current best only when
/// it compares strictly greater under `rule`.
pub fn choose_best_hand(
    hole: &HoleCards,
    community: &[Card],
    rule: TieBreakRule,
) -> Result<HandValue, EvalError> {
    validate_deal(hole, community)?;
    if community.len() != MAX_COMMUNITY {
        return Err(EvalError::CommunitySize(community.len()));
    }

    let without = |skip: &[usize]| -> Vec<Card> {
        community.iter().enumerate().filter(|(k, _)| !skip.contains(k)).map(|(_, c)| *c).collect()
    };
    let mut best = calculate_hand(community)?;
    let mut consider = |candidate: Vec<Card>| -> Result<(), EvalError> {
        let value = calculate_hand(&candidate)?;
        if compare_hands(&value, &best, rule) == Ordering::Greater {
            best = value;
        }
        Ok(())
    };

    for i in 0..community.len() {
        for hole_card in hole.as_array() {
            let mut candidate = vec![hole_card];
            candidate.extend(without(&[i]));
            consider(candidate)?;
        }
        for j in (0..community.len()).filter(|&j| j != i) {
            let mut candidate = hole.as_array().to_vec();
            candidate.extend(without(&[i, j]));
            consider(candidate)?;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn eval(s: &str) -> HandValue {
        calculate_hand(&parse_cards(s).unwrap()).unwrap()
    }

    #[test]
    fn display_spells_tie_breaks_as_ranks() {
        assert_eq!(eval("6c 6h Kd 9s 4c").to_string(), "One pair 6 K 9 4");
        assert_eq!(eval("Ah Td 7s 5c 2d").to_string(), "Nothing T 7 5 2 A");
    }

    #[test]
    fn rejects_bad_card_counts_and_duplicates() {
        let four = parse_cards("2c 3d 4h 5s").unwrap();
        assert_eq!(calculate_hand(&four), Err(EvalError::CardCount(4)));
        let eight = parse_cards("2c 3d 4h 5s 6c 7d 8h 9s").unwrap();
        assert_eq!(calculate_hand(&eight), Err(EvalError::CardCount(8)));
        let dup = parse_cards("2c 2c 4h 5s 6c").unwrap();
        assert!(matches!(calculate_hand(&dup), Err(EvalError::DuplicateCard(_))));
    }

    #[test]
    fn tie_breaks_per_category() {
        assert_eq!(eval("9s 8s 7s 6s 5s").tie_break(), &[9]);
        assert_eq!(eval("9s 8d 7s 6s 5s").tie_break(), &[9]);
        assert_eq!(eval("Ks 9s 7s 3s 2s").tie_break(), &[13, 9, 7, 3, 2]);
        assert_eq!(eval("Kc Kd Kh Ks 2s").tie_break(), &[13, 2]);
        assert_eq!(eval("Tc Td Th 2s 2h").tie_break(), &[10, 2]);
        assert_eq!(eval("Qc Qd Qh 9s 2c").tie_break(), &[12, 9, 2]);
        assert_eq!(eval("Jc Jd 9c 9h 2s").tie_break(), &[11, 9, 2]);
        assert_eq!(eval("Kh 7d 6s 5c 2d").tie_break(), &[13, 7, 6, 5, 2]);
    }

    #[test]
    fn ace_is_low() {
        let wheel = eval("Ac 2d 3h 4s 5c");
        assert_eq!(wheel.category(), HandCategory::Straight);
        assert_eq!(wheel.tie_break(), &[5]);

        let broadway = eval("Tc Jd Qh Ks Ac");
        assert_eq!(broadway.category(), HandCategory::Nothing);
        assert_eq!(broadway.tie_break(), &[13, 12, 11, 10, 1]);

        // aces are the weakest pair
        assert!(eval("Ac Ad 9h 4s 2c") < eval("2h 2s 9c 4d 3c"));
    }

    #[test]
    fn seven_card_groupings() {
        let two_trips = eval("Kc Kd Kh 9s 9c 9d 2s");
        assert_eq!(two_trips.category(), HandCategory::FullHouse);
        assert_eq!(two_trips.tie_break(), &[13, 9]);

        let trips_two_pairs = eval("5c 5d 5h 9s 9c Jd Js");
        assert_eq!(trips_two_pairs.category(), HandCategory::FullHouse);
        assert_eq!(trips_two_pairs.tie_break(), &[5, 11]);

        let three_pairs = eval("Kc Kd 9h 9s 4c 4d 2s");
        assert_eq!(three_pairs.category(), HandCategory::TwoPairs);
        assert_eq!(three_pairs.tie_break(), &[13, 9, 4]);

        let quads_and_trips = eval("8c 8d 8h 8s Qc Qd Qh");
        assert_eq!(quads_and_trips.category(), HandCategory::Poker);
        assert_eq!(quads_and_trips.tie_break(), &[8, 12]);
    }

    #[test]
    fn straight_needs_every_card_in_sequence() {
        assert_eq!(eval("2c 3d 4h 5s 6c 7d").category(), HandCategory::Straight);
        assert_eq!(eval("2c 3d 4h 5s 6c Kd").category(), HandCategory::Nothing);
        assert_eq!(eval("2h 3h 4h 5h 6h 9h").category(), HandCategory::Flush);
    }

    #[test]
    fn compare_rules_agree_on_categories() {
        let pair = HandValue::new(HandCategory::OnePair, vec![2, 3, 4, 5]);
        let flush = HandValue::new(HandCategory::Flush, vec![7, 5, 4, 3, 2]);
        for rule in [TieBreakRule::Lexicographic, TieBreakRule::FirstExceeding] {
            assert_eq!(compare_hands(&flush, &pair, rule), Ordering::Greater);
            assert_eq!(compare_hands(&pair, &flush, rule), Ordering::Less);
            assert_eq!(compare_hands(&pair, &pair, rule), Ordering::Equal);
        }
    }

    #[test]
    fn choose_best_hand_uses_hole_cards() {
        let hole: HoleCards = "Ah Kh".parse().unwrap();
        let community = parse_cards("Qh Jh 2h 2c 9d").unwrap();
        let best = choose_best_hand(&hole, &community, TieBreakRule::Lexicographic).unwrap();
        assert_eq!(best.category(), HandCategory::Flush);
        assert_eq!(best.tie_break(), &[13, 12, 11, 2, 1]);
    }

    #[test]
    fn choose_best_hand_requires_full_community() {
        let hole: HoleCards = "Ah Kh".parse().unwrap();
        let flop = parse_cards("Qh Jh 2h").unwrap();
        assert_eq!(
            choose_best_hand(&hole, &flop, TieBreakRule::Lexicographic),
            Err(EvalError::CommunitySize(3))
        );
        let overlapping = parse_cards("Ah Jh 2h 3c 4c").unwrap();
        assert!(matches!(
            choose_best_hand(&hole, &overlapping, TieBreakRule::Lexicographic),
            Err(EvalError::InvalidHand(HandError::Overlap))
        ));
    }
}
