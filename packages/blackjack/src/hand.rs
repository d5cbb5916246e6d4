use std::fmt;

use serde::{Deserialize, Serialize};

use crate::card::{CardId, CardSet};

/// Highest total that does not bust.
pub const MAX_SCORE: u8 = 21;

/// Synthetic score of a natural; above every reachable bust total.
pub const BLACKJACK_SCORE: u8 = 32;

/// How a hand finished.
///
/// Ordered by strength: any total < `Blackjack`. `Bust` sorts last but never
/// wins a comparison; callers check it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalScore {
    Total(u8),
    Blackjack,
    Bust,
}

impl fmt::Display for FinalScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalScore::Total(n) => write!(f, "{n}"),
            FinalScore::Blackjack => f.write_str("blackjack"),
            FinalScore::Bust => f.write_str("bust"),
        }
    }
}

/// Whether a hand came from the deal or from splitting a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lineage {
    Dealt,
    Split,
}

/// Canonical identity of a hand state.
///
/// - one card: its symbol (`"7"`)
/// - two dealt cards: sorted symbols (`"6,10"`, `"A,10"`)
/// - two cards after a split: `"split:"` + original card + drawn card (`"split:8+3"`)
/// - three or more cards: the live totals (`"16"`, `"7/17"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandKey(String);

impl HandKey {
    pub fn single(cards: &CardSet, card: CardId) -> Self {
        Self(cards.symbol(card).to_string())
    }

    pub fn dealt(cards: &CardSet, first: CardId, second: CardId) -> Self {
        let (lo, hi) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self(format!("{},{}", cards.symbol(lo), cards.symbol(hi)))
    }

    pub fn split(cards: &CardSet, origin: CardId, drawn: CardId) -> Self {
        Self(format!(
            "split:{}+{}",
            cards.symbol(origin),
            cards.symbol(drawn)
        ))
    }

    pub fn drawn(totals: &[u8]) -> Self {
        let parts: Vec<String> = totals.iter().map(|t| t.to_string()).collect();
        Self(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HandKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Totals reachable after adding a card with `values` to a hand with `current` totals.
///
/// Deduplicated and sorted. Busting totals are dropped while any total is
/// still live; a bust hand keeps only its lowest total.
pub fn add_card_totals(current: &[u8], values: &[u8]) -> Vec<u8> {
    let mut all: Vec<u8> = current
        .iter()
        .flat_map(|t| values.iter().map(move |v| t + v))
        .collect();
    all.sort_unstable();
    all.dedup();
    if all.first().is_some_and(|&lowest| lowest <= MAX_SCORE) {
        all.retain(|&t| t <= MAX_SCORE);
    } else {
        all.truncate(1);
    }
    all
}

/// Best live total, or the lowest total when the hand is bust.
pub fn effective_score(totals: &[u8]) -> u8 {
    totals
        .iter()
        .copied()
        .filter(|&t| t <= MAX_SCORE)
        .max()
        .or_else(|| totals.iter().copied().min())
        .unwrap_or(0)
}

/// A natural: exactly two cards reaching 21.
pub fn is_natural(card_count: usize, totals: &[u8]) -> bool {
    card_count == 2 && effective_score(totals) == MAX_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(cards: &CardSet, symbols: &[&str]) -> Vec<CardId> {
        symbols.iter().map(|s| cards.find(s).unwrap()).collect()
    }

    fn hand_totals(cards: &CardSet, hand: &[CardId]) -> Vec<u8> {
        hand.iter().fold(vec![0], |totals, &id| {
            add_card_totals(&totals, &cards.get(id).values)
        })
    }

    #[test]
    fn test_hand_totals_simple() {
        let cards = CardSet::standard();
        assert_eq!(hand_totals(&cards, &ids(&cards, &["2", "3"])), vec![5]);
        assert_eq!(hand_totals(&cards, &ids(&cards, &["10", "10"])), vec![20]);
    }

    #[test]
    fn test_hand_totals_soft_ace() {
        let cards = CardSet::standard();
        assert_eq!(hand_totals(&cards, &ids(&cards, &["A", "6"])), vec![7, 17]);
    }

    #[test]
    fn test_hand_totals_hard_ace() {
        let cards = CardSet::standard();
        let totals = hand_totals(&cards, &ids(&cards, &["A", "6", "9"]));
        assert_eq!(totals, vec![16]);
        assert_eq!(effective_score(&totals), 16);
    }

    #[test]
    fn test_hand_totals_multiple_aces() {
        let cards = CardSet::standard();
        let totals = hand_totals(&cards, &ids(&cards, &["A", "A", "9"]));
        assert_eq!(totals, vec![11, 21]);
        assert_eq!(effective_score(&totals), 21);
    }

    #[test]
    fn test_bust_keeps_lowest_total() {
        let cards = CardSet::standard();
        let totals = hand_totals(&cards, &ids(&cards, &["10", "9", "5"]));
        assert_eq!(totals, vec![24]);
        assert_eq!(effective_score(&totals), 24);
    }

    #[test]
    fn test_is_natural() {
        let cards = CardSet::standard();
        let bj = hand_totals(&cards, &ids(&cards, &["A", "10"]));
        assert!(is_natural(2, &bj));
        let drawn = hand_totals(&cards, &ids(&cards, &["7", "7", "7"]));
        assert!(!is_natural(3, &drawn));
        let twenty = hand_totals(&cards, &ids(&cards, &["10", "10"]));
        assert!(!is_natural(2, &twenty));
    }

    #[test]
    fn test_final_score_order() {
        assert!(FinalScore::Total(21) < FinalScore::Blackjack);
        assert!(FinalScore::Total(17) < FinalScore::Total(18));
        assert!(BLACKJACK_SCORE > 31);
    }

    #[test]
    fn test_hand_keys() {
        let cards = CardSet::standard();
        let ten = cards.find("10").unwrap();
        let six = cards.find("6").unwrap();
        let eight = cards.find("8").unwrap();
        let three = cards.find("3").unwrap();
        assert_eq!(HandKey::dealt(&cards, ten, six).as_str(), "6,10");
        assert_eq!(HandKey::dealt(&cards, six, ten).as_str(), "6,10");
        assert_eq!(HandKey::split(&cards, eight, three).as_str(), "split:8+3");
        assert_eq!(HandKey::drawn(&[7, 17]).as_str(), "7/17");
        assert_eq!(HandKey::drawn(&[16]).as_str(), "16");
        assert_eq!(HandKey::single(&cards, ten).as_str(), "10");
    }
}
