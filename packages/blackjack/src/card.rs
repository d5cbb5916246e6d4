use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Index of a card outcome inside its [`CardSet`].
pub type CardId = usize;

/// Characters reserved by hand keys.
const RESERVED: [char; 4] = [',', '/', ':', '+'];

/// One drawable card value with its relative frequency in the shoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardOutcome {
    pub symbol: String,
    /// One value, or two for a card that may count either way (the ace).
    pub values: Vec<u8>,
    pub weight: f64,
}

impl CardOutcome {
    pub fn new(symbol: impl Into<String>, values: &[u8], weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            values: values.to_vec(),
            weight,
        }
    }

    /// Cards with more than one value are treated like aces.
    pub fn is_ace(&self) -> bool {
        self.values.len() > 1
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.symbol.is_empty() || self.symbol.contains(&RESERVED[..]) {
            return Err(EngineError::Configuration(format!(
                "Invalid card symbol '{}'",
                self.symbol
            )));
        }
        if self.symbol == "average" || self.symbol.starts_with("split") {
            return Err(EngineError::Configuration(format!(
                "Card symbol '{}' collides with a reserved key",
                self.symbol
            )));
        }
        if self.values.is_empty() || self.values.len() > 2 {
            return Err(EngineError::Configuration(format!(
                "Card '{}' must have one or two values, got {}",
                self.symbol,
                self.values.len()
            )));
        }
        if let Some(v) = self.values.iter().find(|v| !(1..=11).contains(*v)) {
            return Err(EngineError::Configuration(format!(
                "Card '{}' has value {v} outside 1..=11",
                self.symbol
            )));
        }
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(EngineError::Configuration(format!(
                "Card '{}' has non-positive weight {}",
                self.symbol, self.weight
            )));
        }
        Ok(())
    }
}

/// The immutable outcome set every build draws from.
///
/// Built once and handed to each build by reference. The shoe never depletes:
/// every draw sees the same weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CardOutcome>", into = "Vec<CardOutcome>")]
pub struct CardSet {
    outcomes: Vec<CardOutcome>,
    total_weight: f64,
}

impl CardSet {
    pub fn new(outcomes: Vec<CardOutcome>) -> Result<Self, EngineError> {
        if outcomes.is_empty() {
            return Err(EngineError::Configuration(
                "Card set must contain at least one outcome".to_string(),
            ));
        }
        for (i, outcome) in outcomes.iter().enumerate() {
            outcome.validate()?;
            if outcomes[..i].iter().any(|o| o.symbol == outcome.symbol) {
                return Err(EngineError::Configuration(format!(
                    "Duplicate card symbol '{}'",
                    outcome.symbol
                )));
            }
        }
        let total_weight = outcomes.iter().map(|o| o.weight).sum();
        Ok(Self {
            outcomes,
            total_weight,
        })
    }

    /// Single-deck proportions: ace through nine once, ten-valued cards four times.
    pub fn standard() -> Self {
        Self::with_multiplier(1.0)
    }

    /// Card counts of a `decks`-deck shoe (4 per rank and deck, 16 ten-valued).
    pub fn shoe(decks: u8) -> Result<Self, EngineError> {
        if decks == 0 {
            return Err(EngineError::Configuration(
                "A shoe needs at least one deck".to_string(),
            ));
        }
        Ok(Self::with_multiplier(4.0 * decks as f64))
    }

    fn with_multiplier(n: f64) -> Self {
        let mut outcomes = vec![CardOutcome::new("A", &[1, 11], n)];
        for v in 2..=9u8 {
            outcomes.push(CardOutcome::new(v.to_string(), &[v], n));
        }
        outcomes.push(CardOutcome::new("10", &[10], 4.0 * n));
        let total_weight = outcomes.iter().map(|o| o.weight).sum();
        Self {
            outcomes,
            total_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn get(&self, id: CardId) -> &CardOutcome {
        &self.outcomes[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CardId, &CardOutcome)> {
        self.outcomes.iter().enumerate()
    }

    pub fn ids(&self) -> std::ops::Range<CardId> {
        0..self.outcomes.len()
    }

    pub fn symbol(&self, id: CardId) -> &str {
        &self.outcomes[id].symbol
    }

    pub fn weight(&self, id: CardId) -> f64 {
        self.outcomes[id].weight
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Probability of drawing `id` on any single draw.
    pub fn probability(&self, id: CardId) -> f64 {
        self.outcomes[id].weight / self.total_weight
    }

    pub fn find(&self, symbol: &str) -> Option<CardId> {
        self.outcomes.iter().position(|o| o.symbol == symbol)
    }
}

impl TryFrom<Vec<CardOutcome>> for CardSet {
    type Error = EngineError;

    fn try_from(outcomes: Vec<CardOutcome>) -> Result<Self, Self::Error> {
        Self::new(outcomes)
    }
}

impl From<CardSet> for Vec<CardOutcome> {
    fn from(set: CardSet) -> Self {
        set.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_layout() {
        let cards = CardSet::standard();
        assert_eq!(cards.len(), 10);
        assert_eq!(cards.symbol(0), "A");
        assert_eq!(cards.symbol(9), "10");
        assert!(cards.get(0).is_ace());
        assert_eq!(cards.get(0).values, vec![1, 11]);
        assert_eq!(cards.total_weight(), 13.0);
    }

    #[test]
    fn test_six_deck_shoe_weights() {
        let cards = CardSet::shoe(6).unwrap();
        assert_eq!(cards.weight(cards.find("A").unwrap()), 24.0);
        assert_eq!(cards.weight(cards.find("7").unwrap()), 24.0);
        assert_eq!(cards.weight(cards.find("10").unwrap()), 96.0);
        assert_eq!(cards.total_weight(), 312.0);
    }

    #[test]
    fn test_shoe_and_standard_share_probabilities() {
        let standard = CardSet::standard();
        let shoe = CardSet::shoe(8).unwrap();
        for id in standard.ids() {
            assert!((standard.probability(id) - shoe.probability(id)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_zero_decks_rejected() {
        assert!(matches!(
            CardSet::shoe(0),
            Err(EngineError::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_outcomes_rejected() {
        let bad_weight = vec![CardOutcome::new("X", &[5], 0.0)];
        assert!(CardSet::new(bad_weight).is_err());

        let bad_value = vec![CardOutcome::new("X", &[12], 1.0)];
        assert!(CardSet::new(bad_value).is_err());

        let bad_symbol = vec![CardOutcome::new("1/2", &[5], 1.0)];
        assert!(CardSet::new(bad_symbol).is_err());

        let duplicate = vec![
            CardOutcome::new("X", &[5], 1.0),
            CardOutcome::new("X", &[6], 1.0),
        ];
        assert!(CardSet::new(duplicate).is_err());

        assert!(CardSet::new(Vec::new()).is_err());
    }

    #[test]
    fn test_find_unknown_symbol() {
        assert_eq!(CardSet::standard().find("K"), None);
    }
}
