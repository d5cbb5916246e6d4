use log::debug;
use serde::Serialize;

use crate::card::CardSet;
use crate::dealer::DealerRef;
use crate::graph::{HandGraph, Shape};
use crate::outcome::Outcome;
use crate::player::DecisionTable;
use crate::EngineError;

/// Expected result of playing every dealt hand against one dealer reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpCardSummary {
    #[serde(skip)]
    pub dealer: DealerRef,
    /// Up-card symbol, or `"average"`
    pub up_card: String,
    /// Probability of this up-card
    pub frequency: f64,
    pub outcome: Outcome,
    /// Expected units staked per round
    pub turnover: f64,
}

/// Whole-game expectation of a full build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Weighted over every up-card, each hand played knowing the up-card
    pub outcome: Outcome,
    pub turnover: f64,
    /// Payout advantage per unit staked
    pub return_per_unit: f64,
    pub by_up_card: Vec<UpCardSummary>,
    /// Every hand played against the averaged dealer
    pub against_average: UpCardSummary,
}

/// Probability of being dealt exactly the unordered pair `[a, b]`.
pub fn deal_probability(cards: &CardSet, a: usize, b: usize) -> f64 {
    let p = cards.probability(a) * cards.probability(b);
    if a == b {
        p
    } else {
        2.0 * p
    }
}

pub fn summarize(
    cards: &CardSet,
    graph: &HandGraph,
    decisions: &DecisionTable,
) -> Result<Summary, EngineError> {
    let column = |dealer: DealerRef, frequency: f64| -> Result<UpCardSummary, EngineError> {
        let mut outcome = Outcome::default();
        let mut turnover = 0.0;
        for &id in graph.initial_hands() {
            let Shape::Dealt([a, b]) = graph.node(id).shape else {
                continue;
            };
            let record = decisions.record(cards, id, dealer).ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "no decision for {} vs {}",
                    graph.node(id).key,
                    dealer.key(cards)
                ))
            })?;
            let weight = deal_probability(cards, a, b);
            let played = record.preferred_evaluation();
            outcome.accumulate(&played.outcome, weight);
            turnover += weight * played.stake;
        }
        outcome.ensure_complete(&format!("summary vs {}", dealer.key(cards)))?;
        Ok(UpCardSummary {
            dealer,
            up_card: dealer.key(cards),
            frequency,
            outcome,
            turnover,
        })
    };

    let by_up_card = cards
        .ids()
        .map(|card| column(DealerRef::UpCard(card), cards.probability(card)))
        .collect::<Result<Vec<_>, EngineError>>()?;
    let against_average = column(DealerRef::Average, 1.0)?;

    let mut outcome = Outcome::default();
    let mut turnover = 0.0;
    for up in &by_up_card {
        outcome.accumulate(&up.outcome, up.frequency);
        turnover += up.frequency * up.turnover;
    }
    outcome.ensure_complete("summary")?;
    let return_per_unit = outcome.advantage.payout / turnover;
    debug!(
        "Summary: payout {:.6}, turnover {:.6}",
        outcome.advantage.payout, turnover
    );

    Ok(Summary {
        outcome,
        turnover,
        return_per_unit,
        by_up_card,
        against_average,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deal_probabilities_sum_to_one() {
        let cards = CardSet::shoe(6).unwrap();
        let mut total = 0.0;
        for a in cards.ids() {
            for b in a..cards.len() {
                total += deal_probability(&cards, a, b);
            }
        }
        assert!((total - 1.0).abs() < 1e-12);
        let ten = cards.find("10").unwrap();
        assert!((deal_probability(&cards, ten, ten) - 16.0 / 169.0).abs() < 1e-12);
        assert!((deal_probability(&cards, 0, ten) - 8.0 / 169.0).abs() < 1e-12);
    }
}
