use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::card::CardSet;
use crate::dealer::{DealerRef, DealerTable};
use crate::distribution::FinalScoreDistribution;
use crate::graph::{Edge, HandGraph, HandId, HandState, Resolved};
use crate::hand::HandKey;
use crate::outcome::{Outcome, Payout};
use crate::{CasinoRules, EngineError, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
}

impl Action {
    /// Tie-break order of every strategy.
    pub const PRIORITY: [Action; 4] = [Action::Stand, Action::Hit, Action::Double, Action::Split];

    pub fn priority(&self) -> usize {
        match self {
            Action::Stand => 0,
            Action::Hit => 1,
            Action::Double => 2,
            Action::Split => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::Double => "double",
            Action::Split => "split",
        }
    }

    /// One-letter code used in strategy tables.
    pub fn symbol(&self) -> &'static str {
        match self {
            Action::Stand => "S",
            Action::Hit => "H",
            Action::Double => "D",
            Action::Split => "P",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::PRIORITY
            .into_iter()
            .find(|action| action.name() == s || action.symbol() == s)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Unknown action '{s}'. Options: stand, hit, double, split"
                ))
            })
    }
}

/// One forced action, as carried in settings and messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub hand: String,
    pub dealer: String,
    pub action: Action,
}

/// User-forced actions keyed by (hand key, dealer reference key).
///
/// Pure input to a build; records never store them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<OverrideEntry>", into = "Vec<OverrideEntry>")]
pub struct Overrides {
    entries: BTreeMap<(HandKey, String), Action>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hand: &str, dealer: &str, action: Action) -> Option<Action> {
        self.entries
            .insert((HandKey::from(hand), dealer.to_string()), action)
    }

    pub fn remove(&mut self, hand: &str, dealer: &str) -> Option<Action> {
        self.entries
            .remove(&(HandKey::from(hand), dealer.to_string()))
    }

    pub fn get(&self, hand: &HandKey, dealer: &str) -> Option<Action> {
        self.entries.get(&(hand.clone(), dealer.to_string())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HandKey, &str, Action)> {
        self.entries
            .iter()
            .map(|((hand, dealer), action)| (hand, dealer.as_str(), *action))
    }
}

impl From<Vec<OverrideEntry>> for Overrides {
    fn from(list: Vec<OverrideEntry>) -> Self {
        let mut overrides = Overrides::new();
        for entry in list {
            overrides.insert(&entry.hand, &entry.dealer, entry.action);
        }
        overrides
    }
}

impl From<Overrides> for Vec<OverrideEntry> {
    fn from(overrides: Overrides) -> Self {
        overrides
            .entries
            .into_iter()
            .map(|((hand, dealer), action)| OverrideEntry {
                hand: hand.as_str().to_string(),
                dealer,
                action,
            })
            .collect()
    }
}

/// Puts a forced action first; the rest keep their ranking.
pub fn apply_override(ranked: &[Action], forced: Option<Action>) -> Vec<Action> {
    match forced {
        Some(action) if ranked.contains(&action) => std::iter::once(action)
            .chain(ranked.iter().copied().filter(|a| *a != action))
            .collect(),
        _ => ranked.to_vec(),
    }
}

/// How one action plays out against one dealer reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionEvaluation {
    pub action: Action,
    /// Final scores of one wager (for a split: either of the two hands)
    pub distribution: FinalScoreDistribution,
    pub outcome: Outcome,
    /// Expected units staked, counting doubles and split hands
    pub stake: f64,
}

/// Decision for one hand against one dealer reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    /// Legal actions in priority order
    pub evaluations: Vec<ActionEvaluation>,
    /// Strategy ranking, best first
    pub ranked: Vec<Action>,
    /// Effective order; the first entry is what gets played
    pub preferred_order: Vec<Action>,
    pub overridden: Option<Action>,
}

impl DecisionRecord {
    pub fn preferred(&self) -> Action {
        self.preferred_order[0]
    }

    pub fn evaluation(&self, action: Action) -> Option<&ActionEvaluation> {
        self.evaluations.iter().find(|e| e.action == action)
    }

    pub fn distribution(&self, action: Action) -> Option<&FinalScoreDistribution> {
        self.evaluation(action).map(|e| &e.distribution)
    }

    pub fn preferred_evaluation(&self) -> &ActionEvaluation {
        let preferred = self.preferred();
        self.evaluations
            .iter()
            .find(|e| e.action == preferred)
            .unwrap_or(&self.evaluations[0])
    }

    pub fn offers(&self, action: Action) -> bool {
        self.evaluation(action).is_some()
    }
}

/// Decision records for every hand of two or more cards, per dealer reference.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTable {
    /// `columns[dealer column][hand id]`
    columns: Vec<Vec<Option<DecisionRecord>>>,
}

impl DecisionTable {
    pub fn decide(
        graph: &HandGraph,
        cards: &CardSet,
        dealer: &DealerTable,
        rules: &CasinoRules,
        strategy: Strategy,
        overrides: &Overrides,
    ) -> Result<Self, EngineError> {
        let columns = DealerRef::all(cards)
            .into_iter()
            .map(|dealer_ref| {
                let column = Column {
                    graph,
                    cards,
                    rules,
                    strategy,
                    overrides,
                    dealer_key: dealer_ref.key(cards),
                    dealer: dealer.distribution(dealer_ref),
                };
                let records = graph.backward_induction(|hand, resolved| column.record(hand, resolved))?;
                debug!("Decisions against {} resolved", column.dealer_key);
                Ok(records)
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(Self { columns })
    }

    pub fn record(&self, cards: &CardSet, hand: HandId, dealer: DealerRef) -> Option<&DecisionRecord> {
        self.columns
            .get(dealer.column(cards))?
            .get(hand)?
            .as_ref()
    }
}

/// Everything needed to resolve one dealer reference.
struct Column<'a> {
    graph: &'a HandGraph,
    cards: &'a CardSet,
    rules: &'a CasinoRules,
    strategy: Strategy,
    overrides: &'a Overrides,
    dealer_key: String,
    dealer: &'a FinalScoreDistribution,
}

impl Column<'_> {
    fn record(
        &self,
        hand: &HandState,
        resolved: &Resolved<Option<DecisionRecord>>,
    ) -> Result<Option<DecisionRecord>, EngineError> {
        if hand.is_single() {
            return Ok(None);
        }

        let mut evaluations = vec![self.stand(hand)];
        if hand.is_active {
            evaluations.push(self.hit(hand, resolved)?);
        }
        if hand.can_double {
            evaluations.push(self.double(hand));
        }
        if hand.can_split {
            evaluations.push(self.split(hand, resolved)?);
        }
        for evaluation in &evaluations {
            let context = format!("{} {} vs {}", hand.key, evaluation.action, self.dealer_key);
            evaluation.distribution.ensure_normalized(&context)?;
            evaluation.outcome.ensure_complete(&context)?;
        }

        let ranked = self.strategy.rank(&evaluations);
        let forced = self.overrides.get(&hand.key, &self.dealer_key);
        let overridden = match forced {
            Some(action) if !ranked.contains(&action) => {
                warn!(
                    "Ignoring override {} for {} vs {}: not a legal action",
                    action, hand.key, self.dealer_key
                );
                None
            }
            other => other,
        };
        let preferred_order = apply_override(&ranked, overridden);

        Ok(Some(DecisionRecord {
            evaluations,
            ranked,
            preferred_order,
            overridden,
        }))
    }

    fn stand(&self, hand: &HandState) -> ActionEvaluation {
        let distribution = FinalScoreDistribution::point(hand.final_score());
        let payout = if hand.is_blackjack && self.rules.blackjack_payout {
            Payout::BLACKJACK
        } else {
            Payout::EVEN
        };
        ActionEvaluation {
            action: Action::Stand,
            distribution,
            outcome: Outcome::versus(&distribution, self.dealer, payout),
            stake: 1.0,
        }
    }

    /// Draw, then keep playing each child the way it prefers.
    fn hit(
        &self,
        hand: &HandState,
        resolved: &Resolved<Option<DecisionRecord>>,
    ) -> Result<ActionEvaluation, EngineError> {
        let children = self.preferred_children(hand, &hand.children, resolved)?;
        let distribution = FinalScoreDistribution::mixture(
            children
                .iter()
                .map(|(weight, child)| (*weight, &child.distribution)),
        );
        Ok(ActionEvaluation {
            action: Action::Hit,
            distribution,
            outcome: Outcome::versus(&distribution, self.dealer, Payout::EVEN),
            stake: 1.0,
        })
    }

    /// Exactly one more card, then stand, for twice the stake.
    fn double(&self, hand: &HandState) -> ActionEvaluation {
        let points: Vec<(f64, FinalScoreDistribution)> = hand
            .children
            .iter()
            .map(|edge| {
                let child = self.graph.node(edge.to);
                (
                    self.cards.weight(edge.card),
                    FinalScoreDistribution::point(child.final_score()),
                )
            })
            .collect();
        let distribution =
            FinalScoreDistribution::mixture(points.iter().map(|(weight, dist)| (*weight, dist)));
        ActionEvaluation {
            action: Action::Double,
            distribution,
            outcome: Outcome::versus(&distribution, self.dealer, Payout::DOUBLED),
            stake: 2.0,
        }
    }

    /// Two independent wagers, each played the way its post-split hand prefers.
    fn split(
        &self,
        hand: &HandState,
        resolved: &Resolved<Option<DecisionRecord>>,
    ) -> Result<ActionEvaluation, EngineError> {
        let children = self.preferred_children(hand, &hand.split_children, resolved)?;
        let total_weight: f64 = children.iter().map(|(weight, _)| weight).sum();
        let distribution = FinalScoreDistribution::mixture(
            children
                .iter()
                .map(|(weight, child)| (*weight, &child.distribution)),
        );
        let mut per_hand = Outcome::default();
        let mut stake = 0.0;
        for (weight, child) in &children {
            let share = weight / total_weight;
            per_hand.accumulate(&child.outcome, share);
            stake += share * child.stake;
        }
        Ok(ActionEvaluation {
            action: Action::Split,
            distribution,
            outcome: per_hand.repeated(2.0),
            stake: 2.0 * stake,
        })
    }

    /// Preferred evaluations of the states behind `edges`, with their draw weights.
    fn preferred_children<'r>(
        &self,
        hand: &HandState,
        edges: &[Edge],
        resolved: &'r Resolved<Option<DecisionRecord>>,
    ) -> Result<Vec<(f64, &'r ActionEvaluation)>, EngineError> {
        edges
            .iter()
            .map(|edge| {
                let record = resolved.get(edge.to)?.as_ref().ok_or_else(|| {
                    EngineError::InvariantViolation(format!(
                        "{} leads to {} which has no decision",
                        hand.key,
                        self.graph.node(edge.to).key
                    ))
                })?;
                Ok((self.cards.weight(edge.card), record.preferred_evaluation()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests;
