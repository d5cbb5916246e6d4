use log::debug;
use serde::Serialize;

use crate::card::{CardId, CardSet};
use crate::distribution::FinalScoreDistribution;
use crate::graph::HandGraph;
use crate::hand::MAX_SCORE;
use crate::EngineError;

/// Default dealer stand threshold.
pub const STAND_THRESHOLD: u8 = 17;

/// Key of the up-card-averaged dealer reference.
pub const AVERAGE_KEY: &str = "average";

/// What the player is deciding against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DealerRef {
    UpCard(CardId),
    /// Up-card not known yet: the frequency-weighted mix of every up-card.
    Average,
}

impl DealerRef {
    /// Every reference in table order: up-cards, then the average.
    pub fn all(cards: &CardSet) -> Vec<DealerRef> {
        cards
            .ids()
            .map(DealerRef::UpCard)
            .chain(std::iter::once(DealerRef::Average))
            .collect()
    }

    pub fn parse(key: &str, cards: &CardSet) -> Option<DealerRef> {
        if key == AVERAGE_KEY {
            Some(DealerRef::Average)
        } else {
            cards.find(key).map(DealerRef::UpCard)
        }
    }

    pub fn key(&self, cards: &CardSet) -> String {
        match self {
            DealerRef::UpCard(card) => cards.symbol(*card).to_string(),
            DealerRef::Average => AVERAGE_KEY.to_string(),
        }
    }

    /// Column of this reference in per-dealer tables.
    pub fn column(&self, cards: &CardSet) -> usize {
        match self {
            DealerRef::UpCard(card) => *card,
            DealerRef::Average => cards.len(),
        }
    }
}

/// Final-score distributions of the dealer, one per up-card plus their average.
#[derive(Debug, Clone, Serialize)]
pub struct DealerTable {
    stand_threshold: u8,
    hits_soft_17: bool,
    by_up_card: Vec<FinalScoreDistribution>,
    average: FinalScoreDistribution,
}

impl DealerTable {
    /// Hit below `stand_threshold`, otherwise stand; never double or split.
    pub fn evaluate(
        graph: &HandGraph,
        cards: &CardSet,
        stand_threshold: u8,
        hits_soft_17: bool,
    ) -> Result<Self, EngineError> {
        validate_threshold(stand_threshold)?;

        let resolved = graph.backward_induction(|hand, resolved| {
            // The up-card always gets its hole card.
            let stands = !hand.is_single()
                && hand.effective_score >= stand_threshold
                && !(hits_soft_17 && hand.is_soft && hand.effective_score == 17);
            if !hand.is_active || stands {
                return Ok(FinalScoreDistribution::point(hand.final_score()));
            }
            let children = hand
                .children
                .iter()
                .map(|edge| Ok((cards.weight(edge.card), resolved.get(edge.to)?)))
                .collect::<Result<Vec<_>, EngineError>>()?;
            let dist = FinalScoreDistribution::mixture(children);
            dist.ensure_normalized(&format!("dealer {}", hand.key))?;
            Ok(dist)
        })?;

        let by_up_card: Vec<FinalScoreDistribution> = cards
            .ids()
            .map(|card| resolved[graph.up_card(card)])
            .collect();
        let average = FinalScoreDistribution::mixture(
            cards.ids().map(|card| (cards.weight(card), &by_up_card[card])),
        );
        average.ensure_normalized("dealer average")?;

        for card in cards.ids() {
            debug!(
                "Dealer {}: bust {:.6}",
                cards.symbol(card),
                by_up_card[card].bust()
            );
        }

        Ok(Self {
            stand_threshold,
            hits_soft_17,
            by_up_card,
            average,
        })
    }

    pub fn stand_threshold(&self) -> u8 {
        self.stand_threshold
    }

    pub fn hits_soft_17(&self) -> bool {
        self.hits_soft_17
    }

    pub fn distribution(&self, dealer: DealerRef) -> &FinalScoreDistribution {
        match dealer {
            DealerRef::UpCard(card) => &self.by_up_card[card],
            DealerRef::Average => &self.average,
        }
    }

    pub fn up_card(&self, card: CardId) -> &FinalScoreDistribution {
        &self.by_up_card[card]
    }

    pub fn average(&self) -> &FinalScoreDistribution {
        &self.average
    }
}

pub fn validate_threshold(stand_threshold: u8) -> Result<(), EngineError> {
    if !(2..=MAX_SCORE).contains(&stand_threshold) {
        return Err(EngineError::Configuration(format!(
            "Stand threshold {stand_threshold} outside 2..={MAX_SCORE}"
        )));
    }
    Ok(())
}
