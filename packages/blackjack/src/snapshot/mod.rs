use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::card::CardSet;
use crate::dealer::{DealerRef, DealerTable, STAND_THRESHOLD};
use crate::distribution::FinalScoreDistribution;
use crate::graph::{HandGraph, HandState};
use crate::player::{DecisionRecord, DecisionTable, Overrides};
use crate::summary::{summarize, Summary};
use crate::{CasinoRules, EngineError, LookupMiss, Strategy};

fn default_stand_threshold() -> u8 {
    STAND_THRESHOLD
}

/// How the player side is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSettings {
    #[serde(default)]
    pub strategy: Strategy,
    /// Dealer stands at or above this score
    #[serde(default = "default_stand_threshold")]
    pub stand_threshold: u8,
    #[serde(default)]
    pub overrides: Overrides,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            stand_threshold: STAND_THRESHOLD,
            overrides: Overrides::new(),
        }
    }
}

pub fn default_casino_rules() -> CasinoRules {
    CasinoRules::default()
}

pub fn default_player_settings() -> PlayerSettings {
    PlayerSettings::default()
}

/// Immutable result of one full build.
#[derive(Debug, Clone)]
pub struct Snapshot {
    cards: CardSet,
    rules: CasinoRules,
    settings: PlayerSettings,
    graph: HandGraph,
    dealer: DealerTable,
    decisions: DecisionTable,
    summary: Summary,
}

/// Derive everything from scratch: hand graph, dealer table, decisions, summary.
pub fn build_everything(
    cards: &CardSet,
    rules: &CasinoRules,
    settings: &PlayerSettings,
) -> Result<Snapshot, EngineError> {
    info!(
        "Building odds: {} card outcomes, strategy {}, dealer stands on {}",
        cards.len(),
        settings.strategy,
        settings.stand_threshold
    );
    crate::dealer::validate_threshold(settings.stand_threshold)?;

    let graph = HandGraph::build(cards, rules)?;
    debug!("Hand graph ready: {} states", graph.len());

    for (hand, dealer, action) in settings.overrides.iter() {
        if graph.find(hand.as_str()).is_none() || DealerRef::parse(dealer, cards).is_none() {
            warn!("Override {action} for {hand} vs {dealer} matches no hand state");
        }
    }

    let dealer = DealerTable::evaluate(
        &graph,
        cards,
        settings.stand_threshold,
        rules.dealer_hits_soft_17,
    )?;
    debug!("Dealer table ready");

    let decisions = DecisionTable::decide(
        &graph,
        cards,
        &dealer,
        rules,
        settings.strategy,
        &settings.overrides,
    )?;
    debug!("Decision table ready");

    let summary = summarize(cards, &graph, &decisions)?;
    info!(
        "Build finished: {} hand states, payout {:.4}%, turnover {:.4}",
        graph.len(),
        summary.outcome.advantage.payout * 100.0,
        summary.turnover
    );

    Ok(Snapshot {
        cards: cards.clone(),
        rules: *rules,
        settings: settings.clone(),
        graph,
        dealer,
        decisions,
        summary,
    })
}

impl Snapshot {
    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    pub fn rules(&self) -> &CasinoRules {
        &self.rules
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn graph(&self) -> &HandGraph {
        &self.graph
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn dealer_table(&self) -> &DealerTable {
        &self.dealer
    }

    pub fn hand(&self, key: &str) -> Result<&HandState, LookupMiss> {
        self.graph
            .find(key)
            .ok_or_else(|| LookupMiss::Hand(key.to_string()))
    }

    pub fn dealer_ref(&self, key: &str) -> Result<DealerRef, LookupMiss> {
        DealerRef::parse(key, &self.cards).ok_or_else(|| LookupMiss::Dealer(key.to_string()))
    }

    /// Final-score distribution of the dealer for an up-card symbol or `"average"`.
    pub fn dealer_distribution(&self, key: &str) -> Result<&FinalScoreDistribution, LookupMiss> {
        Ok(self.dealer.distribution(self.dealer_ref(key)?))
    }

    pub fn decision(&self, hand: &str, dealer: &str) -> Result<&DecisionRecord, LookupMiss> {
        let state = self.hand(hand)?;
        let dealer_ref = self.dealer_ref(dealer)?;
        self.decisions
            .record(&self.cards, state.id, dealer_ref)
            .ok_or_else(|| LookupMiss::Decision {
                hand: hand.to_string(),
                dealer: dealer.to_string(),
            })
    }

    /// Keys of every hand that carries decisions, in graph order.
    pub fn hand_keys(&self) -> Vec<&str> {
        self.graph
            .nodes()
            .iter()
            .filter(|hand| !hand.is_single())
            .map(|hand| hand.key.as_str())
            .collect()
    }
}
