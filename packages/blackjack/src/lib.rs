mod card;
mod dealer;
mod distribution;
mod error;
mod graph;
mod hand;
mod outcome;
mod player;
mod rules;
mod snapshot;
mod strategy;
mod summary;

pub use card::{CardId, CardOutcome, CardSet};
pub use dealer::{validate_threshold, DealerRef, DealerTable, AVERAGE_KEY, STAND_THRESHOLD};
pub use distribution::{FinalScoreDistribution, MASS_TOLERANCE};
pub use error::{EngineError, LookupMiss};
pub use graph::{Edge, HandGraph, HandId, HandState, Resolved, Shape};
pub use hand::{
    add_card_totals, effective_score, FinalScore, HandKey, Lineage,
    BLACKJACK_SCORE, MAX_SCORE,
};
pub use outcome::{breakdown, Advantage, Breakdown, Outcome, Payout};
pub use player::{
    apply_override, Action, ActionEvaluation, DecisionRecord, DecisionTable, OverrideEntry,
    Overrides,
};
pub use rules::{CasinoRules, DoublingMode, RulePreset, SplitOptions};
pub use snapshot::{
    build_everything, default_casino_rules, default_player_settings, PlayerSettings, Snapshot,
};
pub use strategy::Strategy;
pub use summary::{deal_probability, summarize, Summary, UpCardSummary};
