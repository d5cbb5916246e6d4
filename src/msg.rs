use blackjack::{
    Action, ActionEvaluation, CardSet, CasinoRules, FinalScoreDistribution, Outcome,
    PlayerSettings,
};
use serde::{Deserialize, Serialize};

pub use crate::state::Config;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct InstantiateMsg {
    /// Card outcomes; the standard deck weights when omitted
    #[serde(default)]
    pub cards: Option<CardSet>,
    #[serde(default)]
    pub rules: Option<CasinoRules>,
    #[serde(default)]
    pub settings: Option<PlayerSettings>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    UpdateRules {
        rules: CasinoRules,
    },
    UpdateSettings {
        settings: PlayerSettings,
    },
    SetOverride {
        hand: String,
        dealer: String,
        action: Action,
    },
    ClearOverride {
        hand: String,
        dealer: String,
    },
    ClearOverrides {},
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Config {},
    Decision { hand: String, dealer: String },
    Dealer { up_card: String },
    Summary {},
    Hands {},
}

/// What an execute call did.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Response {
    pub attributes: Vec<(String, String)>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ConfigResponse {
    pub config: Config,
    pub processing: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DecisionResponse {
    pub hand: String,
    pub dealer: String,
    pub preferred: Action,
    pub preferred_order: Vec<Action>,
    pub overridden: Option<Action>,
    pub evaluations: Vec<ActionEvaluation>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DealerResponse {
    pub up_card: String,
    pub bust: f64,
    pub distribution: FinalScoreDistribution,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct HandResponse {
    pub key: String,
    pub totals: Vec<u8>,
    pub soft: bool,
    pub can_double: bool,
    pub can_split: bool,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct UpCardResponse {
    pub up_card: String,
    pub frequency: f64,
    pub outcome: Outcome,
    pub turnover: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SummaryResponse {
    pub outcome: Outcome,
    pub turnover: f64,
    pub return_per_unit: f64,
    pub by_up_card: Vec<UpCardResponse>,
    pub against_average: UpCardResponse,
}
