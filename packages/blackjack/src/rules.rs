use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Which two-card hands may be doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoublingMode {
    /// Doubling is never offered
    None,
    /// Only hard 9, 10 or 11
    NineTenEleven,
    /// Hard 9, 10, 11 or any soft hand
    NineTenElevenPlusSoft,
    /// Any two cards
    AnyPair,
}

impl DoublingMode {
    pub const ALL: [DoublingMode; 4] = [
        DoublingMode::None,
        DoublingMode::NineTenEleven,
        DoublingMode::NineTenElevenPlusSoft,
        DoublingMode::AnyPair,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DoublingMode::None => "none",
            DoublingMode::NineTenEleven => "nine_ten_eleven",
            DoublingMode::NineTenElevenPlusSoft => "nine_ten_eleven_plus_soft",
            DoublingMode::AnyPair => "any_pair",
        }
    }

    /// Whether a two-card hand with this score and softness may double.
    pub fn allows(&self, score: u8, is_soft: bool) -> bool {
        let nine_to_eleven = !is_soft && (9..=11).contains(&score);
        match self {
            DoublingMode::None => false,
            DoublingMode::NineTenEleven => nine_to_eleven,
            DoublingMode::NineTenElevenPlusSoft => nine_to_eleven || is_soft,
            DoublingMode::AnyPair => true,
        }
    }
}

impl fmt::Display for DoublingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DoublingMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DoublingMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Unknown doubling mode '{s}'. Options: none, nine_ten_eleven, nine_ten_eleven_plus_soft, any_pair"
                ))
            })
    }
}

/// Pair splitting options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Pairs may be split (once; post-split hands never re-split)
    pub allowed: bool,
    /// Post-split hands may double
    pub double_after_split: bool,
    /// Ace plus ten after a split counts as a natural
    pub blackjack_after_split: bool,
    /// Post-split aces may keep drawing
    pub hit_split_aces: bool,
}

/// Configurable casino rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasinoRules {
    pub doubling_mode: DoublingMode,
    pub split_options: SplitOptions,
    /// Naturals pay 3:2 instead of even money
    pub blackjack_payout: bool,
    /// Dealer draws on soft 17
    #[serde(default)]
    pub dealer_hits_soft_17: bool,
}

impl Default for CasinoRules {
    fn default() -> Self {
        Self {
            doubling_mode: DoublingMode::AnyPair,
            split_options: SplitOptions {
                allowed: true,
                double_after_split: true,
                blackjack_after_split: false,
                hit_split_aces: false,
            },
            blackjack_payout: true,
            dealer_hits_soft_17: false,
        }
    }
}

impl CasinoRules {
    /// European rules (doubling on 9-11 only, no doubling after split)
    pub fn european() -> Self {
        Self {
            doubling_mode: DoublingMode::NineTenEleven,
            split_options: SplitOptions {
                allowed: true,
                double_after_split: false,
                blackjack_after_split: false,
                hit_split_aces: false,
            },
            blackjack_payout: true,
            dealer_hits_soft_17: false,
        }
    }

    /// Atlantic City rules
    pub fn atlantic_city() -> Self {
        Self::default()
    }

    /// Single deck rules as usually found in casinos: dealer hits soft 17,
    /// naturals paid even money
    pub fn single_deck() -> Self {
        Self {
            doubling_mode: DoublingMode::NineTenEleven,
            split_options: SplitOptions {
                allowed: true,
                double_after_split: false,
                blackjack_after_split: false,
                hit_split_aces: false,
            },
            blackjack_payout: false,
            dealer_hits_soft_17: true,
        }
    }

    /// Stand or hit only
    pub fn no_frills() -> Self {
        Self {
            doubling_mode: DoublingMode::None,
            split_options: SplitOptions {
                allowed: false,
                double_after_split: false,
                blackjack_after_split: false,
                hit_split_aces: false,
            },
            blackjack_payout: false,
            dealer_hits_soft_17: false,
        }
    }
}

/// Named rule sets selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePreset {
    Default,
    European,
    AtlanticCity,
    SingleDeck,
    NoFrills,
}

impl RulePreset {
    pub const ALL: [RulePreset; 5] = [
        RulePreset::Default,
        RulePreset::European,
        RulePreset::AtlanticCity,
        RulePreset::SingleDeck,
        RulePreset::NoFrills,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RulePreset::Default => "default",
            RulePreset::European => "european",
            RulePreset::AtlanticCity => "atlantic_city",
            RulePreset::SingleDeck => "single_deck",
            RulePreset::NoFrills => "no_frills",
        }
    }

    pub fn rules(&self) -> CasinoRules {
        match self {
            RulePreset::Default => CasinoRules::default(),
            RulePreset::European => CasinoRules::european(),
            RulePreset::AtlanticCity => CasinoRules::atlantic_city(),
            RulePreset::SingleDeck => CasinoRules::single_deck(),
            RulePreset::NoFrills => CasinoRules::no_frills(),
        }
    }
}

impl FromStr for RulePreset {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RulePreset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Unknown preset '{s}'. Available: default, european, atlantic_city, single_deck, no_frills"
                ))
            })
    }
}
