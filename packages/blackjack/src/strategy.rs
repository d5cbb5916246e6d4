use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;
use crate::player::{Action, ActionEvaluation};
use crate::EngineError;

/// How the preferred action is chosen among the legal ones.
///
/// Ties keep [`Action::PRIORITY`] order (stand, hit, double, split).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Highest expected payout
    #[default]
    #[serde(rename = "max_payout")]
    MaxPayout,
    /// Highest win minus loss probability
    #[serde(rename = "max_hands")]
    MaxHands,
    /// Hit whenever that loses less often than standing
    #[serde(rename = "hitLoss_standLoss")]
    MinLoss,
    /// Highest win probability
    #[serde(rename = "max_win")]
    MaxWin,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::MaxPayout,
        Strategy::MaxHands,
        Strategy::MinLoss,
        Strategy::MaxWin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::MaxPayout => "max_payout",
            Strategy::MaxHands => "max_hands",
            Strategy::MinLoss => "hitLoss_standLoss",
            Strategy::MaxWin => "max_win",
        }
    }

    /// Larger is better.
    fn score(&self, outcome: &Outcome) -> f64 {
        match self {
            Strategy::MaxPayout => outcome.advantage.payout,
            Strategy::MaxHands => outcome.advantage.hands,
            Strategy::MinLoss => -outcome.loss_probability,
            Strategy::MaxWin => outcome.win_probability,
        }
    }

    /// Legal actions, best first.
    pub fn rank(&self, evaluations: &[ActionEvaluation]) -> Vec<Action> {
        let mut ranked: Vec<&ActionEvaluation> = evaluations.iter().collect();
        ranked.sort_by_key(|e| e.action.priority());
        // Stable: equal scores keep priority order.
        ranked.sort_by(|a, b| self.score(&b.outcome).total_cmp(&self.score(&a.outcome)));
        ranked.into_iter().map(|e| e.action).collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Unknown strategy '{s}'. Options: max_payout, max_hands, hitLoss_standLoss, max_win"
                ))
            })
    }
}
