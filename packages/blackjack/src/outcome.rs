use serde::{Deserialize, Serialize};

use crate::distribution::{FinalScoreDistribution, MASS_TOLERANCE};
use crate::hand::FinalScore;
use crate::EngineError;

/// Units won and lost per unit of probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub win: f64,
    pub loss: f64,
}

impl Payout {
    pub const EVEN: Self = Self { win: 1.0, loss: 1.0 };
    pub const DOUBLED: Self = Self { win: 2.0, loss: 2.0 };
    pub const BLACKJACK: Self = Self { win: 1.5, loss: 1.0 };
}

/// Player final score against dealer final score, bucketed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub player_bust: f64,
    /// Dealer busts while the player stands
    pub dealer_bust: f64,
    pub player_less: f64,
    pub player_equal: f64,
    pub player_more: f64,
}

/// Sum probability over the cross product of both distributions.
///
/// A busted player loses even if the dealer busts too. A natural beats a
/// drawn 21; two naturals push.
pub fn breakdown(player: &FinalScoreDistribution, dealer: &FinalScoreDistribution) -> Breakdown {
    let mut result = Breakdown {
        player_bust: player.bust(),
        ..Breakdown::default()
    };
    for (player_score, p) in player.iter() {
        if player_score == FinalScore::Bust {
            continue;
        }
        for (dealer_score, q) in dealer.iter() {
            let joint = p * q;
            if dealer_score == FinalScore::Bust {
                result.dealer_bust += joint;
            } else if player_score < dealer_score {
                result.player_less += joint;
            } else if player_score == dealer_score {
                result.player_equal += joint;
            } else {
                result.player_more += joint;
            }
        }
    }
    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Advantage {
    /// Win probability minus loss probability
    pub hands: f64,
    /// Expected units returned
    pub payout: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Outcome {
    pub loss_probability: f64,
    pub push_probability: f64,
    pub win_probability: f64,
    pub advantage: Advantage,
}

impl Outcome {
    pub fn from_breakdown(breakdown: &Breakdown, payout: Payout) -> Self {
        let loss = breakdown.player_bust + breakdown.player_less;
        let win = breakdown.dealer_bust + breakdown.player_more;
        Self {
            loss_probability: loss,
            push_probability: breakdown.player_equal,
            win_probability: win,
            advantage: Advantage {
                hands: win - loss,
                payout: win * payout.win - loss * payout.loss,
            },
        }
    }

    /// Outcome of standing on `player` against `dealer`.
    pub fn versus(
        player: &FinalScoreDistribution,
        dealer: &FinalScoreDistribution,
        payout: Payout,
    ) -> Self {
        Self::from_breakdown(&breakdown(player, dealer), payout)
    }

    /// Adds `weight` times `other` into this outcome.
    pub fn accumulate(&mut self, other: &Outcome, weight: f64) {
        self.loss_probability += weight * other.loss_probability;
        self.push_probability += weight * other.push_probability;
        self.win_probability += weight * other.win_probability;
        self.advantage.hands += weight * other.advantage.hands;
        self.advantage.payout += weight * other.advantage.payout;
    }

    /// The result of `wagers` independent, identically played wagers.
    ///
    /// Probabilities stay per wager; advantages add up across wagers.
    pub fn repeated(&self, wagers: f64) -> Self {
        Self {
            advantage: Advantage {
                hands: self.advantage.hands * wagers,
                payout: self.advantage.payout * wagers,
            },
            ..*self
        }
    }

    pub fn total_probability(&self) -> f64 {
        self.loss_probability + self.push_probability + self.win_probability
    }

    pub fn ensure_complete(&self, context: &str) -> Result<(), EngineError> {
        let total = self.total_probability();
        if (total - 1.0).abs() > MASS_TOLERANCE {
            return Err(EngineError::InvariantViolation(format!(
                "outcome for {context} has probability {total}"
            )));
        }
        Ok(())
    }
}
