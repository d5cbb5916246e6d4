use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::hand::{FinalScore, MAX_SCORE};
use crate::EngineError;

/// Allowed drift of a distribution's total mass away from 1.
pub const MASS_TOLERANCE: f64 = 1e-9;

const BLACKJACK_SLOT: usize = MAX_SCORE as usize + 1;
const BUST_SLOT: usize = MAX_SCORE as usize + 2;
const SLOTS: usize = MAX_SCORE as usize + 3;

fn slot(score: FinalScore) -> usize {
    match score {
        FinalScore::Total(n) => {
            debug_assert!(n <= MAX_SCORE);
            n as usize
        }
        FinalScore::Blackjack => BLACKJACK_SLOT,
        FinalScore::Bust => BUST_SLOT,
    }
}

fn score(slot: usize) -> FinalScore {
    match slot {
        BLACKJACK_SLOT => FinalScore::Blackjack,
        BUST_SLOT => FinalScore::Bust,
        n => FinalScore::Total(n as u8),
    }
}

/// Probability mass over the ways a hand can finish.
///
/// Fixed slots (one per total, blackjack, bust) keep every fold in the same
/// order, so two builds from the same inputs agree bit for bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalScoreDistribution {
    mass: [f64; SLOTS],
}

impl FinalScoreDistribution {
    fn empty() -> Self {
        Self { mass: [0.0; SLOTS] }
    }

    /// All mass on one score.
    pub fn point(score: FinalScore) -> Self {
        let mut dist = Self::empty();
        dist.mass[slot(score)] = 1.0;
        dist
    }

    /// Weight-normalized mixture of `(weight, distribution)` pairs.
    pub fn mixture<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = (f64, &'a FinalScoreDistribution)>,
    {
        let mut dist = Self::empty();
        let mut total_weight = 0.0;
        for (weight, part) in parts {
            total_weight += weight;
            for (acc, m) in dist.mass.iter_mut().zip(part.mass.iter()) {
                *acc += weight * m;
            }
        }
        if total_weight > 0.0 {
            for m in dist.mass.iter_mut() {
                *m /= total_weight;
            }
        }
        dist
    }

    pub fn mass(&self, score: FinalScore) -> f64 {
        self.mass[slot(score)]
    }

    pub fn bust(&self) -> f64 {
        self.mass[BUST_SLOT]
    }

    pub fn total(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Scores carrying mass, weakest first, bust last.
    pub fn iter(&self) -> impl Iterator<Item = (FinalScore, f64)> + '_ {
        self.mass
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != 0.0)
            .map(|(i, m)| (score(i), *m))
    }

    /// Fails unless the mass sums to 1.
    pub fn ensure_normalized(&self, context: &str) -> Result<(), EngineError> {
        let total = self.total();
        if (total - 1.0).abs() > MASS_TOLERANCE || self.mass.iter().any(|m| *m < 0.0) {
            return Err(EngineError::InvariantViolation(format!(
                "distribution for {context} has mass {total}"
            )));
        }
        Ok(())
    }
}

impl Serialize for FinalScoreDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(FinalScore, f64)> = self.iter().collect();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (score, mass) in entries {
            map.serialize_entry(&score.to_string(), &mass)?;
        }
        map.end()
    }
}
