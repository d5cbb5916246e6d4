use blackjack::{EngineError, LookupMiss};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("{0}")]
    Lookup(#[from] LookupMiss),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Odds are still being computed")]
    Processing {},
}
