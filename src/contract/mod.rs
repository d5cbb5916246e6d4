pub mod execute;
pub mod instantiate;
pub mod query;

#[cfg(test)]
mod tests;

use blackjack::build_everything;
use log::{error, info};

pub use crate::contract::execute::execute;
pub use crate::contract::instantiate::instantiate;
pub use crate::contract::query::query;

use crate::error::ServiceError;
use crate::state::{Config, SnapshotStore};

/// Full rebuild from `config`, published only when it succeeds.
pub(crate) fn rebuild(store: &SnapshotStore, config: &Config) -> Result<(), ServiceError> {
    store.begin();
    match build_everything(&config.cards, &config.rules, &config.settings) {
        Ok(snapshot) => {
            store.finish(Some(snapshot));
            info!("Published new odds snapshot");
            Ok(())
        }
        Err(e) => {
            store.finish(None);
            error!("Rebuild failed, keeping previous snapshot: {e}");
            Err(e.into())
        }
    }
}
