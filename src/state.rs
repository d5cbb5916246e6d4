use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blackjack::{CardSet, CasinoRules, PlayerSettings, Snapshot};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Inputs of the current build.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub cards: CardSet,
    pub rules: CasinoRules,
    pub settings: PlayerSettings,
}

/// Holds the last published snapshot.
///
/// Readers clone the `Arc` and keep a consistent view while a rebuild runs;
/// a finished rebuild swaps the whole snapshot in one step.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    published: RwLock<Option<Arc<Snapshot>>>,
    processing: AtomicBool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.published.read().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub(crate) fn begin(&self) {
        self.processing.store(true, Ordering::Release);
    }

    /// Ends a rebuild; `None` keeps the previous snapshot.
    pub(crate) fn finish(&self, snapshot: Option<Snapshot>) {
        if let Some(snapshot) = snapshot {
            *self.published.write() = Some(Arc::new(snapshot));
        }
        self.processing.store(false, Ordering::Release);
    }
}

/// One odds calculator: its configuration plus the published results.
#[derive(Debug)]
pub struct Session {
    pub(crate) config: Config,
    pub(crate) store: Arc<SnapshotStore>,
}

impl Session {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared handle for readers on other threads.
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.store.current()
    }
}
