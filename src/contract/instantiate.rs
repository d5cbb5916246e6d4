use std::sync::Arc;

use blackjack::{default_casino_rules, default_player_settings, CardSet};

use crate::contract::rebuild;
use crate::error::ServiceError;
use crate::msg::InstantiateMsg;
use crate::state::{Config, Session, SnapshotStore};

pub fn instantiate(msg: InstantiateMsg) -> Result<Session, ServiceError> {
    let config = Config {
        cards: msg.cards.unwrap_or_else(CardSet::standard),
        rules: msg.rules.unwrap_or_else(default_casino_rules),
        settings: msg.settings.unwrap_or_else(default_player_settings),
    };
    let store = Arc::new(SnapshotStore::new());
    rebuild(&store, &config)?;

    Ok(Session { config, store })
}
