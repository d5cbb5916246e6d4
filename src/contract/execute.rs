use blackjack::{Action, CasinoRules, PlayerSettings};
use log::info;

use crate::contract::rebuild;
use crate::error::ServiceError;
use crate::msg::{ExecuteMsg, Response};
use crate::state::{Config, Session};

pub fn execute(session: &mut Session, msg: ExecuteMsg) -> Result<Response, ServiceError> {
    match msg {
        ExecuteMsg::UpdateRules { rules } => execute_update_rules(session, rules),
        ExecuteMsg::UpdateSettings { settings } => execute_update_settings(session, settings),
        ExecuteMsg::SetOverride {
            hand,
            dealer,
            action,
        } => execute_set_override(session, hand, dealer, action),
        ExecuteMsg::ClearOverride { hand, dealer } => {
            execute_clear_override(session, hand, dealer)
        }
        ExecuteMsg::ClearOverrides {} => execute_clear_overrides(session),
    }
}

/// Rebuilds with `update` applied; the session keeps its old config if the build fails.
fn apply<F>(session: &mut Session, update: F) -> Result<(), ServiceError>
where
    F: FnOnce(&mut Config),
{
    let mut config = session.config.clone();
    update(&mut config);
    rebuild(&session.store, &config)?;
    session.config = config;
    Ok(())
}

pub fn execute_update_rules(
    session: &mut Session,
    rules: CasinoRules,
) -> Result<Response, ServiceError> {
    apply(session, |config| config.rules = rules)?;
    info!("Rules updated: doubling {}", rules.doubling_mode);

    Ok(Response::new()
        .add_attribute("method", "update_rules")
        .add_attribute("doubling_mode", rules.doubling_mode))
}

pub fn execute_update_settings(
    session: &mut Session,
    settings: PlayerSettings,
) -> Result<Response, ServiceError> {
    let strategy = settings.strategy;
    let overrides = settings.overrides.len();
    apply(session, |config| config.settings = settings)?;

    Ok(Response::new()
        .add_attribute("method", "update_settings")
        .add_attribute("strategy", strategy)
        .add_attribute("overrides", overrides))
}

pub fn execute_set_override(
    session: &mut Session,
    hand: String,
    dealer: String,
    action: Action,
) -> Result<Response, ServiceError> {
    let snapshot = session.snapshot().ok_or(ServiceError::Processing {})?;
    snapshot.hand(&hand)?;
    snapshot.dealer_ref(&dealer)?;

    apply(session, |config| {
        config.settings.overrides.insert(&hand, &dealer, action);
    })?;

    Ok(Response::new()
        .add_attribute("method", "set_override")
        .add_attribute("hand", hand)
        .add_attribute("dealer", dealer)
        .add_attribute("action", action))
}

pub fn execute_clear_override(
    session: &mut Session,
    hand: String,
    dealer: String,
) -> Result<Response, ServiceError> {
    let mut removed = None;
    apply(session, |config| {
        removed = config.settings.overrides.remove(&hand, &dealer);
    })?;

    let mut response = Response::new()
        .add_attribute("method", "clear_override")
        .add_attribute("hand", hand)
        .add_attribute("dealer", dealer);
    if let Some(action) = removed {
        response = response.add_attribute("removed", action);
    }
    Ok(response)
}

pub fn execute_clear_overrides(session: &mut Session) -> Result<Response, ServiceError> {
    let cleared = session.config.settings.overrides.len();
    apply(session, |config| {
        config.settings.overrides = Default::default();
    })?;

    Ok(Response::new()
        .add_attribute("method", "clear_overrides")
        .add_attribute("cleared", cleared))
}
