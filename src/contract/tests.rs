use super::*;
use blackjack::{Action, CasinoRules, PlayerSettings, Strategy};
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::state::Session;

fn default_session() -> Session {
    instantiate(InstantiateMsg::default()).unwrap()
}

#[test]
fn test_instantiate_with_defaults() {
    let session = default_session();
    assert_eq!(session.config().rules, CasinoRules::default());
    assert_eq!(session.config().settings, PlayerSettings::default());
    assert_eq!(session.config().cards.len(), 10);
    assert!(session.snapshot().is_some());
    assert!(!session.store().is_processing());
}

#[test]
fn test_instantiate_rejects_bad_threshold() {
    let msg = InstantiateMsg {
        settings: Some(PlayerSettings {
            stand_threshold: 1,
            ..PlayerSettings::default()
        }),
        ..InstantiateMsg::default()
    };
    let err = instantiate(msg).unwrap_err();
    assert!(matches!(err, ServiceError::Engine(_)));
}

#[test]
fn test_update_rules_replaces_snapshot() {
    let mut session = default_session();
    let before = session.snapshot().unwrap();

    let res = execute(
        &mut session,
        ExecuteMsg::UpdateRules {
            rules: CasinoRules::no_frills(),
        },
    )
    .unwrap();
    assert_eq!(res.attribute("method"), Some("update_rules"));
    assert_eq!(res.attribute("doubling_mode"), Some("none"));

    let after = session.snapshot().unwrap();
    assert!(!std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(*after.rules(), CasinoRules::no_frills());
    // The old snapshot stays readable for whoever still holds it.
    assert!(before.decision("8,8", "6").unwrap().offers(Action::Split));
    assert!(!after.decision("8,8", "6").unwrap().offers(Action::Split));
}

#[test]
fn test_failed_rebuild_keeps_previous_state() {
    let mut session = default_session();
    let before = session.snapshot().unwrap();

    let err = execute(
        &mut session,
        ExecuteMsg::UpdateSettings {
            settings: PlayerSettings {
                stand_threshold: 30,
                ..PlayerSettings::default()
            },
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Engine(_)));
    assert_eq!(session.config().settings.stand_threshold, 17);
    assert!(std::sync::Arc::ptr_eq(&before, &session.snapshot().unwrap()));
    assert!(!session.store().is_processing());
}

#[test]
fn test_override_lifecycle() {
    let mut session = default_session();
    execute(
        &mut session,
        ExecuteMsg::UpdateSettings {
            settings: PlayerSettings {
                strategy: Strategy::MinLoss,
                ..PlayerSettings::default()
            },
        },
    )
    .unwrap();

    let res = execute(
        &mut session,
        ExecuteMsg::SetOverride {
            hand: "16".to_string(),
            dealer: "10".to_string(),
            action: Action::Stand,
        },
    )
    .unwrap();
    assert_eq!(res.attribute("action"), Some("stand"));
    let record = session
        .snapshot()
        .unwrap()
        .decision("16", "10")
        .unwrap()
        .clone();
    assert_eq!(record.preferred(), Action::Stand);

    let res = execute(
        &mut session,
        ExecuteMsg::ClearOverride {
            hand: "16".to_string(),
            dealer: "10".to_string(),
        },
    )
    .unwrap();
    assert_eq!(res.attribute("removed"), Some("stand"));
    assert!(session.config().settings.overrides.is_empty());
    let snapshot = session.snapshot().unwrap();
    assert_eq!(snapshot.decision("16", "10").unwrap().preferred(), Action::Hit);
}

#[test]
fn test_override_for_unknown_hand() {
    let mut session = default_session();
    let err = execute(
        &mut session,
        ExecuteMsg::SetOverride {
            hand: "5/15/25".to_string(),
            dealer: "10".to_string(),
            action: Action::Hit,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Lookup(_)));

    let err = execute(
        &mut session,
        ExecuteMsg::SetOverride {
            hand: "16".to_string(),
            dealer: "Q".to_string(),
            action: Action::Hit,
        },
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Unknown dealer reference 'Q'");
}

#[test]
fn test_clear_overrides() {
    let mut session = default_session();
    for dealer in ["9", "10"] {
        execute(
            &mut session,
            ExecuteMsg::SetOverride {
                hand: "12".to_string(),
                dealer: dealer.to_string(),
                action: Action::Stand,
            },
        )
        .unwrap();
    }
    assert_eq!(session.config().settings.overrides.len(), 2);
    let res = execute(&mut session, ExecuteMsg::ClearOverrides {}).unwrap();
    assert_eq!(res.attribute("cleared"), Some("2"));
    assert!(session.config().settings.overrides.is_empty());
}

#[test]
fn test_queries() {
    let session = default_session();

    let config = query(&session, QueryMsg::Config {}).unwrap();
    assert_eq!(config["processing"], false);
    assert_eq!(config["config"]["settings"]["strategy"], "max_payout");
    assert_eq!(config["config"]["rules"]["doubling_mode"], "any_pair");

    let decision = query(
        &session,
        QueryMsg::Decision {
            hand: "A,10".to_string(),
            dealer: "average".to_string(),
        },
    )
    .unwrap();
    assert_eq!(decision["preferred"], "stand");
    assert_eq!(decision["evaluations"].as_array().unwrap().len(), 1);

    let dealer = query(
        &session,
        QueryMsg::Dealer {
            up_card: "A".to_string(),
        },
    )
    .unwrap();
    let bust = dealer["bust"].as_f64().unwrap();
    assert!((bust - 0.115_286_270_301_169_49).abs() < 1e-12);
    assert!(dealer["distribution"]["blackjack"].as_f64().unwrap() > 0.3);

    let summary = query(&session, QueryMsg::Summary {}).unwrap();
    assert_eq!(summary["by_up_card"].as_array().unwrap().len(), 10);
    assert_eq!(summary["by_up_card"][0]["up_card"], "A");
    assert_eq!(summary["against_average"]["up_card"], "average");

    let hands = query(&session, QueryMsg::Hands {}).unwrap();
    let keys: Vec<&str> = hands
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["key"].as_str().unwrap())
        .collect();
    assert!(keys.contains(&"6,10"));
    assert!(keys.contains(&"split:8+3"));
    assert!(!keys.contains(&"A"));
}

#[test]
fn test_query_misses() {
    let session = default_session();
    let err = query(
        &session,
        QueryMsg::Decision {
            hand: "22/32".to_string(),
            dealer: "10".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Lookup(_)));
}
