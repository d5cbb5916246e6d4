use super::*;
use crate::hand::FinalScore;
use crate::CasinoRules;

struct Fixture {
    cards: CardSet,
    graph: HandGraph,
    table: DecisionTable,
}

impl Fixture {
    fn new(rules: CasinoRules, strategy: Strategy, overrides: &Overrides) -> Self {
        let cards = CardSet::shoe(6).unwrap();
        let graph = HandGraph::build(&cards, &rules).unwrap();
        let dealer = DealerTable::evaluate(&graph, &cards, 17, rules.dealer_hits_soft_17).unwrap();
        let table =
            DecisionTable::decide(&graph, &cards, &dealer, &rules, strategy, overrides).unwrap();
        Self {
            cards,
            graph,
            table,
        }
    }

    fn standard() -> Self {
        Self::new(CasinoRules::default(), Strategy::MaxPayout, &Overrides::new())
    }

    fn record(&self, hand: &str, dealer: &str) -> &DecisionRecord {
        let id = self.graph.find(hand).unwrap().id;
        let dealer = DealerRef::parse(dealer, &self.cards).unwrap();
        self.table.record(&self.cards, id, dealer).unwrap()
    }
}

#[test]
fn test_action_parse() {
    assert_eq!("stand".parse::<Action>().unwrap(), Action::Stand);
    assert_eq!("P".parse::<Action>().unwrap(), Action::Split);
    assert!(matches!(
        "surrender".parse::<Action>(),
        Err(EngineError::Configuration(_))
    ));
    for (i, action) in Action::PRIORITY.into_iter().enumerate() {
        assert_eq!(action.priority(), i);
    }
}

#[test]
fn test_apply_override() {
    let ranked = vec![Action::Hit, Action::Double, Action::Stand];
    assert_eq!(
        apply_override(&ranked, Some(Action::Stand)),
        vec![Action::Stand, Action::Hit, Action::Double]
    );
    assert_eq!(apply_override(&ranked, None), ranked);
    // Not legal here: ranking is left alone.
    assert_eq!(apply_override(&ranked, Some(Action::Split)), ranked);
}

#[test]
fn test_overrides_map() {
    let mut overrides = Overrides::new();
    assert_eq!(overrides.insert("16", "10", Action::Stand), None);
    assert_eq!(
        overrides.insert("16", "10", Action::Hit),
        Some(Action::Stand)
    );
    overrides.insert("A,8", "average", Action::Double);
    assert_eq!(overrides.len(), 2);
    assert_eq!(
        overrides.get(&HandKey::from("16"), "10"),
        Some(Action::Hit)
    );
    assert_eq!(overrides.get(&HandKey::from("16"), "9"), None);

    let entries: Vec<OverrideEntry> = overrides.clone().into();
    assert_eq!(Overrides::from(entries), overrides);

    assert_eq!(overrides.remove("16", "10"), Some(Action::Hit));
    assert_eq!(overrides.remove("16", "10"), None);
    assert_eq!(overrides.len(), 1);
}

#[test]
fn test_single_cards_have_no_record() {
    let fixture = Fixture::standard();
    let ace = fixture.graph.up_card(0);
    assert!(fixture
        .table
        .record(&fixture.cards, ace, DealerRef::Average)
        .is_none());
}

#[test]
fn test_legal_actions() {
    let fixture = Fixture::standard();

    let pair = fixture.record("8,8", "6");
    let offered: Vec<Action> = pair.evaluations.iter().map(|e| e.action).collect();
    assert_eq!(
        offered,
        vec![Action::Stand, Action::Hit, Action::Double, Action::Split]
    );

    let drawn = fixture.record("16", "10");
    assert!(drawn.offers(Action::Hit));
    assert!(!drawn.offers(Action::Double));
    assert!(!drawn.offers(Action::Split));

    let natural = fixture.record("A,10", "10");
    assert_eq!(natural.preferred_order, vec![Action::Stand]);
}

#[test]
fn test_split_aces_only_stand() {
    let fixture = Fixture::standard();
    for drawn in ["2", "9", "10", "A"] {
        let record = fixture.record(&format!("split:A+{drawn}"), "average");
        assert_eq!(record.preferred_order, vec![Action::Stand]);
    }
    assert!(fixture.record("A,A", "6").offers(Action::Split));
}

#[test]
fn test_split_ace_ten_is_not_blackjack() {
    let fixture = Fixture::standard();
    let record = fixture.record("split:A+10", "6");
    let stand = record.evaluation(Action::Stand).unwrap();
    assert_eq!(stand.distribution.mass(FinalScore::Total(21)), 1.0);
    // Six up never makes a natural, so 21 wins whenever the dealer does not also make 21.
    assert!(stand.outcome.advantage.payout < 1.0);
    assert!(stand.outcome.advantage.payout > 0.8);
}

#[test]
fn test_blackjack_payout() {
    let fixture = Fixture::standard();
    let stand = fixture.record("A,10", "6").preferred_evaluation();
    assert!((stand.outcome.advantage.payout - 1.5).abs() < 1e-12);

    let stand = fixture.record("A,10", "10").preferred_evaluation();
    assert!((stand.outcome.push_probability - 1.0 / 13.0).abs() < 1e-12);
    assert!((stand.outcome.advantage.payout - 1.5 * 12.0 / 13.0).abs() < 1e-12);

    let even_money = CasinoRules {
        blackjack_payout: false,
        ..CasinoRules::default()
    };
    let fixture = Fixture::new(even_money, Strategy::MaxPayout, &Overrides::new());
    let stand = fixture.record("A,10", "6").preferred_evaluation();
    assert!((stand.outcome.advantage.payout - 1.0).abs() < 1e-12);
}

#[test]
fn test_double_stakes_twice() {
    let fixture = Fixture::standard();
    let record = fixture.record("5,6", "6");
    let double = record.evaluation(Action::Double).unwrap();
    assert_eq!(double.stake, 2.0);
    let hit = record.evaluation(Action::Hit).unwrap();
    assert!(
        (double.outcome.advantage.payout - 2.0 * (double.outcome.win_probability - double.outcome.loss_probability)).abs()
            < 1e-12
    );
    assert!(hit.outcome.advantage.payout > 0.0);
}

#[test]
fn test_split_outcome_counts_two_wagers() {
    let fixture = Fixture::standard();
    let split = fixture
        .record("8,8", "6")
        .evaluation(Action::Split)
        .unwrap()
        .clone();
    assert!(split.outcome.ensure_complete("8,8 split").is_ok());
    assert!(split.stake >= 2.0);
    assert!(split.outcome.advantage.hands > 0.0);
    assert!(
        (split.outcome.advantage.hands
            - 2.0 * (split.outcome.win_probability - split.outcome.loss_probability))
            .abs()
            < 1e-12
    );
}

#[test]
fn test_hard_eleven_never_stands() {
    for strategy in Strategy::ALL {
        let fixture = Fixture::new(CasinoRules::default(), strategy, &Overrides::new());
        for dealer in ["2", "6", "10", "A", "average"] {
            assert_ne!(
                fixture.record("11", dealer).preferred(),
                Action::Stand,
                "{strategy} stands on 11 vs {dealer}"
            );
            assert_ne!(fixture.record("3,8", dealer).preferred(), Action::Stand);
        }
    }
}

#[test]
fn test_min_loss_hits_sixteen_against_ten() {
    let fixture = Fixture::new(CasinoRules::default(), Strategy::MinLoss, &Overrides::new());
    let record = fixture.record("16", "10");
    assert_eq!(record.preferred(), Action::Hit);
    let hit = record.evaluation(Action::Hit).unwrap().outcome.loss_probability;
    let stand = record.evaluation(Action::Stand).unwrap().outcome.loss_probability;
    assert!(hit < stand, "hit loses {hit}, stand loses {stand}");
}

#[test]
fn test_override_forces_action_and_keeps_ranking() {
    let mut overrides = Overrides::new();
    overrides.insert("16", "10", Action::Stand);
    let fixture = Fixture::new(CasinoRules::default(), Strategy::MinLoss, &overrides);
    let record = fixture.record("16", "10");
    assert_eq!(record.overridden, Some(Action::Stand));
    assert_eq!(record.preferred(), Action::Stand);
    assert_eq!(record.ranked[0], Action::Hit);
    // Other columns are not affected.
    assert_eq!(fixture.record("16", "9").overridden, None);
}

#[test]
fn test_illegal_override_is_ignored() {
    let mut overrides = Overrides::new();
    overrides.insert("16", "10", Action::Split);
    let fixture = Fixture::new(CasinoRules::default(), Strategy::MinLoss, &overrides);
    let record = fixture.record("16", "10");
    assert_eq!(record.overridden, None);
    assert_eq!(record.preferred_order, record.ranked);
}

#[test]
fn test_distributions_are_normalized() {
    let fixture = Fixture::standard();
    for hand in fixture.graph.nodes() {
        for dealer in DealerRef::all(&fixture.cards) {
            let Some(record) = fixture.table.record(&fixture.cards, hand.id, dealer) else {
                continue;
            };
            for evaluation in &record.evaluations {
                assert!(
                    (evaluation.distribution.total() - 1.0).abs() < 1e-9,
                    "{} {} vs {}",
                    hand.key,
                    evaluation.action,
                    dealer.key(&fixture.cards)
                );
            }
        }
    }
}
