use std::sync::Arc;

use blackjack::{Snapshot, UpCardSummary};
use serde::Serialize;
use serde_json::Value;

use crate::error::ServiceError;
use crate::msg::{
    ConfigResponse, DealerResponse, DecisionResponse, HandResponse, QueryMsg, SummaryResponse,
    UpCardResponse,
};
use crate::state::Session;

fn to_json_value<T: Serialize>(data: &T) -> Result<Value, ServiceError> {
    Ok(serde_json::to_value(data)?)
}

pub fn query(session: &Session, msg: QueryMsg) -> Result<Value, ServiceError> {
    match msg {
        QueryMsg::Config {} => to_json_value(&query_config(session)),
        QueryMsg::Decision { hand, dealer } => {
            to_json_value(&query_decision(session, hand, dealer)?)
        }
        QueryMsg::Dealer { up_card } => to_json_value(&query_dealer(session, up_card)?),
        QueryMsg::Summary {} => to_json_value(&query_summary(session)?),
        QueryMsg::Hands {} => to_json_value(&query_hands(session)?),
    }
}

fn published(session: &Session) -> Result<Arc<Snapshot>, ServiceError> {
    session.snapshot().ok_or(ServiceError::Processing {})
}

pub fn query_config(session: &Session) -> ConfigResponse {
    ConfigResponse {
        config: session.config().clone(),
        processing: session.store.is_processing(),
    }
}

pub fn query_decision(
    session: &Session,
    hand: String,
    dealer: String,
) -> Result<DecisionResponse, ServiceError> {
    let snapshot = published(session)?;
    let record = snapshot.decision(&hand, &dealer)?;
    Ok(DecisionResponse {
        preferred: record.preferred(),
        preferred_order: record.preferred_order.clone(),
        overridden: record.overridden,
        evaluations: record.evaluations.clone(),
        hand,
        dealer,
    })
}

pub fn query_dealer(session: &Session, up_card: String) -> Result<DealerResponse, ServiceError> {
    let snapshot = published(session)?;
    let distribution = *snapshot.dealer_distribution(&up_card)?;
    Ok(DealerResponse {
        up_card,
        bust: distribution.bust(),
        distribution,
    })
}

pub fn query_summary(session: &Session) -> Result<SummaryResponse, ServiceError> {
    let snapshot = published(session)?;
    let summary = snapshot.summary();
    let up_card = |up: &UpCardSummary| UpCardResponse {
        up_card: up.up_card.clone(),
        frequency: up.frequency,
        outcome: up.outcome,
        turnover: up.turnover,
    };
    Ok(SummaryResponse {
        outcome: summary.outcome,
        turnover: summary.turnover,
        return_per_unit: summary.return_per_unit,
        by_up_card: summary.by_up_card.iter().map(up_card).collect(),
        against_average: up_card(&summary.against_average),
    })
}

pub fn query_hands(session: &Session) -> Result<Vec<HandResponse>, ServiceError> {
    let snapshot = published(session)?;
    let hands = snapshot
        .graph()
        .nodes()
        .iter()
        .filter(|hand| !hand.is_single())
        .map(|hand| HandResponse {
            key: hand.key.to_string(),
            totals: hand.all_totals.clone(),
            soft: hand.is_soft,
            can_double: hand.can_double,
            can_split: hand.can_split,
        })
        .collect();
    Ok(hands)
}
