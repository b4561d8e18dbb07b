//! Payments API endpoints

use api_types::{
    Message,
    payment::{PaymentNew, PaymentView, QuickPay},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, views::payment_view};

fn require_pair(event_id: &str, participant_id: &str) -> Result<(), ServerError> {
    if event_id.trim().is_empty() || participant_id.trim().is_empty() {
        return Err(ServerError::Generic("Missing required fields".to_string()));
    }
    Ok(())
}

pub async fn payment_new(
    State(state): State<ServerState>,
    payload: Result<Json<PaymentNew>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let Json(payload) = payload?;
    require_pair(&payload.event_id, &payload.participant_id)?;

    let (payment, participant) = state
        .engine
        .new_payment(&payload.event_id, &payload.participant_id, payload.amount)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(payment_view(&payment, Some(&participant))),
    ))
}

/// Record whatever the participant still owes.
pub async fn quick_pay(
    State(state): State<ServerState>,
    payload: Result<Json<QuickPay>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let Json(payload) = payload?;
    require_pair(&payload.event_id, &payload.participant_id)?;

    let (payment, participant) = state
        .engine
        .quick_pay(&payload.event_id, &payload.participant_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(payment_view(&payment, Some(&participant))),
    ))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(payment_id): Path<String>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_payment(&payment_id).await?;
    Ok(Json(Message::new("Payment deleted successfully")))
}
