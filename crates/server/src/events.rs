//! Events API endpoints

use api_types::{
    Message,
    event::{EventNew, EventView},
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, views::event_view};

/// Handle requests for listing every event, newest first
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<EventView>>, ServerError> {
    let events = state.engine.events().await?;
    Ok(Json(events.iter().map(event_view).collect()))
}

/// Handle requests for creating a new event with its roster
pub async fn event_new(
    State(state): State<ServerState>,
    payload: Result<Json<EventNew>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), ServerError> {
    let Json(payload) = payload?;
    let event = state
        .engine
        .new_event(
            &payload.name,
            payload.total_amount,
            &payload.participant_names,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(event_view(&event))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventView>, ServerError> {
    let event = state.engine.event(&event_id).await?;
    Ok(Json(event_view(&event)))
}

/// Replace name, total and roster. Every payment of the event is dropped.
pub async fn update(
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
    payload: Result<Json<EventNew>, JsonRejection>,
) -> Result<Json<EventView>, ServerError> {
    let Json(payload) = payload?;
    let event = state
        .engine
        .update_event(
            &event_id,
            &payload.name,
            payload.total_amount,
            &payload.participant_names,
        )
        .await?;

    Ok(Json(event_view(&event)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<Message>, ServerError> {
    state.engine.delete_event(&event_id).await?;
    Ok(Json(Message::new("Event deleted successfully")))
}
