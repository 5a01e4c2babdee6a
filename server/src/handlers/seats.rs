use axum::extract::{Path, Query, State};
use axum::response::Response;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::catalog;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct SeatMapQuery {
    /// Lets a booking session see its own held seats as selectable.
    pub session_id: Option<Uuid>,
}

pub async fn showtime_seats(
    State(state): State<AppState>,
    Path(showtime_id): Path<i64>,
    Query(query): Query<SeatMapQuery>,
) -> Result<Response, AppError> {
    let showtime = state.backend.showtime(showtime_id).await?;
    let map = catalog::seat_map(&state, &showtime, query.session_id, Utc::now()).await?;
    Ok(success(map, "Seat map retrieved"))
}

pub async fn room_layout(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<Response, AppError> {
    let layout = catalog::room_layout(&state, room_id).await?;
    Ok(success(layout, "Room layout retrieved"))
}
