use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::booking::pricing::{self, PricedSeat};
use crate::models::{FoodSelection, SeatKey, Voucher};
use crate::services::catalog;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn foods(State(state): State<AppState>) -> Result<Response, AppError> {
    let menu = state.backend.foods().await?;
    Ok(success(menu, "Food menu retrieved"))
}

#[derive(Debug, Serialize)]
pub struct VoucherCheck {
    pub voucher: Voucher,
    pub usable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub async fn voucher(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let voucher = state.backend.voucher(code.trim()).await?;
    let reason = voucher.check_usable(Utc::now()).err().map(|e| e.to_string());
    let check = VoucherCheck {
        usable: reason.is_none(),
        reason,
        voucher,
    };
    Ok(success(check, "Voucher retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub showtime_id: i64,
    pub seats: Vec<SeatKey>,
    #[serde(default)]
    pub foods: Vec<FoodSelection>,
    #[serde(default)]
    pub voucher_code: Option<String>,
}

/// Prices a selection without starting a booking session.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let showtime = state.backend.showtime(request.showtime_id).await?;
    let layout = catalog::room_layout(&state, showtime.room_id).await?;

    let seats = request
        .seats
        .iter()
        .map(|key| {
            layout
                .seat(key)
                .map(|seat| PricedSeat {
                    seat: seat.key,
                    seat_type: seat.seat_type,
                    price: seat.price,
                })
                .ok_or_else(|| AppError::ValidationError(format!("Seat {key} does not exist in this room")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let foods = catalog::price_foods(&state, &request.foods).await?;
    let voucher = match request.voucher_code.as_deref() {
        Some(code) => Some(catalog::usable_voucher(&state, code, now).await?),
        None => None,
    };

    let quote = pricing::quote(&seats, &foods, voucher.as_ref());
    Ok(success(quote, "Price calculated"))
}

pub async fn membership(
    State(state): State<AppState>,
    Path(phone_number): Path<String>,
) -> Result<Response, AppError> {
    let status = catalog::membership(&state, &phone_number).await?;
    Ok(success(status, "Membership retrieved"))
}
