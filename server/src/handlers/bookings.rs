use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{FoodSelection, SeatKey};
use crate::services::booking;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct StartBooking {
    pub showtime_id: i64,
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectSeats {
    pub seats: Vec<SeatKey>,
}

#[derive(Debug, Deserialize)]
pub struct SelectFoods {
    pub foods: Vec<FoodSelection>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyVoucher {
    pub code: String,
}

pub async fn start(
    State(state): State<AppState>,
    Json(body): Json<StartBooking>,
) -> Result<Response, AppError> {
    let view = booking::start(&state, body.showtime_id, &body.phone_number).await?;
    Ok(created(view, "Booking session started"))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, AppError> {
    let view = booking::view(&state, id).await?;
    Ok(success(view, "Booking session retrieved"))
}

pub async fn select_seats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SelectSeats>,
) -> Result<Response, AppError> {
    let view = booking::select_seats(&state, id, body.seats).await?;
    Ok(success(view, "Seats selected"))
}

pub async fn select_foods(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SelectFoods>,
) -> Result<Response, AppError> {
    let view = booking::select_foods(&state, id, &body.foods).await?;
    Ok(success(view, "Food selected"))
}

pub async fn apply_voucher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApplyVoucher>,
) -> Result<Response, AppError> {
    let view = booking::apply_voucher(&state, id, &body.code).await?;
    Ok(success(view, "Voucher applied"))
}

pub async fn clear_voucher(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let view = booking::clear_voucher(&state, id).await?;
    Ok(success(view, "Voucher removed"))
}

pub async fn advance(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, AppError> {
    let view = booking::advance(&state, id).await?;
    Ok(success(view, "Moved to next step"))
}

pub async fn back(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, AppError> {
    let view = booking::back(&state, id).await?;
    Ok(success(view, "Moved to previous step"))
}

pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let confirmation = booking::checkout(&state, id).await?;
    Ok(created(confirmation, "Booking confirmed"))
}

pub async fn abandon(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, AppError> {
    booking::abandon(&state, id).await?;
    Ok(empty_success("Booking session abandoned"))
}

pub async fn confirmation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let confirmation = booking::confirmation(&state, id).await?;
    Ok(success(confirmation, "Booking confirmation retrieved"))
}
