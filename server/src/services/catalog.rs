use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{MembershipStatus, RoomLayout, SeatMap};
use crate::models::{FoodLine, FoodSelection, SeatKey, Showtime, Voucher};
use crate::state::AppState;
use crate::utils::error::AppError;

pub async fn room_layout(state: &AppState, room_id: i64) -> Result<RoomLayout, AppError> {
    let defined = state.backend.seats_for_room(room_id).await?;
    Ok(RoomLayout::for_room(
        room_id,
        &defined,
        state.config.grid_for_room(room_id),
        &state.config.seat_pricing,
    ))
}

/// Seat map for a showtime. Holds owned by `viewer` count as available so a
/// session always sees its own selection as selectable.
pub async fn seat_map(
    state: &AppState,
    showtime: &Showtime,
    viewer: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<SeatMap, AppError> {
    let (layout, tickets, holds) = tokio::try_join!(
        room_layout(state, showtime.room_id),
        async {
            state
                .backend
                .tickets_for_showtime(showtime.showtime_id)
                .await
                .map_err(AppError::from)
        },
        async {
            state
                .store
                .active_holds(showtime.showtime_id, now)
                .await
                .map_err(AppError::from)
        },
    )?;

    let held_by_others: HashSet<SeatKey> = holds
        .into_iter()
        .filter(|hold| Some(hold.session_id) != viewer)
        .map(|hold| hold.seat)
        .collect();

    let map = SeatMap::resolve(showtime.showtime_id, &layout, &tickets, &held_by_others);
    tracing::debug!(
        showtime_id = showtime.showtime_id,
        available = map.available_count,
        booked = map.booked_count,
        "Seat map resolved"
    );
    Ok(map)
}

/// Prices food selections against the backend's menu. Repeated ids are
/// merged.
pub async fn price_foods(state: &AppState, selections: &[FoodSelection]) -> Result<Vec<FoodLine>, AppError> {
    if selections.is_empty() {
        return Ok(Vec::new());
    }

    let mut quantities: BTreeMap<i64, u32> = BTreeMap::new();
    for selection in selections {
        if selection.quantity == 0 {
            return Err(AppError::ValidationError(format!(
                "Food item {} needs a quantity of at least 1",
                selection.food_id
            )));
        }
        let quantity = quantities.entry(selection.food_id).or_default();
        *quantity = quantity.checked_add(selection.quantity).ok_or_else(|| {
            AppError::ValidationError(format!("Food item {} has too large a quantity", selection.food_id))
        })?;
    }

    let menu = state.backend.foods().await?;
    quantities
        .into_iter()
        .map(|(food_id, quantity)| {
            let item = menu
                .iter()
                .find(|item| item.food_id == food_id)
                .ok_or_else(|| AppError::ValidationError(format!("Food item {food_id} is not on the menu")))?;
            Ok(FoodLine {
                food_id,
                name: item.name.clone(),
                quantity,
                unit_price: item.price,
            })
        })
        .collect()
}

pub async fn usable_voucher(state: &AppState, code: &str, now: DateTime<Utc>) -> Result<Voucher, AppError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AppError::ValidationError("Voucher code is empty".to_string()));
    }

    let voucher = state.backend.voucher(code).await?;
    voucher.check_usable(now)?;
    Ok(voucher)
}

pub async fn membership(state: &AppState, phone_number: &str) -> Result<MembershipStatus, AppError> {
    let account = state.backend.account(phone_number).await?;
    Ok(MembershipStatus::for_account(&account, &state.config.tier_thresholds))
}
