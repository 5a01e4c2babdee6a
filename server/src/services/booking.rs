//! Booking session operations that need the cinema backend or the hold store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::catalog;
use crate::booking::{BookingFlow, FlowError, PriceQuote, PricedSeat};
use crate::models::{BookingConfirmation, BookingRequest, FoodSelection, SeatKey};
use crate::state::AppState;
use crate::store::HoldRequest;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    pub session: BookingFlow,
    pub quote: PriceQuote,
}

impl From<BookingFlow> for BookingView {
    fn from(session: BookingFlow) -> Self {
        let quote = session.quote();
        Self { session, quote }
    }
}

async fn update<T>(
    state: &AppState,
    id: Uuid,
    now: DateTime<Utc>,
    f: impl FnOnce(&mut BookingFlow) -> Result<T, FlowError>,
) -> Result<T, AppError> {
    state
        .sessions
        .update(id, now, f)
        .await
        .ok_or_else(|| AppError::session_not_found(id))?
        .map_err(AppError::from)
}

async fn snapshot(state: &AppState, id: Uuid, now: DateTime<Utc>) -> Result<BookingFlow, AppError> {
    state
        .sessions
        .get(id, now)
        .await
        .ok_or_else(|| AppError::session_not_found(id))
}

pub async fn start(state: &AppState, showtime_id: i64, phone_number: &str) -> Result<BookingView, AppError> {
    let phone_number = phone_number.trim();
    if phone_number.is_empty() {
        return Err(AppError::ValidationError("A phone number is required to book".to_string()));
    }

    let showtime = state.backend.showtime(showtime_id).await?;
    let flow = BookingFlow::new(&showtime, phone_number, Utc::now());
    state.sessions.insert(flow.clone()).await;

    tracing::info!(session_id = %flow.id, showtime_id, "Booking session started");
    Ok(flow.into())
}

pub async fn view(state: &AppState, id: Uuid) -> Result<BookingView, AppError> {
    Ok(snapshot(state, id, Utc::now()).await?.into())
}

/// Checks the seats against live availability, holds them for this session,
/// then records the selection.
pub async fn select_seats(state: &AppState, id: Uuid, seats: Vec<SeatKey>) -> Result<BookingView, AppError> {
    let now = Utc::now();
    let flow = snapshot(state, id, now).await?;
    flow.check_seat_selection(&seats)?;

    let showtime = state.backend.showtime(flow.showtime_id).await?;
    let map = catalog::seat_map(state, &showtime, Some(id), now).await?;
    let unavailable = map.unavailable_among(&seats);
    if !unavailable.is_empty() {
        return Err(AppError::Conflict {
            message: "Some of the selected seats are no longer available".to_string(),
            seats: unavailable.iter().map(ToString::to_string).collect(),
        });
    }

    let priced: Vec<PricedSeat> = seats
        .iter()
        .filter_map(|key| map.status(key).map(PricedSeat::from))
        .collect();

    state
        .store
        .place_hold(HoldRequest {
            session_id: id,
            showtime_id: flow.showtime_id,
            seats: seats.clone(),
            now,
            expires_at: now + state.config.hold_ttl,
        })
        .await?;

    if let Err(e) = update(state, id, now, |f| f.select_seats(priced)).await {
        restore_holds(state, &flow, now).await;
        return Err(e);
    }

    tracing::info!(session_id = %id, seats = seats.len(), "Seats held");
    view(state, id).await
}

/// Puts back the holds for `flow`'s recorded selection after a new
/// selection was held but could not be recorded.
async fn restore_holds(state: &AppState, flow: &BookingFlow, now: DateTime<Utc>) {
    let restored = state
        .store
        .place_hold(HoldRequest {
            session_id: flow.id,
            showtime_id: flow.showtime_id,
            seats: flow.seat_keys(),
            now,
            expires_at: now + state.config.hold_ttl,
        })
        .await;

    if let Err(e) = restored {
        tracing::warn!(session_id = %flow.id, error = %e, "Could not restore previous seat holds");
    }
}

pub async fn select_foods(
    state: &AppState,
    id: Uuid,
    selections: &[FoodSelection],
) -> Result<BookingView, AppError> {
    let foods = catalog::price_foods(state, selections).await?;
    update(state, id, Utc::now(), |f| f.select_foods(foods)).await?;
    view(state, id).await
}

pub async fn apply_voucher(state: &AppState, id: Uuid, code: &str) -> Result<BookingView, AppError> {
    let now = Utc::now();
    let voucher = catalog::usable_voucher(state, code, now).await?;
    update(state, id, now, |f| f.apply_voucher(voucher)).await?;
    view(state, id).await
}

pub async fn clear_voucher(state: &AppState, id: Uuid) -> Result<BookingView, AppError> {
    update(state, id, Utc::now(), BookingFlow::clear_voucher).await?;
    view(state, id).await
}

pub async fn advance(state: &AppState, id: Uuid) -> Result<BookingView, AppError> {
    let step = update(state, id, Utc::now(), BookingFlow::advance).await?;
    tracing::debug!(session_id = %id, ?step, "Booking advanced");
    view(state, id).await
}

pub async fn back(state: &AppState, id: Uuid) -> Result<BookingView, AppError> {
    update(state, id, Utc::now(), BookingFlow::back).await?;
    view(state, id).await
}

pub async fn abandon(state: &AppState, id: Uuid) -> Result<(), AppError> {
    let flow = state
        .sessions
        .remove(id)
        .await
        .ok_or_else(|| AppError::session_not_found(id))?;
    let released = state.store.release_holds(id).await?;

    tracing::info!(session_id = %id, showtime_id = flow.showtime_id, released, "Booking session abandoned");
    Ok(())
}

/// Submits the booking. A confirmation is only issued after the cinema
/// backend acknowledges the bill; on any failure the session returns to the
/// payment step with its holds intact.
pub async fn checkout(state: &AppState, id: Uuid) -> Result<BookingConfirmation, AppError> {
    let now = Utc::now();
    let request = update(state, id, now, BookingFlow::begin_checkout).await?;
    let flow = snapshot(state, id, now).await?;

    match submit(state, id, &flow, &request, now).await {
        Ok(confirmation) => Ok(confirmation),
        Err(e) => {
            state
                .sessions
                .update(id, now, |f| {
                    f.abort_checkout();
                    Ok::<_, FlowError>(())
                })
                .await;
            tracing::warn!(session_id = %id, error = %e, "Checkout failed");
            Err(e)
        }
    }
}

async fn submit(
    state: &AppState,
    id: Uuid,
    flow: &BookingFlow,
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingConfirmation, AppError> {
    let seats = flow.seat_keys();

    // The voucher may have expired or been redeemed since it was applied.
    if let Some(applied) = &flow.voucher {
        applied.check_usable(now)?;
        catalog::usable_voucher(state, &applied.code, now).await?;
    }

    // Tickets may have been issued since the seats were selected.
    let showtime = state.backend.showtime(flow.showtime_id).await?;
    let map = catalog::seat_map(state, &showtime, Some(id), now).await?;
    let unavailable = map.unavailable_among(&seats);
    if !unavailable.is_empty() {
        return Err(AppError::Conflict {
            message: "Some seats were taken before checkout completed".to_string(),
            seats: unavailable.iter().map(ToString::to_string).collect(),
        });
    }

    // Re-taking the hold fails if ours lapsed and another session grabbed a seat.
    state
        .store
        .place_hold(HoldRequest {
            session_id: id,
            showtime_id: flow.showtime_id,
            seats: seats.clone(),
            now,
            expires_at: now + state.config.hold_ttl,
        })
        .await?;

    let ack = state.backend.create_booking(request).await?;

    let quote = flow.quote();
    let confirmation = BookingConfirmation {
        id: Uuid::new_v4(),
        bill_id: ack.bill_id,
        showtime_id: flow.showtime_id,
        phone_number: flow.phone_number.clone(),
        seat_count: i32::try_from(seats.len()).unwrap_or(i32::MAX),
        seats,
        subtotal: quote.subtotal,
        discount: quote.discount,
        total: quote.total,
        voucher_code: quote.voucher_code,
        created_at: Utc::now(),
    };

    // The bill exists upstream from here on; the session must not be resubmitted.
    state.sessions.remove(id).await;
    if let Err(e) = state.store.release_holds(id).await {
        tracing::warn!(session_id = %id, error = %e, "Failed to release holds after checkout");
    }
    if let Err(e) = state.store.save_confirmation(&confirmation).await {
        tracing::error!(bill_id = ack.bill_id, error = %e, "Booked bill has no stored confirmation");
        return Err(e.into());
    }

    tracing::info!(
        session_id = %id,
        bill_id = ack.bill_id,
        confirmation_id = %confirmation.id,
        total = %confirmation.total,
        "Booking confirmed"
    );
    Ok(confirmation)
}

pub async fn confirmation(state: &AppState, id: Uuid) -> Result<BookingConfirmation, AppError> {
    state
        .store
        .confirmation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking confirmation '{id}' was not found")))
}
