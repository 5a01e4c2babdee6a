use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BookingStore, HoldRequest, SeatHold, StoreError};
use crate::models::{BookingConfirmation, SeatKey};

#[derive(Default)]
struct Inner {
    holds: HashMap<(i64, SeatKey), SeatHold>,
    confirmations: HashMap<Uuid, BookingConfirmation>,
}

/// Process-local store for development and tests.
#[derive(Default)]
pub struct MemoryBookingStore {
    inner: Mutex<Inner>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn place_hold(&self, request: HoldRequest) -> Result<Vec<SeatHold>, StoreError> {
        let mut inner = self.inner.lock().await;
        let seats = request.distinct_seats();

        let taken: Vec<SeatKey> = seats
            .iter()
            .filter(|seat| {
                inner
                    .holds
                    .get(&(request.showtime_id, **seat))
                    .is_some_and(|hold| hold.session_id != request.session_id && hold.expires_at > request.now)
            })
            .copied()
            .collect();
        if !taken.is_empty() {
            return Err(StoreError::SeatsTaken(taken));
        }

        inner.holds.retain(|(showtime_id, _), hold| {
            !(*showtime_id == request.showtime_id
                && (hold.session_id == request.session_id || hold.expires_at <= request.now))
        });

        let placed: Vec<SeatHold> = seats.into_iter().map(|seat| request.hold(seat)).collect();
        for hold in &placed {
            inner.holds.insert((hold.showtime_id, hold.seat), hold.clone());
        }

        Ok(placed)
    }

    async fn release_holds(&self, session_id: Uuid) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.holds.len();
        inner.holds.retain(|_, hold| hold.session_id != session_id);
        Ok((before - inner.holds.len()) as u64)
    }

    async fn active_holds(&self, showtime_id: i64, now: DateTime<Utc>) -> Result<Vec<SeatHold>, StoreError> {
        let inner = self.inner.lock().await;
        let mut holds: Vec<SeatHold> = inner
            .holds
            .values()
            .filter(|hold| hold.showtime_id == showtime_id && hold.expires_at > now)
            .cloned()
            .collect();
        holds.sort_by_key(|hold| hold.seat);
        Ok(holds)
    }

    async fn purge_expired_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.holds.len();
        inner.holds.retain(|_, hold| hold.expires_at > now);
        Ok((before - inner.holds.len()) as u64)
    }

    async fn save_confirmation(&self, confirmation: &BookingConfirmation) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .confirmations
            .insert(confirmation.id, confirmation.clone());
        Ok(())
    }

    async fn confirmation(&self, id: Uuid) -> Result<Option<BookingConfirmation>, StoreError> {
        Ok(self.inner.lock().await.confirmations.get(&id).cloned())
    }
}
