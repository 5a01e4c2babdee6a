//! Seat holds and booking confirmations.
//!
//! A hold reserves seats for one booking session until it expires, so two
//! customers cannot walk away from checkout with the same seat.

pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BookingConfirmation, SeatKey};

pub use memory::MemoryBookingStore;
pub use postgres::PgBookingStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("seats already held by another booking: {}", labels(.0))]
    SeatsTaken(Vec<SeatKey>),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

fn labels(seats: &[SeatKey]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeatHold {
    pub session_id: Uuid,
    pub showtime_id: i64,
    pub seat: SeatKey,
    pub expires_at: DateTime<Utc>,
}

/// Replace a session's holds for one showtime with `seats`.
#[derive(Debug, Clone)]
pub struct HoldRequest {
    pub session_id: Uuid,
    pub showtime_id: i64,
    pub seats: Vec<SeatKey>,
    pub now: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl HoldRequest {
    /// Requested seats in order, each once.
    pub fn distinct_seats(&self) -> Vec<SeatKey> {
        let mut seen = HashSet::with_capacity(self.seats.len());
        self.seats.iter().copied().filter(|seat| seen.insert(*seat)).collect()
    }

    fn hold(&self, seat: SeatKey) -> SeatHold {
        SeatHold {
            session_id: self.session_id,
            showtime_id: self.showtime_id,
            seat,
            expires_at: self.expires_at,
        }
    }
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All-or-nothing. Fails with `SeatsTaken` if any seat has a live hold
    /// owned by another session; the session's previous holds are then left
    /// untouched. A seat listed twice is held once.
    async fn place_hold(&self, request: HoldRequest) -> Result<Vec<SeatHold>, StoreError>;

    async fn release_holds(&self, session_id: Uuid) -> Result<u64, StoreError>;

    async fn active_holds(&self, showtime_id: i64, now: DateTime<Utc>) -> Result<Vec<SeatHold>, StoreError>;

    async fn purge_expired_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;

    async fn save_confirmation(&self, confirmation: &BookingConfirmation) -> Result<(), StoreError>;

    async fn confirmation(&self, id: Uuid) -> Result<Option<BookingConfirmation>, StoreError>;
}
