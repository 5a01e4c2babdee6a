//! Per-showtime seat availability.
//!
//! Availability is derived, never stored: a seat is open for a showtime when
//! it is physically usable, carries no ticket, and is not held by another
//! booking session.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use super::layout::{RoomLayout, SeatDescriptor, SeatGrid};
use crate::models::{SeatKey, SeatState, SeatType, Ticket};

/// Why a seat cannot be selected. Ordered by precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailability {
    OutOfService,
    Ticketed,
    Held,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub available: Vec<SeatDescriptor>,
    pub booked: Vec<SeatDescriptor>,
}

/// Splits `seats` by membership in `available`: a seat whose key is absent is
/// booked. An empty set therefore books every seat.
pub fn partition(seats: &[SeatDescriptor], available: &HashSet<SeatKey>) -> Availability {
    let (available, booked) = seats
        .iter()
        .cloned()
        .partition(|seat| available.contains(&seat.key));
    Availability { available, booked }
}

/// Seats that are still open: the grid minus ticketed, held, and
/// out-of-service seats.
pub fn available_keys(
    seats: &[SeatDescriptor],
    ticketed: &HashSet<SeatKey>,
    held: &HashSet<SeatKey>,
) -> HashSet<SeatKey> {
    seats
        .iter()
        .filter(|seat| blocking_reason(seat, ticketed, held).is_none())
        .map(|seat| seat.key)
        .collect()
}

fn blocking_reason(
    seat: &SeatDescriptor,
    ticketed: &HashSet<SeatKey>,
    held: &HashSet<SeatKey>,
) -> Option<Unavailability> {
    if seat.state != SeatState::Available {
        Some(Unavailability::OutOfService)
    } else if ticketed.contains(&seat.key) {
        Some(Unavailability::Ticketed)
    } else if held.contains(&seat.key) {
        Some(Unavailability::Held)
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatStatus {
    pub seat: SeatKey,
    pub seat_type: SeatType,
    pub price: Decimal,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Unavailability>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub showtime_id: i64,
    pub room_id: i64,
    pub grid: SeatGrid,
    pub seats: Vec<SeatStatus>,
    pub available_count: usize,
    pub booked_count: usize,
}

impl SeatMap {
    /// `held_by_others` must exclude holds owned by the caller's own session.
    pub fn resolve(
        showtime_id: i64,
        layout: &RoomLayout,
        tickets: &[Ticket],
        held_by_others: &HashSet<SeatKey>,
    ) -> Self {
        let ticketed: HashSet<SeatKey> = tickets
            .iter()
            .filter(|ticket| ticket.showtime_id == showtime_id)
            .filter_map(|ticket| match ticket.key() {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!(ticket_id = ticket.ticket_id, error = %e, "Ticket with an invalid seat ignored");
                    None
                }
            })
            .collect();
        let open = available_keys(&layout.seats, &ticketed, held_by_others);

        let seats: Vec<SeatStatus> = layout
            .seats
            .iter()
            .map(|seat| {
                let available = open.contains(&seat.key);
                SeatStatus {
                    seat: seat.key,
                    seat_type: seat.seat_type,
                    price: seat.price,
                    available,
                    reason: if available {
                        None
                    } else {
                        blocking_reason(seat, &ticketed, held_by_others)
                    },
                }
            })
            .collect();

        let available_count = seats.iter().filter(|s| s.available).count();
        Self {
            showtime_id,
            room_id: layout.room_id,
            grid: layout.grid,
            booked_count: seats.len() - available_count,
            available_count,
            seats,
        }
    }

    pub fn status(&self, key: &SeatKey) -> Option<&SeatStatus> {
        self.seats.iter().find(|status| status.seat == *key)
    }

    /// Keys from `wanted` that are missing from the room or not available.
    pub fn unavailable_among(&self, wanted: &[SeatKey]) -> Vec<SeatKey> {
        wanted
            .iter()
            .filter(|key| !self.status(key).is_some_and(|status| status.available))
            .copied()
            .collect()
    }
}
