//! The seats -> food -> payment booking flow.
//!
//! A [`BookingFlow`] holds a customer's selections until checkout. Steps only
//! move one at a time, and the flow cannot leave `seats` with nothing
//! selected.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::pricing::{self, PriceQuote, PricedSeat};
use crate::models::{BookingRequest, FoodLine, SeatKey, Showtime, TicketLine, Voucher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStep {
    Seats,
    Food,
    Payment,
}

impl BookingStep {
    pub fn next(self) -> Option<Self> {
        match self {
            BookingStep::Seats => Some(BookingStep::Food),
            BookingStep::Food => Some(BookingStep::Payment),
            BookingStep::Payment => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            BookingStep::Seats => None,
            BookingStep::Food => Some(BookingStep::Seats),
            BookingStep::Payment => Some(BookingStep::Food),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("select at least one seat before continuing")]
    NoSeatsSelected,

    #[error("cannot {action} during the {step:?} step")]
    WrongStep {
        action: &'static str,
        step: BookingStep,
    },

    #[error("payment is the last step")]
    AtLastStep,

    #[error("seats is the first step")]
    AtFirstStep,

    #[error("seat {0} was selected more than once")]
    DuplicateSeat(SeatKey),

    #[error("food item {0} needs a quantity of at least 1")]
    ZeroQuantity(i64),

    #[error("checkout is already in progress")]
    CheckoutInProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingFlow {
    pub id: Uuid,
    pub showtime_id: i64,
    pub room_id: i64,
    pub phone_number: String,
    pub step: BookingStep,
    pub seats: Vec<PricedSeat>,
    pub foods: Vec<FoodLine>,
    pub voucher: Option<Voucher>,
    #[serde(skip)]
    pub submitting: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingFlow {
    pub fn new(showtime: &Showtime, phone_number: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            showtime_id: showtime.showtime_id,
            room_id: showtime.room_id,
            phone_number: phone_number.into(),
            step: BookingStep::Seats,
            seats: Vec::new(),
            foods: Vec::new(),
            voucher: None,
            submitting: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn require_step(&self, action: &'static str, allowed: &[BookingStep]) -> Result<(), FlowError> {
        if self.submitting {
            return Err(FlowError::CheckoutInProgress);
        }
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(FlowError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    /// Whether `seats` could replace the current selection.
    pub fn check_seat_selection(&self, seats: &[SeatKey]) -> Result<(), FlowError> {
        self.require_step("select seats", &[BookingStep::Seats])?;

        let mut seen = HashSet::with_capacity(seats.len());
        match seats.iter().find(|seat| !seen.insert(**seat)) {
            Some(dup) => Err(FlowError::DuplicateSeat(*dup)),
            None => Ok(()),
        }
    }

    /// Replaces the seat selection. An empty list clears it.
    pub fn select_seats(&mut self, seats: Vec<PricedSeat>) -> Result<(), FlowError> {
        let keys: Vec<SeatKey> = seats.iter().map(|s| s.seat).collect();
        self.check_seat_selection(&keys)?;
        self.seats = seats;
        Ok(())
    }

    pub fn select_foods(&mut self, foods: Vec<FoodLine>) -> Result<(), FlowError> {
        self.require_step("select food", &[BookingStep::Food])?;
        if let Some(line) = foods.iter().find(|line| line.quantity == 0) {
            return Err(FlowError::ZeroQuantity(line.food_id));
        }
        self.foods = foods;
        Ok(())
    }

    pub fn apply_voucher(&mut self, voucher: Voucher) -> Result<(), FlowError> {
        self.require_step("apply a voucher", &[BookingStep::Food, BookingStep::Payment])?;
        self.voucher = Some(voucher);
        Ok(())
    }

    pub fn clear_voucher(&mut self) -> Result<(), FlowError> {
        self.require_step("remove a voucher", &[BookingStep::Food, BookingStep::Payment])?;
        self.voucher = None;
        Ok(())
    }

    pub fn advance(&mut self) -> Result<BookingStep, FlowError> {
        if self.submitting {
            return Err(FlowError::CheckoutInProgress);
        }
        if self.step == BookingStep::Seats && self.seats.is_empty() {
            return Err(FlowError::NoSeatsSelected);
        }
        self.step = self.step.next().ok_or(FlowError::AtLastStep)?;
        Ok(self.step)
    }

    pub fn back(&mut self) -> Result<BookingStep, FlowError> {
        if self.submitting {
            return Err(FlowError::CheckoutInProgress);
        }
        self.step = self.step.previous().ok_or(FlowError::AtFirstStep)?;
        Ok(self.step)
    }

    pub fn quote(&self) -> PriceQuote {
        pricing::quote(&self.seats, &self.foods, self.voucher.as_ref())
    }

    pub fn seat_keys(&self) -> Vec<SeatKey> {
        self.seats.iter().map(|s| s.seat).collect()
    }

    /// Marks the flow as submitting and returns the bill draft to send.
    pub fn begin_checkout(&mut self) -> Result<BookingRequest, FlowError> {
        self.require_step("check out", &[BookingStep::Payment])?;
        if self.seats.is_empty() {
            return Err(FlowError::NoSeatsSelected);
        }

        self.submitting = true;
        let quote = self.quote();
        Ok(BookingRequest {
            phone_number: self.phone_number.clone(),
            showtime_id: self.showtime_id,
            tickets: self
                .seats
                .iter()
                .map(|s| TicketLine {
                    room_id: self.room_id,
                    seat_row: s.seat.row,
                    seat_column: s.seat.column,
                    price: s.price,
                })
                .collect(),
            foods: self.foods.clone(),
            voucher_code: self.voucher.as_ref().map(|v| v.code.clone()),
            total_price: quote.total,
        })
    }

    /// Returns the flow to the payment step after a failed submission.
    pub fn abort_checkout(&mut self) {
        self.submitting = false;
    }
}
