//! Client side of the cinema backend's REST API.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, BookingAck, BookingRequest, FoodItem, Seat, Showtime, Ticket, Voucher};

pub use http::HttpCinemaBackend;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to cinema backend failed: {0}")]
    Request(String),

    #[error("cinema backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode cinema backend response: {0}")]
    Decode(String),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("booking rejected by cinema backend (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Everything this service reads from or writes to the cinema backend.
#[async_trait]
pub trait CinemaBackend: Send + Sync {
    async fn seats_for_room(&self, room_id: i64) -> Result<Vec<Seat>, UpstreamError>;

    async fn tickets_for_showtime(&self, showtime_id: i64) -> Result<Vec<Ticket>, UpstreamError>;

    async fn showtime(&self, showtime_id: i64) -> Result<Showtime, UpstreamError>;

    async fn voucher(&self, code: &str) -> Result<Voucher, UpstreamError>;

    async fn foods(&self) -> Result<Vec<FoodItem>, UpstreamError>;

    async fn account(&self, phone_number: &str) -> Result<Account, UpstreamError>;

    /// Only an explicit 2xx acknowledgement counts as a booked bill.
    async fn create_booking(&self, request: &BookingRequest) -> Result<BookingAck, UpstreamError>;
}
