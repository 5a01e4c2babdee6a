use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::seat::SeatKey;

/// Server-issued record of a completed checkout, fetched by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub id: Uuid,
    pub bill_id: i64,
    pub showtime_id: i64,
    pub phone_number: String,
    pub seats: Vec<SeatKey>,
    pub seat_count: i32,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub voucher_code: Option<String>,
    pub created_at: DateTime<Utc>,
}
