use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::seat::{SeatKey, SeatKeyError};

/// An issued ticket. The only record that marks a seat as sold for a showtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: i64,
    pub bill_id: i64,
    pub showtime_id: i64,
    pub room_id: i64,
    pub seat_row: char,
    pub seat_column: u16,
    pub price: Decimal,
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn key(&self) -> Result<SeatKey, SeatKeyError> {
        SeatKey::try_new(self.seat_row, self.seat_column)
    }
}
