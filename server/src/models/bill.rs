use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::food::FoodLine;

/// One seat on a bill draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketLine {
    pub room_id: i64,
    pub seat_row: char,
    pub seat_column: u16,
    pub price: Decimal,
}

/// Bill draft submitted to the cinema backend's booking endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub phone_number: String,
    pub showtime_id: i64,
    pub tickets: Vec<TicketLine>,
    pub foods: Vec<FoodLine>,
    pub voucher_code: Option<String>,
    pub total_price: Decimal,
}

/// Acknowledgement returned once the backend has written the bill and its tickets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingAck {
    pub bill_id: i64,
}
