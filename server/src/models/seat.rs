use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Position of a seat inside a room: row letter plus 1-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatKey {
    pub row: char,
    pub column: u16,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatKeyError {
    #[error("seat label is empty")]
    Empty,

    #[error("seat row '{0}' is not a letter between A and Z")]
    InvalidRow(char),

    #[error("seat column in '{0}' is not a positive number")]
    InvalidColumn(String),
}

impl SeatKey {
    pub fn new(row: char, column: u16) -> Self {
        Self {
            row: row.to_ascii_uppercase(),
            column,
        }
    }

    /// Checked constructor for rows and columns that come from outside.
    pub fn try_new(row: char, column: u16) -> Result<Self, SeatKeyError> {
        let row = row.to_ascii_uppercase();
        if !row.is_ascii_uppercase() {
            return Err(SeatKeyError::InvalidRow(row));
        }
        if column == 0 {
            return Err(SeatKeyError::InvalidColumn(format!("{row}{column}")));
        }
        Ok(Self { row, column })
    }

    /// Zero-based row index (`A` = 0).
    pub fn row_index(&self) -> usize {
        (self.row as u8).saturating_sub(b'A') as usize
    }
}

impl fmt::Display for SeatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for SeatKey {
    type Err = SeatKeyError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        let mut chars = label.chars();
        let row = chars.next().ok_or(SeatKeyError::Empty)?;
        if !row.is_ascii_alphabetic() {
            return Err(SeatKeyError::InvalidRow(row));
        }
        let column: u16 = chars
            .as_str()
            .parse()
            .map_err(|_| SeatKeyError::InvalidColumn(label.to_string()))?;

        Self::try_new(row, column)
    }
}

impl TryFrom<String> for SeatKey {
    type Error = SeatKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatKey> for String {
    fn from(key: SeatKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Normal,
    Vip,
    Couple,
}

/// Administrative state of a physical seat. Independent of any showtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatState {
    #[default]
    Available,
    Occupied,
    Unavailable,
    Reserved,
}

/// Seat definition as stored by the cinema backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub room_id: i64,
    pub seat_row: char,
    pub seat_column: u16,
    pub seat_type: SeatType,
    #[serde(default, alias = "seat_state")]
    pub state: SeatState,
    pub price: Decimal,
}

impl Seat {
    pub fn key(&self) -> Result<SeatKey, SeatKeyError> {
        SeatKey::try_new(self.seat_row, self.seat_column)
    }
}
