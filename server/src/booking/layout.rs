//! Seat layout generation.
//!
//! A room's grid is either taken from the seat definitions stored by the
//! cinema backend or, when a room has none, generated from configured
//! dimensions. Generated seats are typed purely by row position: the last
//! row holds couple seats, the row in front of it VIP seats, every other
//! row normal seats.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Seat, SeatKey, SeatKeyError, SeatState, SeatType};

pub const MAX_ROWS: u16 = 26;
pub const MAX_COLUMNS: u16 = 99;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("a room needs between 1 and 26 rows, got {0}")]
    InvalidRows(u16),

    #[error("a room needs between 1 and 99 columns, got {0}")]
    InvalidColumns(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    pub rows: u16,
    pub columns: u16,
}

impl SeatGrid {
    pub fn new(rows: u16, columns: u16) -> Result<Self, LayoutError> {
        if rows == 0 || rows > MAX_ROWS {
            return Err(LayoutError::InvalidRows(rows));
        }
        if columns == 0 || columns > MAX_COLUMNS {
            return Err(LayoutError::InvalidColumns(columns));
        }
        Ok(Self { rows, columns })
    }

    pub fn capacity(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns)
    }

    pub fn contains(&self, key: &SeatKey) -> bool {
        key.row_index() < usize::from(self.rows) && key.column >= 1 && key.column <= self.columns
    }

    /// Seat class for a zero-based row index.
    pub fn seat_type_for_row(&self, row_index: u16) -> SeatType {
        let last = self.rows.saturating_sub(1);
        if row_index >= last {
            SeatType::Couple
        } else if row_index + 1 == last {
            SeatType::Vip
        } else {
            SeatType::Normal
        }
    }
}

/// Unit ticket price per seat class, in VND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatPricing {
    pub normal: Decimal,
    pub vip: Decimal,
    pub couple: Decimal,
}

impl Default for SeatPricing {
    fn default() -> Self {
        Self {
            normal: Decimal::from(75_000),
            vip: Decimal::from(90_000),
            couple: Decimal::from(150_000),
        }
    }
}

impl SeatPricing {
    pub fn price_for(&self, seat_type: SeatType) -> Decimal {
        match seat_type {
            SeatType::Normal => self.normal,
            SeatType::Vip => self.vip,
            SeatType::Couple => self.couple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatDescriptor {
    pub key: SeatKey,
    pub seat_type: SeatType,
    pub price: Decimal,
    pub state: SeatState,
}

impl TryFrom<&Seat> for SeatDescriptor {
    type Error = SeatKeyError;

    fn try_from(seat: &Seat) -> Result<Self, Self::Error> {
        Ok(Self {
            key: seat.key()?,
            seat_type: seat.seat_type,
            price: seat.price,
            state: seat.state,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSource {
    Defined,
    Generated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLayout {
    pub room_id: i64,
    pub grid: SeatGrid,
    pub source: LayoutSource,
    pub seats: Vec<SeatDescriptor>,
}

impl RoomLayout {
    /// Uses the backend's seat definitions when there are any, otherwise
    /// generates the configured grid.
    pub fn for_room(room_id: i64, defined: &[Seat], grid: SeatGrid, pricing: &SeatPricing) -> Self {
        if defined.is_empty() {
            Self {
                room_id,
                grid,
                source: LayoutSource::Generated,
                seats: generate(grid, pricing),
            }
        } else {
            let seats = from_definitions(defined);
            Self {
                room_id,
                grid: bounding_grid(&seats),
                source: LayoutSource::Defined,
                seats,
            }
        }
    }

    pub fn seat(&self, key: &SeatKey) -> Option<&SeatDescriptor> {
        self.seats.iter().find(|seat| seat.key == *key)
    }
}

/// Row-major list of every seat in `grid` (A1, A2, ..., B1, ...).
pub fn generate(grid: SeatGrid, pricing: &SeatPricing) -> Vec<SeatDescriptor> {
    let mut seats = Vec::with_capacity(grid.capacity());
    for row_index in 0..grid.rows {
        let row = char::from(b'A' + row_index as u8);
        let seat_type = grid.seat_type_for_row(row_index);
        let price = pricing.price_for(seat_type);

        for column in 1..=grid.columns {
            seats.push(SeatDescriptor {
                key: SeatKey::new(row, column),
                seat_type,
                price,
                state: SeatState::Available,
            });
        }
    }
    seats
}

/// Backend definitions sorted row-major. A duplicated (row, column) keeps the
/// first definition; rows outside A..=Z are skipped.
pub fn from_definitions(seats: &[Seat]) -> Vec<SeatDescriptor> {
    let mut by_key: BTreeMap<SeatKey, SeatDescriptor> = BTreeMap::new();
    for seat in seats {
        let descriptor = match SeatDescriptor::try_from(seat) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::warn!(room_id = seat.room_id, error = %e, "Invalid seat definition ignored");
                continue;
            }
        };
        if by_key.contains_key(&descriptor.key) {
            tracing::warn!(room_id = seat.room_id, seat = %descriptor.key, "Duplicate seat definition ignored");
            continue;
        }
        by_key.insert(descriptor.key, descriptor);
    }
    by_key.into_values().collect()
}

fn bounding_grid(seats: &[SeatDescriptor]) -> SeatGrid {
    let rows = seats
        .iter()
        .map(|seat| seat.key.row_index() + 1)
        .max()
        .unwrap_or(0);
    let columns = seats.iter().map(|seat| seat.key.column).max().unwrap_or(0);
    SeatGrid {
        rows: u16::try_from(rows).unwrap_or(u16::MAX),
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn grid(rows: u16, columns: u16) -> SeatGrid {
        SeatGrid::new(rows, columns).unwrap()
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        assert_eq!(SeatGrid::new(0, 10), Err(LayoutError::InvalidRows(0)));
        assert_eq!(SeatGrid::new(27, 10), Err(LayoutError::InvalidRows(27)));
        assert_eq!(SeatGrid::new(10, 0), Err(LayoutError::InvalidColumns(0)));
        assert_eq!(SeatGrid::new(10, 100), Err(LayoutError::InvalidColumns(100)));
    }

    #[test]
    fn ten_by_twelve_grid_is_row_major() {
        let seats = generate(grid(10, 12), &SeatPricing::default());
        assert_eq!(seats.len(), 120);
        assert_eq!(seats[0].key.to_string(), "A1");
        assert_eq!(seats[11].key.to_string(), "A12");
        assert_eq!(seats[12].key.to_string(), "B1");
        assert_eq!(seats[119].key.to_string(), "J12");
    }

    #[test]
    fn seat_class_follows_row_position() {
        let seats = generate(grid(10, 10), &SeatPricing::default());
        let type_of = |label: &str| {
            seats
                .iter()
                .find(|s| s.key.to_string() == label)
                .map(|s| s.seat_type)
                .unwrap()
        };

        assert_eq!(type_of("A1"), SeatType::Normal);
        assert_eq!(type_of("H10"), SeatType::Normal);
        assert_eq!(type_of("I1"), SeatType::Vip);
        assert_eq!(type_of("J5"), SeatType::Couple);
    }

    #[test]
    fn single_row_grid_is_all_couple() {
        let seats = generate(grid(1, 4), &SeatPricing::default());
        assert!(seats.iter().all(|s| s.seat_type == SeatType::Couple));
    }

    #[test]
    fn generated_prices_come_from_class_table() {
        let pricing = SeatPricing::default();
        let seats = generate(grid(3, 2), &pricing);
        assert_eq!(seats[0].price, pricing.normal);
        assert_eq!(seats[2].price, pricing.vip);
        assert_eq!(seats[4].price, pricing.couple);
    }

    #[test]
    fn defined_seats_take_precedence_over_generated_grid() {
        let defined = vec![
            Seat {
                room_id: 4,
                seat_row: 'B',
                seat_column: 3,
                seat_type: SeatType::Vip,
                state: SeatState::Available,
                price: Decimal::from(100_000),
            },
            Seat {
                room_id: 4,
                seat_row: 'A',
                seat_column: 1,
                seat_type: SeatType::Normal,
                state: SeatState::Unavailable,
                price: Decimal::from(60_000),
            },
        ];

        let layout = RoomLayout::for_room(4, &defined, grid(10, 10), &SeatPricing::default());
        assert_eq!(layout.source, LayoutSource::Defined);
        assert_eq!(layout.grid, SeatGrid { rows: 2, columns: 3 });
        assert_eq!(layout.seats.len(), 2);
        assert_eq!(layout.seats[0].key.to_string(), "A1");
        assert_eq!(layout.seats[0].state, SeatState::Unavailable);
    }

    #[test]
    fn definitions_with_non_letter_rows_are_skipped() {
        let seat = |seat_row: char| Seat {
            room_id: 4,
            seat_row,
            seat_column: 2,
            seat_type: SeatType::Normal,
            state: SeatState::Available,
            price: Decimal::from(75_000),
        };

        let seats = from_definitions(&[seat('1'), seat('é'), seat('c')]);
        assert_eq!(seats.len(), 1);
        assert_eq!(seats[0].key, SeatKey::new('C', 2));
        assert_eq!(bounding_grid(&seats), SeatGrid { rows: 3, columns: 2 });
    }

    #[test]
    fn empty_definitions_fall_back_to_configured_grid() {
        let layout = RoomLayout::for_room(9, &[], grid(10, 12), &SeatPricing::default());
        assert_eq!(layout.source, LayoutSource::Generated);
        assert_eq!(layout.seats.len(), 120);
    }

    proptest! {
        #[test]
        fn generated_grid_has_rows_times_columns_unique_seats(rows in 1u16..=MAX_ROWS, columns in 1u16..=MAX_COLUMNS) {
            let g = grid(rows, columns);
            let seats = generate(g, &SeatPricing::default());
            let unique: HashSet<SeatKey> = seats.iter().map(|s| s.key).collect();

            prop_assert_eq!(seats.len(), g.capacity());
            prop_assert_eq!(unique.len(), g.capacity());
            prop_assert!(seats.iter().all(|s| g.contains(&s.key)));
        }
    }
}
