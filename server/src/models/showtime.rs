use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A screening of one movie in one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    pub showtime_id: i64,
    pub room_id: i64,
    pub movie_id: i64,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
