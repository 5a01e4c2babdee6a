use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{BookingStore, HoldRequest, SeatHold, StoreError};
use crate::models::{BookingConfirmation, SeatKey};

#[derive(FromRow)]
struct HoldRow {
    session_id: Uuid,
    showtime_id: i64,
    seat_row: String,
    seat_column: i32,
    expires_at: DateTime<Utc>,
}

impl HoldRow {
    fn into_hold(self) -> Option<SeatHold> {
        let seat = format!("{}{}", self.seat_row, self.seat_column).parse::<SeatKey>().ok()?;
        Some(SeatHold {
            session_id: self.session_id,
            showtime_id: self.showtime_id,
            seat,
            expires_at: self.expires_at,
        })
    }
}

#[derive(FromRow)]
struct ConfirmationRow {
    id: Uuid,
    bill_id: i64,
    showtime_id: i64,
    phone_number: String,
    seats: Vec<String>,
    seat_count: i32,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
    voucher_code: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ConfirmationRow> for BookingConfirmation {
    fn from(row: ConfirmationRow) -> Self {
        Self {
            id: row.id,
            bill_id: row.bill_id,
            showtime_id: row.showtime_id,
            phone_number: row.phone_number,
            seats: row.seats.iter().filter_map(|s| s.parse().ok()).collect(),
            seat_count: row.seat_count,
            subtotal: row.subtotal,
            discount: row.discount,
            total: row.total,
            voucher_code: row.voucher_code,
            created_at: row.created_at,
        }
    }
}

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn place_hold(&self, request: HoldRequest) -> Result<Vec<SeatHold>, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM seat_holds WHERE showtime_id = $1 AND (expires_at <= $2 OR session_id = $3)",
        )
        .bind(request.showtime_id)
        .bind(request.now)
        .bind(request.session_id)
        .execute(&mut *tx)
        .await?;

        let seats = request.distinct_seats();
        let mut taken = Vec::new();
        for seat in &seats {
            let inserted = sqlx::query(
                "INSERT INTO seat_holds (showtime_id, seat_row, seat_column, session_id, expires_at)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (showtime_id, seat_row, seat_column) DO NOTHING",
            )
            .bind(request.showtime_id)
            .bind(seat.row.to_string())
            .bind(i32::from(seat.column))
            .bind(request.session_id)
            .bind(request.expires_at)
            .execute(&mut *tx)
            .await?;

            if inserted.rows_affected() == 0 {
                taken.push(*seat);
            }
        }

        if !taken.is_empty() {
            tx.rollback().await?;
            return Err(StoreError::SeatsTaken(taken));
        }
        tx.commit().await?;

        tracing::debug!(
            session_id = %request.session_id,
            showtime_id = request.showtime_id,
            seats = seats.len(),
            "Seat hold placed"
        );

        Ok(seats.into_iter().map(|seat| request.hold(seat)).collect())
    }

    async fn release_holds(&self, session_id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM seat_holds WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn active_holds(&self, showtime_id: i64, now: DateTime<Utc>) -> Result<Vec<SeatHold>, StoreError> {
        let rows: Vec<HoldRow> = sqlx::query_as(
            "SELECT session_id, showtime_id, seat_row, seat_column, expires_at
             FROM seat_holds
             WHERE showtime_id = $1 AND expires_at > $2
             ORDER BY seat_row, seat_column",
        )
        .bind(showtime_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(HoldRow::into_hold).collect())
    }

    async fn purge_expired_holds(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM seat_holds WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn save_confirmation(&self, confirmation: &BookingConfirmation) -> Result<(), StoreError> {
        let seats: Vec<String> = confirmation.seats.iter().map(ToString::to_string).collect();

        sqlx::query(
            "INSERT INTO booking_confirmations
                (id, bill_id, showtime_id, phone_number, seats, seat_count, subtotal, discount, total, voucher_code, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(confirmation.id)
        .bind(confirmation.bill_id)
        .bind(confirmation.showtime_id)
        .bind(&confirmation.phone_number)
        .bind(&seats)
        .bind(confirmation.seat_count)
        .bind(confirmation.subtotal)
        .bind(confirmation.discount)
        .bind(confirmation.total)
        .bind(&confirmation.voucher_code)
        .bind(confirmation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn confirmation(&self, id: Uuid) -> Result<Option<BookingConfirmation>, StoreError> {
        let row: Option<ConfirmationRow> = sqlx::query_as(
            "SELECT id, bill_id, showtime_id, phone_number, seats, seat_count, subtotal, discount, total, voucher_code, created_at
             FROM booking_confirmations
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BookingConfirmation::from))
    }
}
