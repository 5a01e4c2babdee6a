//! Ticket and food pricing with voucher discounts.
//!
//! Amounts are VND held as `Decimal`. Nothing is rounded here; rounding to
//! whole dong only happens in [`format_vnd`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::availability::SeatStatus;
use crate::models::{FoodLine, PromotionalBenefit, SeatKey, SeatType, Voucher};

/// A selected seat with the unit price it was offered at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedSeat {
    pub seat: SeatKey,
    pub seat_type: SeatType,
    pub price: Decimal,
}

impl From<&SeatStatus> for PricedSeat {
    fn from(status: &SeatStatus) -> Self {
        Self {
            seat: status.seat,
            seat_type: status.seat_type,
            price: status.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub seat_count: usize,
    pub ticket_subtotal: Decimal,
    pub food_subtotal: Decimal,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub total_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gift: Option<String>,
}

/// `min(subtotal * percent / 100, cap)`, never negative.
pub fn discount_amount(subtotal: Decimal, percent_reduce: Decimal, max_price_can_reduce: Decimal) -> Decimal {
    let raw = subtotal * percent_reduce / Decimal::ONE_HUNDRED;
    raw.min(max_price_can_reduce).max(Decimal::ZERO)
}

/// Gift promotionals grant no money off.
pub fn voucher_discount(subtotal: Decimal, benefit: &PromotionalBenefit) -> Decimal {
    match benefit {
        PromotionalBenefit::Discount {
            percent_reduce,
            max_price_can_reduce,
        } => discount_amount(subtotal, *percent_reduce, *max_price_can_reduce),
        PromotionalBenefit::Gift { .. } => Decimal::ZERO,
    }
}

pub fn quote(seats: &[PricedSeat], foods: &[FoodLine], voucher: Option<&Voucher>) -> PriceQuote {
    let ticket_subtotal: Decimal = seats.iter().map(|seat| seat.price).sum();
    let food_subtotal: Decimal = foods.iter().map(FoodLine::line_total).sum();
    let subtotal = ticket_subtotal + food_subtotal;

    let discount = voucher
        .map(|v| voucher_discount(subtotal, &v.promotional.benefit))
        .unwrap_or(Decimal::ZERO);
    let total = (subtotal - discount).max(Decimal::ZERO);

    let gift = voucher.and_then(|v| match &v.promotional.benefit {
        PromotionalBenefit::Gift { description } => Some(description.clone()),
        PromotionalBenefit::Discount { .. } => None,
    });

    PriceQuote {
        seat_count: seats.len(),
        ticket_subtotal,
        food_subtotal,
        subtotal,
        discount,
        total,
        total_display: format_vnd(total),
        voucher_code: voucher.map(|v| v.code.clone()),
        gift,
    }
}

/// Whole dong with `.` thousands separators, e.g. `420.000 ₫`.
pub fn format_vnd(amount: Decimal) -> String {
    let whole = amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i128()
        .unwrap_or_default();

    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{grouped} ₫")
}
