use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Food or drink add-on offered at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_id: i64,
    pub name: String,
    pub price: Decimal,
}

/// What the client asks for; prices are looked up server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodSelection {
    pub food_id: i64,
    pub quantity: u32,
}

/// A priced food line on a bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLine {
    pub food_id: i64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl FoodLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
