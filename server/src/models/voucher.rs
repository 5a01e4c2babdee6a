use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherState {
    Active,
    Used,
    Expired,
}

/// What a promotional grants. Only discounts affect the price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromotionalBenefit {
    Discount {
        percent_reduce: Decimal,
        max_price_can_reduce: Decimal,
    },
    Gift {
        description: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotional {
    pub promotional_id: i64,
    pub name: String,
    #[serde(flatten)]
    pub benefit: PromotionalBenefit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub code: String,
    pub state: VoucherState,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub promotional: Promotional,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoucherRejection {
    #[error("voucher {0} has already been used")]
    AlreadyUsed(String),

    #[error("voucher {0} has expired")]
    Expired(String),

    #[error("voucher {0} is not valid yet")]
    NotYetValid(String),
}

impl Voucher {
    /// Checks lifecycle state and validity window at `now`.
    pub fn check_usable(&self, now: DateTime<Utc>) -> Result<(), VoucherRejection> {
        match self.state {
            VoucherState::Used => return Err(VoucherRejection::AlreadyUsed(self.code.clone())),
            VoucherState::Expired => return Err(VoucherRejection::Expired(self.code.clone())),
            VoucherState::Active => {}
        }

        if now < self.valid_from {
            return Err(VoucherRejection::NotYetValid(self.code.clone()));
        }
        if now > self.valid_until {
            return Err(VoucherRejection::Expired(self.code.clone()));
        }

        Ok(())
    }
}
