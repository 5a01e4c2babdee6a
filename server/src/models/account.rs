use serde::{Deserialize, Serialize};

/// Customer account, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub phone_number: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub membership_points: i64,
}

/// Ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    Copper,
    Gold,
    Diamond,
    Vip,
}
