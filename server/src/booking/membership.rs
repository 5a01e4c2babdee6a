use serde::{Deserialize, Serialize};

use crate::models::{Account, MembershipTier};

/// Minimum points for each tier above copper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub gold: i64,
    pub diamond: i64,
    pub vip: i64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            gold: 2_000,
            diamond: 5_000,
            vip: 10_000,
        }
    }
}

impl TierThresholds {
    pub fn tier_for(&self, points: i64) -> MembershipTier {
        if points >= self.vip {
            MembershipTier::Vip
        } else if points >= self.diamond {
            MembershipTier::Diamond
        } else if points >= self.gold {
            MembershipTier::Gold
        } else {
            MembershipTier::Copper
        }
    }

    /// The next tier up and the points still missing to reach it.
    pub fn next_tier(&self, points: i64) -> Option<(MembershipTier, i64)> {
        let (tier, threshold) = match self.tier_for(points) {
            MembershipTier::Copper => (MembershipTier::Gold, self.gold),
            MembershipTier::Gold => (MembershipTier::Diamond, self.diamond),
            MembershipTier::Diamond => (MembershipTier::Vip, self.vip),
            MembershipTier::Vip => return None,
        };
        Some((tier, threshold.saturating_sub(points)))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MembershipStatus {
    pub phone_number: String,
    pub membership_points: i64,
    pub tier: MembershipTier,
    pub next_tier: Option<MembershipTier>,
    pub points_to_next_tier: Option<i64>,
}

impl MembershipStatus {
    pub fn for_account(account: &Account, thresholds: &TierThresholds) -> Self {
        let points = account.membership_points;
        let next = thresholds.next_tier(points);
        Self {
            phone_number: account.phone_number.clone(),
            membership_points: points,
            tier: thresholds.tier_for(points),
            next_tier: next.map(|(tier, _)| tier),
            points_to_next_tier: next.map(|(_, missing)| missing),
        }
    }
}
