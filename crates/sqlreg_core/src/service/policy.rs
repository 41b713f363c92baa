//! Level upgrade eligibility policy.

use crate::config::UpgradePolicyConfig;
use crate::model::level::Level;
use crate::model::member::Member;

/// Decides whether a member qualifies for promotion in the current batch.
pub trait UpgradePolicy {
    fn is_eligible(&self, member: &Member) -> bool;
}

impl<P: UpgradePolicy + ?Sized> UpgradePolicy for &P {
    fn is_eligible(&self, member: &Member) -> bool {
        (**self).is_eligible(member)
    }
}

/// Counter thresholds per level. The terminal level is never eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    min_logins_for_silver: u32,
    min_recommends_for_gold: u32,
}

impl ThresholdPolicy {
    pub const DEFAULT_MIN_LOGINS_FOR_SILVER: u32 = 50;
    pub const DEFAULT_MIN_RECOMMENDS_FOR_GOLD: u32 = 30;

    pub fn new(min_logins_for_silver: u32, min_recommends_for_gold: u32) -> Self {
        Self {
            min_logins_for_silver,
            min_recommends_for_gold,
        }
    }

    pub fn from_config(config: &UpgradePolicyConfig) -> Self {
        Self::new(config.min_logins_for_silver, config.min_recommends_for_gold)
    }
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MIN_LOGINS_FOR_SILVER,
            Self::DEFAULT_MIN_RECOMMENDS_FOR_GOLD,
        )
    }
}

impl UpgradePolicy for ThresholdPolicy {
    fn is_eligible(&self, member: &Member) -> bool {
        match member.level() {
            Level::Basic => member.login_count >= self.min_logins_for_silver,
            Level::Silver => member.recommend_count >= self.min_recommends_for_gold,
            Level::Gold => false,
        }
    }
}
