//! Per-user access state and daily free-use accounting.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-use limits supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLimits {
    pub max_free_uses: u32,
    pub bonus_uses: u32,
}

impl Default for AccessLimits {
    fn default() -> Self {
        Self {
            max_free_uses: 1,
            bonus_uses: 0,
        }
    }
}

impl AccessLimits {
    /// Total uses available per day before the counter is exhausted.
    pub fn daily_allowance(&self) -> u32 {
        self.max_free_uses.saturating_add(self.bonus_uses)
    }
}

/// Daily view counter as reported by the usage service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub count: u32,
    pub max_views: u32,
    pub bonus_views: u32,
    pub next_reset: DateTime<Utc>,
}

impl ViewCount {
    /// A fresh counter for the day containing `now`.
    pub fn empty(limits: AccessLimits, now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            max_views: limits.max_free_uses,
            bonus_views: limits.bonus_uses,
            next_reset: next_daily_reset(now),
        }
    }

    pub fn limits(&self) -> AccessLimits {
        AccessLimits {
            max_free_uses: self.max_views,
            bonus_uses: self.bonus_views,
        }
    }

    pub fn remaining(&self) -> u32 {
        remaining_uses(self.limits(), self.count)
    }
}

/// `max(0, max_free_uses + bonus_uses - used)`
pub fn remaining_uses(limits: AccessLimits, used: u32) -> u32 {
    limits.daily_allowance().saturating_sub(used)
}

/// Next UTC midnight strictly after `now`.
pub fn next_daily_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Duration::days(1);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// Everything the access gate needs to know about one user, recomputed on
/// every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccessState {
    /// `None` for anonymous users.
    pub user_id: Option<String>,
    pub has_premium: bool,
    pub daily_free_use_count: u32,
    pub max_free_uses: u32,
    pub bonus_uses: u32,
}

impl UserAccessState {
    /// Anonymous visitors are never premium and get the full free limit.
    pub fn anonymous(limits: AccessLimits) -> Self {
        Self {
            user_id: None,
            has_premium: false,
            daily_free_use_count: 0,
            max_free_uses: limits.max_free_uses,
            bonus_uses: limits.bonus_uses,
        }
    }

    pub fn new(user_id: Option<String>, has_premium: bool, used: u32, limits: AccessLimits) -> Self {
        Self {
            user_id,
            has_premium,
            daily_free_use_count: used,
            max_free_uses: limits.max_free_uses,
            bonus_uses: limits.bonus_uses,
        }
    }

    /// Build from a usage-service counter. The service's limits win over
    /// configuration because bonus views are granted server-side.
    pub fn from_view_count(user_id: Option<String>, has_premium: bool, view: &ViewCount) -> Self {
        Self::new(user_id, has_premium, view.count, view.limits())
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn limits(&self) -> AccessLimits {
        AccessLimits {
            max_free_uses: self.max_free_uses,
            bonus_uses: self.bonus_uses,
        }
    }

    pub fn remaining_uses(&self) -> u32 {
        remaining_uses(self.limits(), self.daily_free_use_count)
    }

    pub fn used_free_today(&self) -> bool {
        self.daily_free_use_count > 0
    }
}
