use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::DayWindow;

// ── Typed ID wrappers ──────────────────────────────────────────────

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

typed_id!(VisitId);

/// Stable tenant identifier. Projects keep their UUID across renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ── Core entities ──────────────────────────────────────────────────

/// A tracked website — the tenant boundary for every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Public URL of the tracked site, if known.
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One recorded page view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisit {
    pub id: VisitId,
    pub project_id: ProjectId,
    /// Raw URL as received; normalization happens in the graph engine.
    pub url: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub visited_at: DateTime<Utc>,
}

// ── Growth ranking ─────────────────────────────────────────────────

/// Per-project click counts feeding the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSample {
    pub project_id: ProjectId,
    pub clicks_today: u64,
    pub clicks_yesterday: u64,
    /// Yesterday's baseline for rank movement; `None` when the prior
    /// ranking did not exist.
    pub clicks_day_before: Option<u64>,
}

/// One row of the growth leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProject {
    pub project_id: ProjectId,
    /// Day-over-day change, rounded to one decimal, sign preserved.
    pub percent: f64,
    pub clicks_today: u64,
    pub clicks_yesterday: u64,
    /// 1-based position after sorting.
    pub rank: u64,
    /// Positions gained since the prior day's ranking; `None` means the
    /// project was absent from it, which is distinct from `Some(0)`.
    pub rank_change: Option<i64>,
}

// ── Insights ───────────────────────────────────────────────────────

/// Coarse device category derived from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
    Other,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visit count for one UTC calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

/// Direction of the last two daily buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

// ── Store query types ──────────────────────────────────────────────

/// Filter for visit queries. `window = None` means lifetime.
#[derive(Debug, Clone, Default)]
pub struct VisitFilter {
    pub window: Option<DayWindow>,
    /// Maximum rows returned, newest first. `None` uses the store default.
    pub limit: Option<u32>,
}

/// Summary statistics for the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_projects: u64,
    pub total_visits: u64,
    /// Visit count broken down by project name.
    pub visits_by_project: HashMap<String, u64>,
    /// Database file size in bytes (0 for in-memory stores).
    pub db_size_bytes: u64,
}

// ── Tests ──────────────────────────────────────────────────────────
