use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scored topic produced by one detection cycle.
///
/// The whole trend set is cleared and regenerated every cycle, so `id`,
/// `first_seen` and `alerted` only carry meaning within a single cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Persistent identifier; `0` until the store assigns one.
    pub id: i64,
    pub topic: String,
    pub score: f64,
    /// Number of distinct source types contributing to the topic.
    pub source_count: i32,
    pub item_ids: Vec<String>,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub alerted: bool,
}

impl Trend {
    /// Returns `true` once the store has assigned this trend an identifier.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}
