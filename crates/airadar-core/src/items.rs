use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Platform an [`Item`] was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    HackerNews,
    GitHub,
    Reddit,
    ArXiv,
    Twitter,
    YouTube,
    Rss,
}

impl SourceType {
    /// Every supported platform, in display order.
    pub const ALL: [SourceType; 7] = [
        SourceType::HackerNews,
        SourceType::GitHub,
        SourceType::Reddit,
        SourceType::ArXiv,
        SourceType::Twitter,
        SourceType::YouTube,
        SourceType::Rss,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::HackerNews => "hackernews",
            SourceType::GitHub => "github",
            SourceType::Reddit => "reddit",
            SourceType::ArXiv => "arxiv",
            SourceType::Twitter => "twitter",
            SourceType::YouTube => "youtube",
            SourceType::Rss => "rss",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceType::ALL
            .into_iter()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| CoreError::UnknownSource(s.to_string()))
    }
}

/// A normalized content unit collected from any source.
///
/// Identity is the `(source, external_id)` pair; [`Item::id`] is derived from
/// it with [`Item::id_for`]. Re-collection updates `score`, `comments`,
/// `collected_at`, `tags` and `extra` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub source: SourceType,
    pub external_id: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub author: String,
    /// Source-native popularity (points, stars, views, upvotes).
    pub score: i64,
    pub comments: i64,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Item {
    /// Build the stable item ID for a source + external ID pair, e.g. `"hackernews:4242"`.
    #[must_use]
    pub fn id_for(source: SourceType, external_id: &str) -> String {
        format!("{source}:{external_id}")
    }

    /// Create an item with its ID derived from `(source, external_id)` and
    /// both timestamps set to `now`. Remaining fields start empty.
    #[must_use]
    pub fn new(
        source: SourceType,
        external_id: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let external_id = external_id.into();
        Self {
            id: Self::id_for(source, &external_id),
            source,
            external_id,
            title: title.into(),
            url: String::new(),
            description: String::new(),
            author: String::new(),
            score: 0,
            comments: 0,
            tags: Vec::new(),
            published_at: now,
            collected_at: now,
            extra: BTreeMap::new(),
        }
    }
}

/// A point-in-time popularity reading for one item. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub id: i64,
    pub item_id: String,
    pub score: i64,
    pub comments: i64,
    pub checked_at: DateTime<Utc>,
}
