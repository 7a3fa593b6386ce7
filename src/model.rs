use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tracked leaderboard category. Declaration order is the fixed
/// reporting order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexId {
    #[serde(rename = "intelligence_index")]
    Intelligence,
    #[serde(rename = "coding_index")]
    Coding,
    #[serde(rename = "agentic_index")]
    Agentic,
}

impl IndexId {
    pub const ALL: [IndexId; 3] = [IndexId::Intelligence, IndexId::Coding, IndexId::Agentic];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Intelligence => "intelligence_index",
            Self::Coding => "coding_index",
            Self::Agentic => "agentic_index",
        }
    }
}

impl Display for IndexId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Intelligence => "Intelligence",
            Self::Coding => "Coding",
            Self::Agentic => "Agentic",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown index id: {0}")]
pub struct IndexParseError(pub String);

impl FromStr for IndexId {
    type Err = IndexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "intelligence" | "intelligence_index" => Ok(Self::Intelligence),
            "coding" | "coding_index" => Ok(Self::Coding),
            "agentic" | "agentic_index" => Ok(Self::Agentic),
            _ => Err(IndexParseError(s.to_string())),
        }
    }
}

/// One ranked model within an index. `model` is the identity key across
/// snapshots; `score` is on an index-specific scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub rank: u32,
    pub model: String,
    pub score: f64,
}

impl Entry {
    pub fn new(rank: u32, model: impl Into<String>, score: f64) -> Self {
        Self {
            rank,
            model: model.into(),
            score,
        }
    }
}

/// Ordered entries for one index, rank ascending. Ranks may have gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct IndexSnapshot {
    pub entries: Vec<Entry>,
}

impl IndexSnapshot {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One complete timestamped capture of all tracked indices. Immutable after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub source: String,
    pub content_hash: String,
    pub indices: BTreeMap<IndexId, IndexSnapshot>,
}

impl Snapshot {
    pub fn new(
        source: impl Into<String>,
        content_hash: impl Into<String>,
        indices: BTreeMap<IndexId, IndexSnapshot>,
    ) -> Self {
        Self {
            captured_at: Utc::now(),
            source: source.into(),
            content_hash: content_hash.into(),
            indices,
        }
    }

    pub fn index(&self, id: IndexId) -> Option<&IndexSnapshot> {
        self.indices.get(&id)
    }

    pub fn total_entries(&self) -> usize {
        self.indices.values().map(IndexSnapshot::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use crate::model::{Entry, IndexId, IndexSnapshot, Snapshot};

    #[test]
    fn index_id_round_trips_through_slug() {
        for id in IndexId::ALL {
            assert_eq!(IndexId::from_str(id.as_slug()).unwrap(), id);
        }
        assert!(IndexId::from_str("speed_index").is_err());
    }

    #[test]
    fn snapshot_serializes_indices_under_slug_keys() {
        let mut indices = BTreeMap::new();
        indices.insert(
            IndexId::Coding,
            IndexSnapshot::new(vec![Entry::new(1, "A", 90.0)]),
        );
        let snapshot = Snapshot::new("https://example.test/", "abc", indices);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["indices"]["coding_index"].is_array());
        assert_eq!(json["indices"]["coding_index"][0]["model"], "A");
    }

    #[test]
    fn snapshot_round_trips_field_for_field() {
        let mut indices = BTreeMap::new();
        for id in IndexId::ALL {
            indices.insert(
                id,
                IndexSnapshot::new(vec![
                    Entry::new(1, "Model One", 71.0),
                    Entry::new(3, "Model Two", 65.5),
                ]),
            );
        }
        let snapshot = Snapshot::new("https://example.test/", "deadbeef", indices);

        let raw = serde_json::to_string(&snapshot).unwrap();
        let restored: Snapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.total_entries(), 6);
    }
}
