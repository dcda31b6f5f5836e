//! Tool invocation history.

use crate::id::EntityId;
use crate::task::TaskStatus;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default page size of the history listing.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// One past tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: EntityId,
    #[serde(default)]
    pub tool_type: Option<String>,
    /// `None` when missing or not a status this client knows
    #[serde(default, deserialize_with = "known_status")]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub result: Value,
}

/// Decode a status leniently so one odd record does not fail the whole page.
fn known_status<'de, D>(deserializer: D) -> Result<Option<TaskStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// A page of history records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default, alias = "items", alias = "history")]
    pub records: Vec<HistoryRecord>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Query parameters of the history listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub tool_type: Option<String>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_HISTORY_LIMIT,
            tool_type: None,
        }
    }
}

impl HistoryQuery {
    /// Render as `key=value` pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(ref tool_type) = self.tool_type {
            pairs.push(("tool_type", tool_type.clone()));
        }
        pairs
    }
}
