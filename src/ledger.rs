//! Work ledger - the structured record of outstanding and completed work items.
//!
//! The ledger is a JSON document owned by the agent. Wiggum only ever reads it,
//! and reads it fresh each time: the agent rewrites it between iterations, so a
//! summary taken before an invocation says nothing about the state after it.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, WiggumError};

/// The categories a work item can be filed under.
///
/// Category is metadata only; items in every category are counted the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    UserStory,
    Bug,
    Task,
}

impl Category {
    /// All categories in ledger order
    pub const ALL: [Category; 3] = [Category::UserStory, Category::Bug, Category::Task];

    /// Human-readable plural label
    pub fn label(&self) -> &'static str {
        match self {
            Category::UserStory => "user stories",
            Category::Bug => "bugs",
            Category::Task => "tasks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkItem {
    /// Stable identifier; numbers are accepted and rendered as text
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,

    /// Human title
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,

    /// Completion flag. Only a literal JSON `true` counts as done.
    #[serde(default, deserialize_with = "strictly_true")]
    pub passes: bool,
}

/// The full ledger document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ledger {
    #[serde(default, rename = "userStories", alias = "user_stories", alias = "stories")]
    pub user_stories: Vec<WorkItem>,

    #[serde(default)]
    pub bugs: Vec<WorkItem>,

    #[serde(default)]
    pub tasks: Vec<WorkItem>,
}

/// Counts for a single category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSummary {
    pub category: Category,
    pub total: usize,
    pub completed: usize,
}

/// The first item not yet passing, used as a hint in progress output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub category: Category,
    pub id: String,
    pub title: String,
}

/// Aggregate counts computed from one read of the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total: usize,
    pub completed: usize,
    pub groups: Vec<GroupSummary>,
    pub next_pending: Option<PendingItem>,
}

impl LedgerSummary {
    /// Items not yet passing
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

impl Ledger {
    /// Load and parse the ledger at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(WiggumError::LedgerMissing(path.to_path_buf()));
            }
            Err(e) => return Err(WiggumError::Io(e)),
        };

        Self::parse(&content).map_err(|reason| WiggumError::LedgerMalformed {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a ledger document from text
    ///
    /// The top level must be a JSON object; struct deserialization alone would also
    /// accept a bare array.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if !value.is_object() {
            return Err("top-level value must be an object".to_string());
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Items grouped by category, in ledger order
    pub fn groups(&self) -> [(Category, &[WorkItem]); 3] {
        [
            (Category::UserStory, self.user_stories.as_slice()),
            (Category::Bug, self.bugs.as_slice()),
            (Category::Task, self.tasks.as_slice()),
        ]
    }

    /// First item that is not yet passing
    pub fn next_pending(&self) -> Option<PendingItem> {
        self.groups().into_iter().find_map(|(category, items)| {
            items.iter().find(|item| !item.passes).map(|item| PendingItem {
                category,
                id: item.id.clone(),
                title: item.title.clone(),
            })
        })
    }

    /// Count totals across all groups
    pub fn summary(&self) -> LedgerSummary {
        let groups: Vec<GroupSummary> = self
            .groups()
            .into_iter()
            .map(|(category, items)| GroupSummary {
                category,
                total: items.len(),
                completed: items.iter().filter(|item| item.passes).count(),
            })
            .collect();

        LedgerSummary {
            total: groups.iter().map(|g| g.total).sum(),
            completed: groups.iter().map(|g| g.completed).sum(),
            groups,
            next_pending: self.next_pending(),
        }
    }
}

/// Read the ledger at `path` and count its items
pub fn summarize(path: &Path) -> Result<LedgerSummary> {
    let summary = Ledger::load(path)?.summary();
    log::debug!(
        "Ledger {}: {}/{} completed",
        path.display(),
        summary.completed,
        summary.total
    );
    Ok(summary)
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn strictly_true<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const THREE_OF_FIVE: &str = r#"{
        "project": "auth",
        "userStories": [
            {"id": "US-1", "title": "Login form", "passes": true, "priority": 1},
            {"id": "US-2", "title": "Logout", "passes": false}
        ],
        "bugs": [
            {"id": "BUG-1", "title": "Redirect loop", "passes": true}
        ],
        "tasks": [
            {"id": "T-1", "title": "CI", "passes": true},
            {"id": "T-2", "title": "Docs"}
        ]
    }"#;

    #[test]
    fn test_summary_counts() {
        let ledger = Ledger::parse(THREE_OF_FIVE).unwrap();
        let summary = ledger.summary();

        assert_eq!(summary.total, 5);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.remaining(), 2);
    }

    #[test]
    fn test_group_breakdown() {
        let summary = Ledger::parse(THREE_OF_FIVE).unwrap().summary();

        assert_eq!(
            summary.groups,
            vec![
                GroupSummary { category: Category::UserStory, total: 2, completed: 1 },
                GroupSummary { category: Category::Bug, total: 1, completed: 1 },
                GroupSummary { category: Category::Task, total: 2, completed: 1 },
            ]
        );
    }

    #[test]
    fn test_only_literal_true_counts() {
        let ledger = Ledger::parse(
            r#"{"tasks": [
                {"id": "a", "passes": true},
                {"id": "b", "passes": "true"},
                {"id": "c", "passes": 1},
                {"id": "d", "passes": null},
                {"id": "e"},
                {"id": "f", "passes": false}
            ]}"#,
        )
        .unwrap();

        let summary = ledger.summary();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.completed, 1);
    }

    #[test]
    fn test_missing_groups_are_empty() {
        let summary = Ledger::parse(r#"{"bugs": [{"id": "B1", "title": "x", "passes": false}]}"#)
            .unwrap()
            .summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.completed, 0);
    }

    #[test]
    fn test_empty_object_is_valid() {
        let summary = Ledger::parse("{}").unwrap().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed, 0);
        assert!(summary.next_pending.is_none());
    }

    #[test]
    fn test_user_stories_alias() {
        let ledger = Ledger::parse(r#"{"user_stories": [{"id": "1", "passes": true}]}"#).unwrap();
        assert_eq!(ledger.user_stories.len(), 1);
    }

    #[test]
    fn test_numeric_id_accepted() {
        let ledger = Ledger::parse(r#"{"tasks": [{"id": 42, "title": "Answer"}]}"#).unwrap();
        assert_eq!(ledger.tasks[0].id, "42");
        assert_eq!(ledger.tasks[0].title, "Answer");
    }

    #[test]
    fn test_next_pending_follows_group_order() {
        let pending = Ledger::parse(THREE_OF_FIVE).unwrap().next_pending().unwrap();
        assert_eq!(pending.category, Category::UserStory);
        assert_eq!(pending.id, "US-2");
        assert_eq!(pending.title, "Logout");
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Ledger::parse("[]").is_err());
        assert!(Ledger::parse("\"text\"").is_err());
    }

    #[test]
    fn test_rejects_group_that_is_not_a_list() {
        assert!(Ledger::parse(r#"{"tasks": {"id": "T-1"}}"#).is_err());
    }

    #[test]
    fn test_summarize_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prd.json");

        let err = summarize(&path).unwrap_err();
        assert!(matches!(err, WiggumError::LedgerMissing(p) if p == path));
    }

    #[test]
    fn test_summarize_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prd.json");
        fs::write(&path, "{ not json").unwrap();

        let err = summarize(&path).unwrap_err();
        assert!(matches!(err, WiggumError::LedgerMalformed { .. }));
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prd.json");
        fs::write(&path, THREE_OF_FIVE).unwrap();

        let first = summarize(&path).unwrap();
        let second = summarize(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summarize_rereads_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prd.json");
        fs::write(&path, r#"{"tasks": [{"id": "1", "passes": false}]}"#).unwrap();
        assert_eq!(summarize(&path).unwrap().completed, 0);

        fs::write(&path, r#"{"tasks": [{"id": "1", "passes": true}]}"#).unwrap();
        assert_eq!(summarize(&path).unwrap().completed, 1);
    }

    #[test]
    fn test_completed_never_exceeds_total() {
        let docs = [
            "{}",
            THREE_OF_FIVE,
            r#"{"bugs": [{"passes": true}, {"passes": true}]}"#,
            r#"{"tasks": [{"passes": "yes"}], "bugs": [{"passes": true}]}"#,
        ];
        for doc in docs {
            let summary = Ledger::parse(doc).unwrap().summary();
            assert!(summary.completed <= summary.total, "{}", doc);
        }
    }
}
