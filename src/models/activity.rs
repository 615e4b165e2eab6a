use serde::{Deserialize, Serialize};

use crate::normalize::{de_id, de_opt_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityTarget {
    Project,
    Task,
    Other(String),
}

impl From<String> for ActivityTarget {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "project" => ActivityTarget::Project,
            "task" => ActivityTarget::Task,
            _ => ActivityTarget::Other(value),
        }
    }
}

impl From<ActivityTarget> for String {
    fn from(value: ActivityTarget) -> Self {
        match value {
            ActivityTarget::Project => "project".to_string(),
            ActivityTarget::Task => "task".to_string(),
            ActivityTarget::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Other(String),
}

impl From<String> for ActivityAction {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "created" => ActivityAction::Created,
            "updated" => ActivityAction::Updated,
            "deleted" => ActivityAction::Deleted,
            _ => ActivityAction::Other(value),
        }
    }
}

impl From<ActivityAction> for String {
    fn from(value: ActivityAction) -> Self {
        match value {
            ActivityAction::Created => "created".to_string(),
            ActivityAction::Updated => "updated".to_string(),
            ActivityAction::Deleted => "deleted".to_string(),
            ActivityAction::Other(s) => s,
        }
    }
}

/// Read-only audit record. Targets are referenced by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(rename = "_id", default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityTarget,
    pub action: ActivityAction,
    #[serde(default)]
    pub target_name: String,
    #[serde(default, deserialize_with = "de_id")]
    pub actor_id: String,
    #[serde(default)]
    pub actor_name: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub timestamp: Option<String>,
}

impl ActivityEntry {
    pub fn icon(&self) -> &'static str {
        match (&self.kind, &self.action) {
            (ActivityTarget::Project, ActivityAction::Created) => "folder-plus",
            (ActivityTarget::Project, ActivityAction::Updated) => "folder",
            (ActivityTarget::Project, ActivityAction::Deleted) => "folder-minus",
            (ActivityTarget::Task, ActivityAction::Created) => "check-circle",
            (ActivityTarget::Task, ActivityAction::Updated) => "edit",
            (ActivityTarget::Task, ActivityAction::Deleted) => "trash-2",
            _ => "activity",
        }
    }
}
