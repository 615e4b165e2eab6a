use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize::{de_id, de_opt_date, de_opt_id, normalize_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "todo")]
    Todo,
    #[serde(rename = "in progress", alias = "in-progress")]
    InProgress,
    #[serde(rename = "done")]
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReference {
    #[serde(rename = "_id", deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A task's assignee, stored either as a bare user id or as an embedded user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Assignee {
    Id(String),
    Reference(UserReference),
}

impl Assignee {
    pub fn id(&self) -> &str {
        match self {
            Assignee::Id(id) => id,
            Assignee::Reference(user) => &user.id,
        }
    }
}

fn de_opt_assignee<'de, D>(deserializer: D) -> Result<Option<Assignee>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let assignee = match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) if map.contains_key("_id") => {
            let user: UserReference =
                serde_json::from_value(Value::Object(map)).map_err(serde::de::Error::custom)?;
            Some(Assignee::Reference(user))
        }
        Some(other) => Some(Assignee::Id(normalize_id(&other))),
    };
    Ok(assignee.filter(|a| !a.id().is_empty()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id", default, deserialize_with = "de_opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default, deserialize_with = "de_opt_assignee")]
    pub assigned_to: Option<Assignee>,
    #[serde(default, deserialize_with = "de_id")]
    pub project: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub updated_at: Option<String>,
}

impl Task {
    pub fn assignee_id(&self) -> Option<&str> {
        self.assigned_to.as_ref().map(Assignee::id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl UpdateTaskRequest {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignee_accepts_all_encodings() {
        let tasks: Vec<Task> = serde_json::from_value(json!([
            {"title": "a", "status": "todo", "project": "p1", "assignedTo": "u1"},
            {"title": "b", "status": "done", "project": "p1", "assignedTo": {"_id": "u2", "name": "Bo"}},
            {"title": "c", "status": "in progress", "project": "p1", "assignedTo": {"$oid": "u3"}},
            {"title": "d", "status": "in-progress", "project": "p1", "assignedTo": null},
            {"title": "e", "status": "todo", "project": "p1", "assignedTo": ""}
        ]))
        .unwrap();

        assert_eq!(tasks[0].assignee_id(), Some("u1"));
        assert_eq!(tasks[1].assignee_id(), Some("u2"));
        assert_eq!(tasks[2].assignee_id(), Some("u3"));
        assert_eq!(tasks[3].assignee_id(), None);
        assert_eq!(tasks[4].assignee_id(), None);
        assert_eq!(tasks[3].status, TaskStatus::InProgress);
        assert_eq!(tasks[0].priority, TaskPriority::Medium);
    }

    #[test]
    fn status_update_body() {
        let body = serde_json::to_value(UpdateTaskRequest::status(TaskStatus::InProgress)).unwrap();
        assert_eq!(body, json!({"status": "in progress"}));
    }
}
