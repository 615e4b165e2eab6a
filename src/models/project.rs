use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::{de_id, de_id_list, de_opt_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planning" => Ok(ProjectStatus::Planning),
            "in progress" | "in-progress" | "inprogress" => Ok(ProjectStatus::InProgress),
            "on hold" | "on-hold" | "onhold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" | "canceled" => Ok(ProjectStatus::Cancelled),
            other => Err(format!("unknown project status: {}", other)),
        }
    }
}

/// Unknown or empty statuses read as `None` instead of failing the whole record.
fn de_status<'de, D>(deserializer: D) -> Result<Option<ProjectStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(rename = "_id", deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_status")]
    pub status: Option<ProjectStatus>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "de_id")]
    pub owner: String,
    #[serde(default, deserialize_with = "de_id_list")]
    pub members: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub updated_at: Option<String>,
}

impl Project {
    /// Membership is checked against `members` only; the owner is not implied.
    pub fn has_member(&self, user_id: &str) -> bool {
        !user_id.is_empty() && self.members.iter().any(|m| m == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateProjectRequest {
    pub fn members(members: Vec<String>) -> Self {
        Self {
            members: Some(members),
            ..Default::default()
        }
    }
}

impl From<&Project> for UpdateProjectRequest {
    fn from(project: &Project) -> Self {
        Self {
            name: Some(project.name.clone()),
            description: project.description.clone(),
            status: project.status,
            start_date: project.start_date.clone().filter(|s| !s.is_empty()),
            end_date: project.end_date.clone().filter(|s| !s.is_empty()),
            members: Some(project.members.clone()),
            tags: Some(project.tags.clone()),
        }
    }
}
