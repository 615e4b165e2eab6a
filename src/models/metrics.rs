use serde::{Deserialize, Serialize};

use crate::normalize::de_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCompletion {
    #[serde(rename = "_id", deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub completion_rate: f64,
}

/// `/metrics` as sent by the backend; every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total_projects: Option<u32>,
    pub active_projects: Option<u32>,
    pub active_tasks: Option<u32>,
    pub completed_tasks: Option<u32>,
    pub team_members: Option<u32>,
    pub completion_rate: Option<f64>,
    pub overall_completion_rate: Option<f64>,
    pub projects_with_completion: Option<Vec<ProjectCompletion>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_projects: u32,
    pub active_projects: u32,
    pub active_tasks: u32,
    pub completed_tasks: u32,
    pub team_members: u32,
    pub completion_rate: f64,
    pub projects_with_completion: Vec<ProjectCompletion>,
}

impl From<MetricsResponse> for DashboardStats {
    fn from(m: MetricsResponse) -> Self {
        Self {
            total_projects: m.total_projects.unwrap_or(0),
            active_projects: m.active_projects.unwrap_or(0),
            active_tasks: m.active_tasks.unwrap_or(0),
            completed_tasks: m.completed_tasks.unwrap_or(0),
            team_members: m.team_members.unwrap_or(0),
            completion_rate: m
                .overall_completion_rate
                .or(m.completion_rate)
                .unwrap_or(0.0),
            projects_with_completion: m.projects_with_completion.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overall_rate_preferred() {
        let raw: MetricsResponse = serde_json::from_value(json!({
            "totalProjects": 3,
            "completionRate": 10.0,
            "overallCompletionRate": 42.5
        }))
        .unwrap();
        let stats = DashboardStats::from(raw);
        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.active_tasks, 0);
        assert_eq!(stats.completion_rate, 42.5);
    }

    #[test]
    fn empty_metrics_default_to_zero() {
        let raw: MetricsResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(DashboardStats::from(raw), DashboardStats::default());
    }
}
