use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::Backend;
use crate::controllers::{BadgeTone, cancellable, completion_percentage};
use crate::error::ClientError;
use crate::models::{CreateProjectRequest, DirectoryUser, Project, ProjectStatus, Task, TaskStatus};
use crate::routes::Route;
use crate::session::Session;

pub const UNKNOWN_OWNER: &str = "Unknown User";
const PROJECT_NAME_MAX: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub done: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            total: tasks.len(),
            done: tasks.iter().filter(|t| t.status == TaskStatus::Done).count(),
        }
    }

    pub fn percentage(&self) -> u8 {
        completion_percentage(self.done, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectClick {
    Open(Route),
    NotMember { owner_name: String },
}

/// Badge colour for a project status; unknown or missing statuses share the
/// in-progress bucket.
pub fn status_badge(status: Option<ProjectStatus>) -> BadgeTone {
    match status {
        Some(ProjectStatus::Planning) => BadgeTone::Violet,
        Some(ProjectStatus::Completed) => BadgeTone::Blue,
        Some(ProjectStatus::OnHold) => BadgeTone::Yellow,
        Some(ProjectStatus::Cancelled) => BadgeTone::Red,
        Some(ProjectStatus::InProgress) | None => BadgeTone::Green,
    }
}

pub struct ProjectList {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
    cancel: CancellationToken,
    stats: Arc<Mutex<HashMap<String, TaskStats>>>,
    stat_jobs: JoinSet<()>,
    pub projects: Vec<Project>,
    pub users: Vec<DirectoryUser>,
    pub loading: bool,
    pub error: Option<String>,
    /// Set when the user directory could not be loaded; owner names then fall back.
    pub users_error: Option<String>,
    pub submitting: bool,
    /// Owner name shown by the "not a member" notice while it is open.
    pub not_member_owner: Option<String>,
}

impl ProjectList {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<Session>) -> Self {
        Self {
            backend,
            session,
            cancel: CancellationToken::new(),
            stats: Arc::new(Mutex::new(HashMap::new())),
            stat_jobs: JoinSet::new(),
            projects: Vec::new(),
            users: Vec::new(),
            loading: false,
            error: None,
            users_error: None,
            submitting: false,
            not_member_owner: None,
        }
    }

    pub async fn activate(&mut self) -> Result<(), ClientError> {
        self.load_users().await?;
        self.load_projects().await
    }

    /// Stops in-flight requests and pending stat fetches.
    pub fn deactivate(&mut self) {
        self.cancel.cancel();
        self.stat_jobs.abort_all();
    }

    pub async fn load_projects(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        self.error = None;

        match cancellable(&self.cancel, self.backend.list_projects()).await {
            Ok(items) => {
                info!("Loaded {} projects", items.len());
                self.projects = items;
                self.loading = false;
                self.spawn_task_stats();
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("Failed to load projects: {}", e);
                self.loading = false;
                self.error = Some(e.user_message("Failed to load projects"));
                Err(e)
            }
        }
    }

    /// One task fetch per project. Each result lands in its own map entry as
    /// it completes, so stats may be partially available.
    fn spawn_task_stats(&mut self) {
        self.stat_jobs.abort_all();
        self.stats
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();

        for project in &self.projects {
            let backend = self.backend.clone();
            let stats = self.stats.clone();
            let cancel = self.cancel.clone();
            let project_id = project.id.clone();

            self.stat_jobs.spawn(async move {
                let res = cancellable(&cancel, backend.list_tasks(&project_id)).await;
                match res {
                    Ok(tasks) => {
                        let entry = TaskStats::from_tasks(&tasks);
                        let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
                        stats.insert(project_id, entry);
                    }
                    Err(e) => debug!("Task stats unavailable for {}: {}", project_id, e),
                }
            });
        }
    }

    /// Waits for every outstanding stat fetch.
    pub async fn settle_stats(&mut self) {
        while self.stat_jobs.join_next().await.is_some() {}
    }

    pub fn stats_for(&self, project_id: &str) -> Option<TaskStats> {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.get(project_id).copied()
    }

    pub async fn load_users(&mut self) -> Result<(), ClientError> {
        self.users_error = None;
        match cancellable(&self.cancel, self.backend.list_users()).await {
            Ok(users) => {
                self.users = users;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("Failed to load users: {}", e);
                self.users_error = Some(e.user_message("Failed to load users"));
                Ok(())
            }
        }
    }

    pub fn on_project_click(&mut self, project: &Project) -> ProjectClick {
        let current = self.session.current_user_id().unwrap_or_default();
        if project.has_member(&current) {
            return ProjectClick::Open(Route::TaskBoard(project.id.clone()));
        }

        let owner_name = self.owner_name(&project.owner);
        self.not_member_owner = Some(owner_name.clone());
        ProjectClick::NotMember { owner_name }
    }

    pub fn close_dialog(&mut self) {
        self.not_member_owner = None;
    }

    pub fn owner_name(&self, owner_id: &str) -> String {
        self.users
            .iter()
            .find(|u| u.id == owner_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string())
    }

    /// Users that can be picked as members of a new project (everyone but
    /// the current user, who is added automatically).
    pub fn selectable_members(&self) -> Vec<&DirectoryUser> {
        let current = self.session.current_user_id().unwrap_or_default();
        self.users.iter().filter(|u| u.id != current).collect()
    }

    pub async fn create_project(&mut self, draft: &ProjectDraft) -> Result<Project, ClientError> {
        let current = self.session.current_user_id();
        let body = draft.to_request(current.as_deref())?;

        self.submitting = true;
        let res = cancellable(&self.cancel, self.backend.create_project(&body)).await;
        self.submitting = false;

        match res {
            Ok(project) => {
                info!("Created project {}", project.id);
                // The project exists now; a failed reload only shows up in `error`.
                if let Err(e) = self.load_projects().await {
                    debug!("Reload after creating {} failed: {}", project.id, e);
                }
                Ok(project)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.error = Some(e.user_message("Failed to create project"));
                }
                Err(e)
            }
        }
    }
}

/// Form state of the create-project dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: String,
    pub end_date: String,
    pub tags_input: String,
    members: Vec<String>,
    tags: Vec<String>,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            status: ProjectStatus::Planning,
            start_date: String::new(),
            end_date: String::new(),
            tags_input: String::new(),
            members: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl ProjectDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn toggle_member(&mut self, member_id: &str, checked: bool) {
        if checked {
            if !self.members.iter().any(|m| m == member_id) {
                self.members.push(member_id.to_string());
            }
        } else {
            self.remove_member(member_id);
        }
    }

    pub fn remove_member(&mut self, member_id: &str) {
        self.members.retain(|m| m != member_id);
    }

    /// Moves comma-separated entries from `tags_input` into the tag list.
    pub fn add_tags_from_input(&mut self) {
        if self.tags_input.trim().is_empty() {
            return;
        }
        for part in self.tags_input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !self.tags.iter().any(|t| t == part) {
                self.tags.push(part.to_string());
            }
        }
        self.tags_input.clear();
    }

    pub fn remove_tag(&mut self, index: usize) {
        if index < self.tags.len() {
            self.tags.remove(index);
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Project name is required".to_string()));
        }
        if name.chars().count() > PROJECT_NAME_MAX {
            return Err(ClientError::Validation(format!(
                "Project name must be at most {} characters",
                PROJECT_NAME_MAX
            )));
        }
        Ok(())
    }

    /// The creator is always added to the member list.
    pub fn to_request(&self, current_user_id: Option<&str>) -> Result<CreateProjectRequest, ClientError> {
        self.validate()?;

        let mut members = self.members.clone();
        if let Some(id) = current_user_id.filter(|id| !id.is_empty()) {
            if !members.iter().any(|m| m == id) {
                members.push(id.to_string());
            }
        }

        Ok(CreateProjectRequest {
            name: self.name.trim().to_string(),
            description: non_empty(&self.description),
            status: self.status,
            start_date: non_empty(&self.start_date),
            end_date: non_empty(&self.end_date),
            members: (!members.is_empty()).then_some(members),
            tags: (!self.tags.is_empty()).then(|| self.tags.clone()),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
