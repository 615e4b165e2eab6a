//! Task board of a single project: the three status columns, the task
//! creation form with its assignment-conflict warning, membership edits and
//! project settings.
//!
//! Every mutation is followed by a reload from the server; local lists are
//! never patched in place.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::Backend;
use crate::controllers::{BadgeTone, cancellable};
use crate::error::ClientError;
use crate::models::{
    Assignee, DirectoryUser, NewTaskRequest, Project, Task, TaskPriority, TaskStatus,
    UpdateProjectRequest, UpdateTaskRequest,
};
use crate::normalize::{calendar_day, to_input_date};
use crate::routes::Route;
use crate::session::Session;
use crate::toast::Toast;

/// `round(done / total * 100)`, and 0 for an empty board.
pub fn completion_percentage(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

/// True when some task is assigned to `assignee` and due on the same
/// calendar day as `deadline`. Time of day is ignored on both sides.
pub fn has_assignment_conflict(tasks: &[Task], assignee: &str, deadline: &str) -> bool {
    if assignee.is_empty() {
        return false;
    }
    let Some(day) = calendar_day(deadline) else {
        return false;
    };

    tasks.iter().any(|task| {
        task.assignee_id() == Some(assignee)
            && task.due_date.as_deref().and_then(calendar_day) == Some(day)
    })
}

pub fn priority_badge(priority: TaskPriority) -> BadgeTone {
    match priority {
        TaskPriority::Low => BadgeTone::Green,
        TaskPriority::Medium => BadgeTone::Yellow,
        TaskPriority::High => BadgeTone::Orange,
        TaskPriority::Critical => BadgeTone::Red,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskBuckets {
    pub todo: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub done: Vec<Task>,
}

impl TaskBuckets {
    pub fn partition(tasks: &[Task]) -> Self {
        let mut buckets = Self::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => buckets.todo.push(task.clone()),
                TaskStatus::InProgress => buckets.in_progress.push(task.clone()),
                TaskStatus::Done => buckets.done.push(task.clone()),
            }
        }
        buckets
    }
}

/// Create-task form.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub deadline: String,
    pub assignee: String,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            deadline: String::new(),
            assignee: String::new(),
        }
    }
}

impl TaskDraft {
    fn to_request(&self, project_id: &str) -> NewTaskRequest {
        let opt = |s: &str| (!s.trim().is_empty()).then(|| s.trim().to_string());
        NewTaskRequest {
            title: self.title.trim().to_string(),
            description: opt(&self.description),
            status: self.status,
            priority: self.priority,
            due_date: opt(&self.deadline),
            assigned_to: opt(&self.assignee),
            project: project_id.to_string(),
        }
    }
}

pub struct TaskBoard {
    backend: Arc<dyn Backend>,
    session: Arc<Session>,
    cancel: CancellationToken,
    pub toast: Toast,
    pub project_id: String,
    pub current_user_id: Option<String>,
    pub project: Option<Project>,
    pub tasks: Vec<Task>,
    pub buckets: TaskBuckets,
    pub completion: u8,
    pub users: Vec<DirectoryUser>,
    pub loading_tasks: bool,
    pub error_message: Option<String>,
    pub draft: TaskDraft,
    pub adding: bool,
    pub conflict_warning: Option<String>,
    pub adding_member: bool,
    pub member_error: Option<String>,
}

impl TaskBoard {
    pub fn new(backend: Arc<dyn Backend>, session: Arc<Session>, toast: Toast) -> Self {
        Self {
            backend,
            session,
            cancel: CancellationToken::new(),
            toast,
            project_id: String::new(),
            current_user_id: None,
            project: None,
            tasks: Vec::new(),
            buckets: TaskBuckets::default(),
            completion: 0,
            users: Vec::new(),
            loading_tasks: false,
            error_message: None,
            draft: TaskDraft::default(),
            adding: false,
            conflict_warning: None,
            adding_member: false,
            member_error: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    /// Resolves the current user (failure is tolerated), then loads the
    /// project, its tasks and the user directory concurrently.
    pub async fn activate(&mut self, project_id: &str) -> Result<(), ClientError> {
        if project_id.is_empty() {
            self.error_message = Some("Project ID is required".to_string());
            return Err(ClientError::Validation("Project ID is required".to_string()));
        }
        self.project_id = project_id.to_string();

        match cancellable(&self.cancel, self.session.refresh_identity()).await {
            Ok(user) => self.current_user_id = Some(user.id),
            Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
            Err(e) => warn!("Failed to load current user: {}", e),
        }

        self.loading_tasks = true;
        let (project, tasks, users) = tokio::join!(
            cancellable(&self.cancel, self.backend.get_project(project_id)),
            cancellable(&self.cancel, self.backend.list_tasks(project_id)),
            cancellable(&self.cancel, self.backend.list_users()),
        );
        if self.cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        match project {
            Ok(project) => self.set_project(project),
            Err(e) => {
                warn!("Failed to load project {}: {}", project_id, e);
                self.error_message = Some("Failed to load project details".to_string());
            }
        }
        self.apply_tasks(tasks);
        match users {
            Ok(users) => self.users = users,
            Err(e) => warn!("Failed to load users: {}", e),
        }
        Ok(())
    }

    pub async fn reload_tasks(&mut self) -> Result<(), ClientError> {
        self.loading_tasks = true;
        let res = cancellable(&self.cancel, self.backend.list_tasks(&self.project_id)).await;
        if let Err(ClientError::Cancelled) = res {
            return Err(ClientError::Cancelled);
        }
        self.apply_tasks(res);
        Ok(())
    }

    fn apply_tasks(&mut self, res: Result<Vec<Task>, ClientError>) {
        self.loading_tasks = false;
        match res {
            Ok(tasks) => {
                self.buckets = TaskBuckets::partition(&tasks);
                self.completion = completion_percentage(self.buckets.done.len(), tasks.len());
                self.tasks = tasks;
            }
            Err(e) => {
                warn!("Failed to load tasks for {}: {}", self.project_id, e);
                self.error_message = Some("Failed to load tasks".to_string());
            }
        }
    }

    /// Replaces the local project with a server copy, dates cut to `YYYY-MM-DD`.
    fn set_project(&mut self, mut project: Project) {
        project.start_date = project.start_date.as_deref().map(to_input_date);
        project.end_date = project.end_date.as_deref().map(to_input_date);
        self.project = Some(project);
    }

    pub fn set_assignee(&mut self, assignee: impl Into<String>) {
        self.draft.assignee = assignee.into();
        self.check_conflict();
    }

    pub fn set_deadline(&mut self, deadline: impl Into<String>) {
        self.draft.deadline = deadline.into();
        self.check_conflict();
    }

    /// Non-blocking: a warning never prevents submission.
    pub fn check_conflict(&mut self) {
        self.conflict_warning = None;
        if self.draft.assignee.is_empty() || self.draft.deadline.is_empty() {
            return;
        }
        if has_assignment_conflict(&self.tasks, &self.draft.assignee, &self.draft.deadline) {
            let name = self
                .user_by_id(&self.draft.assignee)
                .map(|u| u.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.draft.assignee.clone());
            self.conflict_warning = Some(format!(
                "{} is already assigned to another task on this date.",
                name
            ));
        }
    }

    pub async fn add_task(&mut self) -> Result<(), ClientError> {
        let Some(project_id) = self.project.as_ref().map(|p| p.id.clone()) else {
            return Err(ClientError::NotFound("project not loaded".to_string()));
        };
        if self.draft.title.trim().is_empty() {
            return Err(ClientError::Validation("Task title is required".to_string()));
        }

        self.adding = true;
        let body = self.draft.to_request(&project_id);
        let res = cancellable(&self.cancel, self.backend.create_task(&project_id, &body)).await;
        self.adding = false;

        match res {
            Ok(task) => {
                info!("Created task {:?} in project {}", task.id, project_id);
                self.draft = TaskDraft::default();
                self.conflict_warning = None;
                self.reload_tasks().await
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error(e.user_message("Failed to add task"));
                }
                Err(e)
            }
        }
    }

    pub async fn change_task_status(
        &mut self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<(), ClientError> {
        let body = UpdateTaskRequest::status(status);
        match cancellable(&self.cancel, self.backend.update_task(task_id, &body)).await {
            Ok(_) => self.reload_tasks().await,
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error(e.user_message("Failed to update task"));
                }
                Err(e)
            }
        }
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), ClientError> {
        match cancellable(&self.cancel, self.backend.delete_task(task_id)).await {
            Ok(()) => self.reload_tasks().await,
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error(e.user_message("Failed to delete task"));
                }
                Err(e)
            }
        }
    }

    pub async fn add_member(&mut self, user_id: &str) -> Result<(), ClientError> {
        self.member_error = None;
        if user_id.is_empty() {
            self.member_error = Some("Please select a user".to_string());
            return Err(ClientError::Validation("Please select a user".to_string()));
        }
        let Some(project) = self.project.as_ref() else {
            self.member_error = Some("Project not loaded".to_string());
            return Err(ClientError::NotFound("project not loaded".to_string()));
        };

        let mut members = project.members.clone();
        if !members.iter().any(|m| m == user_id) {
            members.push(user_id.to_string());
        }
        let project_id = project.id.clone();

        self.adding_member = true;
        let res = self.submit_members(&project_id, members).await;
        self.adding_member = false;

        if let Err(e) = &res {
            if !e.is_cancelled() {
                self.member_error = Some(e.user_message("Failed to add member"));
            }
        }
        res
    }

    pub async fn remove_member(&mut self, user_id: &str) -> Result<(), ClientError> {
        let Some(project) = self.project.as_ref() else {
            return Err(ClientError::NotFound("project not loaded".to_string()));
        };
        let members: Vec<String> = project
            .members
            .iter()
            .filter(|m| m.as_str() != user_id)
            .cloned()
            .collect();
        let project_id = project.id.clone();

        let res = self.submit_members(&project_id, members).await;
        if let Err(e) = &res {
            if !e.is_cancelled() {
                self.toast.error(e.user_message("Failed to remove member"));
            }
        }
        res
    }

    async fn submit_members(&mut self, project_id: &str, members: Vec<String>) -> Result<(), ClientError> {
        let body = UpdateProjectRequest::members(members);
        let updated = cancellable(&self.cancel, self.backend.update_project(project_id, &body)).await?;
        self.set_project(updated);
        Ok(())
    }

    /// Mutable access for the settings dialog; persisted by [`save_settings`](Self::save_settings).
    pub fn project_mut(&mut self) -> Option<&mut Project> {
        self.project.as_mut()
    }

    pub async fn save_settings(&mut self) -> Result<(), ClientError> {
        let Some(project) = self.project.as_ref() else {
            return Err(ClientError::NotFound("project not loaded".to_string()));
        };
        let body = UpdateProjectRequest::from(project);
        let project_id = project.id.clone();

        match cancellable(&self.cancel, self.backend.update_project(&project_id, &body)).await {
            Ok(updated) => {
                self.set_project(updated);
                self.toast.success("Project Details Updated successfully.");
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error("Failed to update project settings.");
                }
                Err(e)
            }
        }
    }

    /// On success the caller should navigate to the returned route.
    pub async fn delete_project(&mut self) -> Result<Route, ClientError> {
        let Some(project_id) = self.project.as_ref().map(|p| p.id.clone()) else {
            return Err(ClientError::NotFound("project not loaded".to_string()));
        };

        match cancellable(&self.cancel, self.backend.delete_project(&project_id)).await {
            Ok(()) => {
                info!("Deleted project {}", project_id);
                self.toast.success("Project deleted successfully.");
                Ok(Route::Projects)
            }
            Err(e) => {
                if !e.is_cancelled() {
                    self.toast.error("Failed to delete project.");
                }
                Err(e)
            }
        }
    }

    pub fn user_by_id(&self, id: &str) -> Option<&DirectoryUser> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn assignee_name(&self, assignee: Option<&Assignee>) -> String {
        match assignee {
            None => "-".to_string(),
            Some(Assignee::Reference(user)) => user
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "-".to_string()),
            Some(Assignee::Id(id)) => self
                .user_by_id(id)
                .map(|u| u.name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| id.clone()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
