#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use projecthub::client::Backend;
use projecthub::error::ClientError;
use projecthub::models::*;
use projecthub::session::{MemoryTokenStore, Session, TokenStore};
use serde_json::json;

/// In-process stand-in for the REST backend. Every call is recorded as
/// `name` or `name:arg`; a key listed in `fail` makes that call return a 500.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub fail: Mutex<HashSet<String>>,
    pub me: Mutex<Option<Identity>>,
    pub auth: Mutex<Option<AuthResponse>>,
    pub projects: Mutex<Vec<Project>>,
    pub tasks: Mutex<HashMap<String, Vec<Task>>>,
    pub users: Mutex<Vec<DirectoryUser>>,
    pub activity: Mutex<Vec<ActivityEntry>>,
    next_id: Mutex<u32>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, key: &str) {
        self.fail.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.as_str() == name || c.starts_with(&format!("{}:", name)))
            .count()
    }

    pub fn set_me(&self, user: Identity) {
        *self.me.lock().unwrap() = Some(user);
    }

    pub fn set_auth(&self, token: &str, user: Identity) {
        *self.auth.lock().unwrap() = Some(AuthResponse {
            token: token.to_string(),
            user,
        });
    }

    pub fn add_project(&self, project: Project) {
        self.projects.lock().unwrap().push(project);
    }

    pub fn set_tasks(&self, project_id: &str, tasks: Vec<Task>) {
        self.tasks
            .lock()
            .unwrap()
            .insert(project_id.to_string(), tasks);
    }

    pub fn set_users(&self, users: Vec<DirectoryUser>) {
        *self.users.lock().unwrap() = users;
    }

    fn record(&self, name: &str, arg: Option<&str>) -> Result<(), ClientError> {
        let key = match arg {
            Some(arg) => format!("{}:{}", name, arg),
            None => name.to_string(),
        };
        self.calls.lock().unwrap().push(key.clone());
        let fail = self.fail.lock().unwrap();
        if fail.contains(&key) || fail.contains(name) {
            return Err(ClientError::Api {
                status: 500,
                message: Some(format!("{} failed", key)),
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut n = self.next_id.lock().unwrap();
        *n += 1;
        format!("{}{}", prefix, n)
    }

    fn auth_response(&self) -> Result<AuthResponse, ClientError> {
        self.auth.lock().unwrap().clone().ok_or(ClientError::Api {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        })
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.record("login", Some(&body.email))?;
        self.auth_response()
    }

    async fn signup(&self, body: &SignupRequest) -> Result<AuthResponse, ClientError> {
        self.record("signup", Some(&body.email))?;
        self.auth_response()
    }

    async fn google_login(&self, credential: &str) -> Result<AuthResponse, ClientError> {
        self.record("google_login", Some(credential))?;
        self.auth_response()
    }

    async fn send_otp(&self, email: &str) -> Result<(), ClientError> {
        self.record("send_otp", Some(email))
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ClientError> {
        self.record("verify_otp", Some(email))?;
        if otp == "123456" {
            Ok(())
        } else {
            Err(ClientError::Api {
                status: 400,
                message: Some("Invalid OTP".to_string()),
            })
        }
    }

    async fn me(&self) -> Result<Identity, ClientError> {
        self.record("me", None)?;
        self.me.lock().unwrap().clone().ok_or(ClientError::Api {
            status: 401,
            message: None,
        })
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.record("list_projects", None)?;
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn create_project(&self, body: &CreateProjectRequest) -> Result<Project, ClientError> {
        self.record("create_project", Some(&body.name))?;
        let owner = self
            .me
            .lock()
            .unwrap()
            .as_ref()
            .map(|u| u.id.clone())
            .unwrap_or_default();
        let project = Project {
            id: self.next_id("p"),
            name: body.name.clone(),
            description: body.description.clone(),
            status: Some(body.status),
            start_date: body.start_date.clone(),
            end_date: body.end_date.clone(),
            owner,
            members: body.members.clone().unwrap_or_default(),
            tags: body.tags.clone().unwrap_or_default(),
            created_at: None,
            updated_at: None,
        };
        self.projects.lock().unwrap().push(project.clone());
        Ok(project)
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.record("get_project", Some(project_id))?;
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or(ClientError::Api {
                status: 404,
                message: Some("Project not found".to_string()),
            })
    }

    async fn update_project(
        &self,
        project_id: &str,
        body: &UpdateProjectRequest,
    ) -> Result<Project, ClientError> {
        self.record("update_project", Some(project_id))?;
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or(ClientError::Api {
                status: 404,
                message: Some("Project not found".to_string()),
            })?;
        if let Some(name) = &body.name {
            project.name = name.clone();
        }
        if body.description.is_some() {
            project.description = body.description.clone();
        }
        if body.status.is_some() {
            project.status = body.status;
        }
        if let Some(start) = &body.start_date {
            project.start_date = Some(format!("{}T00:00:00.000Z", start));
        }
        if let Some(end) = &body.end_date {
            project.end_date = Some(format!("{}T00:00:00.000Z", end));
        }
        if let Some(members) = &body.members {
            project.members = members.clone();
        }
        if let Some(tags) = &body.tags {
            project.tags = tags.clone();
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ClientError> {
        self.record("delete_project", Some(project_id))?;
        self.projects.lock().unwrap().retain(|p| p.id != project_id);
        Ok(())
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, ClientError> {
        self.record("list_tasks", Some(project_id))?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_task(&self, project_id: &str, body: &NewTaskRequest) -> Result<Task, ClientError> {
        self.record("create_task", Some(project_id))?;
        let task: Task = serde_json::from_value(json!({
            "_id": self.next_id("t"),
            "title": body.title,
            "description": body.description,
            "status": body.status,
            "priority": body.priority,
            "assignedTo": body.assigned_to,
            "project": project_id,
            "dueDate": body.due_date,
        }))
        .map_err(|e| ClientError::Decode(e.to_string()))?;
        self.tasks
            .lock()
            .unwrap()
            .entry(project_id.to_string())
            .or_default()
            .push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, task_id: &str, body: &UpdateTaskRequest) -> Result<Task, ClientError> {
        self.record("update_task", Some(task_id))?;
        let mut tasks = self.tasks.lock().unwrap();
        for list in tasks.values_mut() {
            if let Some(task) = list.iter_mut().find(|t| t.id.as_deref() == Some(task_id)) {
                if let Some(status) = body.status {
                    task.status = status;
                }
                return Ok(task.clone());
            }
        }
        Err(ClientError::Api {
            status: 404,
            message: Some("Task not found".to_string()),
        })
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        self.record("delete_task", Some(task_id))?;
        let mut tasks = self.tasks.lock().unwrap();
        for list in tasks.values_mut() {
            list.retain(|t| t.id.as_deref() != Some(task_id));
        }
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>, ClientError> {
        self.record("list_users", None)?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn invite_member(&self, email: &str) -> Result<(), ClientError> {
        self.record("invite_member", Some(email))
    }

    async fn update_profile(&self, body: &UpdateProfileRequest) -> Result<Identity, ClientError> {
        self.record("update_profile", None)?;
        let mut me = self.me.lock().unwrap();
        let user = me.as_mut().ok_or(ClientError::Api {
            status: 401,
            message: None,
        })?;
        user.name = body.name.clone();
        Ok(user.clone())
    }

    async fn reset_password(&self, _body: &ResetPasswordRequest) -> Result<(), ClientError> {
        self.record("reset_password", None)
    }

    async fn delete_account(&self) -> Result<(), ClientError> {
        self.record("delete_account", None)
    }

    async fn list_activity(&self) -> Result<Vec<ActivityEntry>, ClientError> {
        self.record("list_activity", None)?;
        Ok(self.activity.lock().unwrap().clone())
    }

    async fn metrics(&self) -> Result<MetricsResponse, ClientError> {
        self.record("metrics", None)?;
        Ok(MetricsResponse::default())
    }
}

pub fn identity(id: &str, name: &str) -> Identity {
    Identity {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        auth_method: AuthMethod::Password,
    }
}

pub fn directory_user(id: &str, name: &str) -> DirectoryUser {
    DirectoryUser {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        projects_count: 0,
        tasks_count: 0,
    }
}

pub fn project(id: &str, owner: &str, members: &[&str]) -> Project {
    Project {
        id: id.to_string(),
        name: format!("Project {}", id),
        status: Some(ProjectStatus::Planning),
        owner: owner.to_string(),
        members: members.iter().map(|m| m.to_string()).collect(),
        ..Default::default()
    }
}

pub fn task(id: &str, status: &str, assignee: Option<&str>, due: Option<&str>) -> Task {
    serde_json::from_value(json!({
        "_id": id,
        "title": format!("Task {}", id),
        "status": status,
        "assignedTo": assignee,
        "dueDate": due,
    }))
    .unwrap()
}

/// Session over `backend` with an in-memory token store.
pub fn session_with(backend: Arc<FakeBackend>) -> (Arc<Session>, Arc<MemoryTokenStore>) {
    let store = Arc::new(MemoryTokenStore::new());
    let tokens: Arc<dyn TokenStore> = store.clone();
    let session = Arc::new(Session::new(backend, Some(tokens)));
    (session, store)
}

/// Session already signed in as `user`.
pub fn signed_in(backend: Arc<FakeBackend>, user: Identity) -> Arc<Session> {
    backend.set_me(user.clone());
    let (session, _) = session_with(backend);
    session.publish(Some(user));
    session
}
