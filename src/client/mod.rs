use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorResponse};
use crate::models::*;
use crate::session::{TOKEN_KEY, TokenStore};

/// The REST backend, grouped the way the server groups its resources.
///
/// Implementations are stateless request builders: no caching, no retry.
#[async_trait]
pub trait Backend: Send + Sync {
    // /auth
    async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ClientError>;
    async fn signup(&self, body: &SignupRequest) -> Result<AuthResponse, ClientError>;
    async fn google_login(&self, credential: &str) -> Result<AuthResponse, ClientError>;
    async fn send_otp(&self, email: &str) -> Result<(), ClientError>;
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ClientError>;
    async fn me(&self) -> Result<Identity, ClientError>;

    // /projects
    async fn list_projects(&self) -> Result<Vec<Project>, ClientError>;
    async fn create_project(&self, body: &CreateProjectRequest) -> Result<Project, ClientError>;
    async fn get_project(&self, project_id: &str) -> Result<Project, ClientError>;
    async fn update_project(
        &self,
        project_id: &str,
        body: &UpdateProjectRequest,
    ) -> Result<Project, ClientError>;
    async fn delete_project(&self, project_id: &str) -> Result<(), ClientError>;

    // /tasks
    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, ClientError>;
    async fn create_task(&self, project_id: &str, body: &NewTaskRequest) -> Result<Task, ClientError>;
    async fn update_task(&self, task_id: &str, body: &UpdateTaskRequest) -> Result<Task, ClientError>;
    async fn delete_task(&self, task_id: &str) -> Result<(), ClientError>;

    // /users
    async fn list_users(&self) -> Result<Vec<DirectoryUser>, ClientError>;
    async fn invite_member(&self, email: &str) -> Result<(), ClientError>;
    async fn update_profile(&self, body: &UpdateProfileRequest) -> Result<Identity, ClientError>;
    async fn reset_password(&self, body: &ResetPasswordRequest) -> Result<(), ClientError>;
    async fn delete_account(&self) -> Result<(), ClientError>;

    // /activity, /metrics
    async fn list_activity(&self) -> Result<Vec<ActivityEntry>, ClientError>;
    async fn metrics(&self) -> Result<MetricsResponse, ClientError>;
}

pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
    tokens: Option<Arc<dyn TokenStore>>,
}

impl HttpBackend {
    pub fn new(
        config: ClientConfig,
        tokens: Option<Arc<dyn TokenStore>>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    async fn bearer_token(&self) -> Option<String> {
        let store = self.tokens.as_ref()?;
        match store.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to read session token: {}", e);
                None
            }
        }
    }

    /// Sends one request and returns the raw success body.
    async fn execute<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<String, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint(path);
        let request_id = Uuid::new_v4();
        debug!("{} {} (request {})", method, url, request_id);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("x-request-id", request_id.to_string());
        if let Some(token) = self.bearer_token().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await;

        if !status.is_success() {
            let message = body
                .ok()
                .and_then(|text| serde_json::from_str::<ErrorResponse>(&text).ok())
                .and_then(|e| e.message);
            warn!("{} {} failed with {} (request {})", method, url, status, request_id);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body?)
    }

    async fn json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let text = self.execute(method, path, body).await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to parse response from {}: {}", path, e);
            ClientError::Decode(format!("{}: {}", path, e))
        })
    }

    /// For endpoints whose success body carries nothing the client needs.
    async fn ack<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, body).await.map(|_| ())
    }
}

const NO_BODY: Option<&()> = None;

#[async_trait]
impl Backend for HttpBackend {
    async fn login(&self, body: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.json(Method::POST, "/auth/login", Some(body)).await
    }

    async fn signup(&self, body: &SignupRequest) -> Result<AuthResponse, ClientError> {
        self.json(Method::POST, "/auth/signup", Some(body)).await
    }

    async fn google_login(&self, credential: &str) -> Result<AuthResponse, ClientError> {
        let body = GoogleLoginRequest {
            credential: credential.to_string(),
        };
        self.json(Method::POST, "/auth/google", Some(&body)).await
    }

    async fn send_otp(&self, email: &str) -> Result<(), ClientError> {
        let body = OtpRequest {
            email: email.to_string(),
        };
        self.ack(Method::POST, "/auth/send-otp", Some(&body)).await
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<(), ClientError> {
        let body = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.ack(Method::POST, "/auth/verify-otp", Some(&body)).await
    }

    async fn me(&self) -> Result<Identity, ClientError> {
        self.json(Method::GET, "/auth/me", NO_BODY).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ClientError> {
        self.json(Method::GET, "/projects", NO_BODY).await
    }

    async fn create_project(&self, body: &CreateProjectRequest) -> Result<Project, ClientError> {
        self.json(Method::POST, "/projects", Some(body)).await
    }

    async fn get_project(&self, project_id: &str) -> Result<Project, ClientError> {
        self.json(Method::GET, &format!("/projects/{}", project_id), NO_BODY)
            .await
    }

    async fn update_project(
        &self,
        project_id: &str,
        body: &UpdateProjectRequest,
    ) -> Result<Project, ClientError> {
        self.json(Method::PUT, &format!("/projects/{}", project_id), Some(body))
            .await
    }

    async fn delete_project(&self, project_id: &str) -> Result<(), ClientError> {
        self.ack(Method::DELETE, &format!("/projects/{}", project_id), NO_BODY)
            .await
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<Task>, ClientError> {
        self.json(Method::GET, &format!("/tasks/project/{}", project_id), NO_BODY)
            .await
    }

    async fn create_task(&self, project_id: &str, body: &NewTaskRequest) -> Result<Task, ClientError> {
        self.json(
            Method::POST,
            &format!("/tasks/project/{}", project_id),
            Some(body),
        )
        .await
    }

    async fn update_task(&self, task_id: &str, body: &UpdateTaskRequest) -> Result<Task, ClientError> {
        self.json(Method::PUT, &format!("/tasks/{}", task_id), Some(body))
            .await
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ClientError> {
        self.ack(Method::DELETE, &format!("/tasks/{}", task_id), NO_BODY)
            .await
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>, ClientError> {
        self.json(Method::GET, "/users/allUsers", NO_BODY).await
    }

    async fn invite_member(&self, email: &str) -> Result<(), ClientError> {
        let body = InviteRequest {
            email: email.to_string(),
        };
        self.ack(Method::POST, "/users/invite", Some(&body)).await
    }

    async fn update_profile(&self, body: &UpdateProfileRequest) -> Result<Identity, ClientError> {
        self.json(Method::PUT, "/users/me", Some(body)).await
    }

    async fn reset_password(&self, body: &ResetPasswordRequest) -> Result<(), ClientError> {
        self.ack(Method::POST, "/users/reset-password", Some(body)).await
    }

    async fn delete_account(&self) -> Result<(), ClientError> {
        self.ack(Method::DELETE, "/users/me", NO_BODY).await
    }

    async fn list_activity(&self) -> Result<Vec<ActivityEntry>, ClientError> {
        self.json(Method::GET, "/activity", NO_BODY).await
    }

    async fn metrics(&self) -> Result<MetricsResponse, ClientError> {
        self.json(Method::GET, "/metrics", NO_BODY).await
    }
}
