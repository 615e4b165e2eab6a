pub mod activity;
pub mod identity;
pub mod metrics;
pub mod project;
pub mod task;

pub use activity::{ActivityAction, ActivityEntry, ActivityTarget};
pub use identity::{
    AuthMethod, AuthResponse, DirectoryUser, GoogleLoginRequest, Identity, InviteRequest,
    LoginRequest, MessageResponse, OtpRequest, ResetPasswordRequest, SignupRequest,
    UpdateProfileRequest, VerifyOtpRequest,
};
pub use metrics::{DashboardStats, MetricsResponse, ProjectCompletion};
pub use project::{CreateProjectRequest, Project, ProjectStatus, UpdateProjectRequest};
pub use task::{
    Assignee, NewTaskRequest, Task, TaskPriority, TaskStatus, UpdateTaskRequest, UserReference,
};
