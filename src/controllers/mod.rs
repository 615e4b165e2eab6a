//! Page-level state holders. Each controller owns its slice of state, talks
//! to the backend through [`Backend`](crate::client::Backend), and reports
//! navigation as a returned [`Route`](crate::routes::Route).
//!
//! Membership checks done here only decide what to show; the backend is the
//! one enforcing access.

pub mod account;
pub mod activity;
pub mod auth_flow;
pub mod board;
pub mod dashboard;
pub mod projects;
pub mod team;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

pub use account::{AccountDeletion, AccountSettings, ProfileForm, initials};
pub use activity::ActivityFeed;
pub use auth_flow::{AuthFlow, AuthMode, AuthStep, OtpCode, OtpFocus};
pub use board::{TaskBoard, TaskBuckets, TaskDraft, completion_percentage, has_assignment_conflict};
pub use dashboard::Dashboard;
pub use projects::{ProjectClick, ProjectDraft, ProjectList, TaskStats};
pub use team::TeamDirectory;

/// Colour bucket for status and priority badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Violet,
    Green,
    Yellow,
    Orange,
    Blue,
    Red,
    Slate,
}

/// Races `fut` against `token`; a cancelled request resolves to
/// [`ClientError::Cancelled`] and its response is dropped.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ClientError::Cancelled),
        res = fut => res,
    }
}
