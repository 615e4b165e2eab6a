use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::client::Backend;
use crate::controllers::cancellable;
use crate::error::ClientError;
use crate::models::DashboardStats;

pub struct Dashboard {
    backend: Arc<dyn Backend>,
    cancel: CancellationToken,
    pub stats: DashboardStats,
    pub error: Option<String>,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cancel: CancellationToken::new(),
            stats: DashboardStats::default(),
            error: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    /// Missing counters read as zero.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        match cancellable(&self.cancel, self.backend.metrics()).await {
            Ok(raw) => {
                self.stats = DashboardStats::from(raw);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Failed to load metrics: {}", e);
                    self.error = Some(e.user_message("Failed to load metrics"));
                }
                Err(e)
            }
        }
    }
}
