use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::client::Backend;
use crate::controllers::cancellable;
use crate::error::ClientError;
use crate::models::ActivityEntry;

pub struct ActivityFeed {
    backend: Arc<dyn Backend>,
    cancel: CancellationToken,
    pub entries: Vec<ActivityEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ActivityFeed {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cancel: CancellationToken::new(),
            entries: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub fn deactivate(&self) {
        self.cancel.cancel();
    }

    pub async fn fetch(&mut self) -> Result<(), ClientError> {
        self.loading = true;
        let res = cancellable(&self.cancel, self.backend.list_activity()).await;
        self.loading = false;

        match res {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Failed to load activity: {}", e);
                    self.error = Some(e.user_message("Failed to load activity log."));
                }
                Err(e)
            }
        }
    }
}
