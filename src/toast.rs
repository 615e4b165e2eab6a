use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

#[derive(Debug, Default)]
struct ToastState {
    notice: Option<Notice>,
    visible: bool,
}

/// Ephemeral notice that hides itself after a fixed delay.
///
/// Timers are never cancelled: every `show` schedules its own hide, so an
/// earlier timer may hide a later notice.
#[derive(Debug, Clone)]
pub struct Toast {
    state: Arc<Mutex<ToastState>>,
    ttl: Duration,
}

impl Toast {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ToastState::default())),
            ttl,
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, NoticeKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, NoticeKind::Error);
    }

    pub fn show(&self, message: impl Into<String>, kind: NoticeKind) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.notice = Some(Notice {
                message: message.into(),
                kind,
            });
            state.visible = true;
        }

        let state = self.state.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            state.visible = false;
        });
    }

    /// The notice currently on screen, if any.
    pub fn current(&self) -> Option<Notice> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.visible { state.notice.clone() } else { None }
    }

    /// The last notice shown, whether or not it has been dismissed.
    pub fn last(&self) -> Option<Notice> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.notice.clone()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hides_after_ttl() {
        let toast = Toast::new(Duration::from_millis(3000));
        toast.success("Saved");
        assert_eq!(toast.current().map(|n| n.message), Some("Saved".to_string()));

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(toast.current().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(toast.current().is_none());
        assert_eq!(toast.last().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_timer_is_not_cancelled() {
        let toast = Toast::new(Duration::from_millis(5000));
        toast.success("first");
        tokio::time::sleep(Duration::from_millis(4000)).await;
        toast.error("second");

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert!(toast.current().is_none());
        assert_eq!(toast.last().map(|n| n.message), Some("second".to_string()));
    }
}
