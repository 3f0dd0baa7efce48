use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    DeadlineElapsed,
    ServerRejected { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditWindowState {
    Editable { editable_until: DateTime<Utc> },
    Locked(LockReason),
}

impl EditWindowState {
    pub fn is_editable(&self) -> bool {
        matches!(self, EditWindowState::Editable { .. })
    }
}

/// Client-side edit window for one submitted report.
///
/// A timer task locks the window once the remaining time the server reported
/// has passed. A 403 or 409 from the server locks it immediately. Dropping the
/// window aborts the timer.
pub struct EditWindow {
    state: Arc<watch::Sender<EditWindowState>>,
    clock: Arc<dyn Clock>,
    timer: Option<JoinHandle<()>>,
}

impl EditWindow {
    /// Opens a window that stays editable for `remaining`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(remaining: Duration, clock: Arc<dyn Clock>) -> Self {
        let editable_until = clock.utc() + remaining;
        let (sender, _) = watch::channel(EditWindowState::Editable { editable_until });
        let mut window = Self {
            state: Arc::new(sender),
            clock,
            timer: None,
        };
        window.start_timer(remaining);
        window
    }

    fn start_timer(&mut self, remaining: Duration) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let state = Arc::clone(&self.state);
        let delay = remaining.to_std().unwrap_or_default();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|current| {
                if current.is_editable() {
                    *current = EditWindowState::Locked(LockReason::DeadlineElapsed);
                    true
                } else {
                    false
                }
            });
            tracing::debug!("Edit window deadline elapsed");
        }));
    }

    /// Restarts the timer with a new remaining duration, e.g. from a later
    /// server response. A locked window stays locked.
    pub fn reschedule(&mut self, remaining: Duration) -> bool {
        if !self.is_editable() {
            return false;
        }

        let editable_until = self.clock.utc() + remaining;
        self.state
            .send_replace(EditWindowState::Editable { editable_until });
        self.start_timer(remaining);
        true
    }

    /// Feeds an edit response status into the window. Returns true if it locked.
    pub fn on_server_response(&mut self, status: StatusCode) -> bool {
        if status != StatusCode::FORBIDDEN && status != StatusCode::CONFLICT {
            return false;
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.state
            .send_replace(EditWindowState::Locked(LockReason::ServerRejected {
                status: status.as_u16(),
            }));
        tracing::debug!("Edit window locked by server response: status={}", status);
        true
    }

    pub fn state(&self) -> EditWindowState {
        *self.state.borrow()
    }

    pub fn is_editable(&self) -> bool {
        self.state().is_editable()
    }

    pub fn subscribe(&self) -> watch::Receiver<EditWindowState> {
        self.state.subscribe()
    }
}

impl Drop for EditWindow {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
