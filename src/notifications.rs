use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{api::ApiClient, error::ApiError, models::Notification};

/// How many notifications the bell drop-down shows.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// NotificationsApi
///
/// Calls behind the notification bell. Every call goes through the shared client, so a 401
/// from a background refresh ends the session exactly like one from a page would.
#[derive(Clone)]
pub struct NotificationsApi {
    api: Arc<ApiClient>,
}

impl NotificationsApi {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// The server answers with a bare integer.
    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        self.api.get_json("/notifications/unread-count", &[]).await
    }

    pub async fn list(&self, limit: u32, include_read: bool) -> Result<Vec<Notification>, ApiError> {
        let query = [
            ("limit".to_string(), limit.to_string()),
            ("include_read".to_string(), include_read.to_string()),
        ];
        self.api.get_json("/notifications/", &query).await
    }

    pub async fn mark_read(&self, id: i64) -> Result<(), ApiError> {
        self.api
            .put_empty::<serde_json::Value>(&format!("/notifications/{id}/read"))
            .await
            .map(|_| ())
    }

    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.api
            .put_empty::<serde_json::Value>("/notifications/read-all")
            .await
            .map(|_| ())
    }
}

/// NotificationPoller
///
/// Refreshes the unread count on a fixed interval and publishes it through a `watch`
/// channel. The first tick fires immediately. A failed refresh keeps the last known count.
/// The task stops when the poller is dropped.
pub struct NotificationPoller {
    task: JoinHandle<()>,
    count: watch::Receiver<u64>,
}

impl NotificationPoller {
    pub fn spawn(notifications: NotificationsApi, period: Duration) -> Self {
        let (sender, count) = watch::channel(0);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match notifications.unread_count().await {
                    Ok(unread) => {
                        sender.send_if_modified(|current| {
                            let changed = *current != unread;
                            *current = unread;
                            changed
                        });
                    }
                    Err(ApiError::Unauthorized { .. }) => {
                        tracing::debug!("notification poll unauthorised, session cleared");
                    }
                    Err(e) => tracing::warn!("notification poll failed: {}", e),
                }
            }
        });

        Self { task, count }
    }

    pub fn unread(&self) -> u64 {
        *self.count.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.count.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}
