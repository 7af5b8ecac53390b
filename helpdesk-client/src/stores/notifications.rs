//! Notifications and the unread counter.

use chrono::{DateTime, Utc};
use shared::models::Notification;

use super::{StoreHandle, StoreState};
use crate::{error::ClientResult, services::NotificationService};

/// Notifications held locally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotificationState {
    /// Last fetched list, with local read marks applied.
    pub notifications: Vec<Notification>,
    /// Unread counter as last reported or adjusted locally.
    pub unread_count: u64,
    /// A notification action is in flight.
    pub loading: bool,
    /// Message of the last failed action.
    pub error: Option<String>,
}

impl NotificationState {
    /// Stamp one notification as read. Only a previously unread one lowers
    /// the counter.
    fn mark_read(&mut self, id: &str, at: DateTime<Utc>) {
        let newly_read = self
            .notifications
            .iter_mut()
            .find(|notification| notification.id == id)
            .is_some_and(|notification| notification.mark_read(at));
        if newly_read || !self.notifications.iter().any(|n| n.id == id) {
            self.unread_count = self.unread_count.saturating_sub(1);
        }
    }

    fn mark_all_read(&mut self, at: DateTime<Utc>) {
        for notification in &mut self.notifications {
            notification.mark_read(at);
        }
        self.unread_count = 0;
    }
}

impl StoreState for NotificationState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Notifications and the unread counter.
#[derive(Clone, Debug)]
pub struct NotificationStore {
    service: NotificationService,
    handle: StoreHandle<NotificationState>,
}

impl NotificationStore {
    /// Empty store over `service`.
    #[must_use]
    pub fn new(service: NotificationService) -> Self {
        Self {
            service,
            handle: StoreHandle::new(),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> NotificationState {
        self.handle.snapshot()
    }

    /// Failures are recorded, not returned.
    pub async fn fetch_notifications(&self) {
        let _loading = self.handle.begin();
        match self.service.list().await {
            Ok(notifications) => self.handle.update(|state| state.notifications = notifications),
            Err(err) => self
                .handle
                .fail(err.message_or("Failed to fetch notifications")),
        }
    }

    /// Refresh the unread counter. Never fails.
    pub async fn fetch_unread_count(&self) -> u64 {
        let _loading = self.handle.begin();
        let count = self.service.unread_count().await.count;
        self.handle.update(|state| state.unread_count = count);
        count
    }

    /// Marks `id` read on the backend, then stamps it locally.
    ///
    /// # Errors
    /// The service error, after recording it; local state is left as is.
    pub async fn mark_as_read(&self, id: &str) -> ClientResult<()> {
        let _loading = self.handle.begin();
        self.service.mark_as_read(id).await.inspect_err(|err| {
            self.handle
                .fail(err.message_or("Failed to mark notification as read"));
        })?;
        self.handle.update(|state| state.mark_read(id, Utc::now()));
        Ok(())
    }

    /// Marks everything read and zeroes the counter.
    ///
    /// # Errors
    /// The service error, after recording it; local state is left as is.
    pub async fn mark_all_as_read(&self) -> ClientResult<()> {
        let _loading = self.handle.begin();
        self.service.mark_all_as_read().await.inspect_err(|err| {
            self.handle
                .fail(err.message_or("Failed to mark all notifications as read"));
        })?;
        self.handle.update(|state| state.mark_all_read(Utc::now()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Map, Value};

    fn notification(id: &str, read_at: Option<DateTime<Utc>>) -> Notification {
        Notification {
            id: id.to_string(),
            kind: None,
            data: Value::Null,
            read_at: read_at.map(|at| at.to_rfc3339()),
            created_at: None,
            extra: Map::new(),
        }
    }

    fn earlier() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_mark_read_stamps_and_decrements() {
        let mut state = NotificationState {
            notifications: vec![notification("a", None), notification("b", None)],
            unread_count: 2,
            ..NotificationState::default()
        };
        let now = Utc::now();
        state.mark_read("a", now);
        assert_eq!(state.notifications[0].read_time(), Some(now));
        assert!(state.notifications[1].read_at.is_none());
        assert_eq!(state.unread_count, 1);
    }

    #[test]
    fn test_mark_read_saturates_at_zero() {
        let mut state = NotificationState::default();
        state.mark_read("missing", Utc::now());
        assert_eq!(state.unread_count, 0);
    }

    #[test]
    fn test_mark_read_twice_counts_once() {
        let mut state = NotificationState {
            notifications: vec![notification("a", Some(earlier()))],
            unread_count: 3,
            ..NotificationState::default()
        };
        state.mark_read("a", Utc::now());
        assert_eq!(state.notifications[0].read_time(), Some(earlier()));
        assert_eq!(state.unread_count, 3);
    }

    #[test]
    fn test_mark_all_read_keeps_existing_stamps() {
        let mut state = NotificationState {
            notifications: vec![notification("a", Some(earlier())), notification("b", None)],
            unread_count: 1,
            ..NotificationState::default()
        };
        let now = Utc::now();
        state.mark_all_read(now);
        assert_eq!(state.notifications[0].read_time(), Some(earlier()));
        assert_eq!(state.notifications[1].read_time(), Some(now));
        assert_eq!(state.unread_count, 0);
    }
}
