//! Tickets and their workflow.

use serde::Serialize;
use serde_json::Value;
use shared::models::{Comment, ResourceId, Ticket};
use tracing::debug;

use super::{StoreHandle, StoreState, remove_by_id};
use crate::{
    error::ClientResult,
    services::{TicketService, tickets::Attachment},
};

/// Tickets, the ticket being viewed, its comments and time tracking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicketState {
    /// Last fetched list.
    pub tickets: Vec<Ticket>,
    /// The ticket being viewed.
    pub current_ticket: Option<Ticket>,
    /// Comments of the last ticket whose thread was fetched.
    pub comments: Vec<Comment>,
    /// Time tracking of the last ticket asked about, as the backend sent it.
    pub time_tracking: Option<Value>,
    /// Filters of the last list fetch, reused by refetches.
    pub filters: Vec<(String, String)>,
    /// An action of this store is in flight.
    pub loading: bool,
    /// Message of the last failed action.
    pub error: Option<String>,
}

impl StoreState for TicketState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Ticket list and workflow actions.
#[derive(Clone, Debug)]
pub struct TicketStore {
    service: TicketService,
    handle: StoreHandle<TicketState>,
}

impl TicketStore {
    /// Empty store over `service`.
    #[must_use]
    pub fn new(service: TicketService) -> Self {
        Self {
            service,
            handle: StoreHandle::new(),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> TicketState {
        self.handle.snapshot()
    }

    /// Load the ticket list. Failures are recorded, not returned.
    pub async fn fetch_tickets(&self, filters: Vec<(String, String)>) {
        let _loading = self.handle.begin();
        match self.service.list(&filters).await {
            Ok(tickets) => {
                debug!(count = tickets.len(), "tickets loaded");
                self.handle.update(|state| {
                    state.tickets = tickets;
                    state.filters = filters;
                });
            }
            Err(err) => self.handle.fail(err.message_or("Failed to fetch tickets")),
        }
    }

    /// Load one ticket into `current_ticket`. Failures are recorded, not
    /// returned.
    pub async fn fetch_ticket(&self, id: ResourceId) {
        let _loading = self.handle.begin();
        match self.service.get(id).await {
            Ok(ticket) => self.handle.update(|state| state.current_ticket = Some(ticket)),
            Err(err) => self
                .handle
                .fail(err.message_or(&format!("Failed to fetch ticket #{id}"))),
        }
    }

    async fn refetch_list(&self) {
        let filters = self.handle.update(|state| state.filters.clone());
        self.fetch_tickets(filters).await;
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn create_ticket<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let created = self
            .service
            .create(body)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to create ticket")))?;
        if let Ok(ticket) = serde_json::from_value::<Ticket>(unwrap_data(&created)) {
            self.handle.update(|state| state.tickets.push(ticket));
        }
        Ok(created)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn update_ticket<B: Serialize + ?Sized>(
        &self,
        id: ResourceId,
        body: &B,
    ) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let updated = self.service.update(id, body).await.inspect_err(|err| {
            self.handle
                .fail(err.message_or(&format!("Failed to update ticket #{id}")));
        })?;
        if let Ok(ticket) = serde_json::from_value::<Ticket>(unwrap_data(&updated)) {
            self.handle.update(|state| replace_ticket(state, ticket));
        }
        Ok(updated)
    }

    /// Delete a ticket and drop it from the local list. Deleting an id that
    /// is not held locally still calls the backend.
    ///
    /// # Errors
    /// The service error, after recording it; local state is left as is.
    pub async fn delete_ticket(&self, id: ResourceId) -> ClientResult<()> {
        let _loading = self.handle.begin();
        self.service.delete(id).await.inspect_err(|err| {
            self.handle
                .fail(err.message_or(&format!("Failed to delete ticket #{id}")));
        })?;
        self.handle.update(|state| {
            remove_by_id(&mut state.tickets, &id);
            if state.current_ticket.as_ref().is_some_and(|ticket| ticket.id == id) {
                state.current_ticket = None;
            }
        });
        Ok(())
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn fetch_comments(&self, id: ResourceId) -> ClientResult<Vec<Comment>> {
        let _loading = self.handle.begin();
        let comments = self
            .service
            .comments(id)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to fetch comments")))?;
        self.handle.update(|state| state.comments.clone_from(&comments));
        Ok(comments)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn add_comment(&self, id: ResourceId, content: &str) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let created = self
            .service
            .add_comment(id, content)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to add comment")))?;
        if let Ok(comment) = serde_json::from_value::<Comment>(unwrap_data(&created)) {
            self.handle.update(|state| state.comments.push(comment));
        }
        Ok(created)
    }

    /// Change the workflow status, then reload the list with the last
    /// filters.
    ///
    /// # Errors
    /// The service error, after recording it.
    pub async fn change_status(&self, id: ResourceId, status: &str) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let response = self
            .service
            .change_status(id, status)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to change status")))?;
        self.refetch_list().await;
        Ok(response)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn assign(&self, id: ResourceId, user_id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let result = self.service.assign(id, user_id).await;
        self.after_ticket_action(id, result, "Failed to assign ticket")
            .await
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn unassign(&self, id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let result = self.service.unassign(id).await;
        self.after_ticket_action(id, result, "Failed to unassign ticket")
            .await
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn close(&self, id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let result = self.service.close(id).await;
        self.after_ticket_action(id, result, "Failed to close ticket")
            .await
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn resolve(&self, id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let result = self.service.resolve(id).await;
        self.after_ticket_action(id, result, "Failed to resolve ticket")
            .await
    }

    /// Record the failure, or reload the affected ticket on success.
    async fn after_ticket_action(
        &self,
        id: ResourceId,
        result: ClientResult<Value>,
        fallback: &str,
    ) -> ClientResult<Value> {
        match result {
            Ok(response) => {
                self.fetch_ticket(id).await;
                Ok(response)
            }
            Err(err) => {
                self.handle.fail(err.message_or(fallback));
                Err(err)
            }
        }
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn upload_attachment(
        &self,
        id: ResourceId,
        attachment: Attachment,
    ) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        self.service
            .upload_attachment(id, attachment)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to upload attachment")))
    }

    /// Load time tracking for a ticket. Failures are recorded, not returned.
    pub async fn fetch_time_tracking(&self, id: ResourceId) {
        let _loading = self.handle.begin();
        match self.service.time_tracking(id).await {
            Ok(tracking) => self.handle.update(|state| state.time_tracking = Some(tracking)),
            Err(err) => self
                .handle
                .fail(err.message_or("Failed to fetch time tracking")),
        }
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn start_time_tracking(&self, id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let tracking = self
            .service
            .start_time_tracking(id)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to start time tracking")))?;
        self.handle
            .update(|state| state.time_tracking = Some(tracking.clone()));
        Ok(tracking)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn stop_time_tracking(&self, id: ResourceId) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let tracking = self
            .service
            .stop_time_tracking(id)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to stop time tracking")))?;
        self.handle
            .update(|state| state.time_tracking = Some(tracking.clone()));
        Ok(tracking)
    }
}

/// The record inside a `{ "data": ... }` envelope, or the value itself.
pub(crate) fn unwrap_data(value: &Value) -> Value {
    value
        .get("data")
        .filter(|data| data.is_object())
        .unwrap_or(value)
        .clone()
}

fn replace_ticket(state: &mut TicketState, ticket: Ticket) {
    if let Some(slot) = state.tickets.iter_mut().find(|held| held.id == ticket.id) {
        *slot = ticket.clone();
    }
    if state
        .current_ticket
        .as_ref()
        .is_some_and(|current| current.id == ticket.id)
    {
        state.current_ticket = Some(ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn ticket(id: ResourceId, title: &str) -> Ticket {
        Ticket {
            id,
            title: title.to_string(),
            description: None,
            status: Some("open".to_string()),
            priority: None,
            category_id: None,
            assigned_to: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_unwrap_data_envelope() {
        let wrapped = json!({ "data": { "id": 4, "title": "Printer" } });
        assert_eq!(unwrap_data(&wrapped), json!({ "id": 4, "title": "Printer" }));

        let bare = json!({ "id": 4, "data": [1, 2] });
        assert_eq!(unwrap_data(&bare), bare);
    }

    #[test]
    fn test_replace_ticket_updates_list_and_current() {
        let mut state = TicketState {
            tickets: vec![ticket(1, "old"), ticket(2, "other")],
            current_ticket: Some(ticket(1, "old")),
            ..TicketState::default()
        };
        replace_ticket(&mut state, ticket(1, "new"));
        assert_eq!(state.tickets[0].title, "new");
        assert_eq!(state.tickets[1].title, "other");
        assert_eq!(state.current_ticket.map(|t| t.title).as_deref(), Some("new"));
    }

    #[test]
    fn test_replace_ticket_ignores_unknown_id() {
        let mut state = TicketState {
            tickets: vec![ticket(1, "old")],
            ..TicketState::default()
        };
        replace_ticket(&mut state, ticket(9, "new"));
        assert_eq!(state.tickets, vec![ticket(1, "old")]);
        assert!(state.current_ticket.is_none());
    }
}
