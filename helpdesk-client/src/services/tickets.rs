//! Ticket endpoints and workflow actions.

use reqwest::{
    Method,
    multipart::{Form, Part},
};
use serde::Serialize;
use serde_json::Value;
use shared::models::{
    AssignRequest, Comment, CommentRequest, ListPayload, ResourceId, StatusRequest, Ticket,
};

use super::{Gateway, ResourceService};
use crate::{error::ClientResult, http::RequestOptions};

/// A file to upload to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name the backend stores the file under.
    pub file_name: String,
    /// MIME type; the multipart default applies when absent.
    pub mime: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    fn into_form(self) -> ClientResult<Form> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(mime) = self.mime {
            part = part.mime_str(&mime)?;
        }
        Ok(Form::new().part("file", part))
    }
}

/// `/api/tickets` plus the ticket workflow sub-actions.
#[derive(Clone, Debug)]
pub struct TicketService {
    crud: ResourceService<Ticket>,
}

impl TicketService {
    /// Service over `gateway`.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            crud: ResourceService::new(gateway, "tickets"),
        }
    }

    fn gateway(&self) -> &Gateway {
        self.crud.gateway()
    }

    fn action_path(&self, id: ResourceId, action: &str) -> String {
        format!("{}/{action}", self.crud.item_path(id))
    }

    async fn action(
        &self,
        operation: &str,
        method: Method,
        id: ResourceId,
        action: &str,
        options: RequestOptions,
    ) -> ClientResult<Value> {
        self.gateway()
            .mutate(operation, method, &self.action_path(id, action), options)
            .await
    }

    /// Tickets matching `filters`, sent as query parameters.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn list(&self, filters: &[(String, String)]) -> ClientResult<Vec<Ticket>> {
        self.crud.list(filters).await
    }

    /// One ticket.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn get(&self, id: ResourceId) -> ClientResult<Ticket> {
        self.crud.get(&id).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.crud.create(body).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: ResourceId,
        body: &B,
    ) -> ClientResult<Value> {
        self.crud.update(&id, body).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn delete(&self, id: ResourceId) -> ClientResult<Value> {
        self.crud.delete(&id).await
    }

    /// Comment thread of ticket `id`.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn comments(&self, id: ResourceId) -> ClientResult<Vec<Comment>> {
        let payload: ListPayload<Comment> = self
            .gateway()
            .fetch(
                "list ticket comments",
                &self.action_path(id, "comments"),
                RequestOptions::new(),
            )
            .await?;
        Ok(payload.into_vec())
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn add_comment(&self, id: ResourceId, content: &str) -> ClientResult<Value> {
        let body = CommentRequest {
            content: content.to_string(),
        };
        self.action(
            "add ticket comment",
            Method::POST,
            id,
            "comments",
            RequestOptions::new().json(&body)?,
        )
        .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn change_status(&self, id: ResourceId, status: &str) -> ClientResult<Value> {
        let body = StatusRequest {
            status: status.to_string(),
        };
        self.action(
            "change ticket status",
            Method::PATCH,
            id,
            "status",
            RequestOptions::new().json(&body)?,
        )
        .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn assign(&self, id: ResourceId, user_id: ResourceId) -> ClientResult<Value> {
        self.action(
            "assign ticket",
            Method::PATCH,
            id,
            "assign",
            RequestOptions::new().json(&AssignRequest { user_id })?,
        )
        .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn unassign(&self, id: ResourceId) -> ClientResult<Value> {
        self.action("unassign ticket", Method::PATCH, id, "unassign", RequestOptions::new())
            .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn close(&self, id: ResourceId) -> ClientResult<Value> {
        self.action("close ticket", Method::PATCH, id, "close", RequestOptions::new())
            .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn resolve(&self, id: ResourceId) -> ClientResult<Value> {
        self.action("resolve ticket", Method::PATCH, id, "resolve", RequestOptions::new())
            .await
    }

    /// Multipart upload to `/api/tickets/{id}/attachments`.
    ///
    /// # Errors
    /// Invalid MIME type, priming, transport or status failures.
    pub async fn upload_attachment(
        &self,
        id: ResourceId,
        attachment: Attachment,
    ) -> ClientResult<Value> {
        let form = attachment.into_form()?;
        self.action(
            "upload ticket attachment",
            Method::POST,
            id,
            "attachments",
            RequestOptions::new().multipart(form),
        )
        .await
    }

    /// Time tracked on ticket `id`, as the backend reports it.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn time_tracking(&self, id: ResourceId) -> ClientResult<Value> {
        self.gateway()
            .fetch(
                "get ticket time tracking",
                &self.action_path(id, "tracking-time"),
                RequestOptions::new(),
            )
            .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn start_time_tracking(&self, id: ResourceId) -> ClientResult<Value> {
        self.action(
            "start ticket time tracking",
            Method::POST,
            id,
            "tracking-time/start",
            RequestOptions::new(),
        )
        .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn stop_time_tracking(&self, id: ResourceId) -> ClientResult<Value> {
        self.action(
            "stop ticket time tracking",
            Method::POST,
            id,
            "tracking-time/stop",
            RequestOptions::new(),
        )
        .await
    }
}
