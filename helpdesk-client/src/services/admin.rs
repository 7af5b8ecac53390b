//! Administration endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use shared::models::{AdminUser, ListPayload, Permission, ResourceId, RolesPermissionsRequest};

use super::{Gateway, ResourceService};
use crate::{error::ClientResult, http::RequestOptions};

/// `/api/admin`: account and permission management.
#[derive(Clone, Debug)]
pub struct AdminService {
    users: ResourceService<AdminUser>,
}

impl AdminService {
    /// Service over `gateway`.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            users: ResourceService::new(gateway, "admin/users"),
        }
    }

    /// Accounts matching `params`.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn users(&self, params: &[(String, String)]) -> ClientResult<Vec<AdminUser>> {
        self.users.list(params).await
    }

    /// # Errors
    /// Transport, status or decode failures.
    pub async fn user(&self, id: ResourceId) -> ClientResult<AdminUser> {
        self.users.get(&id).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn create_user<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.users.create(body).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn update_user<B: Serialize + ?Sized>(
        &self,
        id: ResourceId,
        body: &B,
    ) -> ClientResult<Value> {
        self.users.update(&id, body).await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn delete_user(&self, id: ResourceId) -> ClientResult<Value> {
        self.users.delete(&id).await
    }

    /// Every permission that can be granted.
    ///
    /// # Errors
    /// Transport, status or decode failures.
    pub async fn permissions(&self) -> ClientResult<Vec<Permission>> {
        let payload: ListPayload<Permission> = self
            .users
            .gateway()
            .fetch("list permissions", "api/admin/permissions", RequestOptions::new())
            .await?;
        Ok(payload.into_vec())
    }

    /// Replace the permissions granted to account `id`.
    ///
    /// # Errors
    /// Priming, transport or status failures.
    pub async fn assign_roles_permissions(
        &self,
        id: ResourceId,
        permissions: &[String],
    ) -> ClientResult<Value> {
        let body = RolesPermissionsRequest {
            permissions: permissions.to_vec(),
        };
        self.users
            .gateway()
            .mutate(
                "assign roles and permissions",
                Method::POST,
                &format!("{}/roles-permissions", self.users.item_path(id)),
                RequestOptions::new().json(&body)?,
            )
            .await
    }
}
