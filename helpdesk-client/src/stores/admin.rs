//! Account and permission administration.

use serde::Serialize;
use serde_json::Value;
use shared::models::{AdminUser, Permission, ResourceId};
use tracing::info;

use super::{StoreHandle, StoreState, remove_by_id, tickets::unwrap_data};
use crate::{error::ClientResult, services::AdminService};

/// Administration data held locally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdminState {
    /// Last fetched account list, with local edits merged.
    pub users: Vec<AdminUser>,
    /// Every grantable permission.
    pub permissions: Vec<Permission>,
    /// An action of this store is in flight.
    pub loading: bool,
    /// Message of the last failed action.
    pub error: Option<String>,
}

impl StoreState for AdminState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Account and permission administration.
#[derive(Clone, Debug)]
pub struct AdminStore {
    service: AdminService,
    handle: StoreHandle<AdminState>,
}

impl AdminStore {
    /// Empty store over `service`.
    #[must_use]
    pub fn new(service: AdminService) -> Self {
        Self {
            service,
            handle: StoreHandle::new(),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AdminState {
        self.handle.snapshot()
    }

    /// Failures are recorded, not returned.
    pub async fn fetch_users(&self, params: &[(String, String)]) {
        let _loading = self.handle.begin();
        match self.service.users(params).await {
            Ok(users) => self.handle.update(|state| state.users = users),
            Err(err) => self.handle.fail(err.message_or("Failed to fetch users")),
        }
    }

    /// Failures are recorded, not returned.
    pub async fn fetch_permissions(&self) {
        let _loading = self.handle.begin();
        match self.service.permissions().await {
            Ok(permissions) => self.handle.update(|state| state.permissions = permissions),
            Err(err) => self
                .handle
                .fail(err.message_or("Failed to fetch permissions")),
        }
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn create_user<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let created = self
            .service
            .create_user(body)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to create user")))?;
        if let Ok(user) = serde_json::from_value::<AdminUser>(unwrap_data(&created)) {
            self.handle.update(|state| state.users.push(user));
        }
        Ok(created)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn update_user<B: Serialize + ?Sized>(
        &self,
        id: ResourceId,
        body: &B,
    ) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let updated = self
            .service
            .update_user(id, body)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to update user")))?;
        if let Ok(user) = serde_json::from_value::<AdminUser>(unwrap_data(&updated)) {
            self.handle.update(|state| {
                if let Some(slot) = state.users.iter_mut().find(|held| held.id == id) {
                    *slot = user;
                }
            });
        }
        Ok(updated)
    }

    /// # Errors
    /// The service error, after recording it; local state is left as is.
    pub async fn delete_user(&self, id: ResourceId) -> ClientResult<()> {
        let _loading = self.handle.begin();
        self.service
            .delete_user(id)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to delete user")))?;
        self.handle.update(|state| remove_by_id(&mut state.users, &id));
        Ok(())
    }

    /// Replace the permissions of account `id`, then reload the user list.
    ///
    /// # Errors
    /// The service error, after recording it.
    pub async fn assign_roles_permissions(
        &self,
        id: ResourceId,
        permissions: &[String],
    ) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let response = self
            .service
            .assign_roles_permissions(id, permissions)
            .await
            .inspect_err(|err| {
                self.handle
                    .fail(err.message_or("Failed to assign roles and permissions"));
            })?;
        info!(user_id = id, granted = permissions.len(), "permissions updated");
        self.fetch_users(&[]).await;
        Ok(response)
    }
}
