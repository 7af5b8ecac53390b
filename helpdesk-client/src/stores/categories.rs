//! Ticket categories.

use serde::Serialize;
use serde_json::Value;
use shared::models::{Category, ResourceId};

use super::{StoreHandle, StoreState, remove_by_id, tickets::unwrap_data};
use crate::{error::ClientResult, services::CategoryService};

/// Categories held locally.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryState {
    /// Last fetched list, with local edits merged.
    pub categories: Vec<Category>,
    /// An action of this store is in flight.
    pub loading: bool,
    /// Message of the last failed action.
    pub error: Option<String>,
}

impl StoreState for CategoryState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

/// Ticket categories.
#[derive(Clone, Debug)]
pub struct CategoryStore {
    service: CategoryService,
    handle: StoreHandle<CategoryState>,
}

impl CategoryStore {
    /// Empty store over `service`.
    #[must_use]
    pub fn new(service: CategoryService) -> Self {
        Self {
            service,
            handle: StoreHandle::new(),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CategoryState {
        self.handle.snapshot()
    }

    /// Failures are recorded, not returned.
    pub async fn fetch_categories(&self) {
        let _loading = self.handle.begin();
        match self.service.list(&[]).await {
            Ok(categories) => self.handle.update(|state| state.categories = categories),
            Err(err) => self.handle.fail(err.message_or("Failed to fetch categories")),
        }
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn create_category<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let created = self
            .service
            .create(body)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to create category")))?;
        if let Ok(category) = serde_json::from_value::<Category>(unwrap_data(&created)) {
            self.handle.update(|state| state.categories.push(category));
        }
        Ok(created)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn update_category<B: Serialize + ?Sized>(
        &self,
        id: ResourceId,
        body: &B,
    ) -> ClientResult<Value> {
        let _loading = self.handle.begin();
        let updated = self
            .service
            .update(&id, body)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to update category")))?;
        if let Ok(category) = serde_json::from_value::<Category>(unwrap_data(&updated)) {
            self.handle.update(|state| {
                if let Some(slot) = state.categories.iter_mut().find(|held| held.id == id) {
                    *slot = category;
                }
            });
        }
        Ok(updated)
    }

    /// # Errors
    /// The service error, after recording it.
    pub async fn delete_category(&self, id: ResourceId) -> ClientResult<()> {
        let _loading = self.handle.begin();
        self.service
            .delete(&id)
            .await
            .inspect_err(|err| self.handle.fail(err.message_or("Failed to delete category")))?;
        self.handle
            .update(|state| remove_by_id(&mut state.categories, &id));
        Ok(())
    }
}
