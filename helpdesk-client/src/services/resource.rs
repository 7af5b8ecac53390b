//! Generic CRUD over one REST collection.

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use shared::models::{Category, ItemPayload, ListPayload, Resource, User};
use std::{fmt::Display, marker::PhantomData};

use super::Gateway;
use crate::{error::ClientResult, http::RequestOptions};

/// Generic CRUD over `/api/{resource}`.
#[derive(Debug)]
pub struct ResourceService<T> {
    gateway: Gateway,
    resource: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            resource: self.resource,
            _record: PhantomData,
        }
    }
}

/// `/api/categories`
pub type CategoryService = ResourceService<Category>;

/// `/api/users`
pub type UserService = ResourceService<User>;

impl<T> ResourceService<T>
where
    T: Resource + DeserializeOwned,
{
    /// Service for `/api/{resource}`.
    #[must_use]
    pub fn new(gateway: Gateway, resource: &'static str) -> Self {
        Self {
            gateway,
            resource,
            _record: PhantomData,
        }
    }

    /// Transport used by this service.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// `api/{resource}`
    #[must_use]
    pub fn collection_path(&self) -> String {
        format!("api/{}", self.resource)
    }

    /// `api/{resource}/{id}`
    #[must_use]
    pub fn item_path(&self, id: impl Display) -> String {
        format!("api/{}/{id}", self.resource)
    }

    /// # Errors
    /// Transport, status or decode failures.
    pub async fn list(&self, params: &[(String, String)]) -> ClientResult<Vec<T>> {
        let options = RequestOptions::new().query(params.iter().cloned());
        let payload: ListPayload<T> = self
            .gateway
            .fetch(&format!("list {}", self.resource), &self.collection_path(), options)
            .await?;
        Ok(payload.into_vec())
    }

    /// # Errors
    /// Transport, status or decode failures.
    pub async fn get(&self, id: &T::Id) -> ClientResult<T> {
        let payload: ItemPayload<T> = self
            .gateway
            .fetch(
                &format!("get {} {id}", self.resource),
                &self.item_path(id),
                RequestOptions::new(),
            )
            .await?;
        Ok(payload.into_inner())
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> ClientResult<Value> {
        self.gateway
            .mutate(
                &format!("create {}", self.resource),
                Method::POST,
                &self.collection_path(),
                RequestOptions::new().json(body)?,
            )
            .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: &T::Id,
        body: &B,
    ) -> ClientResult<Value> {
        self.gateway
            .mutate(
                &format!("update {} {id}", self.resource),
                Method::PUT,
                &self.item_path(id),
                RequestOptions::new().json(body)?,
            )
            .await
    }

    /// # Errors
    /// Priming, transport or status failures.
    pub async fn delete(&self, id: &T::Id) -> ClientResult<Value> {
        self.gateway
            .mutate(
                &format!("delete {} {id}", self.resource),
                Method::DELETE,
                &self.item_path(id),
                RequestOptions::new(),
            )
            .await
    }
}
