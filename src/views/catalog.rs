//! Catalog management for admins: document types and registry branches.
//!
//! Both screens behave the same way (list, create, update with PUT, delete,
//! reload after every change), so one [`Catalog`] drives either resource
//! through [`CatalogResource`].

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use std::marker::PhantomData;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Notice, ViewError};
use crate::error::ApiError;
use crate::net::api;
use crate::net::client::ApiClient;
use crate::net::types::{Branch, BranchInput, DocumentType, DocumentTypeInput};

pub const NAME_REQUIRED: &str = "Name is required.";

/// A managed backend collection and the wording of its failures.
#[async_trait]
pub trait CatalogResource: Send + Sync + 'static {
    type Item: Clone + Send + Sync;
    type Input: Send + Sync;

    const LOAD_FAILED: &'static str;
    const SAVE_FAILED: &'static str;
    const DELETE_FAILED: &'static str;

    fn name_of(input: &Self::Input) -> &str;

    async fn list(api: &ApiClient) -> Result<Vec<Self::Item>, ApiError>;
    async fn create(api: &ApiClient, input: &Self::Input) -> Result<Self::Item, ApiError>;
    async fn update(api: &ApiClient, id: &str, input: &Self::Input) -> Result<Self::Item, ApiError>;
    async fn delete(api: &ApiClient, id: &str) -> Result<(), ApiError>;
}

pub struct DocumentTypes;

#[async_trait]
impl CatalogResource for DocumentTypes {
    type Item = DocumentType;
    type Input = DocumentTypeInput;

    const LOAD_FAILED: &'static str = "Failed to load document types";
    const SAVE_FAILED: &'static str = "Failed to save document type";
    const DELETE_FAILED: &'static str = "Failed to delete document type";

    fn name_of(input: &Self::Input) -> &str {
        &input.name
    }

    async fn list(api: &ApiClient) -> Result<Vec<Self::Item>, ApiError> {
        api::list_document_types(api).await
    }

    async fn create(api: &ApiClient, input: &Self::Input) -> Result<Self::Item, ApiError> {
        api::create_document_type(api, input).await
    }

    async fn update(api: &ApiClient, id: &str, input: &Self::Input) -> Result<Self::Item, ApiError> {
        api::update_document_type(api, id, input).await
    }

    async fn delete(api: &ApiClient, id: &str) -> Result<(), ApiError> {
        api::delete_document_type(api, id).await
    }
}

pub struct Branches;

#[async_trait]
impl CatalogResource for Branches {
    type Item = Branch;
    type Input = BranchInput;

    const LOAD_FAILED: &'static str = "Failed to load branches";
    const SAVE_FAILED: &'static str = "Failed to save branch";
    const DELETE_FAILED: &'static str = "Failed to delete branch";

    fn name_of(input: &Self::Input) -> &str {
        &input.name
    }

    async fn list(api: &ApiClient) -> Result<Vec<Self::Item>, ApiError> {
        api::list_branches(api).await
    }

    async fn create(api: &ApiClient, input: &Self::Input) -> Result<Self::Item, ApiError> {
        api::create_branch(api, input).await
    }

    async fn update(api: &ApiClient, id: &str, input: &Self::Input) -> Result<Self::Item, ApiError> {
        api::update_branch(api, id, input).await
    }

    async fn delete(api: &ApiClient, id: &str) -> Result<(), ApiError> {
        api::delete_branch(api, id).await
    }
}

pub struct Catalog<R: CatalogResource> {
    api: ApiClient,
    items: Vec<R::Item>,
    pub notice: Notice,
    _resource: PhantomData<R>,
}

pub type DocumentTypeCatalog = Catalog<DocumentTypes>;
pub type BranchCatalog = Catalog<Branches>;

impl<R: CatalogResource> Catalog<R> {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, items: Vec::new(), notice: Notice::default(), _resource: PhantomData }
    }

    #[must_use]
    pub fn items(&self) -> &[R::Item] {
        &self.items
    }

    /// # Errors
    ///
    /// [`ViewError::Failed`] with the resource's load message.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        match R::list(&self.api).await {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => Err(self.notice.fail(ViewError::failed(R::LOAD_FAILED, e))),
        }
    }

    /// Create (`id == None`) or replace an entry, then reload. A failed
    /// reload leaves the load message in the notice but still returns the
    /// saved entry.
    ///
    /// # Errors
    ///
    /// [`ViewError::Invalid`] for a blank name; [`ViewError::Failed`] with
    /// the resource's save message.
    pub async fn save(&mut self, id: Option<&str>, input: &R::Input) -> Result<R::Item, ViewError> {
        if R::name_of(input).trim().is_empty() {
            return Err(self.notice.fail(ViewError::invalid(NAME_REQUIRED)));
        }
        let saved = match id {
            Some(id) => R::update(&self.api, id, input).await,
            None => R::create(&self.api, input).await,
        };
        let item = match saved {
            Ok(item) => item,
            Err(e) => return Err(self.notice.fail(ViewError::failed(R::SAVE_FAILED, e))),
        };
        info!(name = R::name_of(input), updated = id.is_some(), "catalog entry saved");
        self.notice.clear();
        self.reload_after_change().await;
        Ok(item)
    }

    /// Delete an entry, then reload. A failed reload does not undo the
    /// delete's success.
    ///
    /// # Errors
    ///
    /// [`ViewError::Failed`] with the resource's delete message.
    pub async fn delete(&mut self, id: &str) -> Result<(), ViewError> {
        if let Err(e) = R::delete(&self.api, id).await {
            return Err(self.notice.fail(ViewError::failed(R::DELETE_FAILED, e)));
        }
        info!(id, "catalog entry deleted");
        self.notice.clear();
        self.reload_after_change().await;
        Ok(())
    }

    async fn reload_after_change(&mut self) {
        if let Err(e) = self.load().await {
            warn!(error = %e, "catalog not refreshed after change");
        }
    }
}
