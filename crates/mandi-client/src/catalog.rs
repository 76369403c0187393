//! # Catalog
//!
//! Read-only product browsing. None of these calls need a session.

use std::sync::Arc;

use mandi_core::validation::{validate_category, validate_page, validate_search_query};
use mandi_core::{Product, ProductId};
use tracing::debug;

use crate::api::StorefrontApi;
use crate::error::ClientResult;

/// Default page size for product listings.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct Catalog {
    api: Arc<dyn StorefrontApi>,
}

impl Catalog {
    pub fn new(api: Arc<dyn StorefrontApi>) -> Self {
        Catalog { api }
    }

    /// One page of the product listing.
    pub async fn list(&self, skip: i64, limit: i64) -> ClientResult<Vec<Product>> {
        validate_page(skip, limit)?;
        let products = self.api.products(skip, limit).await?;
        debug!(skip, limit, count = products.len(), "Listed products");
        Ok(products)
    }

    pub async fn get(&self, id: ProductId) -> ClientResult<Product> {
        self.api.product(id).await
    }

    pub async fn by_category(&self, category: &str) -> ClientResult<Vec<Product>> {
        let category = validate_category(category)?;
        self.api.products_by_category(&category).await
    }

    /// Full-text search. The query is trimmed and capped at 100 characters.
    pub async fn search(&self, query: &str) -> ClientResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        let products = self.api.search_products(&query).await?;
        debug!(query = %query, count = products.len(), "Searched products");
        Ok(products)
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}
