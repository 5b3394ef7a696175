//! Product list controller.
//!
//! Keeps a cached copy of the catalogue for the current filters. The cache is
//! never patched: every successful mutation is followed by a full reload and
//! the new list replaces the old one in a single swap.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use afiliado_core::messages;
use afiliado_core::models::product::{Product, ProductDraft, ProductFilters, ProductList};
use afiliado_core::notify::Notifier;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::endpoints;
use crate::http::ApiClient;
use crate::inflight::{InFlightGuard, InFlightTicket};

/// Product operation errors.
#[derive(Debug, Error)]
pub enum ProductsError {
    #[error("The backend did not accept the request")]
    Rejected,

    #[error("The same operation is already running: {0}")]
    Busy(String),
}

/// Counts a refetch as outstanding for as long as it lives.
struct LoadingTicket<'a>(&'a AtomicUsize);

impl<'a> LoadingTicket<'a> {
    fn start(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for LoadingTicket<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller for the admin product table.
pub struct ProductsController {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    products: RwLock<Arc<Vec<Product>>>,
    filters: RwLock<ProductFilters>,
    pending_fetches: AtomicUsize,
    fetch_seq: AtomicU64,
    in_flight: InFlightGuard,
}

impl ProductsController {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            products: RwLock::new(Arc::new(Vec::new())),
            filters: RwLock::new(ProductFilters::default()),
            pending_fetches: AtomicUsize::new(0),
            fetch_seq: AtomicU64::new(0),
            in_flight: InFlightGuard::new(),
        }
    }

    /// Snapshot of the cached collection, in server order.
    pub fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.products.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn filters(&self) -> ProductFilters {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while any refetch is outstanding.
    pub fn loading(&self) -> bool {
        self.pending_fetches.load(Ordering::SeqCst) > 0
    }

    /// Reloads the collection for the current filters.
    ///
    /// Returns `true` if the collection was replaced. A failed or
    /// unrecognised response leaves it as it was, and so does a response
    /// that arrives after a newer refetch has started.
    pub async fn refetch(&self) -> bool {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingTicket::start(&self.pending_fetches);

        let path = endpoints::products_query(&self.filters().to_query());
        let Some(list) = self.client.get::<ProductList>(&path).await else {
            return false;
        };
        let products = list.into_products();

        let mut current = self.products.write().unwrap_or_else(PoisonError::into_inner);
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding product list superseded by a newer fetch");
            return false;
        }
        info!(count = products.len(), %path, "product list refreshed");
        *current = Arc::new(products);
        true
    }

    /// Replaces the filter set. A change triggers exactly one refetch; an
    /// identical filter set is not a change and fetches nothing.
    ///
    /// Returns `true` if the collection was replaced.
    pub async fn set_filters(&self, filters: ProductFilters) -> bool {
        {
            let mut current = self.filters.write().unwrap_or_else(PoisonError::into_inner);
            if *current == filters {
                return false;
            }
            *current = filters;
        }
        self.refetch().await
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<(), ProductsError> {
        let _ticket = self.claim("create".to_string())?;
        let created: Option<Value> = self.client.post(endpoints::PRODUCTS, draft).await;
        self.finish(
            created.is_some(),
            messages::PRODUCT_CREATED,
            messages::PRODUCT_CREATE_FAILED,
        )
        .await
    }

    pub async fn update(&self, id: i64, draft: &ProductDraft) -> Result<(), ProductsError> {
        let _ticket = self.claim(format!("update:{id}"))?;
        let updated: Option<Value> = self.client.put(&endpoints::product(id), draft).await;
        self.finish(
            updated.is_some(),
            messages::PRODUCT_UPDATED,
            messages::PRODUCT_UPDATE_FAILED,
        )
        .await
    }

    /// Deletes a product. Confirming with the user is the caller's job.
    pub async fn delete(&self, id: i64) -> Result<(), ProductsError> {
        let _ticket = self.claim(format!("delete:{id}"))?;
        let deleted: Option<Value> = self.client.delete(&endpoints::product(id)).await;
        self.finish(
            deleted.is_some(),
            messages::PRODUCT_DELETED,
            messages::PRODUCT_DELETE_FAILED,
        )
        .await
    }

    fn claim(&self, op: String) -> Result<InFlightTicket, ProductsError> {
        let key = format!("products:{op}");
        self.in_flight.try_acquire(key.clone()).ok_or_else(|| {
            debug!(%key, "rejecting duplicate product operation");
            ProductsError::Busy(key)
        })
    }

    async fn finish(
        &self,
        accepted: bool,
        success: &str,
        failure: &str,
    ) -> Result<(), ProductsError> {
        if !accepted {
            self.notifier.error(failure);
            return Err(ProductsError::Rejected);
        }
        self.notifier.success(success);
        self.refetch().await;
        Ok(())
    }
}
