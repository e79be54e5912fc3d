use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use common::error::Res;
use db::{Store, models::catalog::ProductWithPrices};
use tokio::sync::{Mutex, RwLock};

struct Snapshot {
    fetched_at: Instant,
    products: Arc<Vec<ProductWithPrices>>,
}

/// Products with their active prices, shared by every worker.
///
/// A snapshot older than `revalidate` is fetched again on the next read. When
/// that fetch fails the previous snapshot keeps being served.
pub struct CatalogCache {
    revalidate: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    refresh_gate: Mutex<()>,
}

impl CatalogCache {
    pub fn new(revalidate: Duration) -> Self {
        CatalogCache {
            revalidate,
            snapshot: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    pub async fn products(&self, store: &dyn Store) -> Res<Arc<Vec<ProductWithPrices>>> {
        if let Some(products) = self.fresh().await {
            return Ok(products);
        }

        // one refetch per interval; later callers find the new snapshot
        let _gate = self.refresh_gate.lock().await;
        if let Some(products) = self.fresh().await {
            return Ok(products);
        }
        let stale = self
            .snapshot
            .read()
            .await
            .as_ref()
            .map(|s| s.products.clone());

        match self.refresh(store).await {
            Ok(products) => Ok(products),
            Err(e) => match stale {
                Some(products) => {
                    log::warn!("Catalog refresh failed, serving previous snapshot: {}", e);
                    Ok(products)
                }
                None => Err(e),
            },
        }
    }

    async fn fresh(&self) -> Option<Arc<Vec<ProductWithPrices>>> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .as_ref()
            .filter(|s| s.fetched_at.elapsed() < self.revalidate)
            .map(|s| s.products.clone())
    }

    /// Fetches the catalog and replaces the snapshot.
    pub async fn refresh(&self, store: &dyn Store) -> Res<Arc<Vec<ProductWithPrices>>> {
        let products = Arc::new(store.active_products_with_prices().await?);
        *self.snapshot.write().await = Some(Snapshot {
            fetched_at: Instant::now(),
            products: products.clone(),
        });
        log::debug!("Catalog refreshed, {} products", products.len());
        Ok(products)
    }
}
