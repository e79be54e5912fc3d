use std::sync::Arc;

use async_trait::async_trait;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    catalog::{Price, ProductWithPrices},
    subscription::Subscription,
};

/// Read access to the billing tables plus the customer mapping the storefront owns.
#[async_trait]
pub trait Store: Send + Sync {
    async fn active_products_with_prices(&self) -> Res<Vec<ProductWithPrices>>;
    async fn price(&self, price_id: &str) -> Res<Option<Price>>;
    async fn current_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>>;
    async fn stripe_customer_id(&self, user_id: Uuid) -> Res<Option<String>>;
    async fn save_stripe_customer_id(&self, user_id: Uuid, customer_id: &str) -> Res<()>;
}

pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn active_products_with_prices(&self) -> Res<Vec<ProductWithPrices>> {
        crate::catalog::get_active_products_with_prices(&*self.pool).await
    }

    async fn price(&self, price_id: &str) -> Res<Option<Price>> {
        crate::catalog::get_price_by_id(&*self.pool, price_id).await
    }

    async fn current_subscription(&self, user_id: Uuid) -> Res<Option<Subscription>> {
        crate::subscription::get_current_subscription(&*self.pool, user_id).await
    }

    async fn stripe_customer_id(&self, user_id: Uuid) -> Res<Option<String>> {
        crate::customer::get_stripe_customer_id(&*self.pool, user_id).await
    }

    async fn save_stripe_customer_id(&self, user_id: Uuid, customer_id: &str) -> Res<()> {
        crate::customer::upsert_stripe_customer_id(&*self.pool, user_id, customer_id).await
    }
}
