use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub id: String,
    pub product_id: Option<String>,
    pub active: Option<bool>,
    pub currency: Option<String>,
    pub unit_amount: Option<i64>,
    /// `day`, `week`, `month` or `year`; empty for one-time prices.
    pub interval: Option<String>,
    pub interval_count: Option<i32>,
    pub trial_period_days: Option<i32>,
    pub price_type: Option<String>,
}

impl Price {
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductWithPrices {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    /// Active prices only, cheapest first.
    pub prices: Vec<Price>,
}

/// One row of the products/prices join; the price columns are empty for
/// products without any active price.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRow {
    pub product_id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price_id: Option<String>,
    pub currency: Option<String>,
    pub unit_amount: Option<i64>,
    pub interval: Option<String>,
    pub interval_count: Option<i32>,
    pub trial_period_days: Option<i32>,
    pub price_type: Option<String>,
}
