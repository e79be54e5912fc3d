use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub user_id: Uuid,
    pub status: String,
    pub price_id: Option<String>,
    pub quantity: Option<i32>,
    pub cancel_at_period_end: bool,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub price: Option<SubscribedPrice>,
}

/// The price a subscription points at, with the name of its product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscribedPrice {
    pub currency: Option<String>,
    pub unit_amount: Option<i64>,
    pub interval: Option<String>,
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub id: String,
    pub user_id: Uuid,
    pub status: Option<String>,
    pub price_id: Option<String>,
    pub quantity: Option<i32>,
    pub cancel_at_period_end: Option<bool>,
    pub current_period_start: DateTime<Utc>,
    pub current_period_end: DateTime<Utc>,
    pub currency: Option<String>,
    pub unit_amount: Option<i64>,
    pub interval: Option<String>,
    pub product_name: Option<String>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        let price = row.price_id.as_ref().map(|_| SubscribedPrice {
            currency: row.currency,
            unit_amount: row.unit_amount,
            interval: row.interval,
            product_name: row.product_name,
        });
        Subscription {
            id: row.id,
            user_id: row.user_id,
            status: row.status.unwrap_or_default(),
            price_id: row.price_id,
            quantity: row.quantity,
            cancel_at_period_end: row.cancel_at_period_end.unwrap_or(false),
            current_period_start: row.current_period_start,
            current_period_end: row.current_period_end,
            price,
        }
    }
}
