use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::subscription::{Subscription, SubscriptionRow};

/// Newest trialing or active subscription of the user, with its price and product.
pub async fn get_current_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, SubscriptionRow>(
        r#"
        SELECT s.id, s.user_id, s.status::text AS status, s.price_id, s.quantity,
               s.cancel_at_period_end, s.current_period_start, s.current_period_end,
               pr.currency, pr.unit_amount, pr.interval::text AS interval,
               p.name AS product_name
        FROM subscriptions s
        LEFT JOIN prices pr ON pr.id = s.price_id
        LEFT JOIN products p ON p.id = pr.product_id
        WHERE s.user_id = $1 AND s.status IN ('trialing', 'active')
        ORDER BY s.created DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map(|row| row.map(Subscription::from))
    .map_err(AppError::from)
}
