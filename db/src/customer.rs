use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

pub async fn get_stripe_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT stripe_customer_id FROM customers WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

pub async fn upsert_stripe_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    stripe_customer_id: &str,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO customers (id, stripe_customer_id)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET stripe_customer_id = EXCLUDED.stripe_customer_id
        "#,
    )
    .bind(user_id)
    .bind(stripe_customer_id)
    .execute(executor)
    .await?;
    Ok(())
}
