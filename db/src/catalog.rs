use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::models::catalog::{CatalogRow, Price, ProductWithPrices};

/// Active products with their active prices, ordered by the `index` key of the
/// product metadata and by price amount.
pub async fn get_active_products_with_prices<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<ProductWithPrices>> {
    let rows = sqlx::query_as::<_, CatalogRow>(
        r#"
        SELECT p.id AS product_id, p.name, p.description, p.image,
               pr.id AS price_id, pr.currency, pr.unit_amount,
               pr.interval::text AS interval, pr.interval_count,
               pr.trial_period_days, pr.type::text AS price_type
        FROM products p
        LEFT JOIN prices pr ON pr.product_id = p.id AND pr.active
        WHERE p.active
        ORDER BY p.metadata->'index', p.id, pr.unit_amount
        "#,
    )
    .fetch_all(executor)
    .await
    .map_err(AppError::from)?;

    Ok(group_rows(rows))
}

pub async fn get_price_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    price_id: &str,
) -> Res<Option<Price>> {
    sqlx::query_as::<_, Price>(
        r#"
        SELECT id, product_id, active, currency, unit_amount,
               interval::text AS interval, interval_count,
               trial_period_days, type::text AS price_type
        FROM prices
        WHERE id = $1
        "#,
    )
    .bind(price_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Folds the flat join rows (sorted by product) into nested products.
pub(crate) fn group_rows(rows: Vec<CatalogRow>) -> Vec<ProductWithPrices> {
    let mut products: Vec<ProductWithPrices> = Vec::new();
    for row in rows {
        let is_same = products.last().is_some_and(|p| p.id == row.product_id);
        if !is_same {
            products.push(ProductWithPrices {
                id: row.product_id.clone(),
                name: row.name.clone(),
                description: row.description.clone(),
                image: row.image.clone(),
                prices: Vec::new(),
            });
        }
        if let (Some(price_id), Some(product)) = (row.price_id, products.last_mut()) {
            product.prices.push(Price {
                id: price_id,
                product_id: Some(row.product_id),
                active: Some(true),
                currency: row.currency,
                unit_amount: row.unit_amount,
                interval: row.interval,
                interval_count: row.interval_count,
                trial_period_days: row.trial_period_days,
                price_type: row.price_type,
            });
        }
    }
    products
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(product: &str, price: Option<&str>, amount: i64) -> CatalogRow {
        CatalogRow {
            product_id: product.to_string(),
            name: Some(format!("{} plan", product)),
            description: None,
            image: None,
            price_id: price.map(str::to_string),
            currency: price.map(|_| "usd".to_string()),
            unit_amount: price.map(|_| amount),
            interval: price.map(|_| "month".to_string()),
            interval_count: Some(1),
            trial_period_days: None,
            price_type: Some("recurring".to_string()),
        }
    }

    #[test]
    fn nests_prices_under_their_product_in_order() {
        let products = group_rows(vec![
            row("prod_basic", Some("price_a"), 500),
            row("prod_basic", Some("price_b"), 900),
            row("prod_pro", Some("price_c"), 2000),
        ]);

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "prod_basic");
        let ids: Vec<_> = products[0].prices.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["price_a", "price_b"]);
        assert_eq!(products[1].prices[0].unit_amount, Some(2000));
    }

    #[test]
    fn keeps_products_without_active_prices() {
        let products = group_rows(vec![row("prod_legacy", None, 0)]);
        assert_eq!(products.len(), 1);
        assert!(products[0].prices.is_empty());
    }
}
