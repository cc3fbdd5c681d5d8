use sea_orm::DatabaseConnection;

use crate::store;

pub async fn init_metrics(db: &DatabaseConnection) {
    // Dataset sizes. A failing count leaves the gauge at zero rather than blocking startup.
    let product_count = store::products::count_all(db).await.unwrap_or(0);
    metrics::gauge!("cosmetics_products_total").set(product_count as f64);

    let company_count = store::companies::count_all(db).await.unwrap_or(0);
    metrics::gauge!("cosmetics_companies_total").set(company_count as f64);

    let ingredient_count = store::ingredients::count_all(db).await.unwrap_or(0);
    metrics::gauge!("cosmetics_ingredients_total").set(ingredient_count as f64);

    tracing::info!(
        "Initialized metrics: Products={}, Companies={}, Ingredients={}",
        product_count,
        company_count,
        ingredient_count
    );
}

pub fn record_rate_limited(group: &'static str) {
    metrics::counter!("cosmetics_rate_limited_total", "group" => group).increment(1);
}

pub fn record_search(results: usize) {
    metrics::counter!("cosmetics_searches_total").increment(1);
    if results == 0 {
        metrics::counter!("cosmetics_searches_empty_total").increment(1);
    }
}
