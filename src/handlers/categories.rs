use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::models::category::Category;
use crate::models::transaction::TransactionType;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// GET /api/categories?type= - Categories for one transaction type
pub async fn list_by_type(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> Json<Vec<Category>> {
    match state.categories().list_by_type(query.category_type).await {
        Ok(categories) => Json(categories),
        Err(e) => {
            tracing::error!("category listing degraded to empty: {}", e);
            Json(Vec::new())
        }
    }
}

/// GET /api/categories/all
pub async fn list_all(State(state): State<AppState>) -> Json<Vec<Category>> {
    match state.categories().list_all().await {
        Ok(categories) => Json(categories),
        Err(e) => {
            tracing::error!("category listing degraded to empty: {}", e);
            Json(Vec::new())
        }
    }
}
