use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::services::calculation_service::{resolve_period, Monthly, Summary};

#[derive(Debug, Deserialize, Default)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/calculations/summary - Family-scoped asset totals
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<Summary> {
    match state.calculations().summary(&user.user_id).await {
        Ok(summary) => Json(summary),
        Err(e) => {
            // Availability over consistency: zeroed body instead of a 503
            tracing::error!("summary degraded to zeroes: {}", e);
            Json(Summary::zero())
        }
    }
}

/// GET /api/calculations/monthly - Owner-scoped income/expense for one month
pub async fn monthly(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<MonthlyQuery>,
) -> Result<Json<Monthly>, ApiError> {
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            let mut field_errors = HashMap::new();
            field_errors.insert(
                "month".to_string(),
                "Must be between 1 and 12".to_string(),
            );
            return Err(ApiError::validation_error(
                "Invalid request",
                Some(field_errors),
            ));
        }
    }

    match state
        .calculations()
        .monthly(&user.user_id, query.year, query.month)
        .await
    {
        Ok(monthly) => Ok(Json(monthly)),
        Err(e) => {
            tracing::error!("monthly summary degraded to zeroes: {}", e);
            let (year, month) = resolve_period(query.year, query.month);
            Ok(Json(Monthly::zero(year, month)))
        }
    }
}
