use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::family::{FamilyGroupDetail, FamilyRole};

use super::validate_name;

#[derive(Debug, Deserialize)]
pub struct CreateFamilyGroupRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub email: String,
    pub role: Option<FamilyRole>,
}

/// POST /api/family/groups - Create a group with the requester as admin
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateFamilyGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name("name", &payload.name)?;

    let group = state
        .families()
        .create_group(&user.user_id, payload.name.trim())
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /api/family/groups/my - The requester's group with its member list
pub async fn my_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FamilyGroupDetail>, ApiError> {
    let detail = state
        .families()
        .group_detail_for(&user.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Family group not found"))?;

    Ok(Json(detail))
}

/// POST /api/family/groups/:group_id/members - Admin-only member addition
pub async fn add_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email)?;
    let role = payload.role.unwrap_or(FamilyRole::Member);

    let member = state
        .families()
        .add_member(&user.user_id, group_id, payload.email.trim(), role)
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// DELETE /api/family/groups/:group_id/members/:member_user_id - Admin-only
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((group_id, member_user_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .families()
        .remove_member(&user.user_id, group_id, &member_user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        let mut field_errors = HashMap::new();
        field_errors.insert("email".to_string(), "Must be an email address".to_string());
        return Err(ApiError::validation_error(
            "Invalid request",
            Some(field_errors),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plausible_emails_pass() {
        assert!(validate_email("kim@example.com").is_ok());
        assert!(validate_email("  kim@example.com  ").is_ok());
    }

    #[test]
    fn junk_emails_fail() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
    }
}
