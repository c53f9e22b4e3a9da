use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role within a family group. Closed two-variant enum so every role check
/// is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "family_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum FamilyRole {
    Admin,
    Member,
}

/// Family group with exactly one admin. `admin_user_id` is unique across
/// groups: a user administers at most one group. There is no delete
/// operation for groups.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FamilyGroup {
    pub id: Uuid,
    pub name: String,
    pub admin_user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row. `(family_group_id, user_id)` is unique; the database
/// constraint is the authoritative guard against concurrent duplicate adds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FamilyMember {
    pub id: Uuid,
    pub family_group_id: Uuid,
    pub user_id: String,
    pub role: FamilyRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Group with its member list, as returned by the my-group endpoint.
/// `email` is filled best-effort from the identity directory.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyGroupDetail {
    #[serde(flatten)]
    pub group: FamilyGroup,
    pub members: Vec<FamilyMemberDetail>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FamilyMemberDetail {
    #[serde(flatten)]
    pub member: FamilyMember,
    pub email: Option<String>,
}
