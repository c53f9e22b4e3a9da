use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::family::{
    FamilyGroup, FamilyGroupDetail, FamilyMember, FamilyMemberDetail, FamilyRole,
};
use crate::services::directory::{DirectoryError, IdentityDirectory};

#[derive(Debug, Error)]
pub enum FamilyError {
    #[error("You already administer a family group")]
    AlreadyAdmin,

    #[error("Family group not found")]
    GroupNotFound,

    #[error("Only the group admin may manage members")]
    NotAdmin,

    #[error("User is already a member of this family group")]
    AlreadyMember,

    #[error("The group admin cannot be removed")]
    AdminNotRemovable,

    #[error("Family member not found")]
    MemberNotFound,

    #[error("No account found for email {0}")]
    UnknownEmail(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const GROUP_COLUMNS: &str = "id, name, admin_user_id, created_at, updated_at";
const MEMBER_COLUMNS: &str = "id, family_group_id, user_id, role, created_at, updated_at";

/// Family group lifecycle and the membership-based visibility resolver.
///
/// A user relates to at most one group at a time: `admin_user_id` is unique
/// across groups and `(family_group_id, user_id)` is unique across members,
/// both enforced by database constraints as the authoritative guard.
pub struct FamilyService {
    pool: PgPool,
    directory: Arc<dyn IdentityDirectory>,
}

impl Clone for FamilyService {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl FamilyService {
    pub fn new(pool: PgPool, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self { pool, directory }
    }

    /// The set of user ids whose records `user_id` may read: the member ids
    /// of the user's group, or just the user when ungrouped. Always contains
    /// `user_id` itself. Read-only; safe to call repeatedly in one request.
    pub async fn visible_user_ids(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
        let group = self.group_for(user_id).await?;

        let Some(group) = group else {
            return Ok(vec![user_id.to_string()]);
        };

        let ids: Vec<String> =
            sqlx::query_scalar("SELECT user_id FROM family_members WHERE family_group_id = $1")
                .bind(group.id)
                .fetch_all(&self.pool)
                .await?;

        if ids.is_empty() {
            return Ok(vec![user_id.to_string()]);
        }
        Ok(ids)
    }

    /// Group where the user is admin, else where the user is a member, else
    /// none. Admin-first precedence keeps resolution unambiguous.
    pub async fn group_for(&self, user_id: &str) -> Result<Option<FamilyGroup>, sqlx::Error> {
        if let Some(group) = self.group_by_admin(user_id).await? {
            return Ok(Some(group));
        }
        self.group_by_membership(user_id).await
    }

    async fn group_by_admin(&self, user_id: &str) -> Result<Option<FamilyGroup>, sqlx::Error> {
        sqlx::query_as::<_, FamilyGroup>(&format!(
            "SELECT {GROUP_COLUMNS} FROM family_groups WHERE admin_user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn group_by_membership(&self, user_id: &str) -> Result<Option<FamilyGroup>, sqlx::Error> {
        sqlx::query_as::<_, FamilyGroup>(
            "SELECT g.id, g.name, g.admin_user_id, g.created_at, g.updated_at \
             FROM family_groups g \
             JOIN family_members m ON m.family_group_id = g.id \
             WHERE m.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn members_of(&self, group_id: Uuid) -> Result<Vec<FamilyMember>, sqlx::Error> {
        sqlx::query_as::<_, FamilyMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM family_members \
             WHERE family_group_id = $1 ORDER BY created_at"
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Create a group with the requester as its ADMIN member. The group row
    /// and the admin membership land in one transaction; neither may exist
    /// without the other.
    pub async fn create_group(
        &self,
        admin_user_id: &str,
        name: &str,
    ) -> Result<FamilyGroup, FamilyError> {
        if self.group_by_admin(admin_user_id).await?.is_some() {
            return Err(FamilyError::AlreadyAdmin);
        }

        let mut tx = self.pool.begin().await?;

        let group = sqlx::query_as::<_, FamilyGroup>(&format!(
            "INSERT INTO family_groups (name, admin_user_id) VALUES ($1, $2) \
             RETURNING {GROUP_COLUMNS}"
        ))
        .bind(name)
        .bind(admin_user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                FamilyError::AlreadyAdmin
            } else {
                e.into()
            }
        })?;

        sqlx::query("INSERT INTO family_members (family_group_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(group.id)
            .bind(admin_user_id)
            .bind(FamilyRole::Admin)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(group)
    }

    /// Admin-only: resolve `email` through the identity directory and add the
    /// resulting user to the group.
    pub async fn add_member(
        &self,
        requester_user_id: &str,
        group_id: Uuid,
        email: &str,
        role: FamilyRole,
    ) -> Result<FamilyMember, FamilyError> {
        let group = self
            .group_by_id(group_id)
            .await?
            .ok_or(FamilyError::GroupNotFound)?;
        ensure_admin(&group, requester_user_id)?;

        let target_user_id = self
            .directory
            .resolve_user_id_by_email(email)
            .await?
            .ok_or_else(|| FamilyError::UnknownEmail(email.to_string()))?;

        if self.membership(group_id, &target_user_id).await?.is_some() {
            return Err(FamilyError::AlreadyMember);
        }

        // The target may never have hit this service; the shadow user row
        // and the membership land in one transaction so a conflict rolls
        // both back.
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(&target_user_id)
            .execute(&mut *tx)
            .await?;

        // The unique constraint on (family_group_id, user_id) settles any
        // race the pre-check above missed.
        let member = sqlx::query_as::<_, FamilyMember>(&format!(
            "INSERT INTO family_members (family_group_id, user_id, role) VALUES ($1, $2, $3) \
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(group_id)
        .bind(&target_user_id)
        .bind(role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                FamilyError::AlreadyMember
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(member)
    }

    /// Admin-only: remove a non-admin member. The admin membership can never
    /// be removed, not even by the admin themself.
    pub async fn remove_member(
        &self,
        requester_user_id: &str,
        group_id: Uuid,
        target_user_id: &str,
    ) -> Result<(), FamilyError> {
        let group = self
            .group_by_id(group_id)
            .await?
            .ok_or(FamilyError::GroupNotFound)?;
        ensure_admin(&group, requester_user_id)?;
        ensure_removable(&group, target_user_id)?;

        let result =
            sqlx::query("DELETE FROM family_members WHERE family_group_id = $1 AND user_id = $2")
                .bind(group_id)
                .bind(target_user_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(FamilyError::MemberNotFound);
        }
        Ok(())
    }

    /// Group for the user with its member list, emails attached best-effort
    /// from the directory (lookup failures degrade to absent emails).
    pub async fn group_detail_for(
        &self,
        user_id: &str,
    ) -> Result<Option<FamilyGroupDetail>, FamilyError> {
        let Some(group) = self.group_for(user_id).await? else {
            return Ok(None);
        };
        let members = self.members_of(group.id).await?;

        let mut details = Vec::with_capacity(members.len());
        for member in members {
            let email = match self.directory.email_for_user_id(&member.user_id).await {
                Ok(email) => email,
                Err(e) => {
                    tracing::debug!("email lookup failed for {}: {}", member.user_id, e);
                    None
                }
            };
            details.push(FamilyMemberDetail { member, email });
        }

        Ok(Some(FamilyGroupDetail {
            group,
            members: details,
        }))
    }

    async fn group_by_id(&self, group_id: Uuid) -> Result<Option<FamilyGroup>, sqlx::Error> {
        sqlx::query_as::<_, FamilyGroup>(&format!(
            "SELECT {GROUP_COLUMNS} FROM family_groups WHERE id = $1"
        ))
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn membership(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> Result<Option<FamilyMember>, sqlx::Error> {
        sqlx::query_as::<_, FamilyMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM family_members \
             WHERE family_group_id = $1 AND user_id = $2"
        ))
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}

fn ensure_admin(group: &FamilyGroup, user_id: &str) -> Result<(), FamilyError> {
    if group.admin_user_id != user_id {
        return Err(FamilyError::NotAdmin);
    }
    Ok(())
}

fn ensure_removable(group: &FamilyGroup, target_user_id: &str) -> Result<(), FamilyError> {
    if group.admin_user_id == target_user_id {
        return Err(FamilyError::AdminNotRemovable);
    }
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        db.is_unique_violation()
    } else {
        false
    }
}
