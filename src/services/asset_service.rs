use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::asset::{Asset, AssetType};
use crate::services::family_service::FamilyService;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewAsset {
    pub asset_type: AssetType,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct AssetChanges {
    pub asset_type: Option<AssetType>,
    pub name: Option<String>,
    pub amount: Option<Decimal>,
}

const ASSET_COLUMNS: &str = "id, user_id, type, name, amount, created_at, updated_at";

/// Asset reads are scoped to the requester's family visibility set; writes
/// are scoped to the owner alone. A co-member can see an asset it can never
/// touch, and a write against someone else's asset reads as absent.
#[derive(Clone)]
pub struct AssetService {
    pool: PgPool,
    family: FamilyService,
}

impl AssetService {
    pub fn new(pool: PgPool, family: FamilyService) -> Self {
        Self { pool, family }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Asset>, AssetError> {
        let visible = self.family.visible_user_ids(user_id).await?;

        let assets = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets \
             WHERE user_id = ANY($1) ORDER BY created_at DESC"
        ))
        .bind(&visible)
        .fetch_all(&self.pool)
        .await?;

        Ok(assets)
    }

    pub async fn get(&self, asset_id: Uuid, user_id: &str) -> Result<Asset, AssetError> {
        let visible = self.family.visible_user_ids(user_id).await?;

        sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND user_id = ANY($2)"
        ))
        .bind(asset_id)
        .bind(&visible)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AssetError::NotFound)
    }

    pub async fn create(&self, user_id: &str, data: NewAsset) -> Result<Asset, AssetError> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "INSERT INTO assets (user_id, type, name, amount) VALUES ($1, $2, $3, $4) \
             RETURNING {ASSET_COLUMNS}"
        ))
        .bind(user_id)
        .bind(data.asset_type)
        .bind(&data.name)
        .bind(data.amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(asset)
    }

    /// Owner-only. The fetch is scoped to `user_id`, never the visibility
    /// set, so a co-member's asset reads as absent.
    pub async fn update(
        &self,
        asset_id: Uuid,
        user_id: &str,
        changes: AssetChanges,
    ) -> Result<Asset, AssetError> {
        let current = self.get_owned(asset_id, user_id).await?;

        let asset_type = changes.asset_type.unwrap_or(current.asset_type);
        let name = changes.name.unwrap_or(current.name);
        let amount = changes.amount.unwrap_or(current.amount);

        let asset = sqlx::query_as::<_, Asset>(&format!(
            "UPDATE assets SET type = $1, name = $2, amount = $3, updated_at = now() \
             WHERE id = $4 AND user_id = $5 RETURNING {ASSET_COLUMNS}"
        ))
        .bind(asset_type)
        .bind(&name)
        .bind(amount)
        .bind(asset_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AssetError::NotFound)?;

        Ok(asset)
    }

    /// Owner-only, same scoping as `update`
    pub async fn delete(&self, asset_id: Uuid, user_id: &str) -> Result<(), AssetError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1 AND user_id = $2")
            .bind(asset_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AssetError::NotFound);
        }
        Ok(())
    }

    /// Sum of CASH amounts over the requester's visibility set
    pub async fn total_cash(&self, user_id: &str) -> Result<Decimal, AssetError> {
        self.total_of_type(user_id, AssetType::Cash).await
    }

    /// Sum of LOAN amounts over the requester's visibility set
    pub async fn total_loans(&self, user_id: &str) -> Result<Decimal, AssetError> {
        self.total_of_type(user_id, AssetType::Loan).await
    }

    async fn total_of_type(
        &self,
        user_id: &str,
        asset_type: AssetType,
    ) -> Result<Decimal, AssetError> {
        let visible = self.family.visible_user_ids(user_id).await?;

        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM assets WHERE user_id = ANY($1) AND type = $2",
        )
        .bind(&visible)
        .bind(asset_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn get_owned(&self, asset_id: Uuid, user_id: &str) -> Result<Asset, AssetError> {
        sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND user_id = $2"
        ))
        .bind(asset_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AssetError::NotFound)
    }
}
