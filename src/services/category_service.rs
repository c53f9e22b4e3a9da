use sqlx::PgPool;

use crate::models::category::Category;
use crate::models::transaction::TransactionType;

/// Read-only access to the global category table
#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_type(
        &self,
        category_type: TransactionType,
    ) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, type, name, display_order FROM categories \
             WHERE type = $1 ORDER BY display_order, name",
        )
        .bind(category_type)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn list_all(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, type, name, display_order FROM categories \
             ORDER BY type, display_order, name",
        )
        .fetch_all(&self.pool)
        .await
    }
}
