use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::transaction::TransactionType;

/// Global spending/income category. Not user-owned and read-only from the
/// API's point of view; rows are seeded out of band.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    pub name: String,
    pub display_order: i32,
}
