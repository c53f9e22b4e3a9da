use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::models::category::Category;
use crate::models::transaction::{Transaction, TransactionType, TransactionWithCategory};

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Transaction not found")]
    NotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Month out of range")]
    InvalidMonth,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub category_id: Uuid,
    pub date: NaiveDate,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const TX_COLUMNS: &str = "id, user_id, type, amount, category_id, date, memo, created_at, updated_at";

const TX_JOINED_SELECT: &str = "SELECT t.id, t.user_id, t.type, t.amount, t.category_id, t.date, \
     t.memo, t.created_at, t.updated_at, \
     c.name AS category_name, c.type AS category_type, c.display_order AS category_display_order \
     FROM transactions t JOIN categories c ON c.id = t.category_id";

/// Joined row: transaction columns plus its category, flattened
#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: String,
    #[sqlx(rename = "type")]
    transaction_type: TransactionType,
    amount: Decimal,
    category_id: Uuid,
    date: NaiveDate,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
    category_type: TransactionType,
    category_display_order: i32,
}

impl TransactionRow {
    fn into_with_category(self) -> TransactionWithCategory {
        TransactionWithCategory {
            category: Category {
                id: self.category_id,
                category_type: self.category_type,
                name: self.category_name,
                display_order: self.category_display_order,
            },
            transaction: Transaction {
                id: self.id,
                user_id: self.user_id,
                transaction_type: self.transaction_type,
                amount: self.amount,
                category_id: self.category_id,
                date: self.date,
                memo: self.memo,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }
}

/// Transactions are owner-scoped on every path, reads included. Unlike
/// assets there is no family-wide transaction sharing.
#[derive(Clone)]
pub struct TransactionService {
    pool: PgPool,
}

impl TransactionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionWithCategory>, TransactionError> {
        let mut qb: sqlx::QueryBuilder<sqlx::Postgres> = sqlx::QueryBuilder::new(TX_JOINED_SELECT);
        qb.push(" WHERE t.user_id = ");
        qb.push_bind(user_id);

        if let Some(transaction_type) = filter.transaction_type {
            qb.push(" AND t.type = ");
            qb.push_bind(transaction_type);
        }
        if let Some(start_date) = filter.start_date {
            qb.push(" AND t.date >= ");
            qb.push_bind(start_date);
        }
        if let Some(end_date) = filter.end_date {
            qb.push(" AND t.date <= ");
            qb.push_bind(end_date);
        }

        qb.push(" ORDER BY t.date DESC, t.created_at DESC");

        let rows: Vec<TransactionRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(TransactionRow::into_with_category)
            .collect())
    }

    pub async fn get(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> Result<TransactionWithCategory, TransactionError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "{TX_JOINED_SELECT} WHERE t.id = $1 AND t.user_id = $2"
        ))
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TransactionError::NotFound)?;

        Ok(row.into_with_category())
    }

    pub async fn create(
        &self,
        user_id: &str,
        data: NewTransaction,
    ) -> Result<TransactionWithCategory, TransactionError> {
        let category = self
            .category_by_id(data.category_id)
            .await?
            .ok_or(TransactionError::CategoryNotFound)?;

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "INSERT INTO transactions (user_id, type, amount, category_id, date, memo) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TX_COLUMNS}"
        ))
        .bind(user_id)
        .bind(data.transaction_type)
        .bind(data.amount)
        .bind(data.category_id)
        .bind(data.date)
        .bind(&data.memo)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionWithCategory {
            transaction,
            category,
        })
    }

    /// Owner-only; the fetch never widens to the family visibility set
    pub async fn update(
        &self,
        transaction_id: Uuid,
        user_id: &str,
        changes: TransactionChanges,
    ) -> Result<TransactionWithCategory, TransactionError> {
        let current = self.get_owned(transaction_id, user_id).await?;

        let category_id = changes.category_id.unwrap_or(current.category_id);
        let category = self
            .category_by_id(category_id)
            .await?
            .ok_or(TransactionError::CategoryNotFound)?;

        let transaction_type = changes.transaction_type.unwrap_or(current.transaction_type);
        let amount = changes.amount.unwrap_or(current.amount);
        let date = changes.date.unwrap_or(current.date);
        let memo = changes.memo.or(current.memo);

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            "UPDATE transactions \
             SET type = $1, amount = $2, category_id = $3, date = $4, memo = $5, updated_at = now() \
             WHERE id = $6 AND user_id = $7 RETURNING {TX_COLUMNS}"
        ))
        .bind(transaction_type)
        .bind(amount)
        .bind(category_id)
        .bind(date)
        .bind(&memo)
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TransactionError::NotFound)?;

        Ok(TransactionWithCategory {
            transaction,
            category,
        })
    }

    pub async fn delete(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> Result<(), TransactionError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(transaction_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TransactionError::NotFound);
        }
        Ok(())
    }

    /// INCOME sum for the owner over `[first_of_month, first_of_next_month)`
    pub async fn monthly_income(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Decimal, TransactionError> {
        self.monthly_total(user_id, TransactionType::Income, year, month)
            .await
    }

    /// EXPENSE sum for the owner over the same half-open interval
    pub async fn monthly_expense(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Decimal, TransactionError> {
        self.monthly_total(user_id, TransactionType::Expense, year, month)
            .await
    }

    async fn monthly_total(
        &self,
        user_id: &str,
        transaction_type: TransactionType,
        year: i32,
        month: u32,
    ) -> Result<Decimal, TransactionError> {
        let (start, end) = month_bounds(year, month).ok_or(TransactionError::InvalidMonth)?;

        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions \
             WHERE user_id = $1 AND type = $2 AND date >= $3 AND date < $4",
        )
        .bind(user_id)
        .bind(transaction_type)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn get_owned(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> Result<Transaction, TransactionError> {
        sqlx::query_as::<_, Transaction>(&format!(
            "SELECT {TX_COLUMNS} FROM transactions WHERE id = $1 AND user_id = $2"
        ))
        .bind(transaction_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TransactionError::NotFound)
    }

    async fn category_by_id(&self, category_id: Uuid) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, type, name, display_order FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Half-open month interval `[first_of_month, first_of_next_month)`, rolling
/// December into January of the next year. `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_rolls_over_to_january() {
        let (start, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn mid_year_month_spans_one_month() {
        let (start, end) = month_bounds(2024, 6).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn invalid_months_are_rejected() {
        assert!(month_bounds(2024, 0).is_none());
        assert!(month_bounds(2024, 13).is_none());
    }
}
