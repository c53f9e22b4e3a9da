use chrono::{Datelike, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::services::asset_service::{AssetError, AssetService};
use crate::services::transaction_service::{TransactionError, TransactionService};

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

impl Summary {
    pub fn zero() -> Self {
        Self {
            total_assets: 0.0,
            total_liabilities: 0.0,
            net_worth: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Monthly {
    pub total_income: f64,
    pub total_expense: f64,
    pub month: u32,
    pub year: i32,
}

impl Monthly {
    pub fn zero(year: i32, month: u32) -> Self {
        Self {
            total_income: 0.0,
            total_expense: 0.0,
            month,
            year,
        }
    }
}

/// Aggregates over already-scoped queries: asset totals run over the family
/// visibility set, monthly income/expense over the requester alone. Zero
/// matching rows always sum to 0.0.
#[derive(Clone)]
pub struct CalculationService {
    assets: AssetService,
    transactions: TransactionService,
}

impl CalculationService {
    pub fn new(assets: AssetService, transactions: TransactionService) -> Self {
        Self {
            assets,
            transactions,
        }
    }

    pub async fn summary(&self, user_id: &str) -> Result<Summary, AssetError> {
        let total_assets = self.assets.total_cash(user_id).await?;
        let total_liabilities = self.assets.total_loans(user_id).await?;
        let net_worth = total_assets - total_liabilities;

        Ok(Summary {
            total_assets: total_assets.to_f64().unwrap_or(0.0),
            total_liabilities: total_liabilities.to_f64().unwrap_or(0.0),
            net_worth: net_worth.to_f64().unwrap_or(0.0),
        })
    }

    /// Year/month default to the current date when unspecified
    pub async fn monthly(
        &self,
        user_id: &str,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Monthly, TransactionError> {
        let (year, month) = resolve_period(year, month);

        let total_income = self.transactions.monthly_income(user_id, year, month).await?;
        let total_expense = self
            .transactions
            .monthly_expense(user_id, year, month)
            .await?;

        Ok(Monthly {
            total_income: total_income.to_f64().unwrap_or(0.0),
            total_expense: total_expense.to_f64().unwrap_or(0.0),
            month,
            year,
        })
    }
}

pub fn resolve_period(year: Option<i32>, month: Option<u32>) -> (i32, u32) {
    let today = Utc::now().date_naive();
    (year.unwrap_or(today.year()), month.unwrap_or(today.month()))
}
