use sqlx::PgPool;

/// Lazy bootstrap of the local user shadow table
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Idempotent: first authenticated request creates the row, later ones
    /// are no-ops on the unique user_id.
    pub async fn ensure_exists(&self, user_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO users (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
