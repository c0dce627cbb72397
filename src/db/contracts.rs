use sqlx::{Pool, Sqlite};

use crate::db::models::ContractRecord;
use crate::error::AppError;

/// Persists the single deployed-contract record so a restart can find the
/// existing deployment instead of creating a new one.
pub struct ContractRepository;

impl ContractRepository {
    pub async fn get(pool: &Pool<Sqlite>) -> Result<Option<ContractRecord>, AppError> {
        let record = sqlx::query_as::<_, ContractRecord>(
            "SELECT address, abi, deployed_at FROM contracts WHERE id = 1",
        )
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    pub async fn set(pool: &Pool<Sqlite>, address: &str, abi: &str) -> Result<(), AppError> {
        let deployed_at = chrono::Utc::now().timestamp();

        sqlx::query(
            "INSERT OR REPLACE INTO contracts (id, address, abi, deployed_at) VALUES (1, ?, ?, ?)",
        )
        .bind(address)
        .bind(abi)
        .bind(deployed_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn set_then_get_replaces_single_row() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init(&pool).await.unwrap();

        assert!(ContractRepository::get(&pool).await.unwrap().is_none());

        ContractRepository::set(&pool, "0xabc", "[]").await.unwrap();
        ContractRepository::set(&pool, "0xdef", "[]").await.unwrap();

        let record = ContractRepository::get(&pool).await.unwrap().unwrap();
        assert_eq!(record.address, "0xdef");
    }
}
