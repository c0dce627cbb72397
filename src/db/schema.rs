//! Table lifecycle for the user and message stores.
//!
//! The schema is applied imperatively instead of through append-only
//! migrations because first-run bootstrap (a fresh contract deployment)
//! drops and recreates the user and message tables.

use sqlx::{Pool, Sqlite};

use crate::error::AppError;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash BLOB NOT NULL,
    password_salt BLOB NOT NULL,
    address TEXT NOT NULL DEFAULT '',
    public_key TEXT,
    created_at INTEGER NOT NULL
)
"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    recv_address TEXT NOT NULL,
    send_address TEXT NOT NULL,
    recv_name TEXT NOT NULL,
    send_name TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    recv_contents TEXT NOT NULL,
    send_contents TEXT NOT NULL,
    created_at INTEGER NOT NULL
)
"#;

const CREATE_MESSAGE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_messages_recv ON messages(recv_address)",
    "CREATE INDEX IF NOT EXISTS idx_messages_send ON messages(send_address)",
];

// Single row, id fixed at 1.
const CREATE_CONTRACTS: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    address TEXT NOT NULL,
    abi TEXT NOT NULL,
    deployed_at INTEGER NOT NULL
)
"#;

/// Creates all tables that do not exist yet.
pub async fn init(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_MESSAGES).execute(pool).await?;
    for stmt in CREATE_MESSAGE_INDEXES {
        sqlx::query(stmt).execute(pool).await?;
    }
    sqlx::query(CREATE_CONTRACTS).execute(pool).await?;
    Ok(())
}

/// Drops and recreates the user and message tables. Runs when the ledger
/// contract was freshly deployed, so local state cannot reference a contract
/// that no longer exists. The contract record itself survives.
pub async fn reset(pool: &Pool<Sqlite>) -> Result<(), AppError> {
    sqlx::query("DROP TABLE IF EXISTS users").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS messages").execute(pool).await?;
    init(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let pool = memory_pool().await;
        init(&pool).await.unwrap();
        init(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn reset_empties_users_and_messages_but_keeps_contract() {
        let pool = memory_pool().await;
        init(&pool).await.unwrap();

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, password_salt, created_at) \
             VALUES ('u1', 'alice', x'00', x'00', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO contracts (id, address, abi, deployed_at) VALUES (1, '0xabc', '[]', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        reset(&pool).await.unwrap();

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(users, 0);

        let contracts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contracts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(contracts, 1);
    }
}
