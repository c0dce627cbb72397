use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::db::models::User;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    /// Inserts a new user. Duplicate usernames surface as a unique-violation
    /// database error, which callers map to their own rejection response.
    pub async fn create(
        pool: &Pool<Sqlite>,
        username: &str,
        password_hash: &[u8; 32],
        password_salt: &[u8; 32],
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, username, password_hash, password_salt, address, public_key, created_at)
VALUES (?, ?, ?, ?, '', NULL, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash.as_slice())
        .bind(password_salt.as_slice())
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_username(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Sets the blockchain address and encryption public key of one user.
    pub async fn save_address(
        pool: &Pool<Sqlite>,
        id: &str,
        address: &str,
        public_key: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET address = ?, public_key = ? WHERE id = ?")
            .bind(address)
            .bind(public_key)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Looks up the public key published for an address. Outer `None` means
    /// no user owns the address; inner `None` means the user never saved a key.
    pub async fn public_key_by_address(
        pool: &Pool<Sqlite>,
        address: &str,
    ) -> Result<Option<Option<String>>, AppError> {
        let row = sqlx::query_scalar::<_, Option<String>>(
            "SELECT public_key FROM users WHERE address = ?",
        )
        .bind(address)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let pool = memory_pool().await;
        let user = UserRepository::create(&pool, "alice", &[1; 32], &[2; 32])
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.address, "");
        assert!(user.public_key.is_none());

        let found = UserRepository::get_by_username(&pool, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);

        assert!(UserRepository::get_by_username(&pool, "bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_username_hits_unique_constraint() {
        let pool = memory_pool().await;
        UserRepository::create(&pool, "alice", &[1; 32], &[2; 32])
            .await
            .unwrap();

        let err = UserRepository::create(&pool, "alice", &[3; 32], &[4; 32])
            .await
            .unwrap_err();
        match err {
            AppError::Database(e) => {
                assert!(e.as_database_error().is_some_and(|d| d.is_unique_violation()))
            }
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn save_address_and_public_key_lookup() {
        let pool = memory_pool().await;
        let user = UserRepository::create(&pool, "alice", &[1; 32], &[2; 32])
            .await
            .unwrap();

        UserRepository::save_address(&pool, &user.id, "0xabc", "pk-alice")
            .await
            .unwrap();

        let updated = UserRepository::get_by_username(&pool, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.address, "0xabc");
        assert_eq!(updated.public_key.as_deref(), Some("pk-alice"));

        let key = UserRepository::public_key_by_address(&pool, "0xabc")
            .await
            .unwrap();
        assert_eq!(key, Some(Some("pk-alice".to_string())));

        let unknown = UserRepository::public_key_by_address(&pool, "0xdead")
            .await
            .unwrap();
        assert_eq!(unknown, None);
    }
}
