use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::db::models::{Contact, Message};
use crate::error::AppError;

/// Fields of a message as the client submits it.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub recv_address: String,
    pub send_address: String,
    pub recv_name: String,
    pub send_name: String,
    pub timestamp: String,
    pub recv_contents: String,
    pub send_contents: String,
}

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(pool: &Pool<Sqlite>, msg: NewMessage) -> Result<Message, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO messages (id, recv_address, send_address, recv_name, send_name,
                      timestamp, recv_contents, send_contents, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(&msg.recv_address)
        .bind(&msg.send_address)
        .bind(&msg.recv_name)
        .bind(&msg.send_name)
        .bind(&msg.timestamp)
        .bind(&msg.recv_contents)
        .bind(&msg.send_contents)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// All messages exchanged between two addresses, regardless of which one
    /// was the sender, in insertion order.
    pub async fn get_between(
        pool: &Pool<Sqlite>,
        first: &str,
        second: &str,
    ) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
SELECT * FROM messages
WHERE (recv_address = ?1 AND send_address = ?2)
   OR (recv_address = ?2 AND send_address = ?1)
ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Distinct counterparties of an address, derived from message history.
    pub async fn contacts(pool: &Pool<Sqlite>, address: &str) -> Result<Vec<Contact>, AppError> {
        let contacts = sqlx::query_as::<_, Contact>(
            r#"
SELECT DISTINCT recv_address AS address, recv_name AS name
FROM messages WHERE send_address = ?1
UNION
SELECT DISTINCT send_address AS address, send_name AS name
FROM messages WHERE recv_address = ?1
            "#,
        )
        .bind(address)
        .fetch_all(pool)
        .await?;

        Ok(contacts)
    }
}
