//! services/api/src/adapters/session_store.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `SessionStore` port from the `core` crate. It
//! persists whole conversations as JSONB rows in PostgreSQL using `sqlx`.

use async_trait::async_trait;
use movie_tracker_core::domain::{ChatSession, ConversationMessage};
use movie_tracker_core::ports::{ChatError, ChatResult, SessionStore};
use sqlx::{PgPool, Row};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SessionStore` port.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new `PgSessionStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn encode_history(history: &[ConversationMessage]) -> ChatResult<serde_json::Value> {
    serde_json::to_value(history).map_err(|e| ChatError::Storage(e.to_string()))
}

fn decode_history(value: serde_json::Value) -> ChatResult<Vec<ConversationMessage>> {
    serde_json::from_value(value)
        .map_err(|e| ChatError::Storage(format!("undecodable session history: {e}")))
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: ChatSession) -> ChatResult<ChatSession> {
        let history = encode_history(&session.history)?;

        sqlx::query("INSERT INTO chat_sessions (id, history, funny_fact) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(&history)
            .bind(&session.funny_fact)
            .execute(&self.pool)
            .await
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        Ok(session)
    }

    async fn get(&self, id: &str) -> ChatResult<ChatSession> {
        let row = sqlx::query("SELECT history, funny_fact FROM chat_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChatError::Storage(e.to_string()))?
            .ok_or_else(|| ChatError::NotFound(format!("Chat session {} not found", id)))?;

        let history = decode_history(
            row.try_get::<serde_json::Value, _>("history")
                .map_err(|e| ChatError::Storage(e.to_string()))?,
        )?;
        let funny_fact = row
            .try_get::<Option<String>, _>("funny_fact")
            .map_err(|e| ChatError::Storage(e.to_string()))?;

        Ok(ChatSession {
            id: id.to_string(),
            history,
            funny_fact,
        })
    }

    async fn replace(
        &self,
        id: &str,
        history: &[ConversationMessage],
        funny_fact: Option<&str>,
    ) -> ChatResult<ChatSession> {
        let encoded = encode_history(history)?;

        let result = sqlx::query(
            "UPDATE chat_sessions SET history = $2, funny_fact = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&encoded)
        .bind(funny_fact)
        .execute(&self.pool)
        .await
        .map_err(|e| ChatError::Storage(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ChatError::NotFound(format!("Chat session {} not found", id)));
        }

        Ok(ChatSession {
            id: id.to_string(),
            history: history.to_vec(),
            funny_fact: funny_fact.map(str::to_string),
        })
    }
}
