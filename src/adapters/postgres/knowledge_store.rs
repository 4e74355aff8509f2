//! PostgreSQL implementation of KnowledgeStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, KnowledgeEntryId, Timestamp};
use crate::domain::support::KnowledgeEntry;
use crate::ports::KnowledgeStore;

/// PostgreSQL implementation of KnowledgeStore.
#[derive(Clone)]
pub struct PostgresKnowledgeStore {
    pool: PgPool,
}

impl PostgresKnowledgeStore {
    /// Creates a new PostgresKnowledgeStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeStore for PostgresKnowledgeStore {
    async fn list_active(&self) -> Result<Vec<KnowledgeEntry>, DomainError> {
        // ORDER BY id is part of the port contract: ties in match scoring
        // resolve to the first entry seen.
        let rows = sqlx::query(
            r#"
            SELECT id, category, question, answer, keywords, faq_url,
                   usage_count, active, created_at, updated_at
            FROM knowledge_entries
            WHERE active
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch active entries", e))?;

        rows.into_iter().map(row_to_entry).collect()
    }

    async fn top_by_usage(&self, limit: u32) -> Result<Vec<KnowledgeEntry>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, category, question, answer, keywords, faq_url,
                   usage_count, active, created_at, updated_at
            FROM knowledge_entries
            WHERE active
            ORDER BY usage_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch top entries", e))?;

        rows.into_iter().map(row_to_entry).collect()
    }
}

fn db_err(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| db_err(&format!("Failed to get column {}", name), e))
}

fn row_to_entry(row: PgRow) -> Result<KnowledgeEntry, DomainError> {
    Ok(KnowledgeEntry::reconstitute(
        KnowledgeEntryId::from_uuid(col(&row, "id")?),
        col(&row, "category")?,
        col(&row, "question")?,
        col(&row, "answer")?,
        col(&row, "keywords")?,
        col::<Option<String>>(&row, "faq_url")?,
        col::<i64>(&row, "usage_count")? as u64,
        col(&row, "active")?,
        Timestamp::from_datetime(col(&row, "created_at")?),
        Timestamp::from_datetime(col(&row, "updated_at")?),
    ))
}
