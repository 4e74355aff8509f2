//! PostgreSQL implementation of SupportStore.
//!
//! Each commit-unit method opens one transaction and writes every record of
//! the unit inside it; a failure anywhere rolls the whole unit back.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, KnowledgeEntryId, MessageId, MessageKind, SatisfactionRating,
    SessionId, SessionStatus, TicketId, TicketPriority, TicketStatus, Timestamp, UserId,
};
use crate::domain::support::{SupportMessage, SupportSession, SupportTicket};
use crate::ports::{EscalationCommit, NewConversation, SupportStore, TurnCommit};

/// PostgreSQL implementation of SupportStore.
#[derive(Clone)]
pub struct PostgresSupportStore {
    pool: PgPool,
}

impl PostgresSupportStore {
    /// Creates a new PostgresSupportStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupportStore for PostgresSupportStore {
    async fn create_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        upsert_ticket(&mut tx, &conversation.ticket).await?;
        upsert_session(&mut tx, &conversation.session).await?;
        insert_message(&mut tx, &conversation.initial_message).await?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit conversation", e))
    }

    async fn find_session(&self, id: &SessionId) -> Result<Option<SupportSession>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, ticket_id, user_id, status, turn_count, escalated,
                   satisfaction, started_at, ended_at
            FROM support_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch session", e))?;

        row.map(row_to_session).transpose()
    }

    async fn find_ticket(&self, id: &TicketId) -> Result<Option<SupportTicket>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, description, status, priority,
                   assigned_operator, created_at, updated_at, resolved_at
            FROM support_tickets
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch ticket", e))?;

        row.map(row_to_ticket).transpose()
    }

    async fn commit_turn(&self, turn: &TurnCommit) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        upsert_session(&mut tx, &turn.session).await?;
        insert_message(&mut tx, &turn.user_message).await?;
        insert_message(&mut tx, &turn.bot_message).await?;

        if let Some(entry_id) = &turn.used_entry {
            increment_usage(&mut tx, entry_id).await?;
        }
        if let Some(ticket) = &turn.ticket {
            upsert_ticket(&mut tx, ticket).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit turn", e))
    }

    async fn commit_escalation(&self, escalation: &EscalationCommit) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to begin transaction", e))?;

        upsert_session(&mut tx, &escalation.session).await?;
        upsert_ticket(&mut tx, &escalation.ticket).await?;
        insert_message(&mut tx, &escalation.handoff_message).await?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit escalation", e))
    }

    async fn update_session(&self, session: &SupportSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE support_sessions SET
                status = $2,
                turn_count = $3,
                escalated = $4,
                satisfaction = $5,
                ended_at = $6
            WHERE id = $1
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session_status_to_str(session.status()))
        .bind(session.turn_count() as i32)
        .bind(session.is_escalated())
        .bind(session.satisfaction().map(|r| r.value() as i16))
        .bind(session.ended_at().map(|t| t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", session.id()),
            ));
        }

        Ok(())
    }

    async fn set_message_feedback(
        &self,
        id: &MessageId,
        is_helpful: bool,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE support_messages SET is_helpful = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(is_helpful)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to update message feedback", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::MessageNotFound,
                format!("Message not found: {}", id),
            ));
        }

        Ok(())
    }

    async fn list_conversation_messages(
        &self,
        ticket_id: &TicketId,
        session_id: &SessionId,
    ) -> Result<Vec<SupportMessage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, ticket_id, session_id, kind, content, sender_id,
                   knowledge_entry_id, is_helpful, created_at
            FROM support_messages
            WHERE ticket_id = $1 AND (session_id = $2 OR session_id IS NULL)
            ORDER BY created_at ASC
            "#,
        )
        .bind(ticket_id.as_uuid())
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch conversation messages", e))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn list_tickets_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, status, priority,
                   assigned_operator, created_at, updated_at, resolved_at
            FROM support_tickets
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to fetch tickets by user", e))?;

        rows.into_iter().map(row_to_ticket).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transaction building blocks
// ════════════════════════════════════════════════════════════════════════════

async fn upsert_ticket(conn: &mut PgConnection, ticket: &SupportTicket) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO support_tickets (
            id, user_id, title, description, status, priority,
            assigned_operator, created_at, updated_at, resolved_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            description = EXCLUDED.description,
            status = EXCLUDED.status,
            priority = EXCLUDED.priority,
            assigned_operator = EXCLUDED.assigned_operator,
            updated_at = EXCLUDED.updated_at,
            resolved_at = EXCLUDED.resolved_at
        "#,
    )
    .bind(ticket.id().as_uuid())
    .bind(ticket.user_id().as_str())
    .bind(ticket.title())
    .bind(ticket.description())
    .bind(ticket_status_to_str(ticket.status()))
    .bind(ticket.priority().value() as i16)
    .bind(ticket.assigned_operator())
    .bind(ticket.created_at().as_datetime())
    .bind(ticket.updated_at().as_datetime())
    .bind(ticket.resolved_at().map(|t| t.as_datetime()))
    .execute(conn)
    .await
    .map_err(|e| db_err("Failed to upsert ticket", e))?;

    Ok(())
}

async fn upsert_session(
    conn: &mut PgConnection,
    session: &SupportSession,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO support_sessions (
            id, ticket_id, user_id, status, turn_count, escalated,
            satisfaction, started_at, ended_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            turn_count = EXCLUDED.turn_count,
            escalated = EXCLUDED.escalated,
            satisfaction = EXCLUDED.satisfaction,
            ended_at = EXCLUDED.ended_at
        "#,
    )
    .bind(session.id().as_uuid())
    .bind(session.ticket_id().as_uuid())
    .bind(session.user_id().as_str())
    .bind(session_status_to_str(session.status()))
    .bind(session.turn_count() as i32)
    .bind(session.is_escalated())
    .bind(session.satisfaction().map(|r| r.value() as i16))
    .bind(session.started_at().as_datetime())
    .bind(session.ended_at().map(|t| t.as_datetime()))
    .execute(conn)
    .await
    .map_err(|e| db_err("Failed to upsert session", e))?;

    Ok(())
}

async fn insert_message(
    conn: &mut PgConnection,
    message: &SupportMessage,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO support_messages (
            id, ticket_id, session_id, kind, content, sender_id,
            knowledge_entry_id, is_helpful, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(message.id().as_uuid())
    .bind(message.ticket_id().as_uuid())
    .bind(message.session_id().map(|s| s.as_uuid()))
    .bind(message_kind_to_str(message.kind()))
    .bind(message.content())
    .bind(message.sender_id().map(|u| u.as_str()))
    .bind(message.knowledge_entry_id().map(|k| k.as_uuid()))
    .bind(message.is_helpful())
    .bind(message.created_at().as_datetime())
    .execute(conn)
    .await
    .map_err(|e| db_err("Failed to insert message", e))?;

    Ok(())
}

/// Atomic read-modify-write on the usage counter, inside the caller's
/// transaction.
async fn increment_usage(
    conn: &mut PgConnection,
    entry_id: &KnowledgeEntryId,
) -> Result<(), DomainError> {
    let result = sqlx::query(
        r#"
        UPDATE knowledge_entries
        SET usage_count = usage_count + 1, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(entry_id.as_uuid())
    .execute(conn)
    .await
    .map_err(|e| db_err("Failed to increment entry usage", e))?;

    if result.rows_affected() == 0 {
        return Err(DomainError::new(
            ErrorCode::KnowledgeEntryNotFound,
            format!("Knowledge entry not found: {}", entry_id),
        ));
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Row mapping
// ════════════════════════════════════════════════════════════════════════════

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

fn row_to_ticket(row: PgRow) -> Result<SupportTicket, DomainError> {
    let status = str_to_ticket_status(&col::<String>(&row, "status")?)?;
    let priority = TicketPriority::try_from_i8(col::<i16>(&row, "priority")? as i8)
        .map_err(|e| db_err("Invalid priority", e))?;
    let user_id =
        UserId::new(col::<String>(&row, "user_id")?).map_err(|e| db_err("Invalid user_id", e))?;

    Ok(SupportTicket::reconstitute(
        TicketId::from_uuid(col(&row, "id")?),
        user_id,
        col(&row, "title")?,
        col(&row, "description")?,
        status,
        priority,
        col::<Option<String>>(&row, "assigned_operator")?,
        Timestamp::from_datetime(col(&row, "created_at")?),
        Timestamp::from_datetime(col(&row, "updated_at")?),
        col::<Option<chrono::DateTime<chrono::Utc>>>(&row, "resolved_at")?
            .map(Timestamp::from_datetime),
    ))
}

fn row_to_session(row: PgRow) -> Result<SupportSession, DomainError> {
    let status = str_to_session_status(&col::<String>(&row, "status")?)?;
    let user_id =
        UserId::new(col::<String>(&row, "user_id")?).map_err(|e| db_err("Invalid user_id", e))?;
    let satisfaction = col::<Option<i16>>(&row, "satisfaction")?
        .map(|v| SatisfactionRating::new(v as i8).map_err(|e| db_err("Invalid satisfaction", e)))
        .transpose()?;

    Ok(SupportSession::reconstitute(
        SessionId::from_uuid(col(&row, "id")?),
        TicketId::from_uuid(col(&row, "ticket_id")?),
        user_id,
        status,
        col::<i32>(&row, "turn_count")? as u32,
        col(&row, "escalated")?,
        satisfaction,
        Timestamp::from_datetime(col(&row, "started_at")?),
        col::<Option<chrono::DateTime<chrono::Utc>>>(&row, "ended_at")?
            .map(Timestamp::from_datetime),
    ))
}

fn row_to_message(row: PgRow) -> Result<SupportMessage, DomainError> {
    let kind = str_to_message_kind(&col::<String>(&row, "kind")?)?;
    let sender_id = col::<Option<String>>(&row, "sender_id")?
        .map(|s| UserId::new(s).map_err(|e| db_err("Invalid sender_id", e)))
        .transpose()?;

    Ok(SupportMessage::reconstitute(
        MessageId::from_uuid(col(&row, "id")?),
        TicketId::from_uuid(col(&row, "ticket_id")?),
        col::<Option<uuid::Uuid>>(&row, "session_id")?.map(SessionId::from_uuid),
        kind,
        col(&row, "content")?,
        sender_id,
        col::<Option<uuid::Uuid>>(&row, "knowledge_entry_id")?.map(KnowledgeEntryId::from_uuid),
        col(&row, "is_helpful")?,
        Timestamp::from_datetime(col(&row, "created_at")?),
    ))
}

// ════════════════════════════════════════════════════════════════════════════
// Status conversion
// ════════════════════════════════════════════════════════════════════════════

fn ticket_status_to_str(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "open",
        TicketStatus::InProgress => "in_progress",
        TicketStatus::Resolved => "resolved",
        TicketStatus::Closed => "closed",
    }
}

fn str_to_ticket_status(s: &str) -> Result<TicketStatus, DomainError> {
    match s {
        "open" => Ok(TicketStatus::Open),
        "in_progress" => Ok(TicketStatus::InProgress),
        "resolved" => Ok(TicketStatus::Resolved),
        "closed" => Ok(TicketStatus::Closed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid ticket status: {}", s),
        )),
    }
}

fn session_status_to_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::WaitingOperator => "waiting_operator",
        SessionStatus::WithOperator => "with_operator",
        SessionStatus::Closed => "closed",
    }
}

fn str_to_session_status(s: &str) -> Result<SessionStatus, DomainError> {
    match s {
        "active" => Ok(SessionStatus::Active),
        "waiting_operator" => Ok(SessionStatus::WaitingOperator),
        "with_operator" => Ok(SessionStatus::WithOperator),
        "closed" => Ok(SessionStatus::Closed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid session status: {}", s),
        )),
    }
}

fn message_kind_to_str(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::User => "user",
        MessageKind::Bot => "bot",
        MessageKind::Operator => "operator",
    }
}

fn str_to_message_kind(s: &str) -> Result<MessageKind, DomainError> {
    match s {
        "user" => Ok(MessageKind::User),
        "bot" => Ok(MessageKind::Bot),
        "operator" => Ok(MessageKind::Operator),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid message kind: {}", s),
        )),
    }
}
