//! SupportSession aggregate entity.
//!
//! A session is the live cursor over one ticket's conversation. A ticket has
//! at most one session at a time; the session tracks the user-turn counter
//! and the escalation state machine.

use crate::domain::foundation::{
    DomainError, ErrorCode, SatisfactionRating, SessionId, SessionStatus, TicketId, Timestamp,
    UserId,
};
use serde::{Deserialize, Serialize};

/// Support chat session aggregate.
///
/// # Invariants
///
/// - `turn_count` equals the number of persisted user-kind messages
/// - `escalated` implies status is WaitingOperator or later
/// - `Closed` is terminal; no message is accepted afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportSession {
    id: SessionId,
    ticket_id: TicketId,
    user_id: UserId,
    status: SessionStatus,
    turn_count: u32,
    escalated: bool,
    satisfaction: Option<SatisfactionRating>,
    started_at: Timestamp,
    ended_at: Option<Timestamp>,
}

impl SupportSession {
    /// Create a new active session with zero turns.
    pub fn new(id: SessionId, ticket_id: TicketId, user_id: UserId) -> Self {
        Self {
            id,
            ticket_id,
            user_id,
            status: SessionStatus::Active,
            turn_count: 0,
            escalated: false,
            satisfaction: None,
            started_at: Timestamp::now(),
            ended_at: None,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        ticket_id: TicketId,
        user_id: UserId,
        status: SessionStatus,
        turn_count: u32,
        escalated: bool,
        satisfaction: Option<SatisfactionRating>,
        started_at: Timestamp,
        ended_at: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            ticket_id,
            user_id,
            status,
            turn_count,
            escalated,
            satisfaction,
            started_at,
            ended_at,
        }
    }

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the parent ticket ID.
    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Returns the owner's user ID.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns how many user messages this session has seen.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Returns whether the session was handed to an operator.
    pub fn is_escalated(&self) -> bool {
        self.escalated
    }

    /// Returns the satisfaction rating, if the user left one.
    pub fn satisfaction(&self) -> Option<SatisfactionRating> {
        self.satisfaction
    }

    /// Returns when the session started.
    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    /// Returns when the session ended, if it did.
    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    /// Checks if the given user owns this session.
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Records one inbound user turn.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session no longer accepts messages
    pub fn record_turn(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.turn_count += 1;
        Ok(())
    }

    /// Hands the session to the operator queue.
    ///
    /// Idempotent once escalated; a second call does not change state.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is closed
    pub fn escalate(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        if self.escalated {
            return Ok(());
        }
        self.status = SessionStatus::WaitingOperator;
        self.escalated = true;
        Ok(())
    }

    /// Marks an operator as having picked the session up.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the session is waiting for one
    pub fn operator_joined(&mut self) -> Result<(), DomainError> {
        if !self.status.can_transition_to(&SessionStatus::WithOperator) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot move session from {} to WithOperator", self.status),
            ));
        }
        self.status = SessionStatus::WithOperator;
        Ok(())
    }

    /// Closes the session, optionally recording a satisfaction rating.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` if the session is already closed
    pub fn close(&mut self, satisfaction: Option<SatisfactionRating>) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = SessionStatus::Closed;
        self.satisfaction = satisfaction;
        self.ended_at = Some(Timestamp::now());
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.accepts_messages() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::SessionClosed,
                format!("Session {} is closed", self.id),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SupportSession {
        SupportSession::new(
            SessionId::new(),
            TicketId::new(),
            UserId::new("user-1").unwrap(),
        )
    }

    #[test]
    fn new_session_is_active_with_zero_turns() {
        let s = session();
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.turn_count(), 0);
        assert!(!s.is_escalated());
        assert!(s.ended_at().is_none());
    }

    #[test]
    fn record_turn_increments_counter() {
        let mut s = session();
        s.record_turn().unwrap();
        s.record_turn().unwrap();
        assert_eq!(s.turn_count(), 2);
    }

    #[test]
    fn record_turn_rejected_when_closed() {
        let mut s = session();
        s.close(None).unwrap();

        let err = s.record_turn().unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionClosed);
        assert_eq!(s.turn_count(), 0);
    }

    #[test]
    fn escalate_moves_to_waiting_operator() {
        let mut s = session();
        s.escalate().unwrap();

        assert_eq!(s.status(), SessionStatus::WaitingOperator);
        assert!(s.is_escalated());
    }

    #[test]
    fn escalate_is_idempotent() {
        let mut s = session();
        s.escalate().unwrap();
        s.operator_joined().unwrap();
        s.escalate().unwrap();

        // a repeat escalation does not bounce the session back to the queue
        assert_eq!(s.status(), SessionStatus::WithOperator);
    }

    #[test]
    fn escalated_sessions_still_accept_turns() {
        let mut s = session();
        s.escalate().unwrap();
        s.record_turn().unwrap();
        assert_eq!(s.turn_count(), 1);
    }

    #[test]
    fn operator_joined_requires_waiting_state() {
        let mut s = session();
        assert!(s.operator_joined().is_err());

        s.escalate().unwrap();
        s.operator_joined().unwrap();
        assert_eq!(s.status(), SessionStatus::WithOperator);
    }

    #[test]
    fn close_records_rating_and_end_time() {
        let mut s = session();
        let rating = SatisfactionRating::new(5).unwrap();
        s.close(Some(rating)).unwrap();

        assert_eq!(s.status(), SessionStatus::Closed);
        assert_eq!(s.satisfaction(), Some(rating));
        assert!(s.ended_at().is_some());
    }

    #[test]
    fn close_is_terminal() {
        let mut s = session();
        s.close(None).unwrap();

        assert!(s.close(None).is_err());
        assert!(s.escalate().is_err());
    }
}
