//! In-memory support store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, SessionId, TicketId, UserId};
use crate::domain::support::{SupportMessage, SupportSession, SupportTicket};
use crate::ports::{EscalationCommit, NewConversation, SupportStore, TurnCommit};

use super::InMemoryKnowledgeStore;

#[derive(Default)]
struct State {
    tickets: HashMap<TicketId, SupportTicket>,
    sessions: HashMap<SessionId, SupportSession>,
    /// Append-only; insertion order doubles as chronological order.
    messages: Vec<SupportMessage>,
}

/// In-memory ticket/session/message store.
///
/// All state sits behind one mutex, so each commit method is trivially
/// atomic: everything it writes lands under a single lock acquisition.
#[derive(Default)]
pub struct InMemorySupportStore {
    state: Mutex<State>,
    /// When paired with a knowledge store, turn commits apply the usage
    /// increment there, mirroring the Postgres transaction.
    knowledge: Option<InMemoryKnowledgeStore>,
}

impl InMemorySupportStore {
    /// Creates an empty store with no paired knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose turn commits apply usage increments to the
    /// given knowledge store.
    pub fn with_knowledge(knowledge: InMemoryKnowledgeStore) -> Self {
        Self {
            state: Mutex::new(State::default()),
            knowledge: Some(knowledge),
        }
    }

    /// Number of stored messages, across all sessions.
    pub fn message_count(&self) -> usize {
        self.state.lock().unwrap().messages.len()
    }

    fn upsert_message(messages: &mut Vec<SupportMessage>, message: &SupportMessage) {
        match messages.iter_mut().find(|m| m.id() == message.id()) {
            Some(existing) => *existing = message.clone(),
            None => messages.push(message.clone()),
        }
    }
}

#[async_trait]
impl SupportStore for InMemorySupportStore {
    async fn create_conversation(
        &self,
        conversation: &NewConversation,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state
            .tickets
            .insert(*conversation.ticket.id(), conversation.ticket.clone());
        state
            .sessions
            .insert(*conversation.session.id(), conversation.session.clone());
        state.messages.push(conversation.initial_message.clone());
        Ok(())
    }

    async fn find_session(&self, id: &SessionId) -> Result<Option<SupportSession>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.sessions.get(id).cloned())
    }

    async fn find_ticket(&self, id: &TicketId) -> Result<Option<SupportTicket>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.tickets.get(id).cloned())
    }

    async fn commit_turn(&self, turn: &TurnCommit) -> Result<(), DomainError> {
        // Apply the usage increment first: it is the only part that can
        // fail, and a failed commit must leave no trace.
        if let Some(entry_id) = &turn.used_entry {
            if let Some(knowledge) = &self.knowledge {
                knowledge.increment_usage(entry_id)?;
            }
        }

        let mut state = self.state.lock().unwrap();
        state
            .sessions
            .insert(*turn.session.id(), turn.session.clone());
        Self::upsert_message(&mut state.messages, &turn.user_message);
        Self::upsert_message(&mut state.messages, &turn.bot_message);
        if let Some(ticket) = &turn.ticket {
            state.tickets.insert(*ticket.id(), ticket.clone());
        }
        Ok(())
    }

    async fn commit_escalation(&self, escalation: &EscalationCommit) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state
            .sessions
            .insert(*escalation.session.id(), escalation.session.clone());
        state
            .tickets
            .insert(*escalation.ticket.id(), escalation.ticket.clone());
        Self::upsert_message(&mut state.messages, &escalation.handoff_message);
        Ok(())
    }

    async fn update_session(&self, session: &SupportSession) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if !state.sessions.contains_key(session.id()) {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session {} not found", session.id()),
            ));
        }
        state.sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn set_message_feedback(
        &self,
        id: &MessageId,
        is_helpful: bool,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MessageNotFound,
                    format!("Message {} not found", id),
                )
            })?;
        message.set_feedback(is_helpful);
        Ok(())
    }

    async fn list_conversation_messages(
        &self,
        ticket_id: &TicketId,
        session_id: &SessionId,
    ) -> Result<Vec<SupportMessage>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .messages
            .iter()
            .filter(|m| {
                m.session_id() == Some(session_id)
                    || (m.session_id().is_none() && m.ticket_id() == ticket_id)
            })
            .cloned()
            .collect())
    }

    async fn list_tickets_by_user(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut tickets: Vec<SupportTicket> = state
            .tickets
            .values()
            .filter(|t| t.is_owner(user_id))
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        tickets.truncate(limit as usize);
        Ok(tickets)
    }
}
