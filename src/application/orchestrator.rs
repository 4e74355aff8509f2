//! Session orchestrator.
//!
//! Drives the ticket/session/message state machine for one inbound message
//! at a time: match against the knowledge base, ask the external provider,
//! or hand the session to an operator, then persist everything the turn
//! produced as one commit unit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::ChatConfig;
use crate::domain::foundation::{
    MessageId, SatisfactionRating, SessionId, TicketId, TicketPriority, UserId,
};
use crate::domain::support::{
    Action, EscalationPolicy, KnowledgeMatcher, SupportMessage, SupportSession, SupportTicket,
};
use crate::ports::{
    AnswerProvider, EscalationCommit, KnowledgeStore, NewConversation, SupportStore, TurnCommit,
};

use super::dto::{
    ChatBotResponse, MessageView, PopularEntry, SessionStarted, TicketView, Transcript,
};
use super::error::ChatError;
use super::knowledge_cache::KnowledgeCache;

/// Longest accepted user message.
const MAX_MESSAGE_LENGTH: usize = 4000;

/// Shown when the provider cannot produce an answer.
const FALLBACK_ANSWER: &str =
    "Sorry, I could not process your request right now. Please try rephrasing your question.";

/// Shown when the session is handed to an operator.
const HANDOFF_ANSWER: &str = "I am connecting you to a support operator. \
    Please stay in this chat; an operator will reply here shortly.";

/// Quick-reply suggestions offered early in a conversation.
const SUGGESTIONS: [&str; 3] = [
    "How do I link my domain?",
    "How do I set up an SSL certificate?",
    "How do I recover my control panel password?",
];

/// User turn from which suggestions are no longer offered.
const SUGGESTION_CUTOFF_TURN: u32 = 4;

/// User turns after which the manual escalation control is offered.
const CAN_ESCALATE_MIN_TURNS: u32 = 3;

/// Orchestrates support conversations over the persistence, knowledge, and
/// provider ports.
pub struct SessionOrchestrator {
    store: Arc<dyn SupportStore>,
    knowledge_store: Arc<dyn KnowledgeStore>,
    knowledge: KnowledgeCache,
    provider: Arc<dyn AnswerProvider>,
    matcher: KnowledgeMatcher,
    policy: EscalationPolicy,
    /// Per-session turn serialization. Calls for different sessions run
    /// concurrently; calls for one session queue up here.
    session_locks: StdMutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionOrchestrator {
    /// Creates an orchestrator wired to the given ports and chat policy.
    pub fn new(
        store: Arc<dyn SupportStore>,
        knowledge_store: Arc<dyn KnowledgeStore>,
        provider: Arc<dyn AnswerProvider>,
        chat: &ChatConfig,
    ) -> Self {
        Self {
            store,
            knowledge: KnowledgeCache::new(Arc::clone(&knowledge_store)),
            knowledge_store,
            provider,
            matcher: KnowledgeMatcher::new(chat.min_match_score),
            policy: EscalationPolicy::new(chat.knowledge_score_threshold, chat.escalation_turn_limit),
            session_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Starts a new conversation: ticket, session, and the opening message
    /// in one commit unit.
    pub async fn start_session(
        &self,
        user_id: &UserId,
        initial_message: &str,
    ) -> Result<SessionStarted, ChatError> {
        let text = validate_message(initial_message)?;

        let ticket_id = TicketId::new();
        let ticket = SupportTicket::new(
            ticket_id,
            user_id.clone(),
            SupportTicket::title_from_message(text),
            text.to_string(),
        )
        .map_err(|e| ChatError::Validation(e.to_string()))?;

        let session = SupportSession::new(SessionId::new(), ticket_id, user_id.clone());
        let session_id = *session.id();
        let status = session.status();
        let opening = SupportMessage::opening(ticket_id, user_id.clone(), text);

        self.store
            .create_conversation(&NewConversation {
                ticket,
                session,
                initial_message: opening,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "conversation creation failed");
                ChatError::from(e)
            })?;

        info!(session_id = %session_id, ticket_id = %ticket_id, "conversation started");
        Ok(SessionStarted {
            session_id,
            ticket_id,
            status,
        })
    }

    /// Processes one user message and returns the bot's reply.
    pub async fn process_message(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        text: &str,
    ) -> Result<ChatBotResponse, ChatError> {
        let text = validate_message(text)?;

        let lock = self.session_lock(session_id);
        let _turn = lock.lock().await;

        let mut session = self.load_owned_session(session_id, user_id).await?;
        session.record_turn().map_err(ChatError::from)?;

        let entries = self.knowledge.active().await?;
        let best = self.matcher.find_best(&entries, text);
        let action = self.policy.decide(best.as_ref(), session.turn_count());

        let user_message =
            SupportMessage::user(*session.ticket_id(), *session_id, user_id.clone(), text);

        let mut used_entry = None;
        let mut ticket_update = None;

        let answer = match action {
            Action::UseKnowledge { entry_id } => match &best {
                Some(m) => {
                    used_entry = Some(entry_id);
                    m.answer.clone()
                }
                // the policy picks this branch only with a match present
                None => FALLBACK_ANSWER.to_string(),
            },
            Action::AskProvider => {
                let context = format!(
                    "The user is asking about hosting. Questions asked in this session so far: {}",
                    session.turn_count()
                );
                match self.provider.complete(text, &context).await {
                    Ok(answer) => answer,
                    Err(err) => {
                        warn!(session_id = %session_id, error = %err, "provider failed, using fallback answer");
                        FALLBACK_ANSWER.to_string()
                    }
                }
            }
            Action::Escalate => {
                // Turns past the limit keep getting the hand-off answer,
                // but the ticket side effects run only on the first one.
                if !session.is_escalated() {
                    session.escalate().map_err(ChatError::from)?;
                    let mut ticket = self.load_ticket(session.ticket_id()).await?;
                    let reason = format!(
                        "Automatic escalation after {} unresolved questions",
                        session.turn_count()
                    );
                    ticket.escalate(Some(&reason), None).map_err(ChatError::from)?;
                    ticket_update = Some(ticket);
                    info!(session_id = %session_id, "session escalated to operator queue");
                }
                HANDOFF_ANSWER.to_string()
            }
        };

        let mut bot_message = SupportMessage::bot(*session.ticket_id(), *session_id, answer);
        if let Some(entry_id) = used_entry {
            bot_message = bot_message.with_knowledge_ref(entry_id);
        }

        let response = ChatBotResponse {
            message: bot_message.content().to_string(),
            message_kind: bot_message.kind(),
            knowledge_entry_id: used_entry,
            is_escalated: session.is_escalated(),
            suggestions: suggestions_for(&session),
            session_id: *session_id,
            questions_count: session.turn_count(),
        };

        self.store
            .commit_turn(&TurnCommit {
                session,
                user_message,
                bot_message,
                used_entry,
                ticket: ticket_update,
            })
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "turn commit failed");
                ChatError::from(e)
            })?;

        Ok(response)
    }

    /// Hands the session to an operator on the user's request.
    pub async fn escalate(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        reason: Option<&str>,
        priority: TicketPriority,
    ) -> Result<ChatBotResponse, ChatError> {
        let lock = self.session_lock(session_id);
        let _turn = lock.lock().await;

        let mut session = self.load_owned_session(session_id, user_id).await?;
        session.escalate().map_err(ChatError::from)?;

        let mut ticket = self.load_ticket(session.ticket_id()).await?;
        ticket
            .escalate(reason, Some(priority))
            .map_err(ChatError::from)?;

        let handoff = SupportMessage::bot(*ticket.id(), *session_id, HANDOFF_ANSWER);

        let response = ChatBotResponse {
            message: HANDOFF_ANSWER.to_string(),
            message_kind: handoff.kind(),
            knowledge_entry_id: None,
            is_escalated: true,
            suggestions: Vec::new(),
            session_id: *session_id,
            questions_count: session.turn_count(),
        };

        self.store
            .commit_escalation(&EscalationCommit {
                session,
                ticket,
                handoff_message: handoff,
            })
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "escalation commit failed");
                ChatError::from(e)
            })?;

        info!(session_id = %session_id, "session escalated on user request");
        Ok(response)
    }

    /// Records whether a bot answer helped. Idempotent.
    pub async fn record_feedback(
        &self,
        message_id: &MessageId,
        is_helpful: bool,
    ) -> Result<(), ChatError> {
        self.store
            .set_message_feedback(message_id, is_helpful)
            .await
            .map_err(ChatError::from)
    }

    /// Closes the session, optionally recording a satisfaction rating.
    pub async fn close(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
        satisfaction: Option<SatisfactionRating>,
    ) -> Result<(), ChatError> {
        let lock = self.session_lock(session_id);
        let _turn = lock.lock().await;

        let mut session = self.load_owned_session(session_id, user_id).await?;
        session.close(satisfaction).map_err(ChatError::from)?;
        self.store
            .update_session(&session)
            .await
            .map_err(ChatError::from)?;

        // the session accepts nothing further; drop its lock entry
        self.session_locks.lock().unwrap().remove(session_id);
        info!(session_id = %session_id, "session closed");
        Ok(())
    }

    /// Returns the conversation's full message history, opening message
    /// included.
    pub async fn get_transcript(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Transcript, ChatError> {
        let session = self.load_owned_session(session_id, user_id).await?;
        let messages = self
            .store
            .list_conversation_messages(session.ticket_id(), session_id)
            .await
            .map_err(ChatError::from)?;

        Ok(Transcript {
            messages: messages.iter().map(MessageView::from).collect(),
            can_escalate: session.turn_count() >= CAN_ESCALATE_MIN_TURNS
                && !session.is_escalated(),
        })
    }

    /// Returns the caller's tickets, newest first.
    pub async fn list_tickets(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<TicketView>, ChatError> {
        let tickets = self
            .store
            .list_tickets_by_user(user_id, limit)
            .await
            .map_err(ChatError::from)?;
        Ok(tickets.iter().map(TicketView::from).collect())
    }

    /// Returns the most-used active knowledge entries.
    ///
    /// Reads the store directly so the ranking reflects committed usage
    /// counts, not the cache's snapshot.
    pub async fn popular_entries(&self, limit: u32) -> Result<Vec<PopularEntry>, ChatError> {
        let entries = self
            .knowledge_store
            .top_by_usage(limit)
            .await
            .map_err(ChatError::from)?;
        Ok(entries.iter().map(PopularEntry::from).collect())
    }

    /// Reloads the knowledge cache. Returns the active entry count.
    pub async fn refresh_knowledge(&self) -> Result<usize, ChatError> {
        self.knowledge.refresh().await.map_err(ChatError::from)
    }

    fn session_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().unwrap();
        locks
            .entry(*session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Loads a session and checks ownership. Foreign sessions read as
    /// missing so the caller cannot probe for existence.
    async fn load_owned_session(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<SupportSession, ChatError> {
        let session = self
            .store
            .find_session(session_id)
            .await
            .map_err(ChatError::from)?
            .ok_or_else(|| ChatError::NotFound(format!("Session not found: {}", session_id)))?;

        if !session.is_owner(user_id) {
            return Err(ChatError::NotFound(format!(
                "Session not found: {}",
                session_id
            )));
        }
        Ok(session)
    }

    async fn load_ticket(&self, ticket_id: &TicketId) -> Result<SupportTicket, ChatError> {
        self.store
            .find_ticket(ticket_id)
            .await
            .map_err(ChatError::from)?
            .ok_or_else(|| ChatError::Processing(format!("Ticket missing: {}", ticket_id)))
    }
}

fn validate_message(text: &str) -> Result<&str, ChatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ChatError::Validation("Message cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ChatError::Validation(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(trimmed)
}

fn suggestions_for(session: &SupportSession) -> Vec<String> {
    if session.is_escalated() || session.turn_count() >= SUGGESTION_CUTOFF_TURN {
        Vec::new()
    } else {
        SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryKnowledgeStore, InMemorySupportStore, StaticAnswerProvider,
    };
    use crate::domain::foundation::{KnowledgeEntryId, MessageKind, SessionStatus, TicketStatus};
    use crate::domain::support::KnowledgeEntry;
    use crate::ports::ProviderError;

    fn password_entry() -> KnowledgeEntry {
        KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "account".to_string(),
            "How to reset password".to_string(),
            "Use the password recovery form in the control panel.".to_string(),
            "reset,password,forgot".to_string(),
            Some("https://faq.example.com/password".to_string()),
        )
        .unwrap()
    }

    struct Fixture {
        orchestrator: SessionOrchestrator,
        store: Arc<InMemorySupportStore>,
        knowledge: InMemoryKnowledgeStore,
        provider: Arc<StaticAnswerProvider>,
    }

    fn fixture_with(entries: Vec<KnowledgeEntry>, provider: StaticAnswerProvider) -> Fixture {
        let knowledge = InMemoryKnowledgeStore::with_entries(entries);
        let store = Arc::new(InMemorySupportStore::with_knowledge(knowledge.clone()));
        let provider = Arc::new(provider);
        let orchestrator = SessionOrchestrator::new(
            store.clone(),
            Arc::new(knowledge.clone()),
            provider.clone(),
            &ChatConfig::default(),
        );
        Fixture {
            orchestrator,
            store,
            knowledge,
            provider,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn start_session_creates_conversation() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f
            .orchestrator
            .start_session(&user(), "my website is down")
            .await
            .unwrap();
        assert_eq!(started.status, SessionStatus::Active);

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        // the opening message is ticket-level: it shows in the transcript
        // but does not count as a turn, so escalation is not yet offered
        assert_eq!(transcript.messages.len(), 1);
        assert_eq!(transcript.messages[0].kind, MessageKind::User);
        assert_eq!(transcript.messages[0].content, "my website is down");
        assert!(!transcript.can_escalate);
    }

    #[tokio::test]
    async fn start_session_rejects_empty_message() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let result = f.orchestrator.start_session(&user(), "   ").await;
        assert!(matches!(result, Err(ChatError::Validation(_))));
    }

    #[tokio::test]
    async fn strong_match_answers_from_knowledge_and_accounts_usage() {
        let entry = password_entry();
        let entry_id = *entry.id();
        let f = fixture_with(vec![entry], StaticAnswerProvider::always("generated"));

        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();
        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "I forgot my password")
            .await
            .unwrap();

        assert_eq!(response.knowledge_entry_id, Some(entry_id));
        assert!(response.message.starts_with("Use the password recovery form"));
        assert!(response.message.contains("https://faq.example.com/password"));
        assert!(!response.is_escalated);
        assert_eq!(response.questions_count, 1);
        // usage moved in the same commit
        assert_eq!(f.knowledge.get(&entry_id).unwrap().usage_count(), 1);
        // provider was never consulted
        assert!(f.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn unmatched_message_asks_provider() {
        let f = fixture_with(
            vec![password_entry()],
            StaticAnswerProvider::always("A generated answer."),
        );
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "something entirely unrelated")
            .await
            .unwrap();

        assert_eq!(response.message, "A generated answer.");
        assert!(response.knowledge_entry_id.is_none());
        assert_eq!(f.provider.calls(), vec!["something entirely unrelated"]);
    }

    #[tokio::test]
    async fn provider_failure_becomes_fallback_answer() {
        let f = fixture_with(vec![], StaticAnswerProvider::failing());
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "anything")
            .await
            .unwrap();

        assert_eq!(response.message, FALLBACK_ANSWER);
        assert!(!response.is_escalated);
        // the turn still committed
        assert_eq!(response.questions_count, 1);
    }

    #[tokio::test]
    async fn fifth_unresolved_turn_escalates() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("no idea"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        for turn in 1..=4u32 {
            let response = f
                .orchestrator
                .process_message(&started.session_id, &user(), "still broken")
                .await
                .unwrap();
            assert!(!response.is_escalated, "turn {} escalated early", turn);
        }

        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "still broken")
            .await
            .unwrap();

        assert!(response.is_escalated);
        assert_eq!(response.message, HANDOFF_ANSWER);
        assert!(response.suggestions.is_empty());

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        // opening message + 5 user turns + 5 bot answers
        assert_eq!(transcript.messages.len(), 11);

        let tickets = f.orchestrator.list_tickets(&user(), 10).await.unwrap();
        assert_eq!(tickets[0].status, TicketStatus::InProgress);
        // automatic escalation does not touch the priority
        assert_eq!(tickets[0].priority, TicketPriority::Low);
    }

    #[tokio::test]
    async fn strong_match_wins_even_past_turn_limit() {
        let entry = password_entry();
        let entry_id = *entry.id();
        let f = fixture_with(vec![entry], StaticAnswerProvider::always("no idea"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        for _ in 0..6 {
            f.orchestrator
                .process_message(&started.session_id, &user(), "unrelated gibberish")
                .await
                .unwrap();
        }

        // 7th turn, already escalated; a matching question still gets the
        // knowledge answer
        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "I forgot my password")
            .await
            .unwrap();
        assert_eq!(response.knowledge_entry_id, Some(entry_id));
    }

    #[tokio::test]
    async fn auto_escalation_touches_ticket_once() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("no idea"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let mut last = None;
        for _ in 0..7 {
            last = Some(
                f.orchestrator
                    .process_message(&started.session_id, &user(), "still broken")
                    .await
                    .unwrap(),
            );
        }
        // the hand-off answer repeats past the limit
        assert_eq!(last.unwrap().message, HANDOFF_ANSWER);

        let ticket = f
            .store
            .find_ticket(&started.ticket_id)
            .await
            .unwrap()
            .unwrap();
        // only the first escalating turn wrote to the ticket
        assert_eq!(ticket.description().matches("Escalation reason:").count(), 1);
        assert_eq!(ticket.priority(), TicketPriority::Low);
    }

    #[tokio::test]
    async fn later_turns_keep_manually_raised_priority() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("no idea"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        // the fifth unmatched turn escalates automatically
        for _ in 0..5 {
            f.orchestrator
                .process_message(&started.session_id, &user(), "still broken")
                .await
                .unwrap();
        }
        f.orchestrator
            .escalate(
                &started.session_id,
                &user(),
                Some("need a human now"),
                TicketPriority::High,
            )
            .await
            .unwrap();

        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "any news?")
            .await
            .unwrap();
        assert!(response.is_escalated);

        let tickets = f.orchestrator.list_tickets(&user(), 10).await.unwrap();
        assert_eq!(tickets[0].priority, TicketPriority::High);
    }

    #[tokio::test]
    async fn closed_session_rejects_messages() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        f.orchestrator
            .close(&started.session_id, &user(), None)
            .await
            .unwrap();

        let result = f
            .orchestrator
            .process_message(&started.session_id, &user(), "are you there")
            .await;
        assert!(matches!(result, Err(ChatError::InvalidState(_))));
    }

    #[tokio::test]
    async fn foreign_session_reads_as_missing() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let intruder = UserId::new("user-2").unwrap();
        let result = f
            .orchestrator
            .process_message(&started.session_id, &intruder, "hi")
            .await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let result = f
            .orchestrator
            .process_message(&SessionId::new(), &user(), "hi")
            .await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn manual_escalation_sets_reason_and_priority() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let response = f
            .orchestrator
            .escalate(
                &started.session_id,
                &user(),
                Some("the bot is not helping"),
                TicketPriority::High,
            )
            .await
            .unwrap();

        assert!(response.is_escalated);
        let tickets = f.orchestrator.list_tickets(&user(), 10).await.unwrap();
        assert_eq!(tickets[0].status, TicketStatus::InProgress);
        assert_eq!(tickets[0].priority, TicketPriority::High);

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        // opening message + hand-off answer
        assert_eq!(transcript.messages.len(), 2);
        assert_eq!(transcript.messages[1].kind, MessageKind::Bot);
    }

    #[tokio::test]
    async fn feedback_round_trips_and_is_idempotent() {
        let f = fixture_with(
            vec![password_entry()],
            StaticAnswerProvider::always("generated"),
        );
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();
        f.orchestrator
            .process_message(&started.session_id, &user(), "I forgot my password")
            .await
            .unwrap();

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        let bot_message = transcript
            .messages
            .iter()
            .find(|m| m.kind == MessageKind::Bot)
            .unwrap();

        f.orchestrator
            .record_feedback(&bot_message.id, true)
            .await
            .unwrap();
        f.orchestrator
            .record_feedback(&bot_message.id, true)
            .await
            .unwrap();

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        let bot_message = transcript
            .messages
            .iter()
            .find(|m| m.kind == MessageKind::Bot)
            .unwrap();
        assert_eq!(bot_message.is_helpful, Some(true));
    }

    #[tokio::test]
    async fn feedback_for_unknown_message_is_not_found() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let result = f.orchestrator.record_feedback(&MessageId::new(), true).await;
        assert!(matches!(result, Err(ChatError::NotFound(_))));
    }

    #[tokio::test]
    async fn close_records_satisfaction_and_is_terminal() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        let rating = SatisfactionRating::new(4).unwrap();
        f.orchestrator
            .close(&started.session_id, &user(), Some(rating))
            .await
            .unwrap();

        let result = f
            .orchestrator
            .close(&started.session_id, &user(), None)
            .await;
        assert!(matches!(result, Err(ChatError::InvalidState(_))));
    }

    #[tokio::test]
    async fn suggestions_stop_from_fourth_turn() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        for turn in 1..=3u32 {
            let response = f
                .orchestrator
                .process_message(&started.session_id, &user(), "question")
                .await
                .unwrap();
            assert!(
                !response.suggestions.is_empty(),
                "turn {} lost suggestions early",
                turn
            );
        }

        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "question")
            .await
            .unwrap();
        assert!(response.suggestions.is_empty());
    }

    #[tokio::test]
    async fn transcript_offers_escalation_after_three_turns() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        for _ in 0..3 {
            f.orchestrator
                .process_message(&started.session_id, &user(), "question")
                .await
                .unwrap();
        }

        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        assert!(transcript.can_escalate);

        f.orchestrator
            .escalate(&started.session_id, &user(), None, TicketPriority::Medium)
            .await
            .unwrap();
        let transcript = f
            .orchestrator
            .get_transcript(&started.session_id, &user())
            .await
            .unwrap();
        assert!(!transcript.can_escalate);
    }

    #[tokio::test]
    async fn escalated_session_status_reaches_waiting_operator() {
        let f = fixture_with(vec![], StaticAnswerProvider::always("generated"));
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        f.orchestrator
            .escalate(&started.session_id, &user(), None, TicketPriority::Medium)
            .await
            .unwrap();

        // further messages are still accepted while waiting
        let response = f
            .orchestrator
            .process_message(&started.session_id, &user(), "any update?")
            .await
            .unwrap();
        assert!(response.is_escalated);
        assert_eq!(
            f.orchestrator
                .get_transcript(&started.session_id, &user())
                .await
                .unwrap()
                .messages
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn popular_entries_rank_by_usage() {
        let common = password_entry();
        let rare = KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "domains".to_string(),
            "How to transfer domain".to_string(),
            "Unlock the domain and request a transfer code.".to_string(),
            "domain,transfer".to_string(),
            None,
        )
        .unwrap();
        let f = fixture_with(vec![common, rare], StaticAnswerProvider::always("generated"));

        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();
        for _ in 0..2 {
            f.orchestrator
                .process_message(&started.session_id, &user(), "I forgot my password")
                .await
                .unwrap();
        }

        let top = f.orchestrator.popular_entries(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].question, "How to reset password");
        assert_eq!(top[0].usage_count, 2);
    }

    #[tokio::test]
    async fn provider_errors_never_surface_to_caller() {
        let f = fixture_with(
            vec![],
            StaticAnswerProvider::scripted(vec![
                Err(ProviderError::Timeout { timeout_secs: 30 }),
                Err(ProviderError::EmptyCompletion),
            ]),
        );
        let started = f.orchestrator.start_session(&user(), "hello").await.unwrap();

        for _ in 0..2 {
            let response = f
                .orchestrator
                .process_message(&started.session_id, &user(), "question")
                .await
                .unwrap();
            assert_eq!(response.message, FALLBACK_ANSWER);
        }
    }
}
