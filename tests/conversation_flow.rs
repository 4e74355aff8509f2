//! End-to-end conversation flow over the in-memory adapters.
//!
//! Drives one support conversation from the opening message through
//! knowledge answers, generated answers, escalation, feedback, and close,
//! checking the externally observable state after each step.

use std::sync::Arc;

use support_desk::adapters::memory::{
    InMemoryKnowledgeStore, InMemorySupportStore, StaticAnswerProvider,
};
use support_desk::application::{ChatError, SessionOrchestrator};
use support_desk::config::ChatConfig;
use support_desk::domain::foundation::{
    KnowledgeEntryId, MessageKind, SatisfactionRating, TicketPriority, TicketStatus, UserId,
};
use support_desk::domain::support::KnowledgeEntry;

fn knowledge_base() -> InMemoryKnowledgeStore {
    let store = InMemoryKnowledgeStore::new();
    store.insert(
        KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "account".to_string(),
            "How to reset password".to_string(),
            "Use the password recovery form in the control panel.".to_string(),
            "reset,password,forgot".to_string(),
            Some("https://faq.example.com/password".to_string()),
        )
        .unwrap(),
    );
    store.insert(
        KnowledgeEntry::new(
            KnowledgeEntryId::new(),
            "domains".to_string(),
            "How to link a domain to hosting".to_string(),
            "Point the domain's NS records at our nameservers.".to_string(),
            "domain,nameserver,link".to_string(),
            None,
        )
        .unwrap(),
    );
    store
}

fn orchestrator(
    knowledge: InMemoryKnowledgeStore,
    provider: StaticAnswerProvider,
) -> SessionOrchestrator {
    let store = Arc::new(InMemorySupportStore::with_knowledge(knowledge.clone()));
    SessionOrchestrator::new(
        store,
        Arc::new(knowledge),
        Arc::new(provider),
        &ChatConfig::default(),
    )
}

#[tokio::test]
async fn full_conversation_lifecycle() {
    let knowledge = knowledge_base();
    let orchestrator = orchestrator(
        knowledge.clone(),
        StaticAnswerProvider::always("You can check the service status page."),
    );
    let user = UserId::new("customer-42").unwrap();

    // open the conversation
    let started = orchestrator
        .start_session(&user, "I cannot get into my hosting account")
        .await
        .unwrap();

    let tickets = orchestrator.list_tickets(&user, 10).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].status, TicketStatus::Open);
    assert!(tickets[0].title.starts_with("Support: "));

    // a question the knowledge base covers
    let response = orchestrator
        .process_message(&started.session_id, &user, "I forgot my password")
        .await
        .unwrap();
    assert!(response.knowledge_entry_id.is_some());
    assert!(response
        .message
        .starts_with("Use the password recovery form"));
    assert_eq!(response.questions_count, 1);

    // a question it does not cover goes to the provider
    let response = orchestrator
        .process_message(&started.session_id, &user, "is there an outage right now")
        .await
        .unwrap();
    assert!(response.knowledge_entry_id.is_none());
    assert_eq!(response.message, "You can check the service status page.");

    // feedback on the knowledge answer
    let transcript = orchestrator
        .get_transcript(&started.session_id, &user)
        .await
        .unwrap();
    // the transcript starts with the conversation's opening message
    assert_eq!(
        transcript.messages[0].content,
        "I cannot get into my hosting account"
    );
    let knowledge_answer = transcript
        .messages
        .iter()
        .find(|m| m.kind == MessageKind::Bot && m.knowledge_entry_id.is_some())
        .unwrap();
    orchestrator
        .record_feedback(&knowledge_answer.id, true)
        .await
        .unwrap();

    // close with a rating; the session is then terminal
    orchestrator
        .close(
            &started.session_id,
            &user,
            Some(SatisfactionRating::new(5).unwrap()),
        )
        .await
        .unwrap();
    let result = orchestrator
        .process_message(&started.session_id, &user, "one more thing")
        .await;
    assert!(matches!(result, Err(ChatError::InvalidState(_))));

    // the matched entry's usage survived the whole flow
    let popular = orchestrator.popular_entries(5).await.unwrap();
    assert_eq!(popular[0].usage_count, 1);
    assert_eq!(popular[0].category, "account");
}

#[tokio::test]
async fn stuck_conversation_escalates_to_operator() {
    let orchestrator = orchestrator(
        InMemoryKnowledgeStore::new(),
        StaticAnswerProvider::always("I am not sure about that."),
    );
    let user = UserId::new("customer-7").unwrap();

    let started = orchestrator
        .start_session(&user, "something is very wrong")
        .await
        .unwrap();

    let mut last = None;
    for _ in 0..5 {
        last = Some(
            orchestrator
                .process_message(&started.session_id, &user, "it is still broken")
                .await
                .unwrap(),
        );
    }
    let last = last.unwrap();
    assert!(last.is_escalated);
    assert!(last.suggestions.is_empty());

    let tickets = orchestrator.list_tickets(&user, 10).await.unwrap();
    assert_eq!(tickets[0].status, TicketStatus::InProgress);
    // automatic escalation flips the status but leaves the priority alone
    assert_eq!(tickets[0].priority, TicketPriority::Low);

    // escalated sessions still accept messages for the operator to read
    let response = orchestrator
        .process_message(&started.session_id, &user, "please hurry")
        .await
        .unwrap();
    assert!(response.is_escalated);
}

#[tokio::test]
async fn concurrent_turns_on_one_session_serialize() {
    let orchestrator = Arc::new(orchestrator(
        InMemoryKnowledgeStore::new(),
        StaticAnswerProvider::always("generated"),
    ));
    let user = UserId::new("customer-9").unwrap();
    let started = orchestrator
        .start_session(&user, "hello")
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let orchestrator = Arc::clone(&orchestrator);
        let user = user.clone();
        let session_id = started.session_id;
        handles.push(tokio::spawn(async move {
            orchestrator
                .process_message(&session_id, &user, &format!("question {}", i))
                .await
        }));
    }

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap().questions_count);
    }
    counts.sort_unstable();

    // every turn saw a distinct counter value: no lost updates
    assert_eq!(counts, (1..=8).collect::<Vec<u32>>());
}
