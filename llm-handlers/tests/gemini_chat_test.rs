//! Tests for [`llm_handlers::GeminiChat`]: history reconstruction and write-after-success.

mod common;

use std::sync::Arc;

use common::{memory_repo, LlmBehavior, MockLlm};
use dbot_core::{DbotError, HandlerError};
use llm_handlers::{GeminiChat, NO_RESPONSE_PLACEHOLDER};
use prompt::{ChatPart, TurnRole};
use storage::{Role, UserTurn};

/// **Test: Stored turns follow the 10 seed turns, with file parts as file references.**
#[tokio::test]
async fn test_history_starts_with_seed_then_stored_turns() {
    let repo = memory_repo().await;
    repo.append_exchange(
        5,
        &UserTurn::text("see this").with_file("image/png", "https://files/1"),
        "I see it",
    )
    .await
    .unwrap();

    let chat = GeminiChat::new(repo, Arc::new(MockLlm::replying("x")), String::new());
    let history = chat.build_history(5).await.unwrap();

    assert_eq!(history.len(), 12);
    assert_eq!(history[0].text(), "Hi there");
    assert_eq!(history[10].role, TurnRole::User);
    assert_eq!(
        history[10].parts,
        vec![
            ChatPart::file("image/png", "https://files/1"),
            ChatPart::text("see this")
        ]
    );
    assert_eq!(history[11].role, TurnRole::Model);
    assert_eq!(history[11].text(), "I see it");
}

/// **Test: A successful call stores the user turn then the model turn.**
#[tokio::test]
async fn test_success_persists_exchange() {
    let repo = memory_repo().await;
    let llm = Arc::new(MockLlm::replying("Hey!"));
    let chat = GeminiChat::new(repo.clone(), llm.clone(), "Hi {name}".to_string());

    let reply = chat
        .get_response(1, "Bob", &UserTurn::text("hello"))
        .await
        .unwrap();

    assert!(reply.generated);
    assert_eq!(reply.text, "Hey!");
    let (system_prompt, _, message) = llm.last_request().unwrap();
    assert_eq!(system_prompt, "Hi Bob");
    assert_eq!(message.text(), "hello");

    let turns = repo.get_recent_turns(1).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Model);
    assert_eq!(turns[1].text(), "Hey!");
}

/// **Test: A vendor failure persists neither the user nor the model turn.**
#[tokio::test]
async fn test_vendor_failure_persists_nothing() {
    let repo = memory_repo().await;
    let chat = GeminiChat::new(
        repo.clone(),
        Arc::new(MockLlm::new(LlmBehavior::Fail("timeout".to_string()))),
        String::new(),
    );

    let err = chat
        .get_response(1, "Bob", &UserTurn::text("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, DbotError::Llm(_)));
    assert!(repo.get_recent_turns(1).await.unwrap().is_empty());
}

/// **Test: An empty answer stores the placeholder and reports generated = false.**
#[tokio::test]
async fn test_empty_answer_stores_placeholder() {
    let repo = memory_repo().await;
    let chat = GeminiChat::new(repo.clone(), Arc::new(MockLlm::replying("")), String::new());

    let reply = chat
        .get_response(1, "Bob", &UserTurn::text("hello"))
        .await
        .unwrap();

    assert!(!reply.generated);
    let latest = repo.get_latest_turn(1).await.unwrap().unwrap();
    assert_eq!(latest.text(), NO_RESPONSE_PLACEHOLDER);
}

/// **Test: Empty input is rejected before any model call.**
#[tokio::test]
async fn test_empty_input_rejected() {
    let llm = Arc::new(MockLlm::replying("x"));
    let chat = GeminiChat::new(memory_repo().await, llm.clone(), String::new());

    let err = chat
        .get_response(1, "Bob", &UserTurn::text("  "))
        .await
        .unwrap_err();

    assert!(matches!(err, DbotError::Handler(HandlerError::EmptyContent)));
    assert_eq!(llm.generate_count(), 0);
}
