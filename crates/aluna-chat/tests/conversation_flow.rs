//! End-to-end conversation flow against a scripted backend.

use std::sync::Arc;
use std::time::Duration;

use aluna_backend::{BackendError, MockBackend};
use aluna_chat::{ChatEvent, ChatSession, ExchangeConfig};
use aluna_core::{CompanyInfo, Sender};

fn backend() -> MockBackend {
    MockBackend::new()
        .with_company(CompanyInfo {
            company_name: "MSBC Group".to_string(),
            company_url: "https://msbcgroup.example".to_string(),
            persona: "Happy Helper".to_string(),
            customer_name: "Mr. Parker".to_string(),
            logo_id: None,
        })
        // Every ask takes 400ms, so the 300ms placeholder shows first.
        .with_latency(Duration::from_millis(400))
        .with_answer("Bulk orders ship in batches of 50.")
        .with_ask_error(BackendError::Network("connection reset".to_string()))
        .with_answer("You can escalate through our support team.")
}

async fn wait_for(
    events: &mut tokio::sync::broadcast::Receiver<ChatEvent>,
    want: impl Fn(&ChatEvent) -> bool,
) -> ChatEvent {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if want(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event did not arrive")
}

#[tokio::test(start_paused = true)]
async fn test_conversation_survives_cancel_and_failure() {
    let mut session = ChatSession::open(
        Arc::new(backend()),
        "msbc_group",
        ExchangeConfig::default(),
        true,
    )
    .await
    .unwrap();
    let mut events = session.subscribe();

    // Turn 1: normal question and answer, placeholder settled in place.
    let turn = session.submit("What's the batch size of bulk order?").unwrap();
    wait_for(&mut events, |e| {
        matches!(e, ChatEvent::TurnCompleted { turn: t } if *t == turn)
    })
    .await;
    assert_eq!(session.messages().len(), 2);
    assert_eq!(
        session.messages()[1].text,
        "Bulk orders ship in batches of 50."
    );

    // Turn 2: cancelled before the placeholder delay elapses. Only the
    // user's message survives, and the abandoned request never lands.
    let turn = session.submit("Never mind this one").unwrap();
    session.cancel();
    wait_for(&mut events, |e| {
        matches!(e, ChatEvent::TurnCancelled { turn: t } if *t == turn)
    })
    .await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.messages().len(), 3);
    assert_eq!(session.messages()[2].text, "Never mind this one");
    assert!(!session.is_processing());

    // Turn 3: backend failure. The placeholder is rolled back and the
    // failure is surfaced as a notification event.
    let turn = session.submit("Are you still there?").unwrap();
    let failed = wait_for(&mut events, |e| {
        matches!(e, ChatEvent::TurnFailed { turn: t, .. } if *t == turn)
    })
    .await;
    match failed {
        ChatEvent::TurnFailed { message, .. } => {
            assert!(message.contains("connection reset"));
        }
        _ => unreachable!(),
    }
    assert_eq!(session.messages().len(), 4);
    assert!(!session.is_processing());

    // Turn 4: the session recovers and completes normally.
    let turn = session.submit("How do I escalate an issue?").unwrap();
    wait_for(&mut events, |e| {
        matches!(e, ChatEvent::TurnCompleted { turn: t } if *t == turn)
    })
    .await;

    let messages = session.messages();
    let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "What's the batch size of bulk order?",
            "Bulk orders ship in batches of 50.",
            "Never mind this one",
            "Are you still there?",
            "How do I escalate an issue?",
            "You can escalate through our support team.",
        ]
    );
    assert!(messages.iter().all(|m| !m.pending));
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[5].sender, Sender::Assistant);
}

#[tokio::test(start_paused = true)]
async fn test_voice_and_typed_input_are_mutually_exclusive() {
    let backend = MockBackend::stalled().with_company(CompanyInfo {
        company_name: "MSBC Group".to_string(),
        ..CompanyInfo::default()
    });
    let mut session = ChatSession::open(
        Arc::new(backend),
        "msbc_group",
        ExchangeConfig::default(),
        true,
    )
    .await
    .unwrap();

    // While a turn is in flight, listening cannot start and further
    // submissions of either kind are rejected.
    session.submit("first").unwrap();
    assert!(session.start_listening().is_err());
    assert!(session.submit("second").is_err());
    assert_eq!(session.messages().len(), 1);
}
