//! Poll cycle integration tests
//!
//! Drives the real Practicum client and Telegram notifier against local mock
//! servers and checks what actually goes over the wire.

use std::sync::Arc;
use std::time::Duration;

use homework_bot::config::{PracticumConfig, TelegramConfig};
use homework_bot::error::{DeliveryError, FetchError, MAX_ERROR_TEXT_CHARS};
use homework_bot::homework::failure_message;
use homework_bot::notify::{Notifier, TelegramNotifier};
use homework_bot::poller::{CycleOutcome, LoopState, Poller, PollerConfig};
use homework_bot::practicum::{PracticumClient, StatusSource};
use httpmock::prelude::*;
use serde_json::json;

const APPROVED_MESSAGE: &str =
    "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

fn practicum(server: &MockServer) -> PracticumClient {
    let config = PracticumConfig {
        endpoint: server.url("/api/user_api/homework_statuses/"),
        timeout_secs: 5,
    };
    PracticumClient::new("p-token", &config).unwrap()
}

fn telegram(server: &MockServer) -> TelegramNotifier {
    let config = TelegramConfig {
        api_base: server.base_url(),
        timeout_secs: 5,
    };
    TelegramNotifier::new("t-token", "42", &config).unwrap()
}

/// Integration test: client sends the OAuth header and from_date query
#[tokio::test]
async fn test_fetch_sends_auth_and_from_date() {
    let server = MockServer::start();
    let statuses = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user_api/homework_statuses/")
            .header("authorization", "OAuth p-token")
            .query_param("from_date", "1700000000");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({"homeworks": [], "current_date": 1700000600}));
    });

    let response = practicum(&server).fetch(Some(1_700_000_000)).await.unwrap();

    statuses.assert_calls(1);
    assert_eq!(response["current_date"], 1700000600);
}

/// Integration test: non-2xx status is a fetch error
#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/user_api/homework_statuses/");
        then.status(503).body("maintenance");
    });

    let err = practicum(&server).fetch(Some(0)).await.unwrap_err();
    assert_eq!(err.to_string(), "Endpoint returned status 503");

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Integration test: a huge error page is cut down before it is kept
#[tokio::test]
async fn test_fetch_error_body_is_truncated() {
    let server = MockServer::start();
    let page = format!("<html>{}</html>", "x".repeat(10_000));
    server.mock(|when, then| {
        when.method(GET).path("/api/user_api/homework_statuses/");
        then.status(502).body(page.as_str());
    });

    let err = practicum(&server).fetch(Some(0)).await.unwrap_err();

    match err {
        FetchError::Status { body, .. } => assert!(body.chars().count() <= MAX_ERROR_TEXT_CHARS + 3),
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Integration test: a body that is not JSON is a fetch error
#[tokio::test]
async fn test_fetch_malformed_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/user_api/homework_statuses/");
        then.status(200).body("<html>not json</html>");
    });

    let err = practicum(&server).fetch(Some(0)).await.unwrap_err();
    assert!(matches!(err, FetchError::Body(_)));
}

/// Integration test: notifier posts chat id and text to sendMessage
#[tokio::test]
async fn test_telegram_send_message() {
    let server = MockServer::start();
    let sent = server.mock(|when, then| {
        when.method(POST)
            .path("/bott-token/sendMessage")
            .json_body(json!({"chat_id": "42", "text": "hello"}));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{"message_id":7}}"#);
    });

    telegram(&server).send("hello").await.unwrap();
    sent.assert_calls(1);
}

/// Integration test: Telegram error replies become delivery errors
#[tokio::test]
async fn test_telegram_rejection() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/bott-token/sendMessage");
        then.status(400)
            .header("content-type", "application/json")
            .body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#);
    });

    let err = telegram(&server).send("hello").await.unwrap_err();

    match err {
        DeliveryError::Rejected { status, description } => {
            assert_eq!(status, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Integration test: a Telegram timeout does not expose the bot token
#[tokio::test]
async fn test_telegram_transport_error_hides_token() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/bot123456:SECRET-BOT-TOKEN/sendMessage");
        then.status(200)
            .delay(Duration::from_secs(3))
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{"message_id":1}}"#);
    });
    let config = TelegramConfig {
        api_base: server.base_url(),
        timeout_secs: 1,
    };
    let notifier = TelegramNotifier::new("123456:SECRET-BOT-TOKEN", "42", &config).unwrap();

    let err = notifier.send("hello").await.unwrap_err();

    assert!(matches!(err, DeliveryError::Transport(_)));
    let announced = failure_message(&err);
    assert!(!announced.contains("SECRET-BOT-TOKEN"), "{}", announced);
    assert!(!format!("{:?}", err).contains("SECRET-BOT-TOKEN"));
}

/// Integration test: full cycle from status change to chat message
#[tokio::test]
async fn test_cycle_end_to_end() {
    let practicum_server = MockServer::start();
    let telegram_server = MockServer::start();

    let statuses = practicum_server.mock(|when, then| {
        when.method(GET)
            .path("/api/user_api/homework_statuses/")
            .query_param("from_date", "1699999400");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "homeworks": [{"homework_name": "hw1", "status": "approved"}],
                "current_date": 1700000600
            }));
    });
    let sent = telegram_server.mock(|when, then| {
        when.method(POST)
            .path("/bott-token/sendMessage")
            .json_body(json!({"chat_id": "42", "text": APPROVED_MESSAGE}));
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{"message_id":1}}"#);
    });

    let mut poller = Poller::with_state(
        Arc::new(practicum(&practicum_server)),
        Arc::new(telegram(&telegram_server)),
        PollerConfig::default(),
        LoopState::new(1_700_000_000),
    );

    let outcome = poller.run_cycle().await;

    assert_eq!(outcome, CycleOutcome::Notified(APPROVED_MESSAGE.to_string()));
    statuses.assert_calls(1);
    sent.assert_calls(1);
    assert_eq!(poller.state().resume_marker, 1_700_000_600);
}

/// Integration test: a persistent outage is announced only once
#[tokio::test]
async fn test_outage_announced_once() {
    let practicum_server = MockServer::start();
    let telegram_server = MockServer::start();

    practicum_server.mock(|when, then| {
        when.method(GET).path("/api/user_api/homework_statuses/");
        then.status(500).body("boom");
    });
    let sent = telegram_server.mock(|when, then| {
        when.method(POST).path("/bott-token/sendMessage");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"ok":true,"result":{"message_id":1}}"#);
    });

    let mut poller = Poller::with_state(
        Arc::new(practicum(&practicum_server)),
        Arc::new(telegram(&telegram_server)),
        PollerConfig::default(),
        LoopState::new(1_700_000_000),
    );

    let first = poller.run_cycle().await;
    let second = poller.run_cycle().await;

    assert!(matches!(first, CycleOutcome::Failed { announced: true, .. }));
    assert!(matches!(second, CycleOutcome::Failed { announced: false, .. }));
    sent.assert_calls(1);
    assert_eq!(poller.state().resume_marker, 1_700_000_000);
}

/// Integration test: Telegram outage does not stop the loop
#[tokio::test]
async fn test_delivery_failure_is_absorbed() {
    let practicum_server = MockServer::start();
    let telegram_server = MockServer::start();

    practicum_server.mock(|when, then| {
        when.method(GET).path("/api/user_api/homework_statuses/");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "homeworks": [{"homework_name": "hw1", "status": "reviewing"}],
                "current_date": 1700000600
            }));
    });
    let failing = telegram_server.mock(|when, then| {
        when.method(POST).path("/bott-token/sendMessage");
        then.status(502).body("bad gateway");
    });

    let mut poller = Poller::with_state(
        Arc::new(practicum(&practicum_server)),
        Arc::new(telegram(&telegram_server)),
        PollerConfig::default(),
        LoopState::new(1_700_000_000),
    );

    let outcome = poller.run_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Failed { announced: true, .. }));
    // Status message plus the failed failure announcement
    failing.assert_calls(2);
    assert!(poller.state().last_notified.is_none());
}
