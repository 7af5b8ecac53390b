//! CSRF priming and token attachment against the mock backend.

mod common;

use client::{
    ErrorKind, Helpdesk,
    csrf::CsrfManager,
    http::{ApiClient, RequestOptions},
};
use common::{Behaviour, CSRF_TOKEN, MockBackend};
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_priming_precedes_token_bearing_request() {
    let backend = MockBackend::start().await;
    let helpdesk = Helpdesk::new(&backend.config()).unwrap();

    helpdesk.tickets().change_status(2, "in_progress").await.unwrap();

    let requests = backend.requests();
    assert_eq!(
        backend.request_lines()[..2],
        [
            "GET /sanctum/csrf-cookie".to_string(),
            "PATCH /api/tickets/2/status".to_string()
        ]
    );
    assert_eq!(requests[0].csrf, None);
    assert_eq!(requests[1].csrf.as_deref(), Some(CSRF_TOKEN));
}

#[tokio::test]
async fn test_read_token_after_priming_is_decoded() {
    let backend = MockBackend::start().await;
    let config = backend.config();
    let api = ApiClient::new(&config).unwrap();
    let csrf = CsrfManager::new(api, &config);

    assert!(csrf.read_csrf_token().is_missing());
    let token = csrf.prepare().await.unwrap();
    assert_eq!(token.value(), Some(CSRF_TOKEN));
    assert_eq!(csrf.read_csrf_token(), token);
}

#[tokio::test]
async fn test_failed_priming_sends_nothing_else() {
    let backend = MockBackend::with(Behaviour {
        csrf_fails: true,
        ..Behaviour::default()
    })
    .await;
    let helpdesk = Helpdesk::new(&backend.config()).unwrap();

    let err = helpdesk.tickets().delete_ticket(1).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(backend.request_lines(), vec!["GET /sanctum/csrf-cookie"]);
    assert_eq!(
        helpdesk.tickets().snapshot().error.as_deref(),
        Some("Failed to delete ticket #1")
    );
}

#[tokio::test]
async fn test_missing_cookie_still_sends_and_surfaces_rejection() {
    let backend = MockBackend::with(Behaviour {
        withhold_csrf_cookie: true,
        ..Behaviour::default()
    })
    .await;
    let helpdesk = Helpdesk::new(&backend.config()).unwrap();

    let err = helpdesk
        .categories()
        .create_category(&json!({ "name": "Hardware" }))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert!(err.is_auth_failure());
    assert_eq!(err.backend_message().as_deref(), Some("CSRF token mismatch."));

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].path, "/api/categories");
    assert_eq!(requests[1].csrf, None);
    assert_eq!(
        helpdesk.categories().snapshot().error.as_deref(),
        Some("CSRF token mismatch.")
    );
}

#[tokio::test]
async fn test_reads_are_not_primed() {
    let backend = MockBackend::start().await;
    let api = ApiClient::new(&backend.config()).unwrap();

    let response = api
        .get(
            "/api/tickets",
            RequestOptions::new().query([("status", "open"), ("page", "2")]),
        )
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("status=open&page=2"));
}

#[tokio::test]
async fn test_every_mutation_is_primed_separately() {
    let backend = MockBackend::start().await;
    let helpdesk = Helpdesk::new(&backend.config()).unwrap();

    helpdesk.tickets().delete_ticket(1).await.unwrap();
    helpdesk.tickets().delete_ticket(2).await.unwrap();

    assert_eq!(
        backend.request_lines(),
        vec![
            "GET /sanctum/csrf-cookie",
            "DELETE /api/tickets/1",
            "GET /sanctum/csrf-cookie",
            "DELETE /api/tickets/2",
        ]
    );
}
