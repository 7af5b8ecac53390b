//! In-process stand-in for the helpdesk backend.
//!
//! Serves just enough of the REST surface for the client flows and records
//! every request it receives, in order.

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use shared::config::ClientConfig;
use std::sync::{Arc, Mutex};
use tokio::{net::TcpListener, sync::Notify};
use url::Url;

/// Raw cookie value set by the CSRF endpoint; decodes to [`CSRF_TOKEN`].
pub const CSRF_COOKIE_VALUE: &str = "tok%2Ben%3D%3D";
pub const CSRF_TOKEN: &str = "tok+en==";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub csrf: Option<String>,
    pub content_type: Option<String>,
}

/// Ticket sub-actions answered with a plain message.
const TICKET_ACTIONS: [&str; 5] = ["status", "assign", "unassign", "close", "resolve"];

/// Behaviour switches for one mock backend.
#[derive(Debug, Clone)]
pub struct Behaviour {
    /// User returned by `/api/user` once logged in.
    pub login_user: Value,
    /// The CSRF endpoint answers 500.
    pub csrf_fails: bool,
    /// The CSRF endpoint answers 204 without setting the cookie.
    pub withhold_csrf_cookie: bool,
    pub logout_fails: bool,
    pub unread_count: Value,
    /// The unread-count endpoint waits for [`MockBackend::release_unread_count`].
    pub hold_unread_count: bool,
    pub tickets: Vec<Value>,
    pub notifications: Vec<Value>,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            login_user: json!({
                "id": 7,
                "name": "Sue Pervisor",
                "email": "sue@example.com",
                "user_type": "supervisor",
                "department": "IT"
            }),
            csrf_fails: false,
            withhold_csrf_cookie: false,
            logout_fails: false,
            unread_count: json!(0),
            hold_unread_count: false,
            tickets: vec![
                json!({ "id": 1, "title": "Printer jammed", "status": "open" }),
                json!({ "id": 2, "title": "VPN down", "status": "open" }),
                json!({ "id": 3, "title": "New laptop", "status": "closed" }),
            ],
            notifications: vec![
                json!({ "id": "n1", "type": "ticket.assigned", "data": { "ticket_id": 2 } }),
                json!({ "id": "n2", "data": {}, "read_at": "2024-01-02 03:04:05" }),
                json!({ "id": 3, "data": { "ticket_id": 1 }, "read_at": null }),
            ],
        }
    }
}

#[derive(Debug)]
struct Mock {
    behaviour: Behaviour,
    log: Mutex<Vec<Recorded>>,
    user: Mutex<Option<Value>>,
    unread_gate: Notify,
}

/// Handle to a running mock backend.
#[derive(Debug, Clone)]
pub struct MockBackend {
    base_url: Url,
    mock: Arc<Mock>,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self::with(Behaviour::default()).await
    }

    pub async fn with(behaviour: Behaviour) -> Self {
        let mock = Arc::new(Mock {
            behaviour,
            log: Mutex::new(Vec::new()),
            user: Mutex::new(None),
            unread_gate: Notify::new(),
        });
        let app = Router::new().fallback(handle).with_state(mock.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            mock,
        }
    }

    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_defaults();
        config.base_url = self.base_url.clone();
        config
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.mock.log.lock().unwrap().clone()
    }

    /// `METHOD /path` lines, in arrival order.
    pub fn request_lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    /// Start with an authenticated backend session.
    pub fn sign_in(&self) {
        *self.mock.user.lock().unwrap() = Some(self.mock.behaviour.login_user.clone());
    }

    pub fn clear_log(&self) {
        self.mock.log.lock().unwrap().clear();
    }

    /// Let a held unread-count request answer.
    pub fn release_unread_count(&self) {
        self.mock.unread_gate.notify_one();
    }
}

fn header_string(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn handle(
    State(mock): State<Arc<Mock>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    _body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let csrf = header_string(&headers, "x-xsrf-token");
    mock.log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        csrf: csrf.clone(),
        content_type: header_string(&headers, header::CONTENT_TYPE),
    });

    let behaviour = &mock.behaviour;
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    if method == Method::GET && path == "/sanctum/csrf-cookie" {
        if behaviour.csrf_fails {
            return (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response();
        }
        let mut response = StatusCode::NO_CONTENT.into_response();
        if !behaviour.withhold_csrf_cookie {
            let cookie = format!("XSRF-TOKEN={CSRF_COOKIE_VALUE}; Path=/");
            response
                .headers_mut()
                .append(header::SET_COOKIE, cookie.parse().unwrap());
        }
        response.headers_mut().append(
            header::SET_COOKIE,
            "helpdesk_session=s3ss10n; Path=/; HttpOnly".parse().unwrap(),
        );
        return response;
    }

    if method != Method::GET && csrf.as_deref() != Some(CSRF_TOKEN) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "CSRF token mismatch." })),
        )
            .into_response();
    }

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "login"]) => {
            *mock.user.lock().unwrap() = Some(behaviour.login_user.clone());
            Json(json!({ "message": "Logged in" })).into_response()
        }
        ("POST", ["api", "register"]) => {
            *mock.user.lock().unwrap() = Some(behaviour.login_user.clone());
            (
                StatusCode::CREATED,
                Json(json!({ "message": "Registered" })),
            )
                .into_response()
        }
        ("POST", ["api", "logout"]) => {
            if behaviour.logout_fails {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Server Error" })),
                )
                    .into_response();
            }
            *mock.user.lock().unwrap() = None;
            StatusCode::NO_CONTENT.into_response()
        }
        ("GET", ["api", "user"]) => match mock.user.lock().unwrap().clone() {
            Some(user) => Json(user).into_response(),
            None => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Unauthenticated." })),
            )
                .into_response(),
        },
        ("GET", ["api", "users"]) => Json(json!([
            { "id": 7, "name": "Sue Pervisor", "email": "sue@example.com", "role": "supervisor" },
            { "id": 12, "name": "Tec Nician", "email": "tec@example.com", "role": "technician" }
        ]))
        .into_response(),
        ("GET", ["api", "notifications", "unread-count"]) => {
            if behaviour.hold_unread_count {
                mock.unread_gate.notified().await;
            }
            Json(behaviour.unread_count.clone()).into_response()
        }
        ("GET", ["api", "notifications"]) => {
            Json(json!({ "data": behaviour.notifications })).into_response()
        }
        ("POST", ["api", "notifications", "read-all"]) => {
            Json(json!({ "message": "All notifications marked as read" })).into_response()
        }
        ("POST", ["api", "notifications", _, "read"]) => {
            Json(json!({ "message": "Notification marked as read" })).into_response()
        }
        ("GET", ["api", "admin", "users"]) => Json(json!({
            "data": [
                { "id": 7, "name": "Sue Pervisor", "user_type": "supervisor" },
                { "id": 12, "name": "Tec Nician", "role": "technician" }
            ]
        }))
        .into_response(),
        ("GET", ["api", "admin", "permissions"]) => Json(json!([
            { "id": 1, "name": "tickets.view" },
            { "id": 2, "name": "tickets.delete" }
        ]))
        .into_response(),
        ("POST", ["api", "admin", "users", _, "roles-permissions"]) => {
            Json(json!({ "message": "Permissions updated" })).into_response()
        }
        ("GET", ["api", "categories"]) => Json(json!([
            { "id": 1, "name": "Hardware" },
            { "id": 2, "name": "Network" },
            { "id": 3, "name": "Accounts" }
        ]))
        .into_response(),
        ("PUT", ["api", "categories", id]) => Json(json!({
            "data": { "id": id.parse::<u64>().unwrap(), "name": "Networking" }
        }))
        .into_response(),
        ("DELETE", ["api", "categories", _]) => StatusCode::NO_CONTENT.into_response(),
        ("GET", ["api", "tickets"]) => Json(json!({
            "current_page": 1,
            "data": behaviour.tickets,
            "total": behaviour.tickets.len()
        }))
        .into_response(),
        ("GET", ["api", "tickets", id]) => behaviour
            .tickets
            .iter()
            .find(|ticket| ticket["id"].to_string() == *id)
            .map_or_else(
                || StatusCode::NOT_FOUND.into_response(),
                |ticket| Json(json!({ "data": ticket })).into_response(),
            ),
        ("DELETE", ["api", "tickets", _]) => StatusCode::NO_CONTENT.into_response(),
        ("PATCH", ["api", "tickets", _, action]) if TICKET_ACTIONS.contains(action) => {
            Json(json!({ "message": "Updated" })).into_response()
        }
        ("POST", ["api", "tickets", _, "attachments"]) => (
            StatusCode::CREATED,
            Json(json!({ "data": { "id": 11, "file_name": "trace.log" } })),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Not Found" })),
        )
            .into_response(),
    }
}
