//! Shared HTTP transport for every backend call.
//!
//! One [`ApiClient`] owns the cookie jar, so the session cookie and the CSRF
//! cookie set by the backend travel with every later request.

use reqwest::{
    Client, Method, StatusCode,
    cookie::{CookieStore, Jar},
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    multipart::Form,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use shared::config::ClientConfig;
use std::{sync::Arc, time::Duration};
use tracing::{debug, error};
use url::Url;

use crate::error::{ClientError, ClientResult};

const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Body attached to an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Serialized as `application/json`.
    Json(Value),
    /// Sent as `multipart/form-data`; never JSON-serialized.
    Multipart(Form),
}

/// Per-request additions on top of the client defaults.
#[derive(Debug, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: RequestBody,
}

impl RequestOptions {
    /// No query, no extra headers, no body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns [`ClientError::Decode`] if `body` cannot be represented as JSON.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart form.
    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    /// Append query parameters.
    #[must_use]
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Set one header, replacing any earlier value for `name`.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Headers added so far.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Query parameters added so far.
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// The attached body.
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// A successful backend answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Status of the answer, always below 400.
    pub status: StatusCode,
    /// Parsed JSON body; `Null` when empty, a JSON string when not JSON.
    pub data: Value,
}

impl ApiResponse {
    /// Decode the body into `T`.
    ///
    /// # Errors
    /// Returns [`ClientError::Decode`] when the body has a different shape.
    pub fn json<T: DeserializeOwned>(self) -> ClientResult<T> {
        Ok(serde_json::from_value(self.data)?)
    }
}

/// Credentialed JSON client bound to one backend origin.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    jar: Arc<Jar>,
}

impl ApiClient {
    /// Create a client with an empty cookie jar.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Create a client sharing an existing cookie jar, e.g. one restored from disk.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_jar(config: &ClientConfig, jar: Arc<Jar>) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));

        let mut builder = Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(headers)
            .user_agent(concat!("helpdesk-client/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: with_trailing_slash(&config.base_url),
            client: builder.build()?,
            jar,
        })
    }

    /// Backend origin, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The cookie jar shared with every clone of this client.
    #[must_use]
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }

    /// The `Cookie` header the jar would send to the backend origin.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Resolve `path` against the backend origin.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidUrl`] when the path cannot be joined.
    pub fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn get(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.send(Method::GET, path, options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn post(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.send(Method::POST, path, options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn put(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.send(Method::PUT, path, options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn patch(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.send(Method::PATCH, path, options).await
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str, options: RequestOptions) -> ClientResult<ApiResponse> {
        self.send(Method::DELETE, path, options).await
    }

    /// Issue one request and map the answer.
    ///
    /// Failed responses are logged with their status and body before the
    /// error is returned. Nothing is retried.
    ///
    /// # Errors
    /// [`ClientError::Network`] when no response arrives,
    /// [`ClientError::Status`] for statuses of 400 and above.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        let url = self.url(path)?;
        let RequestOptions {
            query,
            headers,
            body,
        } = options;

        debug!(method = %method, url = %url, "sending request");

        let mut request = self.client.request(method.clone(), url.clone()).headers(headers);
        if !query.is_empty() {
            request = request.query(&query);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(&value),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                error!(method = %method, url = %url, error = %err, "API error: no response");
                return Err(err.into());
            }
        };

        let status = response.status();
        let bytes = response.bytes().await?;
        let data = decode_body(&bytes);

        if status.is_client_error() || status.is_server_error() {
            error!(
                status = status.as_u16(),
                method = %method,
                url = %url,
                body = %data,
                "API error"
            );
            return Err(ClientError::Status { status, data });
        }

        Ok(ApiResponse { status, data })
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub(crate) fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(base: &str) -> ApiClient {
        let mut config = ClientConfig::with_defaults();
        config.base_url = Url::parse(base).unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_url_join_ignores_leading_slash() {
        let client = client_for("http://localhost:8000");
        assert_eq!(
            client.url("/api/tickets/4").unwrap().as_str(),
            "http://localhost:8000/api/tickets/4"
        );
        assert_eq!(
            client.url("sanctum/csrf-cookie").unwrap().as_str(),
            "http://localhost:8000/sanctum/csrf-cookie"
        );
    }

    #[test]
    fn test_url_join_keeps_base_path() {
        let client = client_for("https://example.com/helpdesk");
        assert_eq!(
            client.url("api/user").unwrap().as_str(),
            "https://example.com/helpdesk/api/user"
        );
    }

    #[test]
    fn test_decode_body_variants() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(b"7"), json!(7));
        assert_eq!(decode_body(br#"{"a":1}"#), json!({ "a": 1 }));
        assert_eq!(decode_body(b"Server Error"), json!("Server Error"));
    }

    #[test]
    fn test_request_options_builders() {
        let options = RequestOptions::new()
            .query([("status", "open"), ("page", "2")])
            .header(
                HeaderName::from_static("x-xsrf-token"),
                HeaderValue::from_static("abc"),
            )
            .json(&json!({ "title": "Broken screen" }))
            .unwrap();

        assert_eq!(options.query_pairs().len(), 2);
        assert_eq!(options.headers()["x-xsrf-token"], "abc");
        let RequestBody::Json(body) = options.body() else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["title"], "Broken screen");
    }

    #[test]
    fn test_multipart_body_is_not_json() {
        let form = Form::new().text("note", "screenshot");
        let options = RequestOptions::new().multipart(form);
        assert!(matches!(options.body(), RequestBody::Multipart(_)));
    }

    #[test]
    fn test_fresh_client_has_no_cookies() {
        let client = client_for("http://localhost:8000");
        assert_eq!(client.cookie_header(), None);
    }
}
