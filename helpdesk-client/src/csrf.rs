//! Double-submit-cookie CSRF flow.
//!
//! The backend sets `XSRF-TOKEN` from its CSRF-cookie endpoint; the client
//! echoes the decoded value in `X-XSRF-TOKEN`. The token is re-primed before
//! every mutating call instead of being cached.

use percent_encoding::percent_decode_str;
use reqwest::{
    Method,
    header::{HeaderName, HeaderValue},
};
use shared::config::ClientConfig;
use tracing::{debug, warn};

use crate::{
    error::ClientResult,
    http::{ApiClient, ApiResponse, RequestOptions},
};

const DEFAULT_HEADER: HeaderName = HeaderName::from_static("x-xsrf-token");

/// Token read from the cookie jar after priming; may be missing when the
/// cookie was not stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CsrfToken(Option<String>);

impl CsrfToken {
    /// Wrap a decoded cookie value.
    #[must_use]
    pub fn new(value: Option<String>) -> Self {
        Self(value)
    }

    /// The decoded token, if the cookie was present.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether the cookie was absent after priming.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }
}

/// Parse a `Cookie` header and return the decoded value of cookie `name`.
///
/// Only an exact `name=` prefix matches, so `XSRF-TOKEN-OLD` is ignored when
/// looking for `XSRF-TOKEN`. Invalid UTF-8 after decoding is replaced lossily.
#[must_use]
pub fn extract_csrf_token(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|entry| {
        let value = entry.trim().strip_prefix(name)?.strip_prefix('=')?;
        Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
    })
}

/// Primes, reads and attaches the CSRF token for mutating requests.
#[derive(Clone, Debug)]
pub struct CsrfManager {
    api: ApiClient,
    cookie_path: String,
    cookie_name: String,
    header_name: HeaderName,
}

impl CsrfManager {
    /// Use the cookie endpoint, cookie name and header name from `config`.
    /// An unusable header name falls back to `X-XSRF-TOKEN`.
    #[must_use]
    pub fn new(api: ApiClient, config: &ClientConfig) -> Self {
        let header_name = HeaderName::from_bytes(config.csrf_header_name.as_bytes())
            .unwrap_or(DEFAULT_HEADER);

        Self {
            api,
            cookie_path: config.csrf_cookie_path.clone(),
            cookie_name: config.csrf_cookie_name.clone(),
            header_name,
        }
    }

    /// Header carrying the token on mutating requests.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    /// Ask the backend to (re)issue the CSRF cookie.
    ///
    /// # Errors
    /// Propagates the transport error; callers must not continue with the
    /// mutating request.
    pub async fn prime_csrf(&self) -> ClientResult<()> {
        let options = RequestOptions::new();
        self.api.get(&self.cookie_path, options).await?;
        Ok(())
    }

    /// Current token from the cookie jar. Never fails.
    #[must_use]
    pub fn read_csrf_token(&self) -> CsrfToken {
        let token = self
            .api
            .cookie_header()
            .and_then(|header| extract_csrf_token(&header, &self.cookie_name));
        CsrfToken::new(token)
    }

    /// Phase one of a mutating call: prime, then read.
    ///
    /// # Errors
    /// Fails only when priming fails.
    pub async fn prepare(&self) -> ClientResult<CsrfToken> {
        self.prime_csrf().await?;
        let token = self.read_csrf_token();
        if token.is_missing() {
            warn!(
                cookie = %self.cookie_name,
                "CSRF cookie missing after priming; sending request without token"
            );
        } else {
            debug!(cookie = %self.cookie_name, "CSRF token refreshed");
        }
        Ok(token)
    }

    /// Add the token header to `options` when a token is present.
    #[must_use]
    pub fn attach(&self, token: &CsrfToken, options: RequestOptions) -> RequestOptions {
        match token.value().map(HeaderValue::from_str) {
            Some(Ok(value)) => options.header(self.header_name.clone(), value),
            Some(Err(_)) => {
                warn!("CSRF token is not a valid header value; sending request without it");
                options
            }
            None => options,
        }
    }

    /// Phase two: issue the token-bearing request. Priming always happens first.
    ///
    /// # Errors
    /// Propagates a priming failure without sending the request, otherwise
    /// whatever [`ApiClient::send`] returns.
    pub async fn send_mutating(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ClientResult<ApiResponse> {
        let token = self.prepare().await?;
        let options = self.attach(&token, options);
        self.api.send(method, path, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_decodes_value() {
        let header = "laravel_session=abc; XSRF-TOKEN=eyJpdiI6Ik1a%3D%3D";
        assert_eq!(
            extract_csrf_token(header, "XSRF-TOKEN").as_deref(),
            Some("eyJpdiI6Ik1a==")
        );
    }

    #[test]
    fn test_extract_is_idempotent() {
        let header = "XSRF-TOKEN=a%2Bb%2Fc; other=1";
        let first = extract_csrf_token(header, "XSRF-TOKEN");
        let second = extract_csrf_token(header, "XSRF-TOKEN");
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Some("a+b/c"));
    }

    #[test]
    fn test_extract_missing_cookie() {
        assert_eq!(extract_csrf_token("", "XSRF-TOKEN"), None);
        assert_eq!(extract_csrf_token("session=1; theme=dark", "XSRF-TOKEN"), None);
    }

    #[test]
    fn test_extract_requires_exact_name() {
        let header = "XSRF-TOKEN-LEGACY=old; X-XSRF-TOKEN=nope";
        assert_eq!(extract_csrf_token(header, "XSRF-TOKEN"), None);

        let header = "XSRF-TOKEN-LEGACY=old; XSRF-TOKEN=new";
        assert_eq!(extract_csrf_token(header, "XSRF-TOKEN").as_deref(), Some("new"));
    }

    #[test]
    fn test_extract_empty_value() {
        assert_eq!(extract_csrf_token("XSRF-TOKEN=", "XSRF-TOKEN").as_deref(), Some(""));
    }

    #[test]
    fn test_attach_skips_missing_token() {
        let api = ApiClient::new(&ClientConfig::with_defaults()).unwrap();
        let manager = CsrfManager::new(api, &ClientConfig::with_defaults());

        let options = manager.attach(&CsrfToken::default(), RequestOptions::new());
        assert!(options.headers().is_empty());

        let token = CsrfToken::new(Some("t0k3n".to_string()));
        let options = manager.attach(&token, RequestOptions::new());
        assert_eq!(options.headers()["x-xsrf-token"], "t0k3n");
    }

    #[test]
    fn test_read_token_from_empty_jar() {
        let api = ApiClient::new(&ClientConfig::with_defaults()).unwrap();
        let manager = CsrfManager::new(api, &ClientConfig::with_defaults());
        assert!(manager.read_csrf_token().is_missing());
    }
}
