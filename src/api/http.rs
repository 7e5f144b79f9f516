//! HTTP utilities for Paperspace REST API calls

use crate::error::{ProviderError, ProviderResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// Client name sent as both user agent and `ps_client_name`
pub const CLIENT_NAME: &str = "terraform-provider-paperspace";

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
pub fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Status code plus decoded body of one API call.
///
/// Non-success statuses are not errors at this level; each operation decides
/// which codes it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// HTTP client wrapper for Paperspace API calls
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client that sends `api_key` on every request
    pub fn new(api_key: &str) -> ProviderResult<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::Config("API key contains invalid characters".to_string()))?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-api-key"), key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static("ps_client_name"),
            HeaderValue::from_static(CLIENT_NAME),
        );

        let client = Client::builder()
            .user_agent(CLIENT_NAME)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> ProviderResult<ApiResponse> {
        self.send(Method::GET, url, None).await
    }

    /// Make a POST request, with an optional JSON body
    pub async fn post(&self, url: &str, body: Option<&Value>) -> ProviderResult<ApiResponse> {
        self.send(Method::POST, url, body).await
    }

    /// Make a PUT request with a JSON body
    pub async fn put(&self, url: &str, body: &Value) -> ProviderResult<ApiResponse> {
        self.send(Method::PUT, url, Some(body)).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> ProviderResult<ApiResponse> {
        self.send(Method::DELETE, url, None).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> ProviderResult<ApiResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            // destroy calls may drop the connection mid-body after succeeding
            Err(e) if status.is_success() => {
                tracing::warn!("{} {}: ignoring unreadable success body: {}", method, url, e);
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let body = decode_body(status.is_success(), &text, &method, url);

        if status.is_success() {
            tracing::debug!("{} {} -> {}", method, url, status.as_u16());
        } else {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} {} -> {} - {}",
                method,
                url,
                status,
                sanitize_for_log(&text)
            );
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode a response body.
///
/// Some endpoints (machine destroy) close the stream without a JSON body on
/// success, so undecodable 2xx bodies read as `null`. Undecodable error
/// bodies are kept as sanitized text.
fn decode_body(success: bool, text: &str, method: &Method, url: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }

    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) if success => {
            tracing::warn!("{} {}: ignoring undecodable success body: {}", method, url, e);
            Value::Null
        }
        Err(_) => Value::String(sanitize_for_log(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_truncates_and_strips() {
        let long = "a".repeat(500);
        let shown = sanitize_for_log(&long);
        assert!(shown.starts_with(&"a".repeat(200)));
        assert!(shown.ends_with("[truncated, 500 bytes total]"));

        assert_eq!(sanitize_for_log("line\nbreak\ttab"), "linebreaktab");
    }

    #[test]
    fn test_sanitize_respects_char_boundaries() {
        let body = format!("{}é{}", "a".repeat(199), "b".repeat(10));
        let shown = sanitize_for_log(&body);
        assert!(shown.contains("truncated"));
    }

    #[test]
    fn test_decode_body_variants() {
        let url = "https://api.paperspace.io/x";
        assert_eq!(decode_body(true, "", &Method::GET, url), Value::Null);
        assert_eq!(decode_body(true, "{\"id\":\"ps1\"}", &Method::GET, url), json!({"id": "ps1"}));
        assert_eq!(decode_body(true, "EOF", &Method::POST, url), Value::Null);
        assert_eq!(
            decode_body(false, "<html>bad gateway</html>", &Method::GET, url),
            json!("<html>bad gateway</html>")
        );
    }

    #[test]
    fn test_rejects_invalid_api_key() {
        assert!(matches!(ApiHttpClient::new("bad\nkey"), Err(ProviderError::Config(_))));
    }
}
