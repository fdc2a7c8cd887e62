//! Outgoing reqwest request as seen by the interception layers.

use http::{Extensions, Method};
use serde_json::Value;
use tollgate_core::{Interceptable, RequestFlags};

/// A [`reqwest::Request`] together with the [`RequestFlags`] attached to it.
///
/// Flags are attached per request through reqwest-middleware extensions:
///
/// ```no_run
/// use tollgate_core::RequestFlags;
///
/// # async fn run(client: reqwest_middleware::ClientWithMiddleware) {
/// let response = client
///     .get("https://example.com/api/user")
///     .with_extension(RequestFlags::new().cacheable())
///     .send()
///     .await;
/// # }
/// ```
///
/// A request without flags passes through every layer untouched.
#[derive(Debug)]
pub struct InterceptedRequest {
    request: reqwest::Request,
    flags: RequestFlags,
}

impl InterceptedRequest {
    /// Reads the flags for `request` from the middleware `extensions`.
    pub fn new(request: reqwest::Request, extensions: &Extensions) -> Self {
        let flags = extensions
            .get::<RequestFlags>()
            .copied()
            .unwrap_or_default();
        Self { request, flags }
    }

    /// Wraps `request` with explicit flags.
    pub fn with_flags(request: reqwest::Request, flags: RequestFlags) -> Self {
        Self { request, flags }
    }

    /// Returns the underlying request.
    pub fn into_inner(self) -> reqwest::Request {
        self.request
    }
}

impl Interceptable for InterceptedRequest {
    fn url(&self) -> &str {
        self.request.url().as_str()
    }

    fn method(&self) -> &Method {
        self.request.method()
    }

    fn flags(&self) -> RequestFlags {
        self.flags
    }

    // Query parameters are already part of the URL; no explicit params.

    fn body(&self) -> Option<Value> {
        let bytes = self.request.body()?.as_bytes()?;
        // Non-JSON payloads are compared as text.
        let body = serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()));
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: Method, body: Option<&'static str>) -> reqwest::Request {
        let mut request = reqwest::Request::new(
            method,
            "https://example.com/api/search?page=1".parse().unwrap(),
        );
        if let Some(body) = body {
            *request.body_mut() = Some(reqwest::Body::from(body));
        }
        request
    }

    #[test]
    fn test_flags_read_from_extensions() {
        let mut extensions = Extensions::new();
        extensions.insert(RequestFlags::new().lockable());

        let intercepted = InterceptedRequest::new(request(Method::POST, None), &extensions);
        assert!(intercepted.flags().lockable);

        let plain = InterceptedRequest::new(request(Method::GET, None), &Extensions::new());
        assert_eq!(plain.flags(), RequestFlags::default());
    }

    #[test]
    fn test_body_parsed_as_json() {
        let intercepted = InterceptedRequest::with_flags(
            request(Method::POST, Some(r#"{"query":"rust"}"#)),
            RequestFlags::default(),
        );
        assert_eq!(intercepted.body(), Some(json!({"query": "rust"})));

        let text = InterceptedRequest::with_flags(
            request(Method::POST, Some("query=rust")),
            RequestFlags::default(),
        );
        assert_eq!(text.body(), Some(json!("query=rust")));

        let empty = InterceptedRequest::with_flags(request(Method::POST, None), RequestFlags::default());
        assert_eq!(empty.body(), None);
    }
}
