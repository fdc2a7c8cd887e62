//! Request parameter snapshots used for cache matching.

use http::Method;
use serde_json::{Map, Value};
use tracing::debug;

use crate::Interceptable;

/// Returns `true` for methods whose parameters live in the query string.
pub fn is_read_style(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Parses the query string of `url` into a JSON object.
///
/// Bracket syntax is supported for arrays and nested maps
/// (`color[]=red&color[]=blue`, `filter[name]=x`). An unparsable query yields
/// an empty object.
pub fn query_params(url: &str) -> Map<String, Value> {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let Some((_, query)) = without_fragment.split_once('?') else {
        return Map::new();
    };
    if query.is_empty() {
        return Map::new();
    }
    serde_qs::Config::new(5, false)
        .deserialize_str::<Map<String, Value>>(query)
        .unwrap_or_else(|error| {
            debug!(%error, query, "Query string parsing failed");
            Map::new()
        })
}

/// Builds the deep-comparable parameter snapshot of a request.
///
/// Read-style requests use the URL query merged with the explicit params
/// object (explicit params win). Write-style requests use the body payload.
pub fn match_params<R>(request: &R) -> Value
where
    R: Interceptable + ?Sized,
{
    if !is_read_style(request.method()) {
        return request.body().unwrap_or(Value::Null);
    }

    let mut merged = query_params(request.url());
    match request.params() {
        Some(Value::Object(explicit)) => merged.extend(explicit),
        Some(Value::Null) | None => {}
        Some(other) => debug!(params = %other, "Ignoring non-object request params"),
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::RequestFlags;

    struct TestRequest {
        url: &'static str,
        method: Method,
        params: Option<Value>,
        body: Option<Value>,
    }

    impl Interceptable for TestRequest {
        fn url(&self) -> &str {
            self.url
        }

        fn method(&self) -> &Method {
            &self.method
        }

        fn flags(&self) -> RequestFlags {
            RequestFlags::default()
        }

        fn params(&self) -> Option<Value> {
            self.params.clone()
        }

        fn body(&self) -> Option<Value> {
            self.body.clone()
        }
    }

    #[test]
    fn test_query_params_parsed() {
        let params = query_params("https://example.com/api/user?id=1&name=bob#top");
        assert_eq!(Value::Object(params), json!({"id": "1", "name": "bob"}));
    }

    #[test]
    fn test_query_params_bracket_arrays() {
        let params = query_params("/list?color[]=red&color[]=blue");
        assert_eq!(params.get("color"), Some(&json!(["red", "blue"])));
    }

    #[test]
    fn test_query_params_missing() {
        assert!(query_params("/api/user").is_empty());
        assert!(query_params("/api/user?").is_empty());
    }

    #[test]
    fn test_read_style_merges_explicit_params() {
        let request = TestRequest {
            url: "/api/user?id=1&page=2",
            method: Method::GET,
            params: Some(json!({"page": 3})),
            body: Some(json!({"ignored": true})),
        };
        assert_eq!(match_params(&request), json!({"id": "1", "page": 3}));
    }

    #[test]
    fn test_write_style_uses_body() {
        let request = TestRequest {
            url: "/api/submit?id=1",
            method: Method::POST,
            params: Some(json!({"page": 3})),
            body: Some(json!({"title": "hello"})),
        };
        assert_eq!(match_params(&request), json!({"title": "hello"}));

        let empty = TestRequest {
            body: None,
            ..request
        };
        assert_eq!(match_params(&empty), Value::Null);
    }
}
