//! Buffered response stored by the cache middleware.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

/// A fully buffered reqwest response.
///
/// A streamed [`reqwest::Response`] can be consumed only once. The cache
/// middleware buffers it into this type so one stored response can be
/// replayed to every caller that hits the entry.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl CapturedResponse {
    /// Reads the whole body of `response`.
    pub async fn capture(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self {
            status,
            version,
            headers,
            body,
        })
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decodes the body as JSON.
    pub fn json<T>(&self) -> serde_json::Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(&self.body)
    }

    /// Rebuilds a [`reqwest::Response`] for the caller.
    pub fn into_response(self) -> reqwest::Response {
        let mut response = http::Response::new(reqwest::Body::from(self.body));
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        reqwest::Response::from(response)
    }
}

impl From<CapturedResponse> for reqwest::Response {
    fn from(response: CapturedResponse) -> Self {
        response.into_response()
    }
}
