#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use http::Method;
use serde_json::Value;
use tokio::sync::watch;
use tollgate::{Error, Interceptable, RequestFlags, Upstream};

#[derive(Debug, Clone)]
pub struct MockRequest {
    url: String,
    method: Method,
    flags: RequestFlags,
    params: Option<Value>,
    body: Option<Value>,
}

impl MockRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            url: url.to_owned(),
            method,
            flags: RequestFlags::default(),
            params: None,
            body: None,
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn flags(self, flags: RequestFlags) -> Self {
        Self { flags, ..self }
    }

    pub fn params(self, params: Value) -> Self {
        Self {
            params: Some(params),
            ..self
        }
    }

    pub fn body(self, body: Value) -> Self {
        Self {
            body: Some(body),
            ..self
        }
    }
}

impl Interceptable for MockRequest {
    fn url(&self) -> &str {
        &self.url
    }

    fn method(&self) -> &Method {
        &self.method
    }

    fn flags(&self) -> RequestFlags {
        self.flags
    }

    fn params(&self) -> Option<Value> {
        self.params.clone()
    }

    fn body(&self) -> Option<Value> {
        self.body.clone()
    }
}

/// Transport double.
///
/// Every call is counted when it is issued. The response is
/// `"<url> #<call number>"`, so a replayed response is distinguishable from a
/// fresh one. URLs containing `fail` produce a transport error. While the gate
/// is closed every response future stays pending.
#[derive(Clone)]
pub struct MockUpstream {
    calls: Arc<AtomicUsize>,
    gate: Arc<watch::Sender<bool>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(gate),
        }
    }

    /// Upstream whose responses stay pending until [`open`](Self::open) is called.
    pub fn gated() -> Self {
        let upstream = Self::new();
        upstream.gate.send_replace(false);
        upstream
    }

    pub fn open(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Upstream<MockRequest> for MockUpstream {
    type Response = Result<String, Error>;
    type Future = BoxFuture<'static, Self::Response>;

    fn call(&mut self, req: MockRequest) -> Self::Future {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let mut gate = self.gate.subscribe();
        async move {
            gate.wait_for(|open| *open).await.ok();
            if req.url.contains("fail") {
                Err(Error::transport(std::io::Error::other("connection reset")))
            } else {
                Ok(format!("{} #{}", req.url, call))
            }
        }
        .boxed()
    }
}
