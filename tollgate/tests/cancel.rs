mod common;

use common::{MockRequest, MockUpstream};
use tollgate::cancel::Cancel;
use tollgate::{RequestFlags, Upstream, is_cancellation};

const SEARCH_URL: &str = "https://example.com/api/search";

#[tokio::test]
async fn test_repeated_request_cancels_pending() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());
    let flags = RequestFlags::new().cancelable();

    let first = service.call(MockRequest::get(&format!("{SEARCH_URL}?q=ru")).flags(flags));
    let second = service.call(MockRequest::get(&format!("{SEARCH_URL}?q=rust")).flags(flags));
    assert_eq!(cancel.store().len(), 1);

    let error = first.await.unwrap_err();
    assert!(is_cancellation(&error));
    assert_eq!(error.key().unwrap(), SEARCH_URL);

    upstream.open();
    let response = second.await.unwrap();
    assert!(response.ends_with("#2"));
    assert!(cancel.store().is_empty());
}

#[tokio::test]
async fn test_navigation_only_requests_do_not_supersede() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());
    let flags = RequestFlags::new().cancel_on_navigation_only();

    let first = service.call(MockRequest::get(SEARCH_URL).flags(flags));
    let second = service.call(MockRequest::get(SEARCH_URL).flags(flags));
    assert_eq!(cancel.store().len(), 2);

    upstream.open();
    let (first, second) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert!(second.is_ok());
    assert!(cancel.store().is_empty());
}

#[tokio::test]
async fn test_cancel_all_reaches_every_pending_request() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());

    let pending = vec![
        service.call(MockRequest::get(SEARCH_URL).flags(RequestFlags::new().cancelable())),
        service.call(
            MockRequest::get("https://example.com/api/feed")
                .flags(RequestFlags::new().cancel_on_navigation_only()),
        ),
        service.call(
            MockRequest::get("https://example.com/api/feed")
                .flags(RequestFlags::new().cancel_on_navigation_only()),
        ),
    ];

    assert_eq!(cancel.cancel_all(), 3);
    assert!(cancel.store().is_empty());

    for result in futures::future::join_all(pending).await {
        assert!(result.unwrap_err().is_cancellation());
    }
    assert_eq!(cancel.cancel_all(), 0);
}

#[tokio::test]
async fn test_cancel_single_url() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());

    let pending = service.call(
        MockRequest::get(&format!("{SEARCH_URL}?q=rust")).flags(RequestFlags::new().cancelable()),
    );

    assert!(cancel.cancel(SEARCH_URL));
    assert!(!cancel.cancel(SEARCH_URL));
    assert!(pending.await.unwrap_err().is_cancellation());
}

#[tokio::test]
async fn test_locked_request_is_not_registered() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());
    let flags = RequestFlags::new().cancelable().locked();

    let first = service.call(MockRequest::get(SEARCH_URL).flags(flags));
    let second = service.call(MockRequest::get(SEARCH_URL).flags(flags));
    assert!(cancel.store().is_empty());

    upstream.open();
    let (first, second) = tokio::join!(first, second);
    assert!(first.is_ok());
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_plain_request_passes_through() {
    let upstream = MockUpstream::new();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());

    service.call(MockRequest::get(SEARCH_URL)).await.unwrap();

    assert_eq!(upstream.calls(), 1);
    assert_eq!(cancel.cancel_all(), 0);
}

#[tokio::test]
async fn test_transport_error_deregisters() {
    let upstream = MockUpstream::new();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());

    let error = service
        .call(
            MockRequest::get("https://example.com/api/fail")
                .flags(RequestFlags::new().cancelable()),
        )
        .await
        .unwrap_err();

    assert!(!error.is_cancellation());
    assert!(cancel.store().is_empty());
}

#[tokio::test]
async fn test_dropped_request_deregisters() {
    let upstream = MockUpstream::gated();
    let cancel = Cancel::new();
    let mut service = cancel.wrap(upstream.clone());

    let pending =
        service.call(MockRequest::get(SEARCH_URL).flags(RequestFlags::new().cancelable()));
    assert_eq!(cancel.store().len(), 1);

    drop(pending);
    assert!(cancel.store().is_empty());
}
