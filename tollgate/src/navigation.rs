//! Navigation signal forwarding.
//!
//! The layers never observe application state. An application that wants
//! navigation-scoped requests cancelled on a route change publishes the route
//! through a [`watch`] channel and forwards it here.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cancel::Cancel;

/// Spawns a task calling [`Cancel::cancel_all`] every time `route` changes.
///
/// The task ends when every sender of the channel is dropped. Must be called
/// from within a tokio runtime.
///
/// ```no_run
/// use tokio::sync::watch;
/// use tollgate::cancel::Cancel;
/// use tollgate::navigation::forward_navigation;
///
/// # async fn run() {
/// let cancel = Cancel::new();
/// let (route, routes) = watch::channel(String::from("/home"));
/// let listener = forward_navigation(routes, cancel.clone());
///
/// route.send_replace(String::from("/settings"));
/// drop(route);
/// listener.await.ok();
/// # }
/// ```
pub fn forward_navigation<T>(mut route: watch::Receiver<T>, cancel: Cancel) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        while route.changed().await.is_ok() {
            let cancelled = cancel.cancel_all();
            debug!(cancelled, "Navigation changed");
        }
        debug!("Navigation channel closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CancelHandle, CancelKey};
    use futures::future::AbortHandle;
    use tollgate_core::IdentityKey;

    #[tokio::test]
    async fn test_route_change_cancels_pending() {
        let cancel = Cancel::new();
        let (abort, _registration) = AbortHandle::new_pair();
        let id = cancel.store().next_id();
        cancel.store().register(
            CancelKey::Scoped {
                identity: IdentityKey::new("/api/list"),
                id,
            },
            CancelHandle::new(id, abort.clone()),
        );

        let (route, routes) = watch::channel("/home");
        let listener = forward_navigation(routes, cancel.clone());

        route.send_replace("/settings");
        drop(route);
        listener.await.unwrap();

        assert!(abort.is_aborted());
        assert!(cancel.store().is_empty());
    }
}
