//! Last-known reachability of the notes service.

use std::fmt;
use std::time::Duration;

use tokio::sync::watch;

use crate::client::NotesApi;
use crate::error::ClientResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    Connected,
    #[default]
    Disconnected,
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        })
    }
}

/// Two-state reachability tracker.
///
/// Starts disconnected. Only a successful health check connects it; a
/// failed health check or a data call that never reached the service
/// disconnects it. Answers such as 404 or 400 prove the service is up and
/// leave the state alone.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: watch::Sender<Connectivity>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(Connectivity::Disconnected);
        Self { state }
    }

    #[must_use]
    pub fn state(&self) -> Connectivity {
        *self.state.borrow()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == Connectivity::Connected
    }

    /// Receiver that observes every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.subscribe()
    }

    fn transition(&self, next: Connectivity) {
        let previous = self.state.send_replace(next);
        match (previous, next) {
            (Connectivity::Disconnected, Connectivity::Connected) => {
                tracing::info!("Connection to notes service established");
            }
            (Connectivity::Connected, Connectivity::Disconnected) => {
                tracing::warn!("Lost connection to notes service");
            }
            _ => {}
        }
    }

    /// Runs one health check and records the result.
    pub async fn check<A: NotesApi + ?Sized>(&self, api: &A) -> bool {
        let healthy = api.health().await;
        self.transition(if healthy {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        });
        healthy
    }

    /// Feeds the outcome of a data operation into the state.
    pub fn observe<T>(&self, result: &ClientResult<T>) {
        if let Err(e) = result
            && e.is_network()
        {
            self.transition(Connectivity::Disconnected);
        }
    }

    /// Checks health every `interval`, forever. Spawn it and abort the
    /// handle to stop.
    pub async fn run<A: NotesApi + ?Sized>(&self, api: &A, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.check(api).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::FakeApi;
    use std::sync::Arc;

    #[test]
    fn starts_disconnected() {
        assert_eq!(ConnectivityMonitor::new().state(), Connectivity::Disconnected);
    }

    #[tokio::test]
    async fn health_check_drives_both_transitions() {
        let api = FakeApi::new();
        let monitor = ConnectivityMonitor::new();

        assert!(monitor.check(&api).await);
        assert!(monitor.is_connected());

        api.set_unreachable(true);
        assert!(!monitor.check(&api).await);
        assert_eq!(monitor.state(), Connectivity::Disconnected);
    }

    #[tokio::test]
    async fn only_unreachable_data_failures_disconnect() {
        let api = FakeApi::new();
        let monitor = ConnectivityMonitor::new();
        monitor.check(&api).await;

        let not_found: ClientResult<()> = Err(ClientError::NotFound {
            message: "Note not found".to_string(),
            details: None,
        });
        monitor.observe(&not_found);
        assert!(monitor.is_connected());

        monitor.observe(&Ok::<_, ClientError>(()));
        assert!(monitor.is_connected());

        let unreachable: ClientResult<()> = Err(ClientError::NetworkUnreachable {
            message: "connection refused".to_string(),
        });
        monitor.observe(&unreachable);
        assert!(!monitor.is_connected());
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let api = FakeApi::new();
        let monitor = ConnectivityMonitor::new();
        let mut rx = monitor.subscribe();

        monitor.check(&api).await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Connectivity::Connected);
    }

    #[tokio::test]
    async fn periodic_checks_restore_connection() {
        let api = Arc::new(FakeApi::new());
        api.set_unreachable(true);
        let monitor = Arc::new(ConnectivityMonitor::new());
        let mut rx = monitor.subscribe();

        let handle = {
            let api = Arc::clone(&api);
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                monitor.run(api.as_ref(), Duration::from_millis(10)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!monitor.is_connected());

        api.set_unreachable(false);
        tokio::time::timeout(
            Duration::from_secs(2),
            rx.wait_for(|s| *s == Connectivity::Connected),
        )
        .await
        .expect("monitor never reconnected")
        .unwrap();

        handle.abort();
        assert!(api.calls() >= 2);
    }
}
