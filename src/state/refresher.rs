use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const LIVE_REFRESH: Duration = Duration::from_secs(30);

/// Periodic live-match refresh. Only the Live feed changes fast enough to poll;
/// the other tabs reload on demand with `r`.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
    period: Duration,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests, period: LIVE_REFRESH }
    }

    pub async fn run(self) {
        let mut live_interval = interval(self.period);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        live_interval.tick().await;

        loop {
            live_interval.tick().await;
            if self.network_requests.send(NetworkRequest::LoadLive).await.is_err() {
                break;
            }
        }
    }
}
