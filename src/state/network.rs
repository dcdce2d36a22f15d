use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use pandascore_api::client::{ApiError, PandaScoreApi};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// Serves `NetworkRequest`s one at a time against PandaScore.
pub struct NetworkWorker {
    client: PandaScoreApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: PandaScoreApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = self.handle(request).await;

            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| NetworkResponse::Error {
                message: err.to_string(),
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> Result<NetworkResponse, ApiError> {
        match request {
            NetworkRequest::LoadLive => {
                debug!("loading live matches");
                let matches = self.client.fetch_live_matches().await?;
                Ok(NetworkResponse::LiveLoaded { matches })
            }
            NetworkRequest::LoadUpcoming => {
                debug!("loading upcoming matches");
                let matches = self.client.fetch_upcoming_enriched().await?;
                Ok(NetworkResponse::UpcomingLoaded { matches })
            }
            NetworkRequest::LoadTournaments => {
                debug!("loading running tournaments");
                let tournaments = self.client.fetch_running_tournaments().await?;
                Ok(NetworkResponse::TournamentsLoaded { tournaments })
            }
            NetworkRequest::LoadPlayers => {
                debug!("loading popular players");
                let players = self.client.fetch_popular_players().await;
                Ok(NetworkResponse::PlayersLoaded { players })
            }
            NetworkRequest::SearchPlayers { query } => {
                debug!("searching players for {query:?}");
                let players = self.client.search_players(&query).await?;
                Ok(NetworkResponse::PlayerSearchLoaded { query, players })
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandascore_api::config::ApiConfig;

    async fn final_response(rx: &mut mpsc::Receiver<NetworkResponse>) -> NetworkResponse {
        loop {
            match rx.recv().await.expect("worker hung up") {
                NetworkResponse::LoadingStateChanged { .. } => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn failed_batch_becomes_error_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/lol/tournaments/running")
            .with_status(500)
            .create_async()
            .await;

        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let client = PandaScoreApi::new(ApiConfig::default().with_base_url(server.url()));
        let worker = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());

        req_tx.send(NetworkRequest::LoadTournaments).await.unwrap();
        match final_response(&mut resp_rx).await {
            NetworkResponse::Error { message } => assert!(message.contains("500"), "{message}"),
            other => panic!("expected error, got {other:?}"),
        }

        worker.abort();
    }

    #[tokio::test]
    async fn search_response_carries_its_query() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/lol/players")
            .match_query(mockito::Matcher::UrlEncoded("search[name]".into(), "caps".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": 1, "name": "Caps", "role": "mid"}]"#)
            .create_async()
            .await;

        let (req_tx, req_rx) = mpsc::channel(4);
        let (resp_tx, mut resp_rx) = mpsc::channel(64);
        let client = PandaScoreApi::new(ApiConfig::default().with_base_url(server.url()));
        let worker = tokio::spawn(NetworkWorker::new(client, req_rx, resp_tx).run());

        req_tx
            .send(NetworkRequest::SearchPlayers { query: "caps".into() })
            .await
            .unwrap();
        match final_response(&mut resp_rx).await {
            NetworkResponse::PlayerSearchLoaded { query, players } => {
                assert_eq!(query, "caps");
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].player.name, "Caps");
            }
            other => panic!("expected search results, got {other:?}"),
        }

        worker.abort();
    }
}
