use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use pandascore_api::{Match, PlayerProfile, Tournament};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    LoadLive,
    LoadUpcoming,
    LoadTournaments,
    LoadPlayers,
    SearchPlayers { query: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    LiveLoaded { matches: Vec<Match> },
    UpcomingLoaded { matches: Vec<Match> },
    TournamentsLoaded { tournaments: Vec<Tournament> },
    PlayersLoaded { players: Vec<PlayerProfile> },
    PlayerSearchLoaded { query: String, players: Vec<PlayerProfile> },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
}
