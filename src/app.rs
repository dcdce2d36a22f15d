use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, PlayersState};
use crate::state::messages::NetworkRequest;
use pandascore_api::{Match, PlayerProfile, Tournament};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Live,
    Upcoming,
    Tournaments,
    Players,
    Help,
}

impl MenuItem {
    pub const TABS: [MenuItem; 4] =
        [MenuItem::Live, MenuItem::Upcoming, MenuItem::Tournaments, MenuItem::Players];

    pub fn title(self) -> &'static str {
        match self {
            MenuItem::Live => "Live",
            MenuItem::Upcoming => "Upcoming",
            MenuItem::Tournaments => "Tournaments",
            MenuItem::Players => "Players",
            MenuItem::Help => "Help",
        }
    }

    /// The request that (re)loads this tab's data.
    pub fn load_request(self) -> Option<NetworkRequest> {
        match self {
            MenuItem::Live => Some(NetworkRequest::LoadLive),
            MenuItem::Upcoming => Some(NetworkRequest::LoadUpcoming),
            MenuItem::Tournaments => Some(NetworkRequest::LoadTournaments),
            MenuItem::Players => Some(NetworkRequest::LoadPlayers),
            MenuItem::Help => None,
        }
    }
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();

        let app = Self {
            state: AppState::new(),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_live_loaded(&mut self, matches: Vec<Match>) {
        self.state.last_error = None;
        let query = self.state.query().to_string();
        self.state.live.load(matches, &query);
    }

    pub fn on_upcoming_loaded(&mut self, matches: Vec<Match>) {
        self.state.last_error = None;
        let query = self.state.query().to_string();
        self.state.upcoming.load(matches, &query);
    }

    pub fn on_tournaments_loaded(&mut self, tournaments: Vec<Tournament>) {
        self.state.last_error = None;
        let query = self.state.query().to_string();
        self.state.tournaments.load(tournaments, &query);
    }

    pub fn on_players_loaded(&mut self, players: Vec<PlayerProfile>) {
        self.state.last_error = None;
        let query = self.state.query().to_string();
        self.state.players.popular.load(players, &query);
    }

    pub fn on_player_search_loaded(&mut self, query: String, players: Vec<PlayerProfile>) {
        self.state.last_error = None;
        log::info!("player search {query:?} returned {} players", players.len());
        self.state.players.load_search_results(query, players);
    }

    pub fn on_error(&mut self, message: String) {
        log::error!("{message}");
        self.state.players.searching = false;
        self.state.clear_requests();
        self.state.last_error = Some(message);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) {
        if self.state.active_tab == next {
            return;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        self.state.search.clear();
        self.state.reset_selection();
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    /// A load for the active tab if it has never been loaded and none is in flight.
    /// Marks the tab as requested.
    pub fn pending_load(&mut self) -> Option<NetworkRequest> {
        let tab = self.state.active_tab;
        let requested = self.requested_flag(tab)?;
        if *requested {
            return None;
        }
        *requested = true;
        tab.load_request()
    }

    /// Explicit reload of the active tab, sent even if a load is already in flight.
    pub fn refresh_request(&mut self) -> Option<NetworkRequest> {
        let tab = self.state.active_tab;
        if let Some(requested) = self.requested_flag(tab) {
            *requested = true;
        }
        tab.load_request()
    }

    /// The in-flight flag of an unloaded tab. `None` once loaded, and for Help.
    fn requested_flag(&mut self, tab: MenuItem) -> Option<&mut bool> {
        let state = &mut self.state;
        let (loaded, requested) = match tab {
            MenuItem::Live => (state.live.loaded, &mut state.live.requested),
            MenuItem::Upcoming => (state.upcoming.loaded, &mut state.upcoming.requested),
            MenuItem::Tournaments => (state.tournaments.loaded, &mut state.tournaments.requested),
            MenuItem::Players => (state.players.popular.loaded, &mut state.players.popular.requested),
            MenuItem::Help => return None,
        };
        if loaded { None } else { Some(requested) }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Search box
    // -----------------------------------------------------------------------

    pub fn start_search(&mut self) {
        if self.state.active_tab != MenuItem::Help {
            self.state.search.composing = true;
        }
    }

    pub fn push_search_char(&mut self, c: char) {
        self.state.search.query.push(c);
        self.state.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.state.search.query.pop();
        self.state.reset_selection();
    }

    pub fn clear_search(&mut self) {
        self.state.search.clear();
        self.state.reset_selection();
    }

    /// Stop composing. On the Players tab a long enough query also goes to the API.
    pub fn submit_search(&mut self) -> Option<NetworkRequest> {
        self.state.search.composing = false;
        let query = self.state.query().to_string();
        if self.state.active_tab != MenuItem::Players || !PlayersState::should_search_remotely(&query) {
            return None;
        }
        self.state.players.searching = true;
        Some(NetworkRequest::SearchPlayers { query })
    }
}
