use crate::app::MenuItem;
use chrono::Local;
use pandascore_api::{Match, PlayerProfile, Tournament};
use std::collections::HashSet;

/// Remote player search only kicks in from this many characters.
pub const MIN_REMOTE_SEARCH_CHARS: usize = 2;

/// Anything a list tab can show and filter.
pub trait Searchable {
    fn key(&self) -> u64;
    fn matches_query(&self, query: &str) -> bool;
}

impl Searchable for Match {
    fn key(&self) -> u64 {
        self.id
    }

    fn matches_query(&self, query: &str) -> bool {
        Match::matches_query(self, query)
    }
}

impl Searchable for Tournament {
    fn key(&self) -> u64 {
        self.id
    }

    fn matches_query(&self, query: &str) -> bool {
        Tournament::matches_query(self, query)
    }
}

impl Searchable for PlayerProfile {
    fn key(&self) -> u64 {
        self.player.id
    }

    fn matches_query(&self, query: &str) -> bool {
        PlayerProfile::matches_query(self, query)
    }
}

// ---------------------------------------------------------------------------
// Generic list state shared by every tab
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    /// Index into the *filtered* view, not into `items`.
    pub selected: usize,
    pub loaded: bool,
    /// A load is in flight. Cleared when it lands or fails.
    pub requested: bool,
    /// Wall-clock time of the last successful load, "HH:MM:SS".
    pub updated_at: Option<String>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self { items: Vec::new(), selected: 0, loaded: false, requested: false, updated_at: None }
    }
}

impl<T: Searchable> Listing<T> {
    /// Replace the items, keeping the cursor on the same entry when it survives the refresh.
    pub fn load(&mut self, items: Vec<T>, query: &str) {
        let previous = self.selected(query).map(|item| item.key());
        self.items = items;
        self.loaded = true;
        self.requested = false;
        self.updated_at = Some(Local::now().format("%H:%M:%S").to_string());
        self.selected = previous
            .and_then(|key| self.visible(query).iter().position(|item| item.key() == key))
            .unwrap_or(0);
    }

    pub fn visible(&self, query: &str) -> Vec<&T> {
        self.items.iter().filter(|item| item.matches_query(query)).collect()
    }

    pub fn selected(&self, query: &str) -> Option<&T> {
        let visible = self.visible(query);
        visible.get(self.selected.min(visible.len().saturating_sub(1))).copied()
    }

    pub fn move_down(&mut self, query: &str) {
        let max = self.visible(query).len().saturating_sub(1);
        if self.selected < max {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Players: popular listing plus optional remote search results
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct PlayersState {
    pub popular: Listing<PlayerProfile>,
    /// Results of the last remote search, tagged with the query that produced them.
    pub remote: Option<(String, Vec<PlayerProfile>)>,
    pub searching: bool,
}

impl PlayersState {
    pub fn should_search_remotely(query: &str) -> bool {
        query.trim().chars().count() >= MIN_REMOTE_SEARCH_CHARS
    }

    pub fn load_search_results(&mut self, query: String, players: Vec<PlayerProfile>) {
        self.searching = false;
        self.remote = Some((query, players));
        self.popular.selected = 0;
    }

    /// Remote results for the current query come first, followed by instant
    /// matches from the popular list that the remote search didn't return.
    pub fn visible(&self, query: &str) -> Vec<&PlayerProfile> {
        let instant = self.popular.visible(query);
        let remote = self
            .remote
            .as_ref()
            .filter(|(q, _)| Self::should_search_remotely(query) && q.trim() == query.trim())
            .map(|(_, players)| players);

        let Some(remote) = remote else {
            return instant;
        };

        let mut seen = HashSet::new();
        remote
            .iter()
            .chain(instant)
            .filter(|p| seen.insert(p.player.id))
            .collect()
    }

    pub fn selected(&self, query: &str) -> Option<&PlayerProfile> {
        let visible = self.visible(query);
        visible
            .get(self.popular.selected.min(visible.len().saturating_sub(1)))
            .copied()
    }

    pub fn move_down(&mut self, query: &str) {
        let max = self.visible(query).len().saturating_sub(1);
        if self.popular.selected < max {
            self.popular.selected += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Search box
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    /// True while keystrokes go into the search box instead of navigation.
    pub composing: bool,
}

impl SearchState {
    pub fn clear(&mut self) {
        self.query.clear();
        self.composing = false;
    }
}

// ---------------------------------------------------------------------------
// Top-level state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub live: Listing<Match>,
    pub upcoming: Listing<Match>,
    pub tournaments: Listing<Tournament>,
    pub players: PlayersState,
    pub search: SearchState,
    pub show_logs: bool,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        self.search.query.trim()
    }

    /// The match under the cursor on the Live or Upcoming tab.
    pub fn selected_match(&self) -> Option<&Match> {
        match self.active_tab {
            MenuItem::Live => self.live.selected(self.query()),
            MenuItem::Upcoming => self.upcoming.selected(self.query()),
            _ => None,
        }
    }

    pub fn move_down(&mut self) {
        let query = self.search.query.trim().to_string();
        match self.active_tab {
            MenuItem::Live => self.live.move_down(&query),
            MenuItem::Upcoming => self.upcoming.move_down(&query),
            MenuItem::Tournaments => self.tournaments.move_down(&query),
            MenuItem::Players => self.players.move_down(&query),
            MenuItem::Help => {}
        }
    }

    pub fn move_up(&mut self) {
        match self.active_tab {
            MenuItem::Live => self.live.move_up(),
            MenuItem::Upcoming => self.upcoming.move_up(),
            MenuItem::Tournaments => self.tournaments.move_up(),
            MenuItem::Players => self.players.popular.move_up(),
            MenuItem::Help => {}
        }
    }

    /// A load failed; whichever tab was waiting may ask again.
    pub fn clear_requests(&mut self) {
        self.live.requested = false;
        self.upcoming.requested = false;
        self.tournaments.requested = false;
        self.players.popular.requested = false;
    }

    /// The filter changed: put every cursor back at the top of its list.
    pub fn reset_selection(&mut self) {
        self.live.selected = 0;
        self.upcoming.selected = 0;
        self.tournaments.selected = 0;
        self.players.popular.selected = 0;
    }
}
