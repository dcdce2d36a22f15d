pub mod client;
pub mod config;
pub mod enrich;
pub mod pandascore;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of PandaScore wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Match {
    pub id: u64,
    pub name: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub begin_at: Option<DateTime<Utc>>,
    pub league: Option<League>,
    /// Zero, one or two slots, in provider order. Never padded.
    pub opponents: Vec<OpponentEntry>,
}

impl Match {
    /// The team in slot `index`, if the slot exists and is filled.
    pub fn team(&self, index: usize) -> Option<&Team> {
        self.opponents.get(index).and_then(|o| o.opponent.as_ref())
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.opponents.iter().filter_map(|o| o.opponent.as_ref())
    }

    /// "T1 vs GEN", falling back to the provider's match name when a slot is empty.
    pub fn matchup_label(&self) -> String {
        match (self.team(0), self.team(1)) {
            (Some(a), Some(b)) => format!("{} vs {}", a.short_label(), b.short_label()),
            _ if !self.name.is_empty() => self.name.clone(),
            (Some(a), None) | (None, Some(a)) => format!("{} vs TBD", a.short_label()),
            (None, None) => "TBD vs TBD".to_string(),
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        contains_ci(&self.name, query)
            || self.league.as_ref().is_some_and(|l| contains_ci(&l.name, query))
            || self
                .teams()
                .any(|t| contains_ci(&t.name, query) || contains_ci(&t.acronym, query))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpponentEntry {
    pub opponent: Option<Team>, // None = bye / TBD
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Team {
    pub id: Option<u64>,
    pub name: String,
    pub location: String,
    pub acronym: String,
    pub image_url: String,
    /// Roster attached during enrichment. Empty when unknown or unavailable.
    pub players: Vec<Player>,
}

impl Team {
    pub fn short_label(&self) -> &str {
        if self.acronym.is_empty() { &self.name } else { &self.acronym }
    }

    /// Roster ordered top, jungle, mid, bot, support, then everyone else.
    pub fn roster_by_role(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.iter().collect();
        players.sort_by_key(|p| p.role_rank());
        players
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Player {
    pub id: u64,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub image_url: String,
    /// Free-text position tag from the provider ("top", "jun", "mid", "adc", "sup").
    pub role: String,
}

impl Player {
    pub fn role_rank(&self) -> u8 {
        match self.role.to_lowercase().as_str() {
            "top" => 1,
            "jun" => 2,
            "mid" => 3,
            "adc" => 4,
            "sup" => 5,
            _ => u8::MAX,
        }
    }

    pub fn full_name(&self) -> Option<String> {
        if self.first_name.is_empty() || self.last_name.is_empty() {
            None
        } else {
            Some(format!("{} {}", self.first_name, self.last_name))
        }
    }
}

/// A player as returned by the listing and search endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerProfile {
    #[serde(flatten)]
    pub player: Player,
    pub hometown: String,
    pub current_team: Option<TeamSummary>,
}

impl PlayerProfile {
    pub fn matches_query(&self, query: &str) -> bool {
        contains_ci(&self.player.name, query)
            || contains_ci(&self.player.first_name, query)
            || contains_ci(&self.player.last_name, query)
            || self
                .current_team
                .as_ref()
                .is_some_and(|t| contains_ci(&t.name, query))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamSummary {
    pub id: u64,
    pub name: String,
    pub acronym: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct League {
    pub id: u64,
    pub name: String,
    pub image_url: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub begin_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub league: Option<League>,
    pub serie: Serie,
}

impl Tournament {
    pub fn matches_query(&self, query: &str) -> bool {
        contains_ci(&self.name, query)
            || contains_ci(&self.serie.full_name, query)
            || self.league.as_ref().is_some_and(|l| contains_ci(&l.name, query))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Serie {
    pub name: String,
    pub full_name: String,
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
