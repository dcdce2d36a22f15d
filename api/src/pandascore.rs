//! PandaScore raw wire types: serde shapes for deserializing provider responses.
//! These map to our clean domain types via the mapping functions in client.rs.
//! Fields we never render are simply not declared, so serde drops them.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Matches  (/lol/matches/running, /lol/matches/upcoming)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsMatch {
    pub id: u64,
    pub name: Option<String>,
    pub scheduled_at: Option<String>, // ISO 8601
    pub begin_at: Option<String>,
    pub league: Option<PsLeague>,
    /// Missing, null and empty all mean "no opponents announced yet".
    pub opponents: Option<Vec<PsOpponentEntry>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsOpponentEntry {
    pub opponent: Option<PsTeam>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTeam {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub acronym: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsLeague {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub slug: Option<String>,
}

// ---------------------------------------------------------------------------
// Players  (/lol/players)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsPlayer {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
    pub role: Option<String>,
    pub hometown: Option<String>,
    pub current_team: Option<PsTeam>,
}

// ---------------------------------------------------------------------------
// Tournaments  (/lol/tournaments/running)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsTournament {
    pub id: u64,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub begin_at: Option<String>,
    pub end_at: Option<String>,
    pub league: Option<PsLeague>,
    pub serie: Option<PsSerie>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PsSerie {
    pub name: Option<String>,
    pub full_name: Option<String>,
}
