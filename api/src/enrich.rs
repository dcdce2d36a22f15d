//! Match enrichment: attach a roster to every team referenced by a batch of matches.
//!
//! The flow is a fan-out/fan-in join over distinct team ids:
//!
//!   raw batch -> distinct team ids -> one roster lookup per id (concurrently)
//!             -> settle-all barrier -> id -> roster map -> second walk over the batch
//!
//! A failed lookup degrades to an empty roster for that team only. Nothing in here
//! can fail the batch; the only fatal error is fetching the batch itself, which
//! happens before this module is reached.
use crate::client::{ApiResult, map_match};
use crate::pandascore::PsMatch;
use crate::{Match, Player};
use futures_util::future::join_all;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::future::Future;

/// Anything that can look up a team's roster. `PandaScoreApi` is the real one;
/// tests plug in stubs.
pub trait RosterSource {
    fn fetch_roster(&self, team_id: u64) -> impl Future<Output = ApiResult<Vec<Player>>> + Send;
}

/// Distinct team ids referenced by the batch. Opponent slots without a team,
/// or a team without an id, contribute nothing.
pub fn collect_team_ids(raw_matches: &[PsMatch]) -> HashSet<u64> {
    raw_matches
        .iter()
        .flat_map(|m| m.opponents.iter().flatten())
        .filter_map(|entry| entry.opponent.as_ref().and_then(|team| team.id))
        .collect()
}

/// Run `fetch` once per id, all at once, and wait for every call to settle.
///
/// Each call isolates its own failure before the join: an `Err` is logged and
/// recorded as an empty list, so the join itself can never short-circuit.
pub async fn settle_rosters<T, F, Fut>(
    team_ids: impl IntoIterator<Item = u64>,
    fetch: F,
) -> HashMap<u64, Vec<T>>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = ApiResult<Vec<T>>>,
{
    let lookups = team_ids.into_iter().map(|team_id| {
        let lookup = fetch(team_id);
        async move {
            let roster = match lookup.await {
                Ok(roster) => roster,
                Err(e) => {
                    warn!("roster for team {team_id} unavailable, using empty roster: {e}");
                    Vec::new()
                }
            };
            (team_id, roster)
        }
    });

    join_all(lookups).await.into_iter().collect()
}

/// Enrich a raw match batch. Output has the same length and order as the input.
pub async fn enrich<S: RosterSource>(source: &S, raw_matches: Vec<PsMatch>) -> Vec<Match> {
    let team_ids = collect_team_ids(&raw_matches);
    debug!(
        "enriching {} matches with {} distinct teams",
        raw_matches.len(),
        team_ids.len()
    );

    let rosters = settle_rosters(team_ids, |team_id| source.fetch_roster(team_id)).await;
    attach_rosters(raw_matches, &rosters)
}

/// Second walk: map each raw match and give every present team its roster.
/// Teams with no id, or an id missing from the map, get an empty roster.
pub fn attach_rosters(raw_matches: Vec<PsMatch>, rosters: &HashMap<u64, Vec<Player>>) -> Vec<Match> {
    raw_matches
        .into_iter()
        .map(|raw| {
            let mut m = map_match(raw);
            for team in m.opponents.iter_mut().filter_map(|o| o.opponent.as_mut()) {
                team.players = team
                    .id
                    .and_then(|id| rosters.get(&id))
                    .cloned()
                    .unwrap_or_default();
            }
            m
        })
        .collect()
}
