use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.pandascore.co";
/// Gen.G, Cloud9, Fnatic.
pub const DEFAULT_SEED_TEAMS: [u64; 3] = [2882, 1097, 126];

/// Everything the client needs to talk to PandaScore.
///
/// Environment overrides (see `from_env`):
///   - `PANDA_KEY`                  bearer credential
///   - `PANDASCORE_BASE_URL`        upstream root, mostly for tests and mirrors
///   - `LOLTERM_ROSTER_PAGE_SIZE`   players requested per team when enriching matches
///   - `LOLTERM_SEED_TEAMS`         comma-separated team ids for the popular players listing
///   - `LOLTERM_HTTP_TIMEOUT_SECS`  per-request timeout
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    /// Upper bound on roster size. The provider paginates, so this is not "all players".
    pub roster_page_size: u32,
    pub seed_team_ids: Vec<u64>,
    pub seed_roster_page_size: u32,
    pub search_page_size: u32,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            roster_page_size: 20,
            seed_team_ids: DEFAULT_SEED_TEAMS.to_vec(),
            seed_roster_page_size: 10,
            search_page_size: 50,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = non_empty("PANDASCORE_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        config.token = non_empty("PANDA_KEY");
        if let Some(size) = non_empty("LOLTERM_ROSTER_PAGE_SIZE").and_then(|v| v.parse::<u32>().ok())
            && size > 0
        {
            config.roster_page_size = size;
        }
        if let Some(seeds) = non_empty("LOLTERM_SEED_TEAMS") {
            config.seed_team_ids = parse_id_list(&seeds);
        }
        if let Some(secs) = non_empty("LOLTERM_HTTP_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok())
            && secs > 0
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_seed_teams(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.seed_team_ids = ids.into_iter().collect();
        self
    }
}

/// "2882, 1097,abc,2882" -> [2882, 1097]. Garbage is skipped, first occurrence wins.
pub fn parse_id_list(raw: &str) -> Vec<u64> {
    let mut ids: Vec<u64> = Vec::new();
    for id in raw.split(',').filter_map(|s| s.trim().parse::<u64>().ok()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = ApiConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token, None);
        assert_eq!(config.roster_page_size, 20);
        assert_eq!(config.seed_team_ids, vec![2882, 1097, 126]);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PANDA_KEY", " secret "),
            ("PANDASCORE_BASE_URL", "http://127.0.0.1:9999/"),
            ("LOLTERM_ROSTER_PAGE_SIZE", "5"),
            ("LOLTERM_SEED_TEAMS", "1,2,3"),
            ("LOLTERM_HTTP_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.roster_page_size, 5);
        assert_eq!(config.seed_team_ids, vec![1, 2, 3]);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PANDA_KEY", "   "),
            ("LOLTERM_ROSTER_PAGE_SIZE", "lots"),
            ("LOLTERM_HTTP_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(config.token, None);
        assert_eq!(config.roster_page_size, 20);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn id_list_skips_garbage_and_duplicates() {
        assert_eq!(parse_id_list("2882, 1097,abc,,2882"), vec![2882, 1097]);
        assert!(parse_id_list("").is_empty());
    }
}
