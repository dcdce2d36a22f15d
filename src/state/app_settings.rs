use log::LevelFilter;
use std::str::FromStr;

#[derive(Debug, Default, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
}

impl AppSettings {
    /// `LOLTERM_LOG=debug` raises the in-app log pane's verbosity.
    pub fn load() -> Self {
        Self::from_log_var(std::env::var("LOLTERM_LOG").ok().as_deref())
    }

    fn from_log_var(raw: Option<&str>) -> Self {
        let log_level = raw.and_then(|v| LevelFilter::from_str(v.trim()).ok());
        Self { full_screen: false, log_level }
    }
}
