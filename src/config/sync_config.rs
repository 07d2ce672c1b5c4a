//! Per-run sync configuration resolved from the environment.

use crate::domain::SyncError;

/// Immutable bundle of everything one sync run needs. Built once, read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub port_token: String,
    pub group_name: String,
    pub notify: bool,
    pub role: Option<String>,
    pub team_ids: Option<Vec<String>>,
    pub dry_run: bool,
    pub verbose: bool,
}

impl SyncConfig {
    /// Reads credentials and options from the environment. A missing
    /// required variable is a fatal configuration error naming it.
    pub fn from_env(group_name: String, dry_run: bool, verbose: bool) -> Result<Self, SyncError> {
        Ok(Self {
            tenant_id: required_env("GRAPH_TENANT_ID")?,
            client_id: required_env("GRAPH_CLIENT_ID")?,
            client_secret: required_env("GRAPH_CLIENT_SECRET")?,
            port_token: required_env("PORT_API_TOKEN")?,
            group_name,
            notify: env_bool("PORT_NOTIFY", true),
            role: optional_env("PORT_ROLE"),
            team_ids: optional_env("PORT_TEAM_IDS").and_then(|raw| parse_team_ids(&raw)),
            dry_run: dry_run || env_bool("DRY_RUN", false),
            verbose,
        })
    }
}

fn required_env(key: &str) -> Result<String, SyncError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            SyncError::configuration(format!("required environment variable {key} is not set"))
        })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => bool_from_str(&val),
        Err(_) => default,
    }
}

fn bool_from_str(val: &str) -> bool {
    matches!(
        val.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Splits a comma-separated list, trimming entries and dropping empties.
/// Returns None when nothing remains.
fn parse_team_ids(raw: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() { None } else { Some(ids) }
}
