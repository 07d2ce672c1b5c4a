//! Ordered-provider resolution of the group name to sync.
//!
//! Priority: CLI flag, then the GROUP_NAME environment variable, then a
//! webhook-style JSON payload (file named by WEBHOOK_PAYLOAD_PATH, else
//! piped stdin). The core only ever sees the resolved non-empty string.

use std::io::IsTerminal;

use tracing::{debug, warn};

use crate::domain::SyncError;

/// One place a group name may come from.
pub trait GroupNameProvider {
    fn source(&self) -> &'static str;
    fn lookup(&self) -> Option<String>;
}

/// The `--group` flag.
pub struct CliFlag(pub Option<String>);

impl GroupNameProvider for CliFlag {
    fn source(&self) -> &'static str {
        "cli flag"
    }

    fn lookup(&self) -> Option<String> {
        self.0.clone()
    }
}

/// The GROUP_NAME environment variable.
pub struct EnvVar;

impl GroupNameProvider for EnvVar {
    fn source(&self) -> &'static str {
        "GROUP_NAME env"
    }

    fn lookup(&self) -> Option<String> {
        std::env::var("GROUP_NAME").ok()
    }
}

/// A webhook payload, read from WEBHOOK_PAYLOAD_PATH or piped stdin.
pub struct WebhookPayload;

impl GroupNameProvider for WebhookPayload {
    fn source(&self) -> &'static str {
        "webhook payload"
    }

    fn lookup(&self) -> Option<String> {
        let payload = read_payload()?;
        group_name_from_payload(&payload)
    }
}

/// Walks the provider chain in priority order; the first non-empty value
/// wins. Exhausting the chain is a fatal configuration error.
pub fn resolve_group_name(flag: Option<String>) -> Result<String, SyncError> {
    let cli_flag = CliFlag(flag);
    let providers: [&dyn GroupNameProvider; 3] = [&cli_flag, &EnvVar, &WebhookPayload];

    for provider in providers {
        if let Some(name) = provider.lookup() {
            let name = name.trim().to_string();
            if !name.is_empty() {
                debug!("Group name resolved from {}", provider.source());
                return Ok(name);
            }
        }
    }

    Err(SyncError::configuration(
        "group name not provided; use --group, set GROUP_NAME, or supply a webhook payload",
    ))
}

/// Extracts a group name from the known webhook payload shapes.
pub fn group_name_from_payload(payload: &serde_json::Value) -> Option<String> {
    ["/resource/groupName", "/data/group", "/group"]
        .iter()
        .find_map(|pointer| payload.pointer(pointer))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

fn read_payload() -> Option<serde_json::Value> {
    if let Ok(path) = std::env::var("WEBHOOK_PAYLOAD_PATH") {
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(payload) => return Some(payload),
                Err(e) => {
                    warn!("Could not parse webhook payload at {path}: {e}");
                    return None;
                }
            },
            Err(e) => {
                warn!("Could not read webhook payload at {path}: {e}");
                return None;
            }
        }
    }

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return None;
    }

    serde_json::from_reader(stdin.lock()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_resource_group_name() {
        let payload = serde_json::json!({"resource": {"groupName": "Team A"}});
        assert_eq!(group_name_from_payload(&payload).as_deref(), Some("Team A"));
    }

    #[test]
    fn test_payload_data_group() {
        let payload = serde_json::json!({"data": {"group": "Team B"}});
        assert_eq!(group_name_from_payload(&payload).as_deref(), Some("Team B"));
    }

    #[test]
    fn test_payload_top_level_group() {
        let payload = serde_json::json!({"group": "Team C"});
        assert_eq!(group_name_from_payload(&payload).as_deref(), Some("Team C"));
    }

    #[test]
    fn test_payload_priority_order() {
        let payload = serde_json::json!({
            "resource": {"groupName": "First"},
            "data": {"group": "Second"},
            "group": "Third"
        });
        assert_eq!(group_name_from_payload(&payload).as_deref(), Some("First"));
    }

    #[test]
    fn test_payload_without_group() {
        let payload = serde_json::json!({"event": "push"});
        assert_eq!(group_name_from_payload(&payload), None);
    }

    #[test]
    fn test_payload_empty_name_ignored() {
        let payload = serde_json::json!({"group": "  "});
        assert_eq!(group_name_from_payload(&payload), None);
    }

    #[test]
    fn test_flag_takes_priority() {
        let name = resolve_group_name(Some("Flag Team".to_string())).unwrap();
        assert_eq!(name, "Flag Team");
    }

    #[test]
    fn test_flag_value_is_trimmed() {
        let name = resolve_group_name(Some("  Padded Team  ".to_string())).unwrap();
        assert_eq!(name, "Padded Team");
    }
}
