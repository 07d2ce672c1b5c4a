//! Port invite dispatcher.

use std::sync::Arc;

use crate::config::SyncConfig;
use crate::domain::InviteOutcome;
use crate::infrastructure::http_client::HttpClientTrait;

/// Response bodies echoed into tolerated-outcome messages are capped here.
const TOLERATED_BODY_LIMIT: usize = 160;

/// Client for Port's user-invite endpoint.
///
/// One attempt per email, no retries. Status codes 409 and 422 are treated
/// as already-satisfied rather than failures, which keeps repeated runs
/// idempotent.
#[derive(Debug)]
pub struct PortClient<C: HttpClientTrait> {
    http: Arc<C>,
    base_url: String,
    auth_header: String,
    notify: bool,
    role: Option<String>,
    team_ids: Option<Vec<String>>,
    dry_run: bool,
}

impl<C: HttpClientTrait> PortClient<C> {
    pub fn new(http: Arc<C>, base_url: impl Into<String>, config: &SyncConfig) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {}", config.port_token),
            notify: config.notify,
            role: config.role.clone(),
            team_ids: config.team_ids.clone(),
            dry_run: config.dry_run,
        }
    }

    fn invite_url(&self) -> String {
        format!("{}/v1/users/invite", self.base_url)
    }

    fn build_body(&self, email: &str) -> serde_json::Value {
        let mut invitee = serde_json::json!({ "email": email });

        if let Some(ref role) = self.role {
            invitee["role"] = serde_json::json!(role);
        }

        if let Some(ref team_ids) = self.team_ids {
            invitee["teamIds"] = serde_json::json!(team_ids);
        }

        serde_json::json!({ "invitee": invitee, "notify": self.notify })
    }

    /// Sends one invite. Transport failures and unexpected statuses become
    /// per-email failures; they never abort the batch.
    pub async fn invite(&self, email: &str) -> InviteOutcome {
        if self.dry_run {
            return InviteOutcome::success("dry-run: not sending");
        }

        let url = self.invite_url();
        let body = self.build_body(email);
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
        ];

        match self.http.post_json(&url, headers, &body).await {
            Ok(resp) => match resp.status {
                200 | 201 | 202 => InviteOutcome::success("invited"),
                409 | 422 => InviteOutcome::success(format!(
                    "skipped ({}) {}",
                    resp.status,
                    truncate(&resp.body, TOLERATED_BODY_LIMIT)
                )),
                status => InviteOutcome::failure(format!("{status} {}", resp.body)),
            },
            Err(e) => InviteOutcome::failure(e.to_string()),
        }
    }
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
