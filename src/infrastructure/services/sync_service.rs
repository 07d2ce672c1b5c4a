//! Orchestrates one sync run: resolve group, expand membership, extract
//! emails, dispatch invites, aggregate counters.

use std::collections::BTreeSet;
use std::time::Duration;

use futures::TryStreamExt;
use tracing::{debug, info};

use crate::domain::{SyncError, SyncReport, extract_email};
use crate::infrastructure::graph::{GraphClient, TransitiveMembersPager, find_group};
use crate::infrastructure::http_client::HttpClientTrait;
use crate::infrastructure::port::PortClient;

/// Fixed pause between invite calls. A courtesy throttle, not adaptive
/// rate limiting.
const INVITE_THROTTLE: Duration = Duration::from_millis(50);

pub struct SyncService<C: HttpClientTrait> {
    graph: GraphClient<C>,
    port: PortClient<C>,
    throttle: Duration,
}

impl<C: HttpClientTrait + 'static> SyncService<C> {
    pub fn new(graph: GraphClient<C>, port: PortClient<C>) -> Self {
        Self {
            graph,
            port,
            throttle: INVITE_THROTTLE,
        }
    }

    #[cfg(test)]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Runs the full sync. Resolution-phase errors abort the run; invite
    /// failures are counted and reported, never fatal.
    pub async fn run(&self, group_name: &str) -> Result<SyncReport, SyncError> {
        info!("Resolving group '{}'", group_name);
        let group = find_group(&self.graph, group_name).await?;
        info!(
            "Found group: {} ({})",
            group.display_name.as_deref().unwrap_or(group_name),
            group.id
        );

        let emails = self.collect_emails(&group.id).await?;
        info!("Will invite {} users", emails.len());

        let mut report = SyncReport::default();

        for (i, email) in emails.iter().enumerate() {
            let outcome = self.port.invite(email).await;
            let status = if outcome.ok { "OK" } else { "ERR" };

            println!(
                "[{}/{}] {}: {} - {}",
                i + 1,
                emails.len(),
                email,
                status,
                outcome.message
            );
            report.record(&outcome);

            if !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
        }

        println!(
            "Done. Invited OK: {}, failed: {}",
            report.invited, report.failed
        );

        Ok(report)
    }

    /// Walks the transitive membership and returns the deduplicated, sorted
    /// set of valid emails. A BTreeSet makes both invariants structural.
    async fn collect_emails(&self, group_id: &str) -> Result<BTreeSet<String>, SyncError> {
        let pager = TransitiveMembersPager::new(self.graph.clone(), group_id);
        let mut stream = Box::pin(pager.into_stream());

        let mut emails = BTreeSet::new();

        while let Some(member) = stream.try_next().await? {
            match extract_email(&member) {
                Some(email) => {
                    emails.insert(email);
                }
                None => debug!(
                    "Skipping member without usable email: {}",
                    member.display_name.as_deref().unwrap_or(member.id.as_str())
                ),
            }
        }

        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use std::sync::Arc;

    const GRAPH_BASE: &str = "https://graph.example.com/v1.0";
    const PORT_BASE: &str = "https://port.example.com";
    const INVITE_URL: &str = "https://port.example.com/v1/users/invite";

    fn config(dry_run: bool) -> SyncConfig {
        SyncConfig {
            tenant_id: "t".to_string(),
            client_id: "c".to_string(),
            client_secret: "s".to_string(),
            port_token: "port-token".to_string(),
            group_name: "Team A".to_string(),
            notify: true,
            role: None,
            team_ids: None,
            dry_run,
            verbose: false,
        }
    }

    fn service(client: Arc<MockHttpClient>, dry_run: bool) -> SyncService<MockHttpClient> {
        let graph = GraphClient::new(client.clone(), GRAPH_BASE, "tok");
        let port = PortClient::new(client, PORT_BASE, &config(dry_run));
        SyncService::new(graph, port).with_throttle(Duration::ZERO)
    }

    fn groups_url(filter: &str) -> String {
        format!(
            "{GRAPH_BASE}/groups?$select=id,displayName&$filter={}&$top=5",
            urlencoding::encode(filter)
        )
    }

    fn members_url(group_id: &str) -> String {
        format!(
            "{GRAPH_BASE}/groups/{group_id}/transitiveMembers?$select=id,displayName,mail,userPrincipalName&$top=999"
        )
    }

    fn user(id: &str, mail: Option<&str>) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "@odata.type": "#microsoft.graph.user",
            "id": id,
            "displayName": id
        });
        if let Some(mail) = mail {
            obj["mail"] = serde_json::json!(mail);
        }
        obj
    }

    #[tokio::test]
    async fn test_run_invites_valid_members_only() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Team A'"),
                    serde_json::json!({"value": [{"id": "g-1", "displayName": "Team A"}]}),
                )
                .with_get_response(
                    members_url("g-1"),
                    serde_json::json!({"value": [
                        user("u-1", Some("a@x.com")),
                        user("u-2", None)
                    ]}),
                )
                .with_post_response(INVITE_URL, 202, "{}"),
        );

        let report = service(client.clone(), false).run("Team A").await.unwrap();

        assert_eq!(report.invited, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.total, 1);
        assert_eq!(client.call_count(INVITE_URL), 1);
    }

    #[tokio::test]
    async fn test_emails_deduplicated_and_sorted() {
        // Same user reachable through two nested groups, plus an unsorted pair.
        let page2 = format!("{GRAPH_BASE}/page2?$skiptoken=t1");

        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Team A'"),
                    serde_json::json!({"value": [{"id": "g-1", "displayName": "Team A"}]}),
                )
                .with_get_response(
                    members_url("g-1"),
                    serde_json::json!({
                        "value": [user("u-1", Some("b@x.com")), user("u-2", Some("a@x.com"))],
                        "@odata.nextLink": page2
                    }),
                )
                .with_get_response(
                    page2,
                    serde_json::json!({"value": [user("u-3", Some("a@x.com"))]}),
                ),
        );

        let svc = service(client, false);
        let emails = svc.collect_emails("g-1").await.unwrap();

        assert_eq!(
            emails.into_iter().collect::<Vec<_>>(),
            vec!["a@x.com".to_string(), "b@x.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_group_not_found_aborts_without_invites() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Ghost'"),
                    serde_json::json!({"value": []}),
                )
                .with_get_response(
                    groups_url("startswith(displayName,'Ghost')"),
                    serde_json::json!({"value": []}),
                ),
        );

        let err = service(client.clone(), false).run("Ghost").await.unwrap_err();

        assert!(matches!(err, SyncError::NotFound { .. }), "{err}");
        assert_eq!(client.call_count(INVITE_URL), 0);
    }

    #[tokio::test]
    async fn test_invite_failure_does_not_abort_batch() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Team A'"),
                    serde_json::json!({"value": [{"id": "g-1", "displayName": "Team A"}]}),
                )
                .with_get_response(
                    members_url("g-1"),
                    serde_json::json!({"value": [
                        user("u-1", Some("a@x.com")),
                        user("u-2", Some("b@x.com"))
                    ]}),
                )
                .with_post_response(INVITE_URL, 500, "boom"),
        );

        let report = service(client.clone(), false).run("Team A").await.unwrap();

        // Both attempted despite failures.
        assert_eq!(report.total, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(client.call_count(INVITE_URL), 2);
    }

    #[tokio::test]
    async fn test_dry_run_skips_network_dispatch() {
        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Team A'"),
                    serde_json::json!({"value": [{"id": "g-1", "displayName": "Team A"}]}),
                )
                .with_get_response(
                    members_url("g-1"),
                    serde_json::json!({"value": [user("u-1", Some("a@x.com"))]}),
                ),
        );

        let report = service(client.clone(), true).run("Team A").await.unwrap();

        assert_eq!(report.invited, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(client.call_count(INVITE_URL), 0);
    }

    #[tokio::test]
    async fn test_directory_error_mid_pagination_is_fatal() {
        let page2 = format!("{GRAPH_BASE}/page2?$skiptoken=t1");

        let client = Arc::new(
            MockHttpClient::new()
                .with_get_response(
                    groups_url("displayName eq 'Team A'"),
                    serde_json::json!({"value": [{"id": "g-1", "displayName": "Team A"}]}),
                )
                .with_get_response(
                    members_url("g-1"),
                    serde_json::json!({
                        "value": [user("u-1", Some("a@x.com"))],
                        "@odata.nextLink": page2
                    }),
                )
                .with_error(page2, "503 throttled"),
        );

        let err = service(client.clone(), false).run("Team A").await.unwrap_err();

        assert!(matches!(err, SyncError::Directory { .. }), "{err}");
        assert_eq!(client.call_count(INVITE_URL), 0);
    }
}
