//! Group resolution by display name.

use tracing::warn;

use crate::domain::{Group, SyncError, build_filter};
use crate::infrastructure::graph::client::{GraphClient, ODataPage};
use crate::infrastructure::http_client::HttpClientTrait;

/// Candidates requested per lookup; more than one already means ambiguity.
const CANDIDATE_LIMIT: u32 = 5;

/// Finds a group by display name: exact match first, `startswith` fallback.
///
/// When several groups share the name, a warning lists them all and the
/// first in server order wins. Zero matches on both queries is fatal.
pub async fn find_group<C: HttpClientTrait>(
    client: &GraphClient<C>,
    name: &str,
) -> Result<Group, SyncError> {
    let exact = filter_for(name, "eq")?;
    let mut items = query_groups(client, &exact).await?;

    if items.is_empty() {
        let prefix = filter_for(name, "startswith")?;
        items = query_groups(client, &prefix).await?;
    }

    if items.is_empty() {
        return Err(SyncError::not_found(format!("group not found: {name}")));
    }

    if items.len() > 1 {
        warn!("Multiple groups matched '{}'; using the first:", name);
        for group in &items {
            warn!(
                "  - {} ({})",
                group.display_name.as_deref().unwrap_or("<unnamed>"),
                group.id
            );
        }
    }

    let mut group = items.remove(0);
    if group.display_name.is_none() {
        group.display_name = Some(name.to_string());
    }

    Ok(group)
}

fn filter_for(name: &str, operator: &str) -> Result<String, SyncError> {
    build_filter("displayName", operator, name)
        .map_err(|e| SyncError::validation(format!("invalid group name: {e}")))
}

async fn query_groups<C: HttpClientTrait>(
    client: &GraphClient<C>,
    filter: &str,
) -> Result<Vec<Group>, SyncError> {
    let url = format!(
        "{}/groups?$select=id,displayName&$filter={}&$top={}",
        client.base_url(),
        urlencoding::encode(filter),
        CANDIDATE_LIMIT
    );

    let page: ODataPage<Group> = client.get_page(&url).await?;
    Ok(page.value)
}
