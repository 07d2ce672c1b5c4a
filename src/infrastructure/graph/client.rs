//! Authenticated transport for Microsoft Graph list endpoints.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::domain::SyncError;
use crate::infrastructure::http_client::HttpClientTrait;

/// Response wrapper for paginated Graph list endpoints.
#[derive(Debug, Deserialize)]
pub struct ODataPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Graph client carrying the bearer token for one run.
#[derive(Debug)]
pub struct GraphClient<C: HttpClientTrait> {
    http: Arc<C>,
    base_url: String,
    auth_header: String,
}

impl<C: HttpClientTrait> Clone for GraphClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            base_url: self.base_url.clone(),
            auth_header: self.auth_header.clone(),
        }
    }
}

impl<C: HttpClientTrait> GraphClient<C> {
    pub fn new(http: Arc<C>, base_url: impl Into<String>, token: &str) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {token}"),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers<'a>(&'a self, url: &str) -> Vec<(&'a str, &'a str)> {
        let mut headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Accept", "application/json"),
        ];

        // Graph requires this for advanced queries ($count / $search).
        if needs_consistency_level(url) {
            headers.push(("ConsistencyLevel", "eventual"));
        }

        headers
    }

    /// GET against an absolute Graph URL. Non-2xx responses and transport
    /// failures are fatal directory errors.
    pub async fn get(&self, url: &str) -> Result<serde_json::Value, SyncError> {
        self.http
            .get_json(url, self.headers(url))
            .await
            .map_err(|e| match e {
                SyncError::Http { message } => SyncError::directory(message),
                other => other,
            })
    }

    /// GET a paged list endpoint, deserializing the `value` array.
    pub async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<ODataPage<T>, SyncError> {
        let json = self.get(url).await?;
        serde_json::from_value(json)
            .map_err(|e| SyncError::directory(format!("failed to parse directory response: {e}")))
    }
}

fn needs_consistency_level(url: &str) -> bool {
    url.contains("$count=true") || url.contains("$search=")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    #[test]
    fn test_consistency_level_detection() {
        assert!(needs_consistency_level(
            "https://graph.example.com/v1.0/groups?$count=true"
        ));
        assert!(needs_consistency_level(
            "https://graph.example.com/v1.0/groups?$search=\"displayName:team\""
        ));
        assert!(!needs_consistency_level(
            "https://graph.example.com/v1.0/groups?$filter=displayName%20eq%20%27x%27"
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = GraphClient::new(
            Arc::new(MockHttpClient::new()),
            "https://graph.example.com/v1.0/",
            "tok",
        );
        assert_eq!(client.base_url(), "https://graph.example.com/v1.0");
    }

    #[tokio::test]
    async fn test_get_page_parses_value_and_next_link() {
        const URL: &str = "https://graph.example.com/v1.0/groups?$top=5";

        let client = Arc::new(MockHttpClient::new().with_get_response(
            URL,
            serde_json::json!({
                "value": [{"id": "g-1", "displayName": "Team A"}],
                "@odata.nextLink": "https://graph.example.com/v1.0/groups?$skiptoken=abc"
            }),
        ));

        let graph = GraphClient::new(client, "https://graph.example.com/v1.0", "tok");
        let page: ODataPage<crate::domain::Group> = graph.get_page(URL).await.unwrap();

        assert_eq!(page.value.len(), 1);
        assert_eq!(page.value[0].id, "g-1");
        assert!(page.next_link.as_deref().unwrap().contains("$skiptoken=abc"));
    }

    #[tokio::test]
    async fn test_transport_failure_becomes_directory_error() {
        const URL: &str = "https://graph.example.com/v1.0/groups";

        let client = Arc::new(MockHttpClient::new().with_error(URL, "connection refused"));
        let graph = GraphClient::new(client, "https://graph.example.com/v1.0", "tok");

        let err = graph.get(URL).await.unwrap_err();
        assert!(matches!(err, SyncError::Directory { .. }), "{err}");
    }
}
