//! OAuth2 client-credentials token acquisition for Microsoft Graph.

use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::config::SyncConfig;
use crate::domain::SyncError;
use crate::infrastructure::http_client::HttpClientTrait;

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Token response from the Microsoft identity platform.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Acquires bearer tokens via the client-credentials flow.
///
/// A sync run is short, so the token is acquired once and never refreshed.
#[derive(Debug)]
pub struct TokenProvider<C: HttpClientTrait> {
    http: Arc<C>,
    login_base_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl<C: HttpClientTrait> TokenProvider<C> {
    pub fn new(http: Arc<C>, login_base_url: impl Into<String>, config: &SyncConfig) -> Self {
        Self {
            http,
            login_base_url: login_base_url.into().trim_end_matches('/').to_string(),
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Acquires a bearer token for the Graph scope. Any failure is fatal.
    pub async fn acquire(&self) -> Result<String, SyncError> {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base_url, self.tenant_id
        );

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ];

        let json = self
            .http
            .post_form(&token_url, &params)
            .await
            .map_err(|e| match e {
                SyncError::Http { message } => SyncError::auth(format!(
                    "failed to acquire Graph token: {message}"
                )),
                other => other,
            })?;

        let response: TokenResponse = serde_json::from_value(json)
            .map_err(|e| SyncError::auth(format!("failed to parse token response: {e}")))?;

        debug!("Acquired Graph access token");
        Ok(response.access_token)
    }
}
