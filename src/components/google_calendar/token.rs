use super::auth;
use crate::config::Config;
use crate::error::{auth_error, ReportResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Google OAuth token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Access tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Fallback lifetime when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Client id and secret of an OAuth client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientKey {
    pub client_id: String,
    pub client_secret: String,
}

/// Layout of the `credentials.json` downloaded from the Google console
#[derive(Debug, Deserialize)]
struct ClientSecrets {
    installed: Option<ClientKey>,
    web: Option<ClientKey>,
}

/// Read the client key from a credentials file, accepting `installed` or `web` clients
pub fn load_client_key(path: &Path) -> ReportResult<ClientKey> {
    let content = fs::read_to_string(path).map_err(|e| {
        auth_error(&format!(
            "Failed to read credentials file {}: {}",
            path.display(),
            e
        ))
    })?;

    let secrets: ClientSecrets = serde_json::from_str(&content)
        .map_err(|e| auth_error(&format!("Failed to parse credentials file: {}", e)))?;

    secrets
        .installed
        .or(secrets.web)
        .ok_or_else(|| auth_error("Credentials file has neither an 'installed' nor a 'web' client"))
}

/// Successful response of the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

/// Token file contents, compatible with Google's `authorized_user` credential format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorizedUser {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl AuthorizedUser {
    /// Build a token record from a fresh token endpoint response
    pub fn from_response(key: &ClientKey, response: TokenResponse, now: i64) -> ReportResult<Self> {
        let refresh_token = response
            .refresh_token
            .ok_or_else(|| auth_error("Token response is missing a refresh token"))?;

        Ok(Self {
            kind: "authorized_user".to_string(),
            client_id: key.client_id.clone(),
            client_secret: key.client_secret.clone(),
            refresh_token,
            access_token: Some(response.access_token),
            expires_at: Some(now + response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN)),
        })
    }

    /// Access token that is still usable at `now`
    pub fn valid_access_token(&self, now: i64) -> Option<&str> {
        match (&self.access_token, self.expires_at) {
            (Some(token), Some(expires_at)) if expires_at - EXPIRY_MARGIN_SECS > now => {
                Some(token.as_str())
            }
            _ => None,
        }
    }

    /// Replace the access token with a refreshed one
    pub fn apply_refresh(&mut self, response: TokenResponse, now: i64) {
        self.access_token = Some(response.access_token);
        self.expires_at = Some(now + response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN));
        // Google may rotate the refresh token
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = refresh_token;
        }
    }

    pub fn client_key(&self) -> ClientKey {
        ClientKey {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    /// Read a saved token; any read or parse failure counts as no token
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No saved token at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!("Ignoring unreadable token file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> ReportResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Produces access tokens for the Calendar API, persisting them to the token file
#[derive(Clone)]
pub struct TokenManager {
    config: Arc<Config>,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Get an access token, from the token file, by refreshing, or through consent
    pub async fn get_access_token(&self) -> ReportResult<String> {
        let now = Utc::now().timestamp();

        let mut token = match AuthorizedUser::load(&self.config.token_path) {
            Some(token) => token,
            None => {
                info!("No saved credentials, starting authorization flow");
                let token = self.authorize().await?;
                return token
                    .access_token
                    .ok_or_else(|| auth_error("Authorization returned no access token"));
            }
        };

        if let Some(access_token) = token.valid_access_token(now) {
            debug!("Reusing cached access token");
            return Ok(access_token.to_string());
        }

        self.refresh_token(&mut token).await?;
        token.save(&self.config.token_path)?;

        token
            .access_token
            .ok_or_else(|| auth_error("Refresh returned no access token"))
    }

    /// Run the interactive consent flow and save the resulting token
    pub async fn authorize(&self) -> ReportResult<AuthorizedUser> {
        let key = load_client_key(&self.config.credentials_path)?;
        let token = auth::run_consent_flow(&self.config, &key, &self.client).await?;
        token.save(&self.config.token_path)?;
        info!("Saved credentials to {}", self.config.token_path.display());
        Ok(token)
    }

    /// Exchange the refresh token for a new access token
    async fn refresh_token(&self, token: &mut AuthorizedUser) -> ReportResult<()> {
        debug!("Refreshing access token");

        let params = [
            ("client_id", token.client_id.clone()),
            ("client_secret", token.client_secret.clone()),
            ("refresh_token", token.refresh_token.clone()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        token.apply_refresh(refreshed, Utc::now().timestamp());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn key() -> ClientKey {
        ClientKey {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
        }
    }

    fn response(refresh_token: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "access".to_string(),
            expires_in: Some(3599),
            refresh_token: refresh_token.map(str::to_string),
        }
    }

    #[test]
    fn test_load_client_key_installed_and_web() {
        let mut installed = tempfile::NamedTempFile::new().unwrap();
        write!(
            installed,
            r#"{{"installed":{{"client_id":"a","client_secret":"b","redirect_uris":["http://localhost"]}}}}"#
        )
        .unwrap();
        assert_eq!(load_client_key(installed.path()).unwrap().client_id, "a");

        let mut web = tempfile::NamedTempFile::new().unwrap();
        write!(web, r#"{{"web":{{"client_id":"c","client_secret":"d"}}}}"#).unwrap();
        assert_eq!(load_client_key(web.path()).unwrap().client_secret, "d");

        let mut neither = tempfile::NamedTempFile::new().unwrap();
        write!(neither, "{{}}").unwrap();
        assert!(load_client_key(neither.path()).is_err());

        assert!(load_client_key(Path::new("missing-credentials.json")).is_err());
    }

    #[test]
    fn test_from_response_requires_refresh_token() {
        assert!(AuthorizedUser::from_response(&key(), response(None), 0).is_err());

        let token = AuthorizedUser::from_response(&key(), response(Some("refresh")), 1000).unwrap();
        assert_eq!(token.kind, "authorized_user");
        assert_eq!(token.refresh_token, "refresh");
        assert_eq!(token.expires_at, Some(4599));
        assert_eq!(token.client_key(), key());
    }

    #[test]
    fn test_valid_access_token_respects_margin() {
        let token = AuthorizedUser::from_response(&key(), response(Some("refresh")), 0).unwrap();
        assert_eq!(token.valid_access_token(0), Some("access"));
        assert_eq!(token.valid_access_token(3599 - EXPIRY_MARGIN_SECS), None);
        assert_eq!(token.valid_access_token(10_000), None);
    }

    #[test]
    fn test_apply_refresh_keeps_refresh_token() {
        let mut token =
            AuthorizedUser::from_response(&key(), response(Some("refresh")), 0).unwrap();
        token.apply_refresh(
            TokenResponse {
                access_token: "new-access".to_string(),
                expires_in: None,
                refresh_token: None,
            },
            100,
        );

        assert_eq!(token.access_token.as_deref(), Some("new-access"));
        assert_eq!(token.expires_at, Some(100 + DEFAULT_EXPIRES_IN));
        assert_eq!(token.refresh_token, "refresh");
    }

    #[test]
    fn test_save_and_load_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        assert!(AuthorizedUser::load(&path).is_none());

        let token = AuthorizedUser::from_response(&key(), response(Some("refresh")), 0).unwrap();
        token.save(&path).unwrap();
        assert_eq!(AuthorizedUser::load(&path), Some(token));

        // Files written by other Google client libraries have no cached access token
        fs::write(
            &path,
            r#"{"type":"authorized_user","client_id":"a","client_secret":"b","refresh_token":"c"}"#,
        )
        .unwrap();
        let loaded = AuthorizedUser::load(&path).unwrap();
        assert_eq!(loaded.valid_access_token(0), None);
    }
}
