use super::token::{AuthorizedUser, ClientKey, TokenResponse, TOKEN_URL};
use crate::config::Config;
use crate::error::{auth_error, ReportResult};
use chrono::Utc;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

/// Google OAuth consent endpoint
pub const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Build the consent URL the user is sent to
pub fn authorization_url(
    key: &ClientKey,
    redirect_uri: &str,
    scopes: &[String],
    state: &str,
) -> ReportResult<Url> {
    let mut url = Url::parse(AUTH_URL)
        .map_err(|e| auth_error(&format!("Failed to parse URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("client_id", &key.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state);

    Ok(url)
}

/// Extract the authorization code from a redirect request path.
///
/// Returns `Ok(None)` for requests that are not the OAuth callback (a browser
/// asking for `/favicon.ico`, say).
pub fn parse_callback(request_path: &str, expected_state: &str) -> ReportResult<Option<String>> {
    let url = Url::parse(&format!("http://localhost{}", request_path))
        .map_err(|e| auth_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(auth_error(&format!("Authorization was denied: {}", error)));
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }

    Ok(Some(code))
}

/// Block on the loopback listener until the OAuth callback arrives
fn wait_for_code(server: tiny_http::Server, state: String) -> ReportResult<String> {
    loop {
        let request = server
            .recv()
            .map_err(|e| auth_error(&format!("Failed to receive callback: {}", e)))?;

        match parse_callback(request.url(), &state) {
            Ok(Some(code)) => {
                let response = tiny_http::Response::from_string(
                    "Authorization successful! You can close this window.",
                );
                request.respond(response)?;
                return Ok(code);
            }
            Ok(None) => {
                let response = tiny_http::Response::from_string("Not found").with_status_code(404);
                request.respond(response)?;
            }
            Err(e) => {
                let response = tiny_http::Response::from_string(
                    "Authorization failed. See the terminal for details.",
                )
                .with_status_code(400);
                request.respond(response)?;
                return Err(e);
            }
        }
    }
}

/// Exchange an authorization code for tokens
async fn exchange_code(
    client: &Client,
    key: &ClientKey,
    code: &str,
    redirect_uri: &str,
) -> ReportResult<AuthorizedUser> {
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", key.client_id.as_str()),
            ("client_secret", key.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to get token: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        return Err(auth_error(&format!("Failed to get token: {}", error_text)));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

    AuthorizedUser::from_response(key, token, Utc::now().timestamp())
}

/// Interactive consent: open the browser, wait for the redirect and exchange the code
pub async fn run_consent_flow(
    config: &Config,
    key: &ClientKey,
    client: &Client,
) -> ReportResult<AuthorizedUser> {
    let redirect_uri = format!("http://localhost:{}", config.redirect_port);

    // Random state guards the callback against forged requests
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = authorization_url(key, &redirect_uri, &config.scopes, &state)?;

    let server = tiny_http::Server::http(("127.0.0.1", config.redirect_port))
        .map_err(|e| auth_error(&format!("Failed to start callback listener: {}", e)))?;

    info!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Could not open a browser ({}), visit this URL manually: {}", e, auth_url);
    }

    info!("Waiting for authorization callback on {}", redirect_uri);
    let code = tokio::task::spawn_blocking(move || wait_for_code(server, state))
        .await
        .map_err(|e| auth_error(&format!("Callback listener failed: {}", e)))??;

    exchange_code(client, key, &code, &redirect_uri).await
}
