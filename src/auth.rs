//! OAuth user authentication for Google APIs.
//!
//! Implements the installed-app flow: a persisted token is reused while it
//! is valid, refreshed with the refresh-token grant when it expired, and
//! re-obtained through an interactive browser consent when neither works.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::error::{Result, ScribeError};
use crate::models::{ClientSecrets, StoredToken, TokenResponse};

/// Google Drive read-only scope.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Seconds of validity a token must still have to be served from cache.
const EXPIRY_BUFFER_SECS: u64 = 60;

static REDIRECT_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]code=([^&\s]+)").expect("Invalid code regex"));

static REDIRECT_ERROR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]error=([^&\s]+)").expect("Invalid error regex"));

/// Storage for the persisted OAuth token.
///
/// Production uses [`FileTokenStore`]; tests substitute [`MemoryTokenStore`].
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredToken>>;
    fn save(&self, token: &StoredToken) -> Result<()>;
}

/// Token store backed by a JSON file (`token.json`).
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<StoredToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&content) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                // An unreadable token file forces re-consent rather than aborting.
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed token file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        let content = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self.token.lock().unwrap().clone())
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }
}

/// Authenticator for Google APIs using installed-app user credentials.
#[derive(Clone)]
pub struct Authenticator {
    secrets: Arc<ClientSecrets>,
    store: Arc<dyn TokenStore>,
    client: Client,
    cached_token: Arc<RwLock<Option<StoredToken>>>,
}

impl Authenticator {
    /// Create an authenticator from a client-secrets file and a token path.
    pub fn from_files<P: AsRef<Path>, Q: Into<PathBuf>>(
        secrets_path: P,
        token_path: Q,
    ) -> Result<Self> {
        let secrets_path = secrets_path.as_ref();
        let content = fs::read_to_string(secrets_path).map_err(|e| {
            ScribeError::Auth(format!(
                "cannot read client secrets {}: {}",
                secrets_path.display(),
                e
            ))
        })?;
        let secrets: ClientSecrets = serde_json::from_str(&content).map_err(|e| {
            ScribeError::Auth(format!(
                "malformed client secrets {}: {}",
                secrets_path.display(),
                e
            ))
        })?;
        Ok(Self::new(secrets, Arc::new(FileTokenStore::new(token_path))))
    }

    /// Create an authenticator with an explicit token store.
    pub fn new(secrets: ClientSecrets, store: Arc<dyn TokenStore>) -> Self {
        Self {
            secrets: Arc::new(secrets),
            store,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Get a valid access token, refreshing or re-consenting as needed.
    pub async fn access_token(&self) -> Result<String> {
        // Check for a valid cached token first
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token_is_fresh(token) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let stored = self.store.load()?;

        if let Some(token) = stored {
            if token_is_fresh(&token) {
                self.cache(token.clone()).await;
                return Ok(token.access_token);
            }
            if let Some(refresh_token) = token.refresh_token.as_deref() {
                match self.refresh(refresh_token).await {
                    Ok(new_token) => {
                        self.store.save(&new_token)?;
                        let access = new_token.access_token.clone();
                        self.cache(new_token).await;
                        return Ok(access);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "token refresh failed, falling back to consent flow");
                    }
                }
            }
        }

        let new_token = self.interactive_consent().await?;
        self.store.save(&new_token)?;
        let access = new_token.access_token.clone();
        self.cache(new_token).await;
        Ok(access)
    }

    async fn cache(&self, token: StoredToken) {
        let mut cached = self.cached_token.write().await;
        *cached = Some(token);
    }

    /// Exchange a refresh token for a new access token.
    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken> {
        let installed = &self.secrets.installed;
        let params = [
            ("grant_type", "refresh_token"),
            ("client_id", installed.client_id.as_str()),
            ("client_secret", installed.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(&installed.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::Auth(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(stored_from_response(
            token_response,
            Some(refresh_token.to_string()),
        ))
    }

    /// Run the interactive loopback consent flow.
    ///
    /// Binds an ephemeral local port, prints the authorization URL, waits for
    /// Google's redirect and exchanges the authorization code for a token.
    async fn interactive_consent(&self) -> Result<StoredToken> {
        let installed = &self.secrets.installed;

        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}", port);

        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            installed.auth_uri,
            urlencoding::encode(&installed.client_id),
            urlencoding::encode(&redirect_uri),
            urlencoding::encode(DRIVE_SCOPE),
        );

        println!("Open this URL in your browser to authorize Drive access:");
        println!("  {}", auth_url);

        let code = wait_for_redirect_code(listener).await?;

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", installed.client_id.as_str()),
            ("client_secret", installed.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];

        let response = self
            .client
            .post(&installed.token_uri)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScribeError::Auth(format!(
                "code exchange failed ({}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(stored_from_response(token_response, None))
    }
}

fn token_is_fresh(token: &StoredToken) -> bool {
    token.expires_at > unix_now() + EXPIRY_BUFFER_SECS
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}

fn stored_from_response(response: TokenResponse, fallback_refresh: Option<String>) -> StoredToken {
    StoredToken {
        access_token: response.access_token,
        refresh_token: response.refresh_token.or(fallback_refresh),
        expires_at: unix_now() + response.expires_in,
    }
}

/// Accept one connection on the loopback listener and extract the
/// authorization code from the redirect request line.
async fn wait_for_redirect_code(listener: TcpListener) -> Result<String> {
    let (mut stream, _) = listener.accept().await?;

    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let outcome = parse_redirect_request(&request);

    let body = match &outcome {
        Ok(_) => "Authorization received. You may close this tab.",
        Err(_) => "Authorization failed. You may close this tab.",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    outcome
}

/// Extract the `code` query parameter from a redirect request.
fn parse_redirect_request(request: &str) -> Result<String> {
    if let Some(captures) = REDIRECT_ERROR_REGEX.captures(request) {
        let error = captures.get(1).map(|m| m.as_str()).unwrap_or("unknown");
        return Err(ScribeError::Auth(format!("consent declined: {}", error)));
    }

    if let Some(captures) = REDIRECT_CODE_REGEX.captures(request) {
        if let Some(code) = captures.get(1) {
            let decoded = urlencoding::decode(code.as_str())
                .map_err(|e| ScribeError::Auth(format!("invalid authorization code: {}", e)))?;
            return Ok(decoded.into_owned());
        }
    }

    Err(ScribeError::Auth(
        "no authorization code in redirect".to_string(),
    ))
}
