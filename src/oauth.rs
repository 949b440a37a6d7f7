//! OAuth 2.0 Authorization Code Flow with PKCE for Twitter/X.
//!
//! [`AuthSession`] drives the flow: `/auth` calls
//! [`AuthSession::begin_authorization`] and `/callback` finishes it. A
//! successful exchange yields an [`AuthenticatedSession`], which is the only
//! type that can post. The pending verifier and the issued session sit behind
//! one mutex, so concurrent `/auth` visits overwrite each other in order
//! instead of interleaving.

use async_trait::async_trait;
use base64::Engine;
use log::{debug, error, info, warn};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

use crate::config::{mask_secret, BotConfig};
use crate::error::{AuthError, NotAuthenticatedError, PostError};
use crate::twitter::{Mention, PostConfirmation, SocialPlatform, TwitterClient};

/// Consent endpoint.
pub const TWITTER_AUTH_URL: &str = "https://twitter.com/i/oauth2/authorize";
/// Token endpoint.
pub const TWITTER_TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";
/// Scopes requested from the operator.
pub const DEFAULT_SCOPES: &[&str] = &["tweet.read", "tweet.write", "users.read"];

const VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
const VERIFIER_LENGTH: usize = 128;

/// Builds the Authorization header for OAuth 2.0 User Context authentication.
///
/// # Example
///
/// ```rust
/// use react_ai_bot::build_oauth2_user_context_header;
///
/// let header = build_oauth2_user_context_header("your_access_token");
/// assert_eq!(header, "Bearer your_access_token");
/// ```
pub fn build_oauth2_user_context_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Generates a random PKCE code verifier from the unreserved character set.
pub fn generate_code_verifier() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFIER_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..VERIFIER_CHARSET.len());
            VERIFIER_CHARSET[idx] as char
        })
        .collect()
}

/// Derives the S256 code challenge for a verifier.
pub fn generate_code_challenge(code_verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn generate_state() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Builds the consent URL for the authorization code flow.
pub fn build_authorization_url(
    authorize_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
    code_challenge: &str,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(authorize_url)?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256");
    Ok(url.to_string())
}

/// The platform side of the flow: trading a code for a token and opening an
/// API client with that token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<String, AuthError>;

    fn connect(&self, access_token: String) -> Arc<dyn SocialPlatform>;
}

/// Token exchange against the Twitter OAuth 2.0 token endpoint.
#[derive(Debug, Clone)]
pub struct TwitterOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
}

impl TwitterOAuth {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: TWITTER_TOKEN_URL.into(),
            api_base: crate::twitter::DEFAULT_API_BASE.into(),
        }
    }

    /// Set the token endpoint and API base URL (for testing).
    #[must_use]
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl TokenExchange for TwitterOAuth {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<String, AuthError> {
        info!("Exchanging authorization code for access token");

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", redirect_uri),
            ("code", code),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Token exchange failed with status {}", status);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message: crate::twitter::sanitize_for_logging(&body, 200),
            });
        }

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|_| AuthError::MissingAccessToken)?;
        let access_token = json
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or(AuthError::MissingAccessToken)?;

        debug!("Access token (masked): {}", mask_secret(access_token));
        Ok(access_token.to_string())
    }

    fn connect(&self, access_token: String) -> Arc<dyn SocialPlatform> {
        Arc::new(TwitterClient::new(access_token).with_base_url(self.api_base.clone()))
    }
}

/// Result of starting an authorization.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Consent URL to redirect the operator to
    pub url: String,
    /// Verifier that must accompany the code exchange
    pub code_verifier: String,
    /// CSRF state echoed back on the callback
    pub state: String,
}

#[derive(Debug, Clone)]
struct PendingAuthorization {
    code_verifier: String,
    state: String,
}

#[derive(Default)]
struct AuthState {
    pending: Option<PendingAuthorization>,
    session: Option<AuthenticatedSession>,
}

/// Handle to the authenticated platform account.
///
/// Only obtainable from [`AuthSession`] after a successful exchange, so every
/// call site that posts has already proven authentication.
#[derive(Clone)]
pub struct AuthenticatedSession {
    platform: Arc<dyn SocialPlatform>,
}

impl fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedSession").finish_non_exhaustive()
    }
}

impl AuthenticatedSession {
    pub(crate) fn new(platform: Arc<dyn SocialPlatform>) -> Self {
        Self { platform }
    }

    /// Publishes a tweet.
    pub async fn post(&self, text: &str) -> Result<PostConfirmation, PostError> {
        self.platform.post_tweet(text).await
    }

    /// Publishes `text` as a threaded reply.
    pub async fn reply(&self, text: &str, in_reply_to: u64) -> Result<PostConfirmation, PostError> {
        self.platform.reply_to_tweet(text, in_reply_to).await
    }

    /// Fetches mentions newer than `since_id`, oldest first.
    pub async fn mentions_since(
        &self,
        since_id: Option<u64>,
        max_results: u32,
    ) -> Result<Vec<Mention>, PostError> {
        self.platform.fetch_mentions(since_id, max_results).await
    }
}

/// OAuth state for the single bot account.
pub struct AuthSession {
    client_id: String,
    redirect_uri: String,
    authorize_url: String,
    scopes: Vec<&'static str>,
    exchange: Arc<dyn TokenExchange>,
    state: Mutex<AuthState>,
}

impl AuthSession {
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        exchange: Arc<dyn TokenExchange>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: TWITTER_AUTH_URL.into(),
            scopes: DEFAULT_SCOPES.to_vec(),
            exchange,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Builds a session talking to the real Twitter endpoints.
    pub fn from_config(config: &BotConfig) -> Self {
        let exchange = TwitterOAuth::new(&config.client_id, &config.client_secret);
        Self::new(&config.client_id, config.redirect_uri(), Arc::new(exchange))
    }

    /// Starts a new authorization, replacing any pending one.
    pub async fn begin_authorization(&self) -> Result<AuthorizationRequest, AuthError> {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();

        let url = build_authorization_url(
            &self.authorize_url,
            &self.client_id,
            &self.redirect_uri,
            &self.scopes,
            &state,
            &code_challenge,
        )?;

        let mut guard = self.state.lock().await;
        if guard.pending.is_some() {
            warn!("Replacing a pending authorization that never completed");
        }
        guard.pending = Some(PendingAuthorization {
            code_verifier: code_verifier.clone(),
            state: state.clone(),
        });
        info!("Authorization started, waiting for callback");

        Ok(AuthorizationRequest {
            url,
            code_verifier,
            state,
        })
    }

    /// Exchanges `code` using `code_verifier`, which must be the verifier of
    /// the pending authorization. The pending authorization is consumed either way.
    pub async fn complete_authorization(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthenticatedSession, AuthError> {
        let pending = self
            .take_pending(|pending| {
                if pending.code_verifier == code_verifier {
                    Ok(())
                } else {
                    Err(AuthError::VerifierMismatch)
                }
            })
            .await?;
        self.exchange_and_store(code, &pending.code_verifier).await
    }

    /// Completes the pending authorization from the callback parameters.
    ///
    /// When the platform echoes `state`, it must match the pending one.
    pub async fn complete_callback(
        &self,
        code: &str,
        returned_state: Option<&str>,
    ) -> Result<AuthenticatedSession, AuthError> {
        let pending = self
            .take_pending(|pending| match returned_state {
                Some(state) if state != pending.state => Err(AuthError::StateMismatch),
                _ => Ok(()),
            })
            .await?;
        self.exchange_and_store(code, &pending.code_verifier).await
    }

    /// The authenticated handle, if the flow has completed.
    pub async fn session(&self) -> Result<AuthenticatedSession, NotAuthenticatedError> {
        self.state
            .lock()
            .await
            .session
            .clone()
            .ok_or(NotAuthenticatedError)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    async fn take_pending<F>(&self, check: F) -> Result<PendingAuthorization, AuthError>
    where
        F: FnOnce(&PendingAuthorization) -> Result<(), AuthError>,
    {
        let mut guard = self.state.lock().await;
        let pending = guard
            .pending
            .take()
            .ok_or(AuthError::NoPendingAuthorization)?;
        if let Err(e) = check(&pending) {
            warn!("Rejecting callback: {}", e);
            return Err(e);
        }
        Ok(pending)
    }

    async fn exchange_and_store(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<AuthenticatedSession, AuthError> {
        let access_token = self
            .exchange
            .exchange_code(code, code_verifier, &self.redirect_uri)
            .await?;

        let session = AuthenticatedSession::new(self.exchange.connect(access_token));
        self.state.lock().await.session = Some(session.clone());
        info!("Twitter client authenticated");
        Ok(session)
    }
}
