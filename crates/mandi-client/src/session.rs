//! # Session Holder
//!
//! Owns the bearer token and the signed-in user, persists them, and turns
//! authentication failures into a trip to the login page.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  restore() ──► token + tokenExpiration in store?                        │
//! │                   │ no ─────────────────────────────► signed out        │
//! │                   │ expired ──► force_logout() ─────► /login            │
//! │                   ▼                                                     │
//! │  login() / signup() ──► POST /auth/* ──► token                          │
//! │                   │                                                     │
//! │                   ├── exp claim (or token_ttl_minutes) ─► expires_at    │
//! │                   ├── user from response or GET /user/profile           │
//! │                   └── persist token, user, tokenExpiration              │
//! │                                                                         │
//! │  with_token(call) ──► 401 ──► clear session ──► /login                  │
//! │                   └─► 403 ──────────────────────► /login                │
//! │                                                                         │
//! │  logout() ──► remove token, user, tokenExpiration                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Expiry
//! The expiry comes from the token's `exp` claim. The signature is not
//! checked here; only the backend can do that. Tokens without a readable
//! claim are assumed to last `token_ttl_minutes`.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mandi_core::User;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{Credentials, SignupRequest, SignupResponse, StorefrontApi, TokenResponse};
use crate::config::SessionSettings;
use crate::error::{ClientError, ClientResult};
use crate::navigator::{Destination, Navigator};
use crate::store::{SessionStore, EXPIRATION_KEY, SESSION_KEYS, TOKEN_KEY, USER_KEY};

const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

// =============================================================================
// Session
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    user: Option<User>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Result of a signup.
#[derive(Debug, Clone, PartialEq)]
pub enum SignupOutcome {
    /// The backend returned a token; the user is now signed in.
    SignedIn(User),
    /// The account exists but the user still has to log in.
    Created(User),
}

// =============================================================================
// Token Expiry
// =============================================================================

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads the `exp` claim without verifying the signature.
pub fn token_claim_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp?, 0)
}

/// When a freshly issued token should be treated as expired.
///
/// A TTL too large to add to `now` places no cap on the claim; without a
/// claim it is a configuration error.
pub fn token_expiry(
    token: &str,
    settings: &SessionSettings,
    now: DateTime<Utc>,
) -> ClientResult<DateTime<Utc>> {
    let ttl_limit = Duration::try_minutes(settings.token_ttl_minutes)
        .and_then(|ttl| now.checked_add_signed(ttl));

    match (token_claim_expiry(token), ttl_limit) {
        (Some(exp), _) if settings.remember_me => Ok(exp),
        (Some(exp), Some(limit)) => Ok(exp.min(limit)),
        (Some(exp), None) => Ok(exp),
        (None, Some(limit)) => Ok(limit),
        (None, None) => Err(ClientError::Config(format!(
            "token_ttl_minutes {} is out of range",
            settings.token_ttl_minutes
        ))),
    }
}

// =============================================================================
// Session Holder
// =============================================================================

/// Shared owner of the signed-in session.
///
/// Services hold it behind an `Arc` and route every authenticated call
/// through [`SessionHolder::with_token`].
pub struct SessionHolder {
    api: Arc<dyn StorefrontApi>,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    settings: SessionSettings,
    state: RwLock<Option<Session>>,
}

impl SessionHolder {
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        settings: SessionSettings,
    ) -> Self {
        SessionHolder {
            api,
            store,
            navigator,
            settings,
            state: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &Arc<dyn StorefrontApi> {
        &self.api
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // =========================================================================
    // Sign in / out
    // =========================================================================

    /// Loads the persisted session, if any.
    ///
    /// An expired session is cleared and the user is sent to log in. When
    /// the stored user record is missing it is fetched again.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        let token = match self.store.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => {
                debug!("No stored session");
                return Ok(None);
            }
        };

        let stored_expiry = self
            .store
            .get(EXPIRATION_KEY)?
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);
        let expires_at = match stored_expiry {
            Some(expires_at) => expires_at,
            None => token_expiry(&token, &self.settings, Utc::now())?,
        };

        if Utc::now() >= expires_at {
            info!(%expires_at, "Stored session has expired");
            self.force_logout().await;
            return Ok(None);
        }

        let user = self.store.get(USER_KEY)?.and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .map_err(|e| warn!(error = %e, "Ignoring unreadable stored user"))
                .ok()
        });

        *self.state.write().await = Some(Session {
            token: SecretString::from(token),
            user: user.clone(),
            expires_at,
        });

        let user = match user {
            Some(user) => user,
            None => self.refresh_user().await?,
        };

        info!(user_id = user.id, %expires_at, "Session restored");
        Ok(Some(user))
    }

    /// Signs in with email and password.
    ///
    /// A 401 here means wrong credentials, so it does not trigger the
    /// login redirect.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        let response = self.api.login(credentials).await?;
        self.establish(response).await
    }

    /// Creates an account, signing in when the backend hands out a token.
    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<SignupOutcome> {
        let request = request.validate()?;

        match self.api.signup(&request).await? {
            SignupResponse::Token(response) => {
                Ok(SignupOutcome::SignedIn(self.establish(response).await?))
            }
            SignupResponse::Created(user) => {
                info!(user_id = user.id, "Account created");
                Ok(SignupOutcome::Created(user))
            }
        }
    }

    /// Forgets the session locally and in storage.
    ///
    /// Every key is removed even if one removal fails; the first failure
    /// is returned.
    pub async fn logout(&self) -> ClientResult<()> {
        self.state.write().await.take();

        let mut first_error = None;
        for key in SESSION_KEYS {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove session key");
                first_error.get_or_insert(e);
            }
        }

        info!("Signed out");
        first_error.map_or(Ok(()), Err)
    }

    /// Logs out and sends the user to the login page.
    pub async fn force_logout(&self) {
        if let Err(e) = self.logout().await {
            warn!(error = %e, "Session storage not fully cleared");
        }
        self.navigator.navigate(Destination::Login);
    }

    async fn establish(&self, response: TokenResponse) -> ClientResult<User> {
        let raw_token = response.access_token;
        let expires_at = token_expiry(&raw_token, &self.settings, Utc::now())?;
        let token = SecretString::from(raw_token);

        let user = match response.user {
            Some(user) => user,
            None => self.api.profile(&token).await?,
        };

        self.store.set(TOKEN_KEY, token.expose_secret())?;
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.store
            .set(EXPIRATION_KEY, &expires_at.timestamp_millis().to_string())?;

        *self.state.write().await = Some(Session {
            token,
            user: Some(user.clone()),
            expires_at,
        });

        info!(user_id = user.id, role = %user.role, %expires_at, "Signed in");
        Ok(user)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub async fn current_user(&self) -> Option<User> {
        self.state
            .read()
            .await
            .as_ref()
            .and_then(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .await
            .as_ref()
            .is_some_and(|s| !s.is_expired())
    }

    pub async fn is_admin(&self) -> bool {
        self.current_user().await.is_some_and(|u| u.is_admin())
    }

    /// The bearer token, while it is still valid.
    pub async fn token(&self) -> Option<SecretString> {
        self.state
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_expired())
            .map(|s| s.token.clone())
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.clone()
    }

    /// The bearer token, or why there is none.
    pub async fn require_token(&self) -> ClientResult<SecretString> {
        let guard = self.state.read().await;
        match guard.as_ref() {
            None => Err(ClientError::NotAuthenticated),
            Some(s) if s.is_expired() => {
                Err(ClientError::Unauthorized(SESSION_EXPIRED_MESSAGE.to_string()))
            }
            Some(s) => Ok(s.token.clone()),
        }
    }

    /// Replaces the stored user record, e.g. after a profile edit.
    pub async fn set_user(&self, user: User) -> ClientResult<()> {
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        if let Some(session) = self.state.write().await.as_mut() {
            session.user = Some(user);
        }
        Ok(())
    }

    /// Fetches the user record again and stores it.
    pub async fn refresh_user(&self) -> ClientResult<User> {
        let user = self
            .with_token(|api, token| async move { api.profile(&token).await })
            .await?;
        self.set_user(user.clone()).await?;
        Ok(user)
    }

    // =========================================================================
    // Authenticated Calls
    // =========================================================================

    /// Runs an authenticated call and applies the login-required rule to
    /// its outcome.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let cart = session
    ///     .with_token(|api, token| async move { api.cart(&token).await })
    ///     .await?;
    /// ```
    pub async fn with_token<T, F, Fut>(&self, call: F) -> ClientResult<T>
    where
        F: FnOnce(Arc<dyn StorefrontApi>, SecretString) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let result = match self.require_token().await {
            Ok(token) => call(Arc::clone(&self.api), token).await,
            Err(e) => Err(e),
        };
        self.observe(result).await
    }

    /// 401 clears the session; 401, 403 and "not signed in" all send the
    /// user to the login page.
    pub async fn observe<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(err) = &result {
            if err.invalidates_session() {
                warn!(error = %err, "Session rejected by backend");
                if let Err(e) = self.logout().await {
                    warn!(error = %e, "Session storage not fully cleared");
                }
            }
            if err.requires_login() {
                self.navigator.navigate(Destination::Login);
            }
        }
        result
    }
}

impl std::fmt::Debug for SessionHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHolder")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
