//! Credential lifecycle.
//!
//! A `Session` owns the current bearer token, mirrors it into durable
//! storage and into the client's default `Authorization` header, and keeps
//! it fresh with a single renewal timer. The timer fires `margin` seconds
//! before expiry; a failed background renewal logs the user out.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gamedb_core::Token;
use gamedb_core::config::SessionConfig as SessionSettings;

use crate::client::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::params::Params;
use crate::schedule::{ScheduledTask, TaskId};
use crate::storage::TokenStorage;

/// The UI entry point shown when the user has to sign in again.
pub trait LoginSurface: Send + Sync {
    /// Whether the login surface is what the user is looking at right now.
    fn is_current(&self) -> bool;
    fn present(&self);
}

/// A surface that is always current, for headless embedders.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoginSurface;

impl LoginSurface for NoLoginSurface {
    fn is_current(&self) -> bool {
        true
    }

    fn present(&self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A credential is set but no renewal is pending (disposed, or a renewal
    /// is in flight).
    Authenticated,
    RenewalScheduled,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Credentials with this much time or less left are discarded, and
    /// renewal fires this long before expiry.
    pub safety_margin: Duration,
    pub auth_path: String,
    pub refresh_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            safety_margin: settings.safety_margin(),
            auth_path: settings.auth_path.clone(),
            refresh_path: settings.refresh_path.clone(),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Default)]
struct Slot {
    token: Option<Token>,
    renewal: Option<ScheduledTask>,
}

impl Slot {
    fn state(&self) -> SessionState {
        match (&self.token, &self.renewal) {
            (None, _) => SessionState::Unauthenticated,
            (Some(_), None) => SessionState::Authenticated,
            (Some(_), Some(_)) => SessionState::RenewalScheduled,
        }
    }
}

struct Inner {
    client: ApiClient,
    storage: Arc<dyn TokenStorage>,
    surface: Arc<dyn LoginSurface>,
    config: SessionConfig,
    slot: Mutex<Slot>,
    /// Serializes storage writes in the order the slot changed. Taken while
    /// `slot` is still held, then `slot` is released before the I/O.
    io_order: Mutex<()>,
}

/// Storage write owed after a slot change.
enum Persist {
    Store(String),
    Clear,
}

/// Authenticated session over an [`ApiClient`].
///
/// Cheap to clone; clones share the same credential and renewal timer.
/// Methods that install a credential spawn the renewal timer and must be
/// called from within a tokio runtime.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl Session {
    pub fn new(
        client: ApiClient,
        storage: Arc<dyn TokenStorage>,
        surface: Arc<dyn LoginSurface>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                storage,
                surface,
                config,
                slot: Mutex::new(Slot::default()),
                io_order: Mutex::new(()),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Restore a persisted credential. Anything undecodable or too close to
    /// expiry is wiped from storage.
    pub fn initialize(&self) -> SessionState {
        let raw = match self.inner.storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.state(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                return self.state();
            }
        };

        match Token::decode(raw.as_str()) {
            Ok(token) => {
                debug!(subject = token.subject(), ttl = token.ttl(), "Restoring persisted token");
                self.inner.replace(Some(token))
            }
            Err(e) => {
                warn!(error = %e, "Discarding undecodable persisted token");
                self.inner.replace(None)
            }
        }
    }

    /// Exchange username and password for a credential.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<SessionState> {
        let body = LoginRequest { username, password };
        let resp: TokenResponse = self
            .inner
            .client
            .post(&self.inner.config.auth_path, &body, &Params::new())
            .await?;
        let state = self.inner.set_token(Some(&resp.token))?;
        info!(username, ?state, "Logged in");
        Ok(state)
    }

    /// Renew the current credential now.
    ///
    /// On failure the session is left as it was.
    pub async fn refresh(&self) -> ApiResult<SessionState> {
        if self.token().is_none() {
            return Err(ApiError::Unauthenticated);
        }
        let raw = self.inner.request_refresh().await?;
        self.inner.set_token(Some(&raw))
    }

    /// Install `raw` as the credential, replacing any previous one and its
    /// renewal timer. `None`, or a credential within the safety margin of
    /// expiry, leaves the session unauthenticated.
    ///
    /// A string that does not decode is rejected with the session untouched.
    pub fn set_token(&self, raw: Option<&str>) -> ApiResult<SessionState> {
        self.inner.set_token(raw)
    }

    /// Drop the credential everywhere and bring up the login surface.
    pub fn logout(&self) {
        self.inner.logout();
    }

    /// Stop the renewal timer. The credential stays in memory and on disk.
    pub fn dispose(&self) {
        self.inner.lock().renewal = None;
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state()
    }

    pub fn token(&self) -> Option<Token> {
        self.inner.lock().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().token.is_some()
    }

    /// Whether the current credential's roles grant `role`.
    pub fn is_role_granted(&self, role: &str) -> bool {
        self.inner
            .lock()
            .token
            .as_ref()
            .is_some_and(|t| t.has_role(role))
    }

    /// Delay of the pending renewal, if one is scheduled.
    pub fn renewal_delay(&self) -> Option<Duration> {
        self.inner.lock().renewal.as_ref().map(ScheduledTask::delay)
    }

    /// Identity of the pending renewal, if one is scheduled.
    pub fn renewal_id(&self) -> Option<TaskId> {
        self.inner.lock().renewal.as_ref().map(ScheduledTask::id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.inner.lock();
        f.debug_struct("Session")
            .field("state", &slot.state())
            .field("subject", &slot.token.as_ref().map(Token::subject))
            .field("base_url", &self.inner.client.base_url())
            .finish_non_exhaustive()
    }
}

/// Time until renewal for a credential with `ttl_secs` left: `margin` before
/// expiry, but never sooner than one second.
pub fn renewal_delay(ttl_secs: i64, margin: Duration) -> Duration {
    let margin = i64::try_from(margin.as_secs()).unwrap_or(i64::MAX);
    let secs = u64::try_from(ttl_secs.saturating_sub(margin)).unwrap_or(0);
    Duration::from_secs(secs.max(1))
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_token(self: &Arc<Self>, raw: Option<&str>) -> ApiResult<SessionState> {
        let token = raw.map(Token::decode).transpose()?;
        Ok(self.replace(token))
    }

    /// Swap the credential in one critical section, then persist.
    fn replace(self: &Arc<Self>, token: Option<Token>) -> SessionState {
        let mut slot = self.lock();
        let (state, persist) = self.apply(&mut slot, token);
        self.persist(slot, persist);
        state
    }

    /// Make `token` current (attach it and schedule its renewal), or clear
    /// the credential when there is none or it is within the safety margin.
    /// Any previous renewal timer is aborted.
    fn apply(self: &Arc<Self>, slot: &mut Slot, token: Option<Token>) -> (SessionState, Persist) {
        slot.renewal = None;
        match token {
            Some(token) if token.is_usable(self.config.safety_margin) => {
                let delay = renewal_delay(token.ttl(), self.config.safety_margin);
                let raw = token.as_str().to_string();
                self.client.set_bearer(&raw);
                slot.renewal = Some(self.schedule_renewal(raw.clone(), delay));
                debug!(
                    subject = token.subject(),
                    delay_secs = delay.as_secs(),
                    "Scheduled token renewal"
                );
                slot.token = Some(token);
                (slot.state(), Persist::Store(raw))
            }
            token => {
                if let Some(token) = token {
                    debug!(ttl = token.ttl(), "Rejecting token within the safety margin");
                }
                slot.token = None;
                self.client.clear_bearer();
                (SessionState::Unauthenticated, Persist::Clear)
            }
        }
    }

    /// Release `slot` and perform the storage write it owes, keeping writes
    /// in slot order without holding `slot` across file I/O.
    fn persist(&self, slot: MutexGuard<'_, Slot>, persist: Persist) {
        let _order = self.io_order.lock().unwrap_or_else(PoisonError::into_inner);
        drop(slot);
        let (result, what) = match &persist {
            Persist::Store(raw) => (self.storage.store(raw), "persist"),
            Persist::Clear => (self.storage.clear(), "clear persisted"),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to {what} token");
        }
    }

    fn present_login(&self) {
        if !self.surface.is_current() {
            self.surface.present();
        }
    }

    fn logout(self: &Arc<Self>) {
        self.replace(None);
        self.present_login();
        info!("Logged out");
    }

    async fn request_refresh(&self) -> ApiResult<String> {
        let resp: TokenResponse = self
            .client
            .get(&self.config.refresh_path, &Params::new(), None)
            .await?;
        Ok(resp.token)
    }

    fn schedule_renewal(self: &Arc<Self>, previous: String, delay: Duration) -> ScheduledTask {
        let weak = Arc::downgrade(self);
        ScheduledTask::after(delay, move |id| renew(weak, id, previous))
    }

    /// Apply the outcome of a background refresh of `previous`.
    ///
    /// Checked and applied under one slot lock: if the credential changed
    /// meanwhile the outcome is dropped. A failed refresh, or one that yields
    /// a credential too close to expiry, logs the user out.
    fn finish_renewal(self: &Arc<Self>, previous: &str, outcome: ApiResult<String>) {
        let outcome = outcome.and_then(|raw| Token::decode(raw).map_err(ApiError::from));

        let mut slot = self.lock();
        if slot.token.as_ref().map(Token::as_str) != Some(previous) {
            debug!("Credential changed during renewal; discarding result");
            return;
        }

        match outcome {
            Ok(token) if token.is_usable(self.config.safety_margin) => {
                let (state, persist) = self.apply(&mut slot, Some(token));
                self.persist(slot, persist);
                debug!(?state, "Token renewed");
            }
            Ok(token) => {
                let reason = format!("renewed token expires in {}s", token.ttl());
                self.fail_renewal(slot, &reason);
            }
            Err(e) => self.fail_renewal(slot, &e.to_string()),
        }
    }

    fn fail_renewal(self: &Arc<Self>, mut slot: MutexGuard<'_, Slot>, reason: &str) {
        warn!(error = reason, "Token renewal failed; logging out");
        let (_, persist) = self.apply(&mut slot, None);
        self.persist(slot, persist);
        self.present_login();
        info!("Logged out");
    }
}

/// Body of the renewal timer.
async fn renew(weak: Weak<Inner>, id: TaskId, previous: String) {
    let Some(inner) = weak.upgrade() else {
        return;
    };

    // Release our own slot without aborting ourselves.
    {
        let mut slot = inner.lock();
        match slot.renewal.take_if(|task| task.id() == id) {
            Some(task) => task.detach(),
            None => return,
        }
    }

    let outcome = inner.request_refresh().await;
    inner.finish_renewal(&previous, outcome);
}
