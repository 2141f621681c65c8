//! Ceremony orchestrator.
//!
//! Drives the two passkey ceremonies end-to-end: begin against the
//! relying-party service, transcode, suspend on the platform authenticator,
//! transcode back, finish against the service. One orchestrator instance
//! exists per UI session and allows exactly one ceremony in flight; a
//! second request fails fast instead of queueing or cancelling.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::authenticator::PlatformAuthenticator;
use crate::errors::CeremonyError;
use crate::relying_party::{RegistrationAck, RelyingParty};
use crate::session::IdentityCache;
use crate::transcode;

/// Ceremony progression. A run always starts from `Idle` and, whatever the
/// outcome, leaves the orchestrator back at `Idle` so the user can retry
/// without reloading. `Completed`/`Failed` are observable transitions, not
/// resting states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeremonyState {
    Idle,
    BeginRequested,
    OptionsReady,
    AwaitingAuthenticator,
    CredentialReady,
    FinishRequested,
    Completed,
    Failed,
}

pub struct CeremonyOrchestrator {
    relying_party: Arc<dyn RelyingParty>,
    authenticator: Arc<dyn PlatformAuthenticator>,
    identity: IdentityCache,
    state: Mutex<CeremonyState>,
}

/// In-flight marker for the single permitted ceremony. Dropping it returns
/// the orchestrator to `Idle`, so an abandoned ceremony (navigation away,
/// dropped future) can never wedge the state machine.
struct InFlight<'a> {
    orchestrator: &'a CeremonyOrchestrator,
}

impl InFlight<'_> {
    fn advance(&self, next: CeremonyState) {
        let mut state = self.orchestrator.lock_state();
        tracing::debug!(from = ?*state, to = ?next, "ceremony state transition");
        *state = next;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.orchestrator.lock_state() = CeremonyState::Idle;
    }
}

impl CeremonyOrchestrator {
    /// Constructed once per session; reset on logout by constructing anew.
    pub fn new(
        relying_party: Arc<dyn RelyingParty>,
        authenticator: Arc<dyn PlatformAuthenticator>,
        identity: IdentityCache,
    ) -> Self {
        Self {
            relying_party,
            authenticator,
            identity,
            state: Mutex::new(CeremonyState::Idle),
        }
    }

    pub fn state(&self) -> CeremonyState {
        *self.lock_state()
    }

    pub fn identity(&self) -> &IdentityCache {
        &self.identity
    }

    fn lock_state(&self) -> MutexGuard<'_, CeremonyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether passkey affordances should be shown at all: the platform
    /// must expose a credential API and have a platform authenticator
    /// available. Probe failures are environment facts, not errors.
    pub async fn passkeys_available(&self) -> bool {
        if !self.authenticator.is_supported().await {
            return false;
        }
        self.authenticator.is_platform_authenticator_available().await
    }

    /// Whether the given identifier has a registered passkey; gates the
    /// passkey tab on the login form. Swallows failures to `false`.
    pub async fn identity_has_passkey(&self, email: &str) -> bool {
        self.relying_party.has_passkey(email).await
    }

    /// Runs the registration ceremony: requires an authenticated session
    /// (the service rejects otherwise) and a device label for the new
    /// credential. Returns the server's acknowledgement, which names the
    /// credential the server just stored.
    pub async fn register(&self, label: &str) -> Result<RegistrationAck, CeremonyError> {
        if !self.authenticator.is_supported().await {
            return Err(CeremonyError::CapabilityUnavailable);
        }
        let ceremony = self.try_begin()?;
        let result = self.run_registration(&ceremony, label).await;
        self.conclude(&ceremony, &result);
        result
    }

    /// Runs the authentication ceremony for the given identifier. No
    /// session is required; this is how a session begins. Returns the
    /// redirect target on success.
    pub async fn authenticate(&self, email: &str) -> Result<String, CeremonyError> {
        if !self.authenticator.is_supported().await {
            return Err(CeremonyError::CapabilityUnavailable);
        }
        let ceremony = self.try_begin()?;
        let result = self.run_authentication(&ceremony, email).await;
        self.conclude(&ceremony, &result);
        result
    }

    fn try_begin(&self) -> Result<InFlight<'_>, CeremonyError> {
        let mut state = self.lock_state();
        if *state != CeremonyState::Idle {
            tracing::debug!(current = ?*state, "rejecting ceremony request while in flight");
            return Err(CeremonyError::CeremonyInProgress);
        }
        *state = CeremonyState::BeginRequested;
        Ok(InFlight { orchestrator: self })
    }

    fn conclude<T>(&self, ceremony: &InFlight<'_>, result: &Result<T, CeremonyError>) {
        match result {
            Ok(_) => ceremony.advance(CeremonyState::Completed),
            Err(CeremonyError::UserCancelled) => {
                tracing::debug!("ceremony cancelled by the user");
                ceremony.advance(CeremonyState::Failed);
            }
            Err(err) => {
                tracing::error!(%err, "ceremony failed");
                ceremony.advance(CeremonyState::Failed);
            }
        }
    }

    async fn run_registration(
        &self,
        ceremony: &InFlight<'_>,
        label: &str,
    ) -> Result<RegistrationAck, CeremonyError> {
        let options = self.relying_party.begin_register().await?;
        ceremony.advance(CeremonyState::OptionsReady);

        let options = transcode::to_authenticator_options(options)?;
        ceremony.advance(CeremonyState::AwaitingAuthenticator);

        // Suspends for as long as the user interaction takes.
        let credential = self.authenticator.create_credential(options).await?;
        ceremony.advance(CeremonyState::CredentialReady);

        let payload = transcode::to_server_credential(&credential);
        ceremony.advance(CeremonyState::FinishRequested);

        self.relying_party.finish_register(&payload, label).await
    }

    async fn run_authentication(
        &self,
        ceremony: &InFlight<'_>,
        email: &str,
    ) -> Result<String, CeremonyError> {
        let options = self.relying_party.begin_login(email).await?;
        // The begin request went through, so the identifier is worth
        // pre-filling next time. Ceremony completion does not matter here.
        self.identity.remember_passkey_email(email);
        ceremony.advance(CeremonyState::OptionsReady);

        // An empty allowCredentials list is forwarded as-is: whether
        // anything matches is the authenticator's decision, not ours.
        let options = transcode::to_authenticator_options(options)?;
        ceremony.advance(CeremonyState::AwaitingAuthenticator);

        let credential = self.authenticator.get_assertion(options).await?;
        ceremony.advance(CeremonyState::CredentialReady);

        let payload = transcode::to_server_credential(&credential);
        ceremony.advance(CeremonyState::FinishRequested);

        let outcome = self.relying_party.finish_login(&payload).await?;
        Ok(outcome.redirect)
    }
}
