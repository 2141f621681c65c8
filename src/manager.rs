//! Credential lifecycle manager.
//!
//! List, register and delete operations over the user's stored
//! credentials. The manager's in-memory list is a projection of server
//! state, reconciled by re-fetching after every mutating ceremony; it is
//! never a write source. Rendering is an external collaborator.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::ceremony::CeremonyOrchestrator;
use crate::config::PASSKEY_LABEL_MAX_LEN;
use crate::errors::CeremonyError;
use crate::relying_party::RelyingParty;
use crate::types::CredentialHandle;

/// Destructive-action confirmation seam. Implementations ask the user;
/// the manager never deletes without an affirmative answer.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// `true` means the user confirmed removing the named credential.
    async fn confirm_delete(&self, name: &str) -> bool;
}

pub struct CredentialManager {
    relying_party: Arc<dyn RelyingParty>,
    orchestrator: Arc<CeremonyOrchestrator>,
    prompt: Arc<dyn UserPrompt>,
    credentials: Mutex<Vec<CredentialHandle>>,
}

impl CredentialManager {
    pub fn new(
        relying_party: Arc<dyn RelyingParty>,
        orchestrator: Arc<CeremonyOrchestrator>,
        prompt: Arc<dyn UserPrompt>,
    ) -> Self {
        Self {
            relying_party,
            orchestrator,
            prompt,
            credentials: Mutex::new(Vec::new()),
        }
    }

    fn lock_credentials(&self) -> MutexGuard<'_, Vec<CredentialHandle>> {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetches the credential list from the service and replaces the local
    /// projection. An empty list renders as an empty state, not an error.
    pub async fn list(&self) -> Result<Vec<CredentialHandle>, CeremonyError> {
        let fetched = self.relying_party.list_credentials().await?;
        *self.lock_credentials() = fetched.clone();
        Ok(fetched)
    }

    /// The current projection, for display between fetches.
    pub fn cached(&self) -> Vec<CredentialHandle> {
        self.lock_credentials().clone()
    }

    /// Registers a new credential labelled `label` and returns the
    /// server-assigned handle. The finish acknowledgement names the stored
    /// credential's id; the handle itself is taken from the mandatory list
    /// re-fetch, never synthesized locally (timestamps and ids are
    /// server-owned).
    pub async fn register(&self, label: &str) -> Result<CredentialHandle, CeremonyError> {
        let label = validate_label(label)?;

        let ack = self.orchestrator.register(&label).await?;
        let registered = ack.passkey.ok_or_else(|| {
            CeremonyError::ServerRejected(
                "registration acknowledgement carried no credential".to_string(),
            )
        })?;

        let after = self.list().await?;
        after
            .into_iter()
            .find(|c| c.id == registered.id)
            .ok_or_else(|| {
                CeremonyError::ServerRejected(
                    "registered credential missing from refreshed list".to_string(),
                )
            })
    }

    /// Deletes a credential after explicit user confirmation. Returns
    /// `false` when the user declined; no network call is made in that
    /// case. Deleting the last credential is permitted: lockout policy is
    /// the server's concern.
    pub async fn delete(&self, credential_id: &str) -> Result<bool, CeremonyError> {
        let name = self
            .lock_credentials()
            .iter()
            .find(|c| c.id == credential_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| credential_id.to_string());

        if !self.prompt.confirm_delete(&name).await {
            tracing::debug!(credential_id, "delete declined by the user");
            return Ok(false);
        }

        self.relying_party.delete_credential(credential_id).await?;
        self.list().await?;
        Ok(true)
    }
}

fn validate_label(label: &str) -> Result<String, CeremonyError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(CeremonyError::InvalidLabel(
            "a device label is required".to_string(),
        ));
    }
    if trimmed.len() > *PASSKEY_LABEL_MAX_LEN {
        return Err(CeremonyError::InvalidLabel(format!(
            "device label exceeds {} characters",
            *PASSKEY_LABEL_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}
