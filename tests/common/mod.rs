//! Shared mocks: an in-memory relying party and a scriptable platform
//! authenticator.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Semaphore;

use tally_passkey::{
    AuthenticatorCredential, AuthenticatorError, AuthenticatorOptions, AuthenticatorOutput,
    CeremonyError, CredentialHandle, CredentialRef, LoginSuccess, PlatformAuthenticator,
    PublicKeyOptions, RegistrationAck, RelyingParty, RpEntity, ServerCredential, UserEntity,
    UserPrompt,
};

#[derive(Clone)]
pub enum MockOutcome {
    Succeed,
    Cancel,
    Fail(String),
}

/// Platform authenticator whose prompt outcome is scripted by the test.
/// An optional zero-permit semaphore parks the prompt mid-ceremony so
/// reentrancy can be exercised.
pub struct MockAuthenticator {
    pub supported: bool,
    pub platform_available: bool,
    outcome: Mutex<MockOutcome>,
    gate: Option<Arc<Semaphore>>,
    pub create_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub last_allow_count: Mutex<Option<usize>>,
}

impl MockAuthenticator {
    pub fn new() -> Self {
        Self {
            supported: true,
            platform_available: true,
            outcome: Mutex::new(MockOutcome::Succeed),
            gate: None,
            create_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            last_allow_count: Mutex::new(None),
        }
    }

    pub fn unsupported() -> Self {
        let mut mock = Self::new();
        mock.supported = false;
        mock
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        let mut mock = Self::new();
        mock.gate = Some(gate);
        mock
    }

    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    async fn prompt(&self, kind: PromptKind) -> Result<AuthenticatorCredential, AuthenticatorError> {
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.expect("gate closed");
            permit.forget();
        }
        match self.outcome.lock().unwrap().clone() {
            MockOutcome::Succeed => Ok(match kind {
                PromptKind::Create => AuthenticatorCredential {
                    id: "bW9jaw".to_string(),
                    raw_id: vec![0x6d, 0x6f, 0x63, 0x6b],
                    type_: "public-key".to_string(),
                    response: AuthenticatorOutput {
                        client_data_json: vec![4, 5, 6],
                        attestation_object: Some(vec![7, 8, 9]),
                        ..Default::default()
                    },
                },
                PromptKind::Get => AuthenticatorCredential {
                    id: "bW9jaw".to_string(),
                    raw_id: vec![0x6d, 0x6f, 0x63, 0x6b],
                    type_: "public-key".to_string(),
                    response: AuthenticatorOutput {
                        client_data_json: vec![4, 5, 6],
                        authenticator_data: Some(vec![10]),
                        signature: Some(vec![11]),
                        ..Default::default()
                    },
                },
            }),
            MockOutcome::Cancel => Err(AuthenticatorError::Cancelled),
            MockOutcome::Fail(message) => Err(AuthenticatorError::Failed(message)),
        }
    }
}

enum PromptKind {
    Create,
    Get,
}

#[async_trait]
impl PlatformAuthenticator for MockAuthenticator {
    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn is_platform_authenticator_available(&self) -> bool {
        self.platform_available
    }

    async fn create_credential(
        &self,
        options: AuthenticatorOptions,
    ) -> Result<AuthenticatorCredential, AuthenticatorError> {
        assert!(!options.challenge.is_empty(), "challenge must be decoded");
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.prompt(PromptKind::Create).await
    }

    async fn get_assertion(
        &self,
        options: AuthenticatorOptions,
    ) -> Result<AuthenticatorCredential, AuthenticatorError> {
        assert!(!options.challenge.is_empty(), "challenge must be decoded");
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_allow_count.lock().unwrap() =
            options.allow_credentials.as_ref().map(|list| list.len());
        self.prompt(PromptKind::Get).await
    }
}

/// In-memory relying party holding the authoritative credential store.
pub struct MockRelyingParty {
    pub credentials: Mutex<Vec<CredentialHandle>>,
    pub allow_credentials: Mutex<Option<Vec<CredentialRef>>>,
    pub fail_begin_login: bool,
    pub fail_check: bool,
    next_id: AtomicUsize,
    pub begin_register_calls: AtomicUsize,
    pub finish_register_calls: AtomicUsize,
    pub begin_login_calls: AtomicUsize,
    pub finish_login_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockRelyingParty {
    pub fn new() -> Self {
        Self {
            credentials: Mutex::new(Vec::new()),
            allow_credentials: Mutex::new(None),
            fail_begin_login: false,
            fail_check: false,
            next_id: AtomicUsize::new(1),
            begin_register_calls: AtomicUsize::new(0),
            finish_register_calls: AtomicUsize::new(0),
            begin_login_calls: AtomicUsize::new(0),
            finish_login_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RelyingParty for MockRelyingParty {
    async fn begin_register(&self) -> Result<PublicKeyOptions, CeremonyError> {
        self.begin_register_calls.fetch_add(1, Ordering::SeqCst);
        Ok(PublicKeyOptions {
            challenge: "AQID".to_string(),
            rp: Some(RpEntity {
                id: Some("tally.example".to_string()),
                name: Some("Tally".to_string()),
            }),
            rp_id: None,
            user: Some(UserEntity {
                id: "dXNlcg".to_string(),
                name: Some("ada".to_string()),
                display_name: Some("Ada".to_string()),
            }),
            pub_key_cred_params: None,
            timeout: Some(60_000),
            exclude_credentials: None,
            allow_credentials: None,
            authenticator_selection: None,
            user_verification: None,
            attestation: Some("none".to_string()),
        })
    }

    async fn finish_register(
        &self,
        credential: &ServerCredential,
        label: &str,
    ) -> Result<RegistrationAck, CeremonyError> {
        self.finish_register_calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            credential.response.attestation_object.is_some(),
            "registration must carry an attestation object"
        );
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = CredentialHandle {
            id: format!("cred-{n}"),
            name: label.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        self.credentials.lock().unwrap().push(handle.clone());
        Ok(RegistrationAck {
            message: Some("Passkey registered successfully".to_string()),
            passkey: Some(handle),
        })
    }

    async fn begin_login(&self, _email: &str) -> Result<PublicKeyOptions, CeremonyError> {
        self.begin_login_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_begin_login {
            return Err(CeremonyError::ServerRejected(
                "Authentication failed".to_string(),
            ));
        }
        Ok(PublicKeyOptions {
            challenge: "AQID".to_string(),
            rp: None,
            rp_id: Some("tally.example".to_string()),
            user: None,
            pub_key_cred_params: None,
            timeout: Some(60_000),
            exclude_credentials: None,
            allow_credentials: self.allow_credentials.lock().unwrap().clone(),
            authenticator_selection: None,
            user_verification: Some("preferred".to_string()),
            attestation: None,
        })
    }

    async fn finish_login(
        &self,
        credential: &ServerCredential,
    ) -> Result<LoginSuccess, CeremonyError> {
        self.finish_login_calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            credential.response.signature.is_some(),
            "authentication must carry a signature"
        );
        Ok(LoginSuccess {
            message: Some("Login successful".to_string()),
            redirect: "/web/dashboard".to_string(),
        })
    }

    async fn has_passkey(&self, _email: &str) -> bool {
        if self.fail_check {
            return false;
        }
        !self.credentials.lock().unwrap().is_empty()
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialHandle>, CeremonyError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credentials.lock().unwrap().clone())
    }

    async fn delete_credential(&self, credential_id: &str) -> Result<(), CeremonyError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let mut credentials = self.credentials.lock().unwrap();
        let before = credentials.len();
        credentials.retain(|c| c.id != credential_id);
        if credentials.len() == before {
            return Err(CeremonyError::ServerRejected(
                "Credential not found".to_string(),
            ));
        }
        Ok(())
    }
}

/// Confirmation prompt with a scripted answer.
pub struct ScriptedPrompt {
    pub accept: bool,
    pub asked: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(accept: bool) -> Self {
        Self {
            accept,
            asked: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm_delete(&self, _name: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.accept
    }
}
