//! Platform authenticator boundary.
//!
//! The host platform (OS credential manager, biometric sensor, security
//! key) owns the actual credential creation and assertion calls. Its
//! invocation contract is fixed: the calls suspend for as long as the user
//! interaction takes and resolve with either a credential or a
//! cancellation. This module only describes that boundary; implementations
//! bind it to whatever platform API is available.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{AuthenticatorSelection, PubKeyCredParam, RpEntity};

/// Failure reported by the platform authenticator itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticatorError {
    /// The user dismissed the prompt, or the platform's own interaction
    /// timeout elapsed. An expected outcome, not a fault.
    #[error("the passkey prompt was cancelled")]
    Cancelled,

    /// Any other platform-level failure.
    #[error("authenticator failure: {0}")]
    Failed(String),
}

/// Ceremony options with every identifier already decoded to raw bytes,
/// in the shape the platform credential API expects.
#[derive(Debug, Clone, Default)]
pub struct AuthenticatorOptions {
    pub challenge: Vec<u8>,
    pub rp: Option<RpEntity>,
    pub rp_id: Option<String>,
    pub user: Option<AuthenticatorUser>,
    pub pub_key_cred_params: Option<Vec<PubKeyCredParam>>,
    pub timeout: Option<u32>,
    pub exclude_credentials: Option<Vec<AuthenticatorCredentialRef>>,
    pub allow_credentials: Option<Vec<AuthenticatorCredentialRef>>,
    pub authenticator_selection: Option<AuthenticatorSelection>,
    pub user_verification: Option<String>,
    pub attestation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticatorUser {
    pub id: Vec<u8>,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthenticatorCredentialRef {
    pub type_: String,
    pub id: Vec<u8>,
    pub transports: Option<Vec<String>>,
}

/// Binary credential returned by the platform after a completed prompt.
#[derive(Debug, Clone)]
pub struct AuthenticatorCredential {
    pub id: String,
    pub raw_id: Vec<u8>,
    pub type_: String,
    pub response: AuthenticatorOutput,
}

/// Raw response artifacts. `client_data_json` is always present;
/// `attestation_object` only after credential creation; the assertion
/// fields only after authentication. The client never inspects any of
/// them beyond lossless re-encoding.
#[derive(Debug, Clone, Default)]
pub struct AuthenticatorOutput {
    pub client_data_json: Vec<u8>,
    pub attestation_object: Option<Vec<u8>>,
    pub authenticator_data: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
    pub user_handle: Option<Vec<u8>>,
}

/// The platform credential API.
///
/// The two probes are environment capability checks: implementations must
/// swallow their own failures and answer `false` rather than error, since
/// an unsupported environment is an expected condition. The two credential
/// calls suspend indefinitely pending user interaction and must surface a
/// platform-level cancellation as [`AuthenticatorError::Cancelled`]. No
/// caller-side timeout competes with the platform's own.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Whether the platform exposes a credential API at all.
    async fn is_supported(&self) -> bool;

    /// Whether a user-verifying platform (as opposed to roaming)
    /// authenticator is currently available.
    async fn is_platform_authenticator_available(&self) -> bool;

    /// Creates a new credential (registration ceremony). Suspends until
    /// the user completes or dismisses the prompt.
    async fn create_credential(
        &self,
        options: AuthenticatorOptions,
    ) -> Result<AuthenticatorCredential, AuthenticatorError>;

    /// Asserts an existing credential (authentication ceremony). Suspends
    /// until the user completes or dismisses the prompt.
    async fn get_assertion(
        &self,
        options: AuthenticatorOptions,
    ) -> Result<AuthenticatorCredential, AuthenticatorError>;
}
