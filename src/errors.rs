//! Error taxonomy for the passkey ceremony subsystem.

use thiserror::Error;

use crate::authenticator::AuthenticatorError;
use crate::codec::MalformedEncoding;

/// A single typed failure returned to the UI layer.
///
/// Ceremony-level failures are classified at the orchestrator boundary;
/// the UI only renders the message and never inspects ceremony internals.
/// Codec failures are programming-contract violations and propagate
/// unchanged. No variant is ever retried automatically; every retry is a
/// fresh user-initiated ceremony.
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// The environment exposes no usable credential API. Expected on older
    /// platforms; callers hide passkey affordances instead of surfacing
    /// this as an error message.
    #[error("passkeys are not available in this environment")]
    CapabilityUnavailable,

    /// The codec was handed text outside the base64url alphabet. Never
    /// occurs with a well-behaved server; fails loudly.
    #[error("{0}")]
    MalformedEncoding(#[from] MalformedEncoding),

    /// A ceremony was requested while another is still in flight. The
    /// in-flight ceremony is unaffected.
    #[error("another passkey ceremony is already in progress")]
    CeremonyInProgress,

    /// The user dismissed the authenticator prompt. Informational, not
    /// alarming; the ceremony may be restarted at any time.
    #[error("the passkey prompt was cancelled")]
    UserCancelled,

    /// The platform authenticator failed for a reason other than
    /// cancellation.
    #[error("authenticator error: {0}")]
    Authenticator(String),

    /// The supplied device label failed validation before any network
    /// call.
    #[error("invalid device label: {0}")]
    InvalidLabel(String),

    /// The relying-party service answered with a non-success status or an
    /// unrecognizable body. Carries the server's message verbatim when one
    /// was provided.
    #[error("{0}")]
    ServerRejected(String),

    /// Transport-level failure, distinct from a server-level rejection.
    #[error("network error: {0}")]
    Network(String),
}

impl From<AuthenticatorError> for CeremonyError {
    fn from(err: AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::Cancelled => Self::UserCancelled,
            AuthenticatorError::Failed(message) => Self::Authenticator(message),
        }
    }
}
