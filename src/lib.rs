//! tally-passkey - Passkey ceremony client for the Tally dashboard
//!
//! This crate is the client-side protocol engine that negotiates WebAuthn
//! registration and authentication ceremonies between a relying-party
//! service and the platform authenticator, and manages the lifecycle of
//! the user's registered credentials.
//!
//! The pieces compose top-down:
//! - [`CeremonyOrchestrator`] drives a ceremony end-to-end and enforces
//!   the one-in-flight rule;
//! - [`transcode`] converts between the service's text wire format and the
//!   authenticator's binary one;
//! - [`codec`] is the underlying base64url codec;
//! - [`CredentialManager`] keeps a server-authoritative projection of the
//!   registered credentials;
//! - [`IdentityCache`] pre-fills ceremony inputs from session storage.
//!
//! The platform authenticator and the confirmation prompt are trait seams
//! ([`PlatformAuthenticator`], [`UserPrompt`]) so hosts can bind them to
//! whatever UI and credential API they have. Cryptographic verification of
//! ceremony artifacts is the relying party's job; this crate marshals them
//! losslessly and never looks inside.

pub mod codec;
pub mod transcode;

mod authenticator;
mod ceremony;
mod config;
mod errors;
mod manager;
mod relying_party;
mod session;
mod types;

pub use authenticator::{
    AuthenticatorCredential, AuthenticatorCredentialRef, AuthenticatorError, AuthenticatorOptions,
    AuthenticatorOutput, AuthenticatorUser, PlatformAuthenticator,
};
pub use ceremony::{CeremonyOrchestrator, CeremonyState};
pub use codec::MalformedEncoding;
pub use errors::CeremonyError;
pub use manager::{CredentialManager, UserPrompt};
pub use relying_party::{HttpRelyingParty, LoginSuccess, RegistrationAck, RelyingParty};
pub use session::{IdentityCache, MemorySessionStore, SessionStore};
pub use types::{
    AuthenticatorSelection, CredentialHandle, CredentialRef, PubKeyCredParam, PublicKeyOptions,
    RpEntity, ServerCredential, ServerCredentialResponse, UserEntity,
};
