//! Wire types shared across the relying-party boundary.
//!
//! All structures follow the WebAuthn JSON conventions the relying-party
//! service speaks: camelCase field names, binary identifiers carried as
//! base64url text, optional fields omitted entirely when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client-visible metadata for a registered credential.
///
/// The relying-party service owns these records; the client only ever holds
/// a read-through projection refreshed after every mutating ceremony.
/// `last_used_at` is set server-side by successful authentication
/// ceremonies and merely reflected here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialHandle {
    pub id: String,
    /// User-supplied device label, e.g. "My Laptop".
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Relying-party identity embedded in ceremony options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// User entity in registration options; `id` is base64url on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubKeyCredParam {
    #[serde(rename = "type")]
    pub type_: String,
    pub alg: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_resident_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
}

/// A credential reference inside `excludeCredentials`/`allowCredentials`;
/// `id` is base64url on the wire. Transport hints pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRef {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transports: Option<Vec<String>>,
}

/// Ceremony options as issued by the relying-party service, for either
/// ceremony kind. Registration options carry `user`/`excludeCredentials`,
/// authentication options carry `allowCredentials`; fields absent on the
/// wire stay `None` and are never fabricated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyOptions {
    pub challenge: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rp: Option<RpEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_key_cred_params: Option<Vec<PubKeyCredParam>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_credentials: Option<Vec<CredentialRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<Vec<CredentialRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_verification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<String>,
}

/// The authenticator's response re-encoded for submission to the
/// relying-party service. The binary ceremony artifacts inside are opaque:
/// the client marshals them losslessly and never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCredential {
    pub id: String,
    pub raw_id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub response: ServerCredentialResponse,
}

/// Ceremony-kind-specific response fields. `client_data_json` is always
/// present; attestation fields appear only for registration, assertion
/// fields only for authentication. Absent fields are omitted from the
/// serialized payload, never sent as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCredentialResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}
