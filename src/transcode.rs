//! Ceremony payload transcoder.
//!
//! Two pure transforms sit between the relying-party wire format (binary
//! fields as base64url text) and the platform authenticator API (raw
//! bytes). The directions are strictly asymmetric: inbound server options
//! are *decoded*, outbound authenticator responses are *encoded*. Fields
//! absent on one side stay absent on the other.

use crate::authenticator::{
    AuthenticatorCredential, AuthenticatorCredentialRef, AuthenticatorOptions, AuthenticatorUser,
};
use crate::codec::{self, MalformedEncoding};
use crate::types::{CredentialRef, PublicKeyOptions, ServerCredential, ServerCredentialResponse};

/// Converts relying-party ceremony options into the binary shape the
/// platform authenticator expects: decodes `challenge`, `user.id` and the
/// id of every `excludeCredentials`/`allowCredentials` entry, and passes
/// everything else through unchanged.
pub fn to_authenticator_options(
    options: PublicKeyOptions,
) -> Result<AuthenticatorOptions, MalformedEncoding> {
    let challenge = codec::decode(&options.challenge)?;
    let user = options
        .user
        .map(|u| -> Result<AuthenticatorUser, MalformedEncoding> {
            Ok(AuthenticatorUser {
                id: codec::decode(&u.id)?,
                name: u.name,
                display_name: u.display_name,
            })
        })
        .transpose()?;

    Ok(AuthenticatorOptions {
        challenge,
        rp: options.rp,
        rp_id: options.rp_id,
        user,
        pub_key_cred_params: options.pub_key_cred_params,
        timeout: options.timeout,
        exclude_credentials: decode_credential_refs(options.exclude_credentials)?,
        allow_credentials: decode_credential_refs(options.allow_credentials)?,
        authenticator_selection: options.authenticator_selection,
        user_verification: options.user_verification,
        attestation: options.attestation,
    })
}

fn decode_credential_refs(
    refs: Option<Vec<CredentialRef>>,
) -> Result<Option<Vec<AuthenticatorCredentialRef>>, MalformedEncoding> {
    refs.map(|list| {
        list.into_iter()
            .map(|c| {
                Ok(AuthenticatorCredentialRef {
                    type_: c.type_,
                    id: codec::decode(&c.id)?,
                    transports: c.transports,
                })
            })
            .collect::<Result<Vec<_>, MalformedEncoding>>()
    })
    .transpose()
}

/// Converts the authenticator's binary credential into the transport-safe
/// payload the relying-party service expects: encodes `raw_id` and every
/// binary response field the authenticator returned, and omits the ones it
/// did not.
pub fn to_server_credential(credential: &AuthenticatorCredential) -> ServerCredential {
    let response = &credential.response;
    ServerCredential {
        id: credential.id.clone(),
        raw_id: codec::encode(&credential.raw_id),
        type_: credential.type_.clone(),
        response: ServerCredentialResponse {
            client_data_json: codec::encode(&response.client_data_json),
            attestation_object: response.attestation_object.as_deref().map(codec::encode),
            authenticator_data: response.authenticator_data.as_deref().map(codec::encode),
            signature: response.signature.as_deref().map(codec::encode),
            user_handle: response.user_handle.as_deref().map(codec::encode),
        },
    }
}
