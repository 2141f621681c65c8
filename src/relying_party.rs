//! Relying-party service boundary.
//!
//! One trait method per service endpoint, each with an explicit
//! request/response schema validated at the boundary. Unknown-shaped
//! success bodies are rejected as [`CeremonyError::ServerRejected`] rather
//! than letting missing-field failures surface elsewhere.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{CREDENTIAL_LABEL_HEADER, PASSKEY_ROUTE_PREFIX};
use crate::errors::CeremonyError;
use crate::types::{CredentialHandle, PublicKeyOptions, ServerCredential};

/// Acknowledgement of a finished registration. The credential summary is
/// informational only; the authoritative record comes from a list re-fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationAck {
    pub message: Option<String>,
    pub passkey: Option<CredentialHandle>,
}

/// Outcome of a finished authentication ceremony.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginSuccess {
    pub message: Option<String>,
    /// Where the caller should navigate next.
    pub redirect: String,
}

/// The relying-party service: issues single-use challenges, verifies
/// ceremony results and is the authoritative store of credentials.
#[async_trait]
pub trait RelyingParty: Send + Sync {
    /// Issues registration ceremony options for the authenticated session.
    async fn begin_register(&self) -> Result<PublicKeyOptions, CeremonyError>;

    /// Submits the registration result together with the device label.
    async fn finish_register(
        &self,
        credential: &ServerCredential,
        label: &str,
    ) -> Result<RegistrationAck, CeremonyError>;

    /// Issues authentication ceremony options for the given identifier.
    async fn begin_login(&self, email: &str) -> Result<PublicKeyOptions, CeremonyError>;

    /// Submits the authentication result.
    async fn finish_login(&self, credential: &ServerCredential)
    -> Result<LoginSuccess, CeremonyError>;

    /// Whether the identifier has any registered passkey. Failures swallow
    /// to `false`: this only gates a login-form affordance.
    async fn has_passkey(&self, email: &str) -> bool;

    /// Fetches the authenticated user's credentials. An empty list is a
    /// valid result, not an error.
    async fn list_credentials(&self) -> Result<Vec<CredentialHandle>, CeremonyError>;

    /// Removes one credential by id.
    async fn delete_credential(&self, credential_id: &str) -> Result<(), CeremonyError>;
}

#[derive(Deserialize)]
struct OptionsEnvelope {
    #[serde(rename = "publicKey")]
    public_key: PublicKeyOptions,
}

#[derive(Deserialize)]
struct BeginResponse {
    options: OptionsEnvelope,
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(rename = "hasPasskey")]
    has_passkey: bool,
}

#[derive(Deserialize)]
struct ListResponse {
    passkeys: Option<Vec<CredentialHandle>>,
}

#[derive(Deserialize)]
#[allow(dead_code)]
struct DeleteResponse {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP implementation over `reqwest`. The ceremony session state the
/// service keeps between begin and finish travels in cookies, so the
/// client carries a cookie jar.
pub struct HttpRelyingParty {
    base: Url,
    client: reqwest::Client,
}

impl HttpRelyingParty {
    pub fn new(base: &str) -> Result<Self, CeremonyError> {
        let base = Url::parse(base)
            .map_err(|e| CeremonyError::Network(format!("invalid relying-party URL: {e}")))?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| CeremonyError::Network(e.to_string()))?;
        Ok(Self { base, client })
    }

    /// Appends the route prefix and endpoint path to the base URL, keeping
    /// any path component the base already carries.
    fn endpoint(&self, path: &str) -> Result<Url, CeremonyError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                CeremonyError::Network("relying-party URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty();
            segments.extend(
                PASSKEY_ROUTE_PREFIX
                    .split('/')
                    .chain(path.split('/'))
                    .filter(|s| !s.is_empty()),
            );
        }
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CeremonyError> {
        let response = request
            .send()
            .await
            .map_err(|e| CeremonyError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CeremonyError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            tracing::debug!(%status, %message, "relying party rejected request");
            return Err(CeremonyError::ServerRejected(message));
        }

        serde_json::from_str(&body).map_err(|e| {
            CeremonyError::ServerRejected(format!("unexpected response shape: {e}"))
        })
    }
}

#[async_trait]
impl RelyingParty for HttpRelyingParty {
    async fn begin_register(&self) -> Result<PublicKeyOptions, CeremonyError> {
        let url = self.endpoint("api/passkey/begin-register")?;
        let response: BeginResponse = self.execute(self.client.post(url)).await?;
        Ok(response.options.public_key)
    }

    async fn finish_register(
        &self,
        credential: &ServerCredential,
        label: &str,
    ) -> Result<RegistrationAck, CeremonyError> {
        let url = self.endpoint("api/passkey/finish-register")?;
        self.execute(
            self.client
                .post(url)
                .header(CREDENTIAL_LABEL_HEADER, label)
                .json(credential),
        )
        .await
    }

    async fn begin_login(&self, email: &str) -> Result<PublicKeyOptions, CeremonyError> {
        let url = self.endpoint("auth/passkey/begin-login")?;
        let response: BeginResponse = self
            .execute(self.client.post(url).json(&serde_json::json!({ "email": email })))
            .await?;
        Ok(response.options.public_key)
    }

    async fn finish_login(
        &self,
        credential: &ServerCredential,
    ) -> Result<LoginSuccess, CeremonyError> {
        let url = self.endpoint("auth/passkey/finish-login")?;
        self.execute(self.client.post(url).json(credential)).await
    }

    async fn has_passkey(&self, email: &str) -> bool {
        let result: Result<CheckResponse, CeremonyError> = async {
            let url = self.endpoint("auth/passkey/check")?;
            self.execute(self.client.post(url).json(&serde_json::json!({ "email": email })))
                .await
        }
        .await;

        match result {
            Ok(response) => response.has_passkey,
            Err(err) => {
                tracing::debug!(%err, "passkey pre-check failed, treating as none registered");
                false
            }
        }
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialHandle>, CeremonyError> {
        let url = self.endpoint("api/passkey/list")?;
        let response: ListResponse = self.execute(self.client.get(url)).await?;
        Ok(response.passkeys.unwrap_or_default())
    }

    async fn delete_credential(&self, credential_id: &str) -> Result<(), CeremonyError> {
        let url = self.endpoint("api/passkey/delete")?;
        let _: DeleteResponse = self
            .execute(
                self.client
                    .post(url)
                    .json(&serde_json::json!({ "credentialId": credential_id })),
            )
            .await?;
        Ok(())
    }
}
