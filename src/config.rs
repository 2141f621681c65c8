use std::{env, sync::LazyLock};

/// Path prefix the relying-party service mounts its web routes under.
pub(crate) static PASSKEY_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_ROUTE_PREFIX")
        .ok()
        .unwrap_or_else(|| "/web".to_string())
});

/// Maximum accepted device-label length. The service enforces the same
/// cap; validating here avoids a doomed ceremony.
pub(crate) static PASSKEY_LABEL_MAX_LEN: LazyLock<usize> = LazyLock::new(|| {
    env::var("PASSKEY_LABEL_MAX_LEN")
        .map(|v| v.parse::<usize>().unwrap_or(100))
        .unwrap_or(100)
});

/// Header carrying the device label on the finish-register call.
pub(crate) const CREDENTIAL_LABEL_HEADER: &str = "X-Credential-Name";
