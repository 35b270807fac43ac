use std::env::VarError;

/// Looks up an environment variable.
///
/// Credentials take one of these instead of reading `std::env` directly so
/// that tests can supply their own environment.
pub(crate) type EnvFetcherFn = Box<dyn Fn(&str) -> Result<String, VarError> + Send + Sync>;

pub(crate) const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub(crate) const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub(crate) const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub(crate) const AZURE_AUTHORITY_HOST: &str = "AZURE_AUTHORITY_HOST";
pub(crate) const AZURE_FEDERATED_TOKEN_FILE: &str = "AZURE_FEDERATED_TOKEN_FILE";

/// The process environment.
pub(crate) fn process_env() -> EnvFetcherFn {
    Box::new(|key| std::env::var(key))
}

/// Returns the value of `key`, treating unset, empty and non-unicode values
/// as absent.
pub(crate) fn non_empty(env: &EnvFetcherFn, key: &str) -> Option<String> {
    env(key).ok().filter(|value| !value.trim().is_empty())
}
