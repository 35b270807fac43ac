//! Reads secrets from Azure Key Vault.

use std::sync::Arc;

use async_trait::async_trait;
use azure_core::{
    credentials::TokenCredential,
    error::ErrorKind,
    http::{ClientOptions, RetryOptions, StatusCode},
};
use azure_security_keyvault_secrets::{SecretClient, SecretClientOptions};
use tracing::{instrument, Level};
use url::Url;

/// Errors returned by a [`SecretStore`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid vault URL '{url}': {reason}")]
    InvalidVaultUrl { url: String, reason: String },
    #[error("failed to acquire a token for the vault")]
    Credential(#[source] azure_core::Error),
    #[error("secret '{0}' was not found")]
    SecretNotFound(String),
    #[error("secret '{0}' has no value")]
    MissingValue(String),
    #[error("the vault could not be reached")]
    Unavailable(#[source] azure_core::Error),
    #[error("the vault rejected the request")]
    Service(#[source] azure_core::Error),
}

impl Error {
    fn from_azure(name: &str, err: azure_core::Error) -> Self {
        match err.kind() {
            ErrorKind::HttpResponse {
                status: StatusCode::NotFound,
                ..
            } => Error::SecretNotFound(name.to_owned()),
            ErrorKind::Credential => Error::Credential(err),
            ErrorKind::Io => Error::Unavailable(err),
            _ => Error::Service(err),
        }
    }
}

/// The `get(name) -> value` side of a secret store.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetches the latest value of the secret called `name`.
    async fn get_secret(&self, name: &str) -> Result<String, Error>;
}

/// Opens a [`SecretStore`] for a vault address.
pub type StoreConnectorFn =
    Box<dyn Fn(&str) -> Result<Arc<dyn SecretStore>, Error> + Send + Sync>;

/// Returns a connector that opens a [`KeyVaultStore`] authenticated with
/// `credential`.
pub fn key_vault_connector(credential: Arc<dyn TokenCredential>) -> StoreConnectorFn {
    Box::new(move |vault_url: &str| -> Result<Arc<dyn SecretStore>, Error> {
        let store = KeyVaultStore::new(vault_url, credential.clone())?;
        Ok(Arc::new(store) as Arc<dyn SecretStore>)
    })
}

/// A [`SecretStore`] backed by one Azure Key Vault.
///
/// Each read is a single attempt: the SDK's retry policy is switched off.
pub struct KeyVaultStore {
    vault_url: Url,
    client: SecretClient,
}

impl KeyVaultStore {
    /// Creates a store for the vault at `vault_url`, e.g.
    /// `https://myvault.vault.azure.net/`.
    pub fn new(vault_url: &str, credential: Arc<dyn TokenCredential>) -> Result<Self, Error> {
        let invalid = |reason: String| Error::InvalidVaultUrl {
            url: vault_url.to_owned(),
            reason,
        };
        let mut url = Url::parse(vault_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected https",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".into()));
        }
        url.set_query(None);
        url.set_fragment(None);

        let options = SecretClientOptions {
            client_options: ClientOptions {
                retry: Some(RetryOptions::none()),
                ..Default::default()
            },
            ..Default::default()
        };
        let client = SecretClient::new(url.as_str(), credential, Some(options))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            vault_url: url,
            client,
        })
    }
}

#[async_trait]
impl SecretStore for KeyVaultStore {
    #[instrument(name = "secret_demo_key_vault.get_secret", level = Level::DEBUG, skip(self), err(level = Level::INFO), fields(vault = %self.vault_url, otel.kind = "client"))]
    async fn get_secret(&self, name: &str) -> Result<String, Error> {
        let secret = self
            .client
            .get_secret(name, "", None)
            .await
            .map_err(|err| Error::from_azure(name, err))?
            .into_body()
            .await
            .map_err(Error::Service)?;
        secret
            .value
            .ok_or_else(|| Error::MissingValue(name.to_owned()))
    }
}
