use http::{header, Response, StatusCode};
use hyper::body::Bytes;
use secret_demo_key_vault::StoreConnectorFn;

use crate::{body, Body, EndpointConfig, DEMO_SECRET_NAME};

/// Why a secret could not be served.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("the vault address is not configured, set `KeyVaultUrl`")]
    ConfigurationMissing,
    #[error(transparent)]
    Store(#[from] secret_demo_key_vault::Error),
}

impl EndpointError {
    /// The status reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            EndpointError::Store(secret_demo_key_vault::Error::SecretNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Serves the value of [`DEMO_SECRET_NAME`].
///
/// Every call opens a store for the configured vault and reads the secret
/// again: the value is never cached.
pub struct SecretEndpoint {
    config: EndpointConfig,
    connect: StoreConnectorFn,
}

impl SecretEndpoint {
    pub fn new(config: EndpointConfig, connect: StoreConnectorFn) -> Self {
        Self { config, connect }
    }

    /// Fetches the current value of the secret.
    pub async fn fetch(&self) -> Result<String, EndpointError> {
        let vault_url = self
            .config
            .vault_url
            .as_deref()
            .ok_or(EndpointError::ConfigurationMissing)?;
        let store = (self.connect)(vault_url)?;
        Ok(store.get_secret(DEMO_SECRET_NAME).await?)
    }

    /// Fetches the secret and renders the outcome as a response.
    ///
    /// Failures get an empty body so neither the secret nor its name leaks.
    pub async fn respond(&self) -> anyhow::Result<Response<Body>> {
        match self.fetch().await {
            Ok(value) => Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(body::full(Bytes::from(value)))?),
            Err(err) => {
                let status = err.status();
                tracing::error!("Error retrieving secret: {:?}", anyhow::Error::new(err));
                Ok(Response::builder().status(status).body(body::empty())?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use secret_demo_identity::StaticTokenCredential;
    use secret_demo_key_vault::{key_vault_connector, Error, SecretStore};

    use super::*;

    /// A store that remembers which names it was asked for.
    #[derive(Default)]
    struct RecordingStore {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SecretStore for RecordingStore {
        async fn get_secret(&self, name: &str) -> Result<String, Error> {
            self.requested.lock().unwrap().push(name.to_owned());
            Err(Error::SecretNotFound(name.to_owned()))
        }
    }

    fn key_vault_endpoint(vault_url: Option<&str>) -> SecretEndpoint {
        SecretEndpoint::new(
            EndpointConfig::new(vault_url.map(String::from)),
            key_vault_connector(Arc::new(StaticTokenCredential::new("token"))),
        )
    }

    #[tokio::test]
    async fn missing_configuration() {
        let err = key_vault_endpoint(None).fetch().await.unwrap_err();
        assert!(matches!(err, EndpointError::ConfigurationMissing));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn malformed_configuration() {
        let err = key_vault_endpoint(Some("vault please"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Store(Error::InvalidVaultUrl { .. })
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn asks_the_configured_vault_for_the_demo_secret() {
        let store = Arc::new(RecordingStore::default());
        let opened = Arc::new(Mutex::new(Vec::new()));
        let endpoint = SecretEndpoint::new(
            EndpointConfig::new(Some("https://demo.vault.azure.net".into())),
            Box::new({
                let store = store.clone();
                let opened = opened.clone();
                move |vault_url: &str| -> Result<Arc<dyn SecretStore>, Error> {
                    opened.lock().unwrap().push(vault_url.to_owned());
                    Ok(store.clone())
                }
            }),
        );

        let response = endpoint.respond().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(*opened.lock().unwrap(), vec!["https://demo.vault.azure.net"]);
        assert_eq!(*store.requested.lock().unwrap(), vec![DEMO_SECRET_NAME]);
    }
}
