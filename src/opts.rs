use std::sync::Arc;

use clap::Args;
use secret_demo_http::{EndpointConfig, SecretEndpoint};
use secret_demo_identity::{ChainedCredential, CredentialKind, StaticTokenCredential};
use secret_demo_key_vault::key_vault_connector;

pub const KEY_VAULT_URL_ENV: &str = "KeyVaultUrl";
pub const CREDENTIALS_ENV: &str = "SECRET_DEMO_CREDENTIALS";
pub const STATIC_TOKEN_ENV: &str = "SECRET_DEMO_STATIC_TOKEN";

/// Options shared by every command that talks to the vault.
#[derive(Args, Debug)]
pub struct VaultOpts {
    /// Base address of the Key Vault holding the secret, e.g. https://myvault.vault.azure.net/
    #[clap(long = "key-vault-url", env = KEY_VAULT_URL_ENV)]
    pub key_vault_url: Option<String>,

    /// Credential providers to try, in order. One or more of: environment,
    /// workload-identity, managed-identity, azure-cli. Defaults to all of them.
    #[clap(
        long = "credential",
        env = CREDENTIALS_ENV,
        value_delimiter = ',',
        value_parser = parse_credential_kind,
    )]
    pub credentials: Vec<CredentialKind>,

    /// Send this bearer token to the vault instead of using a credential
    /// chain. Intended for local Key Vault emulators.
    #[clap(
        long = "static-token",
        env = STATIC_TOKEN_ENV,
        hide_env_values = true,
        conflicts_with = "credentials"
    )]
    pub static_token: Option<String>,
}

impl VaultOpts {
    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig::new(self.key_vault_url.clone())
    }

    /// The credential providers, in the order they will be tried.
    pub fn credential_kinds(&self) -> Vec<CredentialKind> {
        if self.credentials.is_empty() {
            CredentialKind::default_chain()
        } else {
            self.credentials.clone()
        }
    }

    /// Builds the endpoint, with the credential shared by every vault request.
    pub fn secret_endpoint(&self) -> SecretEndpoint {
        let connector = match &self.static_token {
            Some(token) => {
                tracing::info!("Authenticating to the vault with a static token");
                key_vault_connector(Arc::new(StaticTokenCredential::new(token.clone())))
            }
            None => {
                let chain = ChainedCredential::from_kinds(&self.credential_kinds());
                tracing::info!("Credential chain: {}", chain.names().join(" -> "));
                key_vault_connector(Arc::new(chain))
            }
        };
        SecretEndpoint::new(self.endpoint_config(), connector)
    }
}

fn parse_credential_kind(s: &str) -> Result<CredentialKind, String> {
    s.parse()
}
