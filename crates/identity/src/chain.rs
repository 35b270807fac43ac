use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use azure_core::{
    credentials::{AccessToken, TokenCredential, TokenRequestOptions},
    error::{Error, ErrorKind},
};
use azure_identity::{
    AzureCliCredential, AzureCliCredentialOptions, ManagedIdentityCredential,
    ManagedIdentityCredentialOptions, UserAssignedId, WorkloadIdentityCredential,
};
use tracing::{instrument, Level};

use crate::{
    env::{
        non_empty, process_env, EnvFetcherFn, AZURE_CLIENT_ID, AZURE_FEDERATED_TOKEN_FILE,
        AZURE_TENANT_ID,
    },
    environment::client_secret_from_env,
};

/// The credential providers a chain can be assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Environment,
    WorkloadIdentity,
    ManagedIdentity,
    AzureCli,
}

impl CredentialKind {
    /// The order used when nothing else is configured: explicit service
    /// principals first, then platform identities, then the developer's CLI
    /// session.
    pub fn default_chain() -> Vec<CredentialKind> {
        vec![
            CredentialKind::Environment,
            CredentialKind::WorkloadIdentity,
            CredentialKind::ManagedIdentity,
            CredentialKind::AzureCli,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Environment => "environment",
            CredentialKind::WorkloadIdentity => "workload-identity",
            CredentialKind::ManagedIdentity => "managed-identity",
            CredentialKind::AzureCli => "azure-cli",
        }
    }

    /// Creates the SDK credential, or explains why it doesn't apply here.
    ///
    /// - `workload-identity` needs `AZURE_FEDERATED_TOKEN_FILE` (plus the
    ///   tenant and client IDs the SDK reads alongside it).
    /// - `managed-identity` uses the user assigned identity named by
    ///   `AZURE_CLIENT_ID`, if any.
    /// - `azure-cli` asks for a token in `AZURE_TENANT_ID`, if set.
    fn create(&self, env: &EnvFetcherFn) -> Result<Arc<dyn TokenCredential>, String> {
        let credential: Arc<dyn TokenCredential> = match self {
            CredentialKind::Environment => return client_secret_from_env(env),
            CredentialKind::WorkloadIdentity => {
                if non_empty(env, AZURE_FEDERATED_TOKEN_FILE).is_none() {
                    return Err(format!("{AZURE_FEDERATED_TOKEN_FILE} is not set"));
                }
                WorkloadIdentityCredential::new(None).map_err(|e| e.to_string())?
            }
            CredentialKind::ManagedIdentity => {
                ManagedIdentityCredential::new(Some(ManagedIdentityCredentialOptions {
                    user_assigned_id: non_empty(env, AZURE_CLIENT_ID).map(UserAssignedId::ClientId),
                    ..Default::default()
                }))
                .map_err(|e| e.to_string())?
            }
            CredentialKind::AzureCli => {
                let mut options = AzureCliCredentialOptions::default();
                options.tenant_id = non_empty(env, AZURE_TENANT_ID);
                AzureCliCredential::new(Some(options)).map_err(|e| e.to_string())?
            }
        };
        Ok(credential)
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "environment" | "env" => Ok(CredentialKind::Environment),
            "workload-identity" => Ok(CredentialKind::WorkloadIdentity),
            "managed-identity" => Ok(CredentialKind::ManagedIdentity),
            "azure-cli" | "cli" => Ok(CredentialKind::AzureCli),
            other => Err(format!(
                "unknown credential '{other}', expected one of: environment, workload-identity, managed-identity, azure-cli"
            )),
        }
    }
}

/// One link of a [`ChainedCredential`].
struct Source {
    name: String,
    /// The credential, or why it couldn't be created in this environment.
    credential: Result<Arc<dyn TokenCredential>, String>,
}

const NONE_SELECTED: usize = usize::MAX;

/// Tries each credential in order and returns the first token obtained.
///
/// Once a credential has produced a token the chain sticks with it, so later
/// requests neither query the instance metadata service again nor start the
/// Azure CLI. The credentials themselves cache their tokens until expiry.
pub struct ChainedCredential {
    sources: Vec<Source>,
    selected: AtomicUsize,
}

impl ChainedCredential {
    pub(crate) fn new(sources: Vec<(String, Arc<dyn TokenCredential>)>) -> Self {
        Self::from_sources(
            sources
                .into_iter()
                .map(|(name, credential)| Source {
                    name,
                    credential: Ok(credential),
                })
                .collect(),
        )
    }

    /// Builds a chain from `kinds`, reading the process environment.
    pub fn from_kinds(kinds: &[CredentialKind]) -> Self {
        Self::from_kinds_with_env(kinds, &process_env())
    }

    pub(crate) fn from_kinds_with_env(kinds: &[CredentialKind], env: &EnvFetcherFn) -> Self {
        Self::from_sources(
            kinds
                .iter()
                .map(|kind| {
                    let credential = kind.create(env);
                    if let Err(reason) = &credential {
                        tracing::debug!("Credential {kind} is unavailable: {reason}");
                    }
                    Source {
                        name: kind.to_string(),
                        credential,
                    }
                })
                .collect(),
        )
    }

    fn from_sources(sources: Vec<Source>) -> Self {
        Self {
            sources,
            selected: AtomicUsize::new(NONE_SELECTED),
        }
    }

    /// The names of the chained credentials, in the order they are tried.
    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name.as_str()).collect()
    }
}

impl fmt::Debug for ChainedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedCredential")
            .field("sources", &self.names())
            .finish()
    }
}

#[async_trait]
impl TokenCredential for ChainedCredential {
    #[instrument(name = "secret_demo_identity.get_token", level = Level::DEBUG, skip(self, options), err(level = Level::INFO))]
    async fn get_token(
        &self,
        scopes: &[&str],
        options: Option<TokenRequestOptions>,
    ) -> azure_core::Result<AccessToken> {
        let selected = self.selected.load(Ordering::Acquire);
        if let Some(Source {
            credential: Ok(credential),
            ..
        }) = self.sources.get(selected)
        {
            return credential.get_token(scopes, options).await;
        }

        let mut failures = Vec::with_capacity(self.sources.len());
        for (index, source) in self.sources.iter().enumerate() {
            let credential = match &source.credential {
                Ok(credential) => credential,
                Err(reason) => {
                    failures.push(format!("{}: {reason}", source.name));
                    continue;
                }
            };
            match credential.get_token(scopes, options.clone()).await {
                Ok(token) => {
                    tracing::info!("Authenticated with the {} credential", source.name);
                    self.selected.store(index, Ordering::Release);
                    return Ok(token);
                }
                Err(err) => {
                    tracing::debug!("Credential {} failed: {err}", source.name);
                    failures.push(format!("{}: {err}", source.name));
                }
            }
        }
        Err(Error::with_message(
            ErrorKind::Credential,
            || exhausted_message(&failures),
        ))
    }
}

fn exhausted_message(failures: &[String]) -> String {
    if failures.is_empty() {
        return "no credential could provide a token: the chain is empty".into();
    }
    format!(
        "no credential could provide a token ({})",
        failures.join("; ")
    )
}
