//! Token credentials for Azure services.
//!
//! Rather than letting the SDK pick a credential implicitly, callers
//! assemble an explicit, ordered [`ChainedCredential`] from
//! [`CredentialKind`]s. Each link is one of the `azure_identity` credentials.

mod authority;
mod chain;
mod env;
mod environment;

#[cfg(test)]
mod test_server;

use std::time::Duration;

use async_trait::async_trait;
use azure_core::{
    credentials::{AccessToken, Secret, TokenCredential, TokenRequestOptions},
    date::OffsetDateTime,
};

pub use chain::{ChainedCredential, CredentialKind};

/// How long a token from [`StaticTokenCredential`] claims to be valid.
const STATIC_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// A credential that always returns the same token.
///
/// Useful against local Key Vault emulators, which accept any bearer token.
#[derive(Debug)]
pub struct StaticTokenCredential {
    token: Secret,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Secret::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions>,
    ) -> azure_core::Result<AccessToken> {
        Ok(AccessToken::new(
            self.token.clone(),
            OffsetDateTime::now_utc() + STATIC_TOKEN_LIFETIME,
        ))
    }
}
