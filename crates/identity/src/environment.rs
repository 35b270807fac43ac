use std::sync::Arc;

use azure_core::credentials::TokenCredential;
use azure_identity::{ClientSecretCredential, ClientSecretCredentialOptions, TokenCredentialOptions};

use crate::{
    authority::AuthorityHost,
    env::{
        non_empty, EnvFetcherFn, AZURE_AUTHORITY_HOST, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET,
        AZURE_TENANT_ID,
    },
};

/// A service principal configured through environment variables:
///
/// - `AZURE_TENANT_ID`: ID of the service principal's Azure tenant.
/// - `AZURE_CLIENT_ID`: the service principal's client ID.
/// - `AZURE_CLIENT_SECRET`: one of the service principal's secrets.
/// - `AZURE_AUTHORITY_HOST`: (optional) the host for the identity provider.
///
/// Returns why the credential can't be used when the environment doesn't
/// describe a complete service principal.
pub(crate) fn client_secret_from_env(
    env: &EnvFetcherFn,
) -> Result<Arc<dyn TokenCredential>, String> {
    let (Some(tenant_id), Some(client_id), Some(client_secret)) = (
        non_empty(env, AZURE_TENANT_ID),
        non_empty(env, AZURE_CLIENT_ID),
        non_empty(env, AZURE_CLIENT_SECRET),
    ) else {
        return Err(format!(
            "{AZURE_TENANT_ID}, {AZURE_CLIENT_ID} and {AZURE_CLIENT_SECRET} must all be set"
        ));
    };
    let authority_host = match non_empty(env, AZURE_AUTHORITY_HOST) {
        Some(host) => host.parse::<AuthorityHost>()?,
        None => AuthorityHost::default(),
    };

    let mut credential_options = TokenCredentialOptions::default();
    credential_options.set_authority_host(authority_host.as_str().to_owned());

    let credential = ClientSecretCredential::new(
        &tenant_id,
        client_id,
        client_secret.into(),
        Some(ClientSecretCredentialOptions { credential_options }),
    )
    .map_err(|e| e.to_string())?;
    Ok(credential)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{env::test::fake_env, test_server};

    #[test]
    fn requires_every_variable() {
        let env = fake_env(&[(AZURE_TENANT_ID, "tenant"), (AZURE_CLIENT_ID, "client")]);
        let reason = client_secret_from_env(&env).unwrap_err();
        assert!(reason.contains(AZURE_CLIENT_SECRET));
    }

    #[test]
    fn invalid_authority_host_is_rejected() {
        let env = fake_env(&[
            (AZURE_TENANT_ID, "tenant"),
            (AZURE_CLIENT_ID, "client"),
            (AZURE_CLIENT_SECRET, "secret"),
            (AZURE_AUTHORITY_HOST, "nonsense"),
        ]);
        let reason = client_secret_from_env(&env).unwrap_err();
        assert!(reason.contains("nonsense"));
    }

    #[tokio::test]
    async fn exchanges_client_secret_for_token() -> anyhow::Result<()> {
        let addr = test_server::serve(|req| {
            assert_eq!(req.method, "POST");
            assert!(req.uri.starts_with("/my-tenant/oauth2/v2.0/token"));
            assert!(req.body.contains("client_id=my-client"));
            assert!(req.body.contains("client_secret=hunter2"));
            (
                200,
                serde_json::json!({
                    "access_token": "from-entra",
                    "token_type": "Bearer",
                    "expires_in": 3600
                })
                .to_string(),
            )
        })
        .await;

        let authority = format!("http://{addr}");
        let env = fake_env(&[
            (AZURE_TENANT_ID, "my-tenant"),
            (AZURE_CLIENT_ID, "my-client"),
            (AZURE_CLIENT_SECRET, "hunter2"),
            (AZURE_AUTHORITY_HOST, authority.as_str()),
        ]);
        let credential = client_secret_from_env(&env).map_err(anyhow::Error::msg)?;
        let token = credential
            .get_token(&["https://vault.azure.net/.default"], None)
            .await?;
        assert_eq!(token.token.secret(), "from-entra");
        Ok(())
    }
}
