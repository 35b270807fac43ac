use std::str::FromStr;

/// The Microsoft Entra ID host that issues tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthorityHost {
    #[default]
    AzurePublicCloud,
    AzureChina,
    AzureGermany,
    AzureGovernment,
    /// Any other authority, e.g. a private cloud or a test server.
    Custom(String),
}

impl AuthorityHost {
    /// The base URL of the authority, without a trailing slash.
    pub fn as_str(&self) -> &str {
        match self {
            AuthorityHost::AzureChina => "https://login.chinacloudapi.cn",
            AuthorityHost::AzureGovernment => "https://login.microsoftonline.us",
            AuthorityHost::AzureGermany => "https://login.microsoftonline.de",
            AuthorityHost::AzurePublicCloud => "https://login.microsoftonline.com",
            AuthorityHost::Custom(url) => url.trim_end_matches('/'),
        }
    }
}

impl FromStr for AuthorityHost {
    type Err = String;

    /// Accepts either a well-known cloud name or an absolute URL, the same
    /// forms `AZURE_AUTHORITY_HOST` takes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = [
            AuthorityHost::AzurePublicCloud,
            AuthorityHost::AzureChina,
            AuthorityHost::AzureGermany,
            AuthorityHost::AzureGovernment,
        ];
        if let Some(host) = known
            .into_iter()
            .find(|host| host.as_str() == s.trim_end_matches('/'))
        {
            return Ok(host);
        }
        match s {
            "AzurePublicCloud" => Ok(AuthorityHost::AzurePublicCloud),
            "AzureChina" => Ok(AuthorityHost::AzureChina),
            "AzureGermany" => Ok(AuthorityHost::AzureGermany),
            "AzureGovernment" => Ok(AuthorityHost::AzureGovernment),
            other => {
                let url = url::Url::parse(other)
                    .map_err(|e| format!("invalid authority host '{other}': {e}"))?;
                if url.scheme() != "https" && url.scheme() != "http" {
                    return Err(format!(
                        "invalid authority host '{other}': expected an http(s) URL"
                    ));
                }
                Ok(AuthorityHost::Custom(other.to_owned()))
            }
        }
    }
}
