/// Settings for the secret endpoint, resolved once at start-up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointConfig {
    /// The base address of the vault (`KeyVaultUrl`).
    ///
    /// Deliberately left unparsed: a malformed address is reported by every
    /// request rather than refusing to start.
    pub vault_url: Option<String>,
}

impl EndpointConfig {
    /// Creates a config, treating an empty or blank address as unset.
    pub fn new(vault_url: Option<String>) -> Self {
        Self {
            vault_url: vault_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_vault_url_is_unset() {
        assert_eq!(EndpointConfig::new(Some("".into())).vault_url, None);
        assert_eq!(EndpointConfig::new(Some("  ".into())).vault_url, None);
        assert_eq!(EndpointConfig::new(None).vault_url, None);
        assert_eq!(
            EndpointConfig::new(Some("https://demo.vault.azure.net".into())).vault_url,
            Some("https://demo.vault.azure.net".into())
        );
    }
}
