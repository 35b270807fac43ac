use anyhow::Context;
use clap::Parser;
use secret_demo_http::DEMO_SECRET_NAME;

use crate::opts::VaultOpts;

/// Read the secret once and print it, using the same path as the endpoint.
#[derive(Parser, Debug)]
#[clap(about = "Fetch the DemoSecret value once and print it to stdout")]
pub struct GetCommand {
    #[clap(flatten)]
    pub vault: VaultOpts,
}

impl GetCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let value = self
            .vault
            .secret_endpoint()
            .fetch()
            .await
            .with_context(|| format!("Failed to read secret '{DEMO_SECRET_NAME}'"))?;
        println!("{value}");
        Ok(())
    }
}
