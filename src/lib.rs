pub mod commands;
pub mod opts;

use clap::Parser;

use crate::commands::{get::GetCommand, serve::ServeCommand};

/// Serves an Azure Key Vault secret over HTTP.
#[derive(Parser, Debug)]
#[clap(name = "secret-demo", version)]
pub enum SecretDemoApp {
    Serve(ServeCommand),
    Get(GetCommand),
}

impl SecretDemoApp {
    /// The main entry point to the secret demo.
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Serve(cmd) => cmd.run().await,
            Self::Get(cmd) => cmd.run().await,
        }
    }
}
