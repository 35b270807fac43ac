use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use secret_demo_http::HttpServer;

use crate::opts::VaultOpts;

/// The port used when neither `--listen` nor the Functions host pick one.
const DEFAULT_PORT: u16 = 3000;

/// Serve the secret over HTTP.
#[derive(Parser, Debug)]
#[clap(about = "Serve the DemoSecret value on GET /api/GetSecret")]
pub struct ServeCommand {
    #[clap(flatten)]
    pub vault: VaultOpts,

    /// IP address and port to listen on
    #[clap(long = "listen", value_parser = parse_listen_addr)]
    pub listen: Option<SocketAddr>,

    /// Port assigned by the Azure Functions host to a custom handler.
    #[clap(long = "functions-port", env = "FUNCTIONS_CUSTOMHANDLER_PORT", hide = true)]
    pub functions_port: Option<u16>,
}

impl ServeCommand {
    /// The address to bind: `--listen` wins over the Functions host port.
    pub fn listen_addr(&self) -> SocketAddr {
        if let Some(addr) = self.listen {
            return addr;
        }
        let port = self.functions_port.unwrap_or(DEFAULT_PORT);
        SocketAddr::from((Ipv4Addr::LOCALHOST, port))
    }

    pub async fn run(self) -> anyhow::Result<()> {
        if self.vault.endpoint_config().vault_url.is_none() {
            tracing::warn!(
                "No vault address configured; requests will fail until `KeyVaultUrl` is set"
            );
        }

        let endpoint = self.vault.secret_endpoint();
        let server = Arc::new(HttpServer::new(self.listen_addr(), endpoint));

        tokio::select! {
            res = server.serve() => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                Ok(())
            }
        }
    }
}

fn parse_listen_addr(addr: &str) -> anyhow::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
    // Prefer 127.0.0.1 over e.g. [::1]
    if let Some(addr) = addrs
        .iter()
        .find(|addr| addr.is_ipv4() && addr.ip() == Ipv4Addr::LOCALHOST)
    {
        return Ok(*addr);
    }
    addrs.into_iter().next().context("couldn't resolve address")
}
