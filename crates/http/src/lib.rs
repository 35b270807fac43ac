//! The HTTP surface of the secret demo: one anonymous `GET` trigger that
//! answers with the value of a Key Vault secret.

pub mod body;
mod config;
mod endpoint;
mod instrument;
mod server;

pub use config::EndpointConfig;
pub use endpoint::{EndpointError, SecretEndpoint};
pub use instrument::Route;
pub use server::HttpServer;

/// The route of the secret trigger, as the Functions host exposes it
/// (`api` route prefix + function name).
pub const SECRET_ROUTE: &str = "/api/GetSecret";

/// Liveness check answered by the server itself.
pub const HEALTH_ROUTE: &str = "/.well-known/secret-demo/health";

/// The name of the secret returned by the trigger.
pub const DEMO_SECRET_NAME: &str = "DemoSecret";

/// Response body type.
pub type Body = http_body_util::combinators::BoxBody<hyper::body::Bytes, std::convert::Infallible>;
