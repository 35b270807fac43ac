//! Commands for the secret demo CLI.

/// Command for reading the secret once.
pub mod get;
/// Command for serving the secret endpoint.
pub mod serve;
