//! Configuration for the typed GraphQL client.
//!
//! Settings live in `.graphqlclientrc.yml` (or `.yaml`, `.json`, or
//! `graphql-client.config.*`), found by walking up from a start directory.

mod config;
mod error;
mod loader;

pub use config::{
    AuthorizationConfig, ClientConfig, RequestMethod, DEFAULT_AUTHORIZATION_METHOD,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str};
