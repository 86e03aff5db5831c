//! Resolves the client config from a config file and command-line overrides.

use anyhow::{Context, Result};
use clap::Args;
use graphql_client_config::{find_config, load_config, AuthorizationConfig, ClientConfig};
use std::path::{Path, PathBuf};

/// Endpoint options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Path to the client config file (searched upwards from the current
    /// directory when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint URL (overrides the config file)
    #[arg(short, long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// HTTP headers to include in every request (can be specified multiple times)
    /// Format: "Header-Name: Header-Value"
    #[arg(long = "header", short = 'H', value_name = "HEADER", global = true)]
    pub headers: Vec<String>,

    /// Bearer token sent in the `Authorization` header
    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds (overrides config file)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Number of retry attempts on failure (overrides config file)
    #[arg(long, global = true)]
    pub retry: Option<u32>,
}

/// Parses a header string in "Name: Value" format.
pub fn parse_header(header: &str) -> Result<(String, String)> {
    let Some((name, value)) = header.split_once(':') else {
        anyhow::bail!("Invalid header format: '{header}'. Expected 'Header-Name: Header-Value'");
    };
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Header name cannot be empty");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Builds the effective config. `cwd` is where the config search starts.
#[tracing::instrument(skip(args))]
pub fn resolve_config(args: &ConnectionArgs, cwd: &Path) -> Result<ClientConfig> {
    let mut config = match (&args.config, &args.url) {
        (Some(path), _) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        (None, Some(url)) => ClientConfig::new(url.clone()),
        (None, None) => {
            let path = find_config(cwd)
                .context("Failed to search for config")?
                .context("No client config file found. Use --config to specify one or pass --url.")?;
            load_config(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
    };

    if let Some(url) = &args.url {
        config.url.clone_from(url);
    }

    for header in &args.headers {
        let (name, value) = parse_header(header).context("Failed to parse headers")?;
        // Command-line headers replace config headers regardless of case.
        config.headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
        config.headers.insert(name, value);
    }

    if let Some(token) = &args.token {
        config.authorization = Some(AuthorizationConfig::new(token.clone()));
    }
    if args.timeout.is_some() {
        config.timeout = args.timeout;
    }
    if args.retry.is_some() {
        config.retry = args.retry;
    }

    tracing::debug!(url = %config.url, headers = config.headers.len(), "Resolved client config");
    Ok(config)
}
