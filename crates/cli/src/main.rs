mod commands;
mod exit_code;
mod settings;

use clap::{Parser, Subcommand};
use exit_code::ExitCode;
use graphql_typed_client::GraphQLClient;
use settings::ConnectionArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gqlc")]
#[command(about = "Query, introspect and validate against a GraphQL endpoint", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the schema via introspection
    Introspect {
        /// Output file path (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: commands::introspect::SchemaFormat,
    },

    /// Check a selection of dotted field paths against the schema
    ///
    /// Exits with status 1 when the selection has errors. Deprecated fields
    /// are reported as warnings.
    Validate {
        /// Field paths, e.g. `hero.name hero.friends.name`
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,

        /// Root operation the paths start from
        #[arg(long, value_enum, default_value = "query")]
        operation: commands::validate::Operation,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Execute a query built from dotted field paths and print the data
    Query {
        /// Field paths, e.g. `hero.name hero.friends.name`
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<String>,

        /// Send the query as a GET request
        #[arg(long)]
        get: bool,

        /// Print the generated query to stderr
        #[arg(long)]
        print_query: bool,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let cwd = std::env::current_dir()?;
    let config = match settings::resolve_config(&cli.connection, &cwd) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::ConfigError.exit();
        }
    };
    let client = GraphQLClient::from_config(config);

    let result = match cli.command {
        Commands::Introspect { output, format } => {
            commands::introspect::run(&client, output, format)
                .await
                .map(|()| ExitCode::Success)
        }
        Commands::Validate {
            paths,
            operation,
            format,
        } => commands::validate::run(&client, &paths, operation, format, cli.quiet).await,
        Commands::Query {
            paths,
            get,
            print_query,
        } => commands::query::run(&client, &paths, get, print_query)
            .await
            .map(|()| ExitCode::Success),
    };

    match result {
        Ok(ExitCode::Success) => Ok(()),
        Ok(code) => code.exit(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::RequestError.exit();
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Configure colored output from flags and the `NO_COLOR` / `CLICOLOR_FORCE`
/// / `CLICOLOR` conventions, in that order of priority. Without any of them
/// the `colored` crate decides from TTY detection.
fn configure_colors(force_color: bool, no_color: bool) {
    use colored::control;

    if let Some(enabled) = color_override(
        force_color,
        no_color,
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("CLICOLOR_FORCE").ok().as_deref(),
        std::env::var("CLICOLOR").ok().as_deref(),
    ) {
        control::set_override(enabled);
    }
}

fn color_override(
    force_color: bool,
    no_color: bool,
    no_color_env: bool,
    clicolor_force: Option<&str>,
    clicolor: Option<&str>,
) -> Option<bool> {
    if force_color {
        Some(true)
    } else if no_color || no_color_env {
        Some(false)
    } else if let Some(value) = clicolor_force {
        (!value.is_empty() && value != "0").then_some(true)
    } else if clicolor == Some("0") {
        Some(false)
    } else {
        None
    }
}
