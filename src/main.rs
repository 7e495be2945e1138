//! MCP server for the Contentful Management API.
//!
//! Run with `contentful-mcp --management-token <TOKEN>`, or configure it
//! through `CONTENTFUL_MANAGEMENT_ACCESS_TOKEN` and friends.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use contentful_mcp::config::{DEFAULT_HOST, DEFAULT_LOCALE};
use contentful_mcp::{Credentials, Gateway, GatewayConfig, HttpClientProvider, McpServer, PinnedScope};

/// MCP server for the Contentful Management API.
///
/// Exposes spaces, environments, content types, entries and assets as MCP
/// tools for AI agents. Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "contentful-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Management API access token.
    #[arg(long, env = "CONTENTFUL_MANAGEMENT_ACCESS_TOKEN", hide_env_values = true)]
    management_token: Option<String>,

    /// Management API host.
    #[arg(long, env = "CONTENTFUL_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Pin every call to this space.
    #[arg(long, env = "SPACE_ID")]
    space_id: Option<String>,

    /// Pin every call to this environment.
    #[arg(long, env = "ENVIRONMENT_ID")]
    environment_id: Option<String>,

    /// App private key, used instead of a management token.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// App definition id. Required with --private-key.
    #[arg(long, env = "APP_ID")]
    app_id: Option<String>,

    /// Locale used for asset title, description and file.
    #[arg(long, env = "CONTENTFUL_LOCALE", default_value = DEFAULT_LOCALE)]
    locale: String,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    // Set up logging; stdout carries the protocol
    let mut filter = EnvFilter::from_default_env();
    if args.verbose {
        if let Ok(directive) = "contentful_mcp=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let pinned = PinnedScope::new(args.space_id, args.environment_id);
    if pinned.any() && !pinned.both() {
        tracing::warn!(
            "only one of SPACE_ID and ENVIRONMENT_ID is set; tools still hide spaceId/environmentId \
             but the space and environment tools stay available"
        );
    }

    let credentials = match Credentials::resolve(
        args.management_token,
        args.private_key,
        args.app_id,
        &pinned,
    ) {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let clients = HttpClientProvider::new(&args.host, credentials);
    tracing::info!(
        host = %clients.base_url(),
        space = ?pinned.space_id,
        environment = ?pinned.environment_id,
        "starting contentful-mcp"
    );

    let config = GatewayConfig::new(pinned).with_locale(args.locale);
    let gateway = Gateway::new(config, Arc::new(clients));
    let mut server = McpServer::new(gateway);

    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
