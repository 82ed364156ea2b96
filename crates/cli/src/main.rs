//! Pawshop CLI - storefront and admin client.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! pawshop products --category toys --sort price-low-to-high
//! pawshop product -NabcDEF
//!
//! # Manage the cart
//! pawshop cart add -NabcDEF --qty 2
//! pawshop cart show
//! pawshop cart remove line-1 --yes
//!
//! # Place an order
//! pawshop checkout --name "Mochi Chen" --email mochi@example.com \
//!     --tel 0912345678 --address "1 Paw Street"
//!
//! # Admin (reads the password from stdin)
//! pawshop login -u admin@example.com
//! pawshop admin list
//! pawshop logout
//! ```
//!
//! Configuration comes from the environment (see `pawshop_client::config`).
//! Set `PAWSHOP_CREDENTIAL_FILE` so the admin session survives between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use pawshop_client::config::ClientConfig;
use pawshop_client::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::admin::AdminAction;
use commands::shop::{CartAction, CheckoutArgs, ProductsArgs};

#[derive(Parser)]
#[command(name = "pawshop")]
#[command(author, version, about = "Pawshop storefront and admin client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in as an admin (password is read from stdin)
    Login {
        /// Admin email address
        #[arg(short, long)]
        username: String,
    },
    /// Sign out and forget the stored credential
    Logout,
    /// Navigate to a path and show where the router lands
    Visit {
        /// Path such as `/admin/product` or `/login`
        path: String,
    },
    /// List products
    Products(ProductsArgs),
    /// Show a single product
    Product {
        /// Product ID
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
    /// Manage products (requires login)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pawshop_client=info,pawshop=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;
    let mut notices = state.notices().subscribe();

    let result = match cli.command {
        Commands::Login { username } => commands::session::login(&state, &username).await,
        Commands::Logout => commands::session::logout(&state).await,
        Commands::Visit { path } => commands::session::visit(&state, &path).await,
        Commands::Products(args) => commands::shop::products(&state, args).await,
        Commands::Product { id } => commands::shop::product(&state, &id).await,
        Commands::Cart { action } => commands::shop::cart(&state, action).await,
        Commands::Checkout(args) => commands::shop::checkout(&state, args).await,
        Commands::Admin { action } => commands::admin::run(&state, action).await,
    };

    // Notices are printed even when the command failed
    render::notices(&mut std::io::stdout().lock(), &pawshop_client::notice::drain(&mut notices))?;
    result?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_ids_may_start_with_hyphen() {
        let cli = Cli::try_parse_from(["pawshop", "product", "-NabcDEF"]).unwrap();
        assert!(matches!(cli.command, Commands::Product { ref id } if id == "-NabcDEF"));

        let cli = Cli::try_parse_from(["pawshop", "cart", "add", "-Nxyz", "--qty", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Cart { action: CartAction::Add { ref product_id, qty: 2 } } if product_id == "-Nxyz"
        ));
    }

    #[test]
    fn test_admin_update_flags() {
        let cli = Cli::try_parse_from([
            "pawshop", "admin", "update", "-Nabc", "--price", "199", "--disabled",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Admin { action: AdminAction::Update { ref id, page: 1, .. } } if id == "-Nabc"
        ));

        assert!(
            Cli::try_parse_from(["pawshop", "admin", "create", "--enabled", "--disabled"]).is_err()
        );
    }
}
