// ============================================================================
// wallet-gate - CLI for the persisted wallet session and subscription
// ============================================================================
// Usage:
//   wallet-gate status                               Session, user and subscription
//   wallet-gate connect                              Connect via WALLET_GATE_RPC_URL
//   wallet-gate pay --amount 0x2386f26fc10000        Send the subscription payment
//   wallet-gate set-subscription --start .. --end .. Write a subscription record
//   wallet-gate logout | disconnect                  Clear auth or wallet state
//   wallet-gate export                               Dump stored keys as JSON
// ============================================================================

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};
use wallet_core::subscription::parse_timestamp;
use wallet_core::{
    HttpEvmProvider, InjectedProviders, Navigator, Outcome, PaymentRequester,
    RedbStore, SessionStore, SubscriptionEvaluator, SubscriptionRecord, WalletConfig,
    WalletConnector,
};

/// Wallet session and subscription tool
#[derive(Parser)]
#[command(name = "wallet-gate", version, about = "Inspect and manage the persisted wallet session")]
struct Cli {
    /// Path to the session store (default: ~/.wallet-gate/session.redb)
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the wallet session, user and subscription status
    Status,

    /// Connect a wallet through the configured JSON-RPC provider and save it
    Connect,

    /// Send the subscription payment from the connected wallet
    Pay {
        /// Amount in wei as a 0x-prefixed hex quantity
        #[arg(long)]
        amount: String,
    },

    /// Write a subscription record (normally done by the billing flow)
    SetSubscription {
        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        end: String,

        /// Mark the subscription as a free trial
        #[arg(long)]
        trial: bool,

        /// Store the record with active=false
        #[arg(long)]
        inactive: bool,
    },

    /// Remove the auth token and user profile (keeps the wallet)
    Logout,

    /// Forget the connected wallet
    Disconnect,

    /// Export all stored keys as JSON
    Export,
}

/// Opens the install page in the user's browser
struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn redirect(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!("Failed to open browser: {}", e);
            println!("Install a wallet from: {}", url);
        }
    }
}

fn providers(config: &WalletConfig) -> InjectedProviders {
    match &config.rpc_url {
        Some(url) => {
            info!("Using JSON-RPC provider at {}", url);
            InjectedProviders::new().with_ethereum(Arc::new(HttpEvmProvider::new(url.clone(), config.provider_flags)))
        }
        None => InjectedProviders::new(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Could not load .env file: {}", e);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wallet_cli=info".parse()?)
                .add_directive("wallet_core=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = WalletConfig::from_env();
    let db_path = cli.db_path.clone().or_else(|| config.db_path.clone());
    let store = Arc::new(RedbStore::open(db_path.as_deref())?);
    let sessions = SessionStore::new(store.clone());

    match cli.command {
        Commands::Status => cmd_status(&sessions),
        Commands::Connect => cmd_connect(&config, &sessions).await,
        Commands::Pay { amount } => cmd_pay(&config, &sessions, &amount).await,
        Commands::SetSubscription {
            start,
            end,
            trial,
            inactive,
        } => cmd_set_subscription(&sessions, &start, &end, trial, !inactive),
        Commands::Logout => {
            sessions.logout()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Disconnect => {
            sessions.clear_session()?;
            println!("Wallet disconnected.");
            Ok(())
        }
        Commands::Export => cmd_export(&store),
    }
}

fn cmd_status(sessions: &SessionStore) -> Result<()> {
    println!("=== Wallet Gate Status ===");

    match sessions.load_session()? {
        Some(session) => println!("Wallet:       {}: {}", session.wallet_type, session.short_address()),
        None => println!("Wallet:       not connected"),
    }

    match sessions.load_user()? {
        Some(user) => println!("User:         {}", user.name),
        None => println!("User:         logged out"),
    }

    match SubscriptionEvaluator::new().evaluate(sessions.kv()) {
        Some(status) => {
            let state = if status.expired {
                "expired"
            } else if status.record.active {
                "active"
            } else {
                "inactive"
            };
            let end = status.record.end_date.format("%Y-%m-%d");
            match status.record.start_date {
                Some(start) => println!("Subscription: {} ({} -> {})", state, start.format("%Y-%m-%d"), end),
                None => println!("Subscription: {} (until {})", state, end),
            }
            if let Some(badge) = status.badge() {
                println!("Badge:        {}", badge.label());
            }
        }
        None => println!("Subscription: none"),
    }

    Ok(())
}

async fn cmd_connect(config: &WalletConfig, sessions: &SessionStore) -> Result<()> {
    let connector = WalletConnector::new(
        Arc::new(providers(config)),
        Arc::new(BrowserNavigator),
        config.install_url.clone(),
    );

    match connector.connect_and_persist(sessions).await? {
        Outcome::Completed(session) => {
            println!("Connected {}: {}", session.wallet_type, session.address);
        }
        // The install page is open; nothing to report as an error
        Outcome::RedirectInitiated { url } => {
            println!("No wallet found. Opened {}", url);
        }
    }
    Ok(())
}

async fn cmd_pay(config: &WalletConfig, sessions: &SessionStore, amount: &str) -> Result<()> {
    let session = sessions
        .load_session()?
        .ok_or_else(|| anyhow!("No wallet connected. Run `wallet-gate connect` first."))?;

    let requester = PaymentRequester::new(
        Arc::new(providers(config)),
        Arc::new(BrowserNavigator),
        config.payment_recipient.clone(),
        config.install_url.clone(),
    );

    match requester.send_payment(&session.address, amount).await? {
        Outcome::Completed(hash) => println!("Payment submitted: {}", hash),
        Outcome::RedirectInitiated { url } => println!("No wallet found. Opened {}", url),
    }
    Ok(())
}

fn cmd_set_subscription(
    sessions: &SessionStore,
    start: &str,
    end: &str,
    is_trial: bool,
    active: bool,
) -> Result<()> {
    let start_date = parse_timestamp(start).ok_or_else(|| anyhow!("Invalid start date '{}'", start))?;
    let end_date = parse_timestamp(end).ok_or_else(|| anyhow!("Invalid end date '{}'", end))?;
    if end_date < start_date {
        anyhow::bail!("End date {} is before start date {}", end, start);
    }

    let record = SubscriptionRecord::new(start_date, end_date, is_trial, active);
    sessions.save_subscription(&record)?;

    println!(
        "Saved {} subscription {} -> {}",
        if is_trial { "trial" } else { "paid" },
        start_date.format("%Y-%m-%d"),
        end_date.format("%Y-%m-%d")
    );
    Ok(())
}

fn cmd_export(store: &RedbStore) -> Result<()> {
    let mut values = serde_json::Map::new();
    for (key, value) in store.entries()? {
        // JSON-encoded records are exported as objects
        let value = serde_json::from_str::<serde_json::Value>(&value)
            .ok()
            .filter(|v| v.is_object())
            .unwrap_or(serde_json::Value::String(value));
        values.insert(key, value);
    }

    let export = serde_json::json!({
        "exported_at": Utc::now().to_rfc3339(),
        "path": store.path().display().to_string(),
        "entries": values,
    });

    println!("{}", serde_json::to_string_pretty(&export)?);
    Ok(())
}
