//! Ledgermail - compose and send chain messages from the command line
//!
//! Talks to a locally running sending service.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use ledgermail_api::config::{DEFAULT_BASE_URL, DEFAULT_NETWORK, DEFAULT_PROTOCOL};
use ledgermail_api::{ApiConfig, MailchainClient};
use ledgermail_core::{ComposeConfig, ComposeContext, Services};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Applied on top of `RUST_LOG`
const DEFAULT_LOG_DIRECTIVE: &str = "ledgermail=debug";

#[derive(Debug, Parser)]
#[command(name = "ledgermail", version, about = "Compose and send messages to chain addresses")]
struct Cli {
    /// Sending service API root
    #[arg(long, env = "LEDGERMAIL_API_URL", default_value = DEFAULT_BASE_URL, global = true)]
    api_url: String,

    /// Protocol used for name resolution and key lookup
    #[arg(long, env = "LEDGERMAIL_PROTOCOL", default_value = DEFAULT_PROTOCOL, global = true)]
    protocol: String,

    /// Network to resolve and send on
    #[arg(long, env = "LEDGERMAIL_NETWORK", default_value = DEFAULT_NETWORK, global = true)]
    network: String,

    /// Quiet period before a recipient is resolved, in milliseconds
    #[arg(long, default_value_t = 1500, global = true)]
    debounce_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the sender addresses held by the service
    Addresses {
        /// Also print each address identicon
        #[arg(long)]
        identicons: bool,
    },
    /// Resolve a name or validate an address
    Resolve { value: String },
    /// Compose and send a new message
    Send {
        #[arg(long)]
        to: String,
        /// Sender address, defaults to the first address of the service
        #[arg(long)]
        from: Option<String>,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Reply to a message stored as JSON
    Reply {
        /// Path to the message being replied to
        message: PathBuf,
        /// Text placed above the quoted message
        #[arg(long, default_value = "")]
        body: String,
    },
}

impl Cli {
    fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            protocol: self.protocol.clone(),
            network: self.network.clone(),
        }
    }

    fn compose_config(&self) -> ComposeConfig {
        ComposeConfig::default().with_debounce(Duration::from_millis(self.debounce_ms))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .init();

    let cli = Cli::parse();
    let api_config = cli.api_config();
    tracing::info!("Using sending service at {}", api_config.base_url);

    let client = MailchainClient::new(&api_config)?;
    let services = Services::from_backend(Arc::new(client));
    let context = ComposeContext::new(&api_config.protocol, &api_config.network);
    let config = cli.compose_config();

    match cli.command {
        Command::Addresses { identicons } => {
            commands::list_addresses(services, context, config, identicons).await
        }
        Command::Resolve { value } => {
            let address = commands::resolve(services, context, config, &value).await?;
            println!("{}", address);
            Ok(())
        }
        Command::Send {
            to,
            from,
            subject,
            body,
        } => {
            let context = match from {
                Some(from) => context.with_account(from),
                None => context,
            };
            commands::send(services, context, config, &to, subject, body).await
        }
        Command::Reply { message, body } => {
            let raw = std::fs::read_to_string(&message)?;
            let message = serde_json::from_str(&raw)?;
            commands::reply(services, context.replying_to(message), config, &body).await
        }
    }
}
