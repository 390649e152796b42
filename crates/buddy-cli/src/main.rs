//! Interview Buddy CLI - chat with the interview coach from a terminal.

mod config;
mod repl;

use std::path::PathBuf;
use std::time::Duration;

use buddy_chat::{ChatConfig, SessionStore, StorageRepository};
use buddy_client::{BackendClient, DEFAULT_API_BASE_URL};
use buddy_gateway::GatewayConfig;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use config::CliConfig;

/// Interview Buddy CLI - AI interview practice in your terminal
#[derive(Parser)]
#[command(name = "interview-buddy")]
#[command(about = "Practice interviews with Interview Buddy", long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "BUDDY_API_URL", default_value = DEFAULT_API_BASE_URL)]
    api_url: String,

    /// Access token (defaults to the one saved by `login`)
    #[arg(long, env = "BUDDY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory for saved chats and login
    #[arg(long, env = "BUDDY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the access token
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "BUDDY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a new account
    Signup {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "BUDDY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Start an interactive chat
    Chat {
        /// Typing delay before each reply, in milliseconds
        #[arg(long, default_value = "1500")]
        typing_delay_ms: u64,

        /// Chat request timeout, in seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// List saved chats
    Sessions,

    /// Run the HTTP gateway in front of the backend
    Gateway {
        /// HTTP bind address
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so the chat transcript on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::from_default_env())?)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::new(cli.api_url, cli.token, cli.data_dir)?;

    match cli.command {
        Commands::Login { email, password } => {
            login(&config, &email, &password).await?;
        }
        Commands::Signup { email, password } => {
            signup(&config, &email, &password).await?;
        }
        Commands::Chat {
            typing_delay_ms,
            timeout_secs,
        } => {
            let chat_config = ChatConfig {
                typing_delay: Duration::from_millis(typing_delay_ms),
                request_timeout: Duration::from_secs(timeout_secs),
                ..ChatConfig::default()
            };
            chat(&config, chat_config).await?;
        }
        Commands::Sessions => {
            let sessions = config.saved_sessions();
            if sessions.is_empty() {
                println!("No saved chats.");
            } else {
                repl::print_sessions(&sessions, sessions.first().map(|s| &s.id));
            }
        }
        Commands::Gateway { bind } => {
            let gateway = GatewayConfig {
                bind_addr: bind,
                backend_url: config.api_url.clone(),
                ..GatewayConfig::default()
            };
            buddy_gateway::serve(gateway).await?;
        }
    }

    Ok(())
}

/// Info level for this binary and every `buddy_*` library crate.
fn log_filter(base: EnvFilter) -> Result<EnvFilter, ParseError> {
    Ok(base
        .add_directive("interview_buddy=info".parse()?)
        .add_directive("buddy=info".parse()?))
}

async fn login(
    config: &CliConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.api_url);
    let tokens = match client.login(email, password).await {
        Ok(tokens) => tokens,
        Err(e) => return Err(e.detail_or("Login failed").into()),
    };
    config.save_login(&tokens)?;

    info!(data_dir = %config.data_dir.display(), "Saved login");
    println!("Logged in as {email}.");
    Ok(())
}

async fn signup(
    config: &CliConfig,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = BackendClient::new(&config.api_url);
    match client.signup(email, password).await {
        Ok(message) => {
            println!("{message}");
            println!("Run `interview-buddy login` to sign in.");
            Ok(())
        }
        Err(e) => Err(e.detail_or("Signup failed").into()),
    }
}

async fn chat(config: &CliConfig, chat_config: ChatConfig) -> Result<(), Box<dyn std::error::Error>> {
    let token = config
        .access_token()
        .ok_or("Not logged in. Run `interview-buddy login` first.")?;
    let backend =
        BackendClient::with_timeout(&config.api_url, chat_config.request_timeout)?.with_token(token);
    let store = SessionStore::open(StorageRepository::new(config.storage()));

    info!(api_url = %config.api_url, "Starting chat");
    repl::run(store, backend, chat_config).await
}
