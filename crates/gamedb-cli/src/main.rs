//! gamedb CLI
//!
//! Admin client for the game-data API: sign in, then list, fetch, create,
//! update and delete entities.

use clap::Parser;
use tracing::info;

use gamedb_cli::auth_cmd::{self, AuthAction};
use gamedb_cli::entity_cmd::{self, EntityAction};
use gamedb_cli::session;

#[derive(Parser, Debug)]
#[command(name = "gamedb")]
#[command(version, about = "Game-data API admin client", long_about = None)]
struct Cli {
    /// API root URL (overrides settings.json and GAMEDB_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Locale path segment, e.g. "en"
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Sign in, sign out, inspect or renew the stored credential.
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    #[command(flatten)]
    Entity(EntityAction),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = gamedb_core::config::load_config()?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if let Some(locale) = cli.locale {
        config.api.locale = Some(locale).filter(|l| !l.is_empty());
    }
    let log_json = cli.log_json || config.logging.json;

    gamedb_core::tracing_init::init_tracing(&config.logging.level, log_json);
    info!(version = env!("CARGO_PKG_VERSION"), base_url = %config.api.base_url, "Starting gamedb CLI");

    let session = session::open(&config)?;

    match cli.command {
        Commands::Auth { action } => auth_cmd::run(action, &session).await?,
        Commands::Entity(action) => {
            session.initialize();
            let result = entity_cmd::run(action, session.client()).await;
            session.dispose();
            result?;
        }
    }

    Ok(())
}
