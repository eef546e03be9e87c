use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use tidal_mcp::{cli, config, error, server};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Defaults to `serve` when omitted
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the TIDAL tools over MCP on stdio
    Serve,

    /// Authenticate with TIDAL and store the session
    Auth(AuthOptions),

    /// Show the stored session and whether it is still valid
    Status,

    /// Delete the stored session
    Logout,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Log in through the browser with PKCE instead of the device flow
    #[clap(long)]
    pub pkce: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
        command => {
            if let Err(e) = config::load_env().await {
                error!("Cannot load environment. Err: {}", e);
            }
            let config = config::Config::from_env();

            match command {
                Command::Auth(opt) => cli::auth(&config, opt.pkce).await,
                Command::Status => cli::status(&config).await,
                Command::Logout => cli::logout(&config).await,
                Command::Serve | Command::Completions(_) => {}
            }
        }
    }
}

/// stdout carries the MCP transport, so everything here reports on stderr.
async fn serve() {
    let env_loaded = config::load_env().await;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = env_loaded {
        tracing::error!(error = %e, "Cannot load environment");
        std::process::exit(1);
    }

    tracing::info!("Starting TIDAL MCP server");
    let config = config::Config::from_env();
    if let Err(err) = server::serve_stdio(&config).await {
        tracing::error!(%err, "fatal error");
        std::process::exit(1);
    }
}
