mod cli;
mod logging;
mod provider;
mod state;
mod sync;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignores if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let state_dir = cli.state_dir.as_path();

    match cli.command {
        Commands::Auth => {
            cli::commands::auth::run(state_dir).await?;
        }
        Commands::Logout => {
            cli::commands::auth::logout(state_dir).await?;
        }
        Commands::Whoami => {
            cli::commands::auth::whoami(cli.source, state_dir).await?;
        }
        Commands::Build { file, dry_run } => {
            cli::commands::build::run(&file, dry_run, cli.source, state_dir).await?;
        }
        Commands::Export { playlist, output } => {
            cli::commands::export::run(&playlist, &output, cli.source, state_dir).await?;
        }
        Commands::Backup { dir } => {
            cli::commands::backup::run(&dir, cli.source, state_dir).await?;
        }
        Commands::History { limit } => {
            cli::commands::history::run(limit, state_dir).await?;
        }
    }

    Ok(())
}
