//! ClassSync CLI entry point.
//!
//! Binary name: `classsync`
//!
//! Parses CLI arguments, opens the store and wires services, then dispatches
//! to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use classsync_observe::tracing_setup::{init_tracing, shutdown_tracing};
use classsync_types::user::RegisterRequest;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,classsync=debug",
        _ => "trace",
    };
    if let Err(e) = init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "classsync", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let json = cli.json;

    match cli.command {
        Commands::Init => cli::account::init(&state, json)?,

        Commands::Login { username, password } => {
            cli::account::login(&state, &username, &password, json)?;
        }

        Commands::Register {
            name,
            username,
            password,
            role,
        } => {
            let request = RegisterRequest {
                name,
                username,
                password,
                role,
            };
            cli::account::register(&state, request, json)?;
        }

        Commands::Logout => cli::account::logout(&state, json)?,

        Commands::Whoami => cli::account::whoami(&state, json)?,

        Commands::Students => cli::account::students(&state, json)?,

        Commands::Vote { action } => cli::vote::handle_vote_command(action, &state, json)?,

        Commands::Chat { action } => cli::chat::handle_chat_command(action, &state, json)?,

        Commands::Assignment { action } => {
            cli::assignment::handle_assignment_command(action, &state, json).await?;
        }

        Commands::Settings { action } => {
            cli::settings::handle_settings_command(action, &state, json)?;
        }

        Commands::Quiz { action } => cli::account::handle_quiz_command(action, &state, json)?,

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
