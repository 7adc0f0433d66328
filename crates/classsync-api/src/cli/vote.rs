//! Voting CLI subcommands: open/close rounds, cast votes, view results.

use std::collections::HashMap;

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use classsync_types::voting::{VOTES_PER_ROUND, Vote};

use super::{print_json, require_teacher, require_user, resolve_user};
use crate::state::AppState;

/// Voting subcommands.
#[derive(Subcommand)]
pub enum VoteCommand {
    /// Open a new voting round (teacher only).
    Open,

    /// Close the current round (teacher only).
    Close,

    /// Show the round state and your remaining votes.
    Status,

    /// Vote for a classmate in the open round.
    Cast {
        /// Target student id or username.
        target: String,
    },

    /// List votes of a round (defaults to the current round).
    List {
        #[arg(long)]
        round: Option<String>,
    },

    /// Votes received per student (defaults to the current round).
    Tally {
        #[arg(long)]
        round: Option<String>,
    },
}

/// Handle a vote subcommand.
pub fn handle_vote_command(cmd: VoteCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        VoteCommand::Open => set_active(state, true, json),
        VoteCommand::Close => set_active(state, false, json),
        VoteCommand::Status => status(state, json),
        VoteCommand::Cast { target } => cast(state, &target, json),
        VoteCommand::List { round } => list(state, round, json),
        VoteCommand::Tally { round } => tally(state, round, json),
    }
}

fn set_active(state: &AppState, is_active: bool, json: bool) -> Result<()> {
    require_teacher(state)?;
    let session = state.sessions.set_active(is_active)?;

    if json {
        return print_json(&session);
    }
    println!();
    if session.is_active {
        println!(
            "  {} Voting is open (round {})",
            style("ok").green(),
            style(&session.session_id).cyan()
        );
    } else {
        println!(
            "  {} Voting is closed (last round {})",
            style("ok").green(),
            style(&session.session_id).dim()
        );
    }
    println!();
    Ok(())
}

fn status(state: &AppState, json: bool) -> Result<()> {
    let session = state.sessions.session()?;
    let user = state.auth.current_user()?;
    let remaining = match &user {
        Some(user) => Some(state.ledger.remaining_votes(&user.id)?),
        None => None,
    };
    let cast = state.ledger.votes_in_round(&session.session_id)?.len();

    if json {
        return print_json(&serde_json::json!({
            "session": session,
            "votes_in_round": cast,
            "remaining_votes": remaining,
        }));
    }

    println!();
    let open = if session.is_active {
        style("open").green().bold()
    } else {
        style("closed").red().bold()
    };
    println!("  {:<14} {}", "Voting:", open);
    println!("  {:<14} {}", "Round:", style(&session.session_id).dim());
    if let Some(started) = session.last_started_at {
        println!("  {:<14} {}", "Started:", started.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  {:<14} {}", "Votes cast:", cast);
    if let Some(remaining) = remaining {
        println!("  {:<14} {remaining} of {VOTES_PER_ROUND}", "Your votes:");
    }
    println!();
    Ok(())
}

fn cast(state: &AppState, target: &str, json: bool) -> Result<()> {
    let voter = require_user(state)?;
    let target = resolve_user(state, target)?;
    let vote = state.ledger.cast_vote(&voter.id, &target.id)?;

    if json {
        return print_json(&vote);
    }
    let remaining = state.ledger.remaining_votes(&voter.id)?;
    println!();
    println!(
        "  {} Voted for {} ({} vote{} left this round)",
        style("ok").green(),
        style(&target.name).cyan().bold(),
        remaining,
        if remaining == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

fn round_or_current(state: &AppState, round: Option<String>) -> Result<String> {
    match round {
        Some(round) => Ok(round),
        None => Ok(state.sessions.session()?.session_id),
    }
}

/// Map of user id to display name for table output.
fn names(state: &AppState) -> Result<HashMap<String, String>> {
    Ok(state
        .auth
        .users()?
        .into_iter()
        .map(|u| (u.id, u.name))
        .collect())
}

fn list(state: &AppState, round: Option<String>, json: bool) -> Result<()> {
    let round = round_or_current(state, round)?;
    let votes = state.ledger.votes_in_round(&round)?;

    if json {
        return print_json(&votes);
    }
    if votes.is_empty() {
        println!();
        println!(
            "  {} No votes in round {}.",
            style("i").blue().bold(),
            style(&round).dim()
        );
        println!();
        return Ok(());
    }

    let names = names(state)?;
    println!();
    println!("  Votes in round {} ({})", style(&round).dim(), votes.len());
    println!();
    println!("{}", vote_table(&votes, &names));
    println!();
    Ok(())
}

fn vote_table(votes: &[Vote], names: &HashMap<String, String>) -> Table {
    let display = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Voter").fg(Color::White),
        Cell::new("Target").fg(Color::White),
        Cell::new("Time").fg(Color::White),
    ]);
    for vote in votes {
        table.add_row(vec![
            Cell::new(display(&vote.voter_id)),
            Cell::new(display(&vote.target_id)).fg(Color::Cyan),
            Cell::new(vote.timestamp.format("%H:%M:%S")).fg(Color::DarkGrey),
        ]);
    }
    table
}

fn tally(state: &AppState, round: Option<String>, json: bool) -> Result<()> {
    let round = round_or_current(state, round)?;
    let tally = state.ledger.tally(&round)?;

    if json {
        return print_json(&tally);
    }
    if tally.is_empty() {
        println!();
        println!(
            "  {} No votes in round {}.",
            style("i").blue().bold(),
            style(&round).dim()
        );
        println!();
        return Ok(());
    }

    let names = names(state)?;
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Student").fg(Color::White),
        Cell::new("Votes").fg(Color::White),
    ]);
    for (rank, entry) in tally.iter().enumerate() {
        let name = names.get(&entry.target_id).unwrap_or(&entry.target_id);
        table.add_row(vec![
            Cell::new(rank + 1).fg(Color::DarkGrey),
            Cell::new(name).fg(Color::Cyan),
            Cell::new(entry.votes).fg(Color::Yellow),
        ]);
    }

    println!();
    println!("  Results for round {}", style(&round).dim());
    println!();
    println!("{table}");
    println!();
    Ok(())
}
