//! CLI command definitions for the `classsync` binary.
//!
//! Uses clap derive macros for argument parsing. Commands act as the
//! current user (see `classsync login`); teacher-only commands refuse to
//! run for students.

pub mod account;
pub mod assignment;
pub mod chat;
pub mod settings;
pub mod vote;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;

use classsync_types::user::{User, UserRole};

use crate::state::AppState;

/// Classroom companion: accounts, voting rounds, chat and assignments.
#[derive(Parser)]
#[command(name = "classsync", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans to stdout through OpenTelemetry.
    #[arg(long, global = true, env = "CLASSSYNC_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and seed default records.
    Init,

    /// Log in as an existing account.
    Login {
        username: String,

        #[arg(long, short)]
        password: String,
    },

    /// Create an account and log in as it.
    Register {
        /// Display name.
        #[arg(long)]
        name: String,

        #[arg(long)]
        username: String,

        #[arg(long, short)]
        password: String,

        /// "teacher" or "student".
        #[arg(long, default_value = "student")]
        role: UserRole,
    },

    /// Log out the current user.
    Logout,

    /// Show the current user.
    Whoami,

    /// List students and their balances.
    Students,

    /// Voting rounds and votes.
    Vote {
        #[command(subcommand)]
        action: vote::VoteCommand,
    },

    /// Chat rooms and messages.
    Chat {
        #[command(subcommand)]
        action: chat::ChatCommand,
    },

    /// Assignments, submissions and AI feedback.
    #[command(alias = "hw")]
    Assignment {
        #[command(subcommand)]
        action: assignment::AssignmentCommand,
    },

    /// Show or change class settings.
    Settings {
        #[command(subcommand)]
        action: Option<settings::SettingsCommand>,
    },

    /// Quiz results.
    Quiz {
        #[command(subcommand)]
        action: account::QuizCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// The logged-in account, or an error telling the user to log in.
pub(crate) fn require_user(state: &AppState) -> Result<User> {
    match state.auth.current_user()? {
        Some(user) => Ok(user),
        None => bail!("Not logged in. Run: classsync login <username> --password <password>"),
    }
}

pub(crate) fn require_teacher(state: &AppState) -> Result<User> {
    let user = require_user(state)?;
    if user.role != UserRole::Teacher {
        bail!("Only the teacher can do that (logged in as '{}')", user.username);
    }
    Ok(user)
}

pub(crate) fn require_student(state: &AppState) -> Result<User> {
    let user = require_user(state)?;
    if !user.is_student() {
        bail!("Only students can do that (logged in as '{}')", user.username);
    }
    Ok(user)
}

/// Find an account by id or username.
pub(crate) fn resolve_user(state: &AppState, id_or_username: &str) -> Result<User> {
    match find_account(state.auth.users()?, id_or_username) {
        Some(user) => Ok(user),
        None => bail!("No account with id or username '{id_or_username}'"),
    }
}

/// An exact id match wins over a username match.
fn find_account(users: Vec<User>, id_or_username: &str) -> Option<User> {
    let by_username = users.iter().position(|u| u.username == id_or_username);
    let index = users
        .iter()
        .position(|u| u.id == id_or_username)
        .or(by_username)?;
    users.into_iter().nth(index)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Shorten `text` to `max` characters for table cells.
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_vote_cast() {
        let cli = Cli::try_parse_from(["classsync", "--json", "vote", "cast", "student2"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Vote {
                action: vote::VoteCommand::Cast { ref target }
            } if target == "student2"
        ));
    }

    #[test]
    fn test_cli_register_role_parses() {
        let cli = Cli::try_parse_from([
            "classsync", "register", "--name", "Mr. Wu", "--username", "wu", "-p", "pw", "--role",
            "teacher",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Register {
                role: UserRole::Teacher,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_role() {
        let result = Cli::try_parse_from([
            "classsync", "register", "--name", "X", "--username", "x", "-p", "pw", "--role", "admin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    fn account(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            name: username.to_string(),
            username: username.to_string(),
            password: "pw".to_string(),
            role: UserRole::Student,
            student: None,
        }
    }

    #[test]
    fn test_find_account_prefers_id_over_username() {
        // "s2" is one account's username and another account's id.
        let users = vec![account("s9", "s2"), account("s2", "student2")];
        let found = find_account(users, "s2").unwrap();
        assert_eq!(found.id, "s2");
        assert_eq!(found.username, "student2");
    }

    #[test]
    fn test_find_account_falls_back_to_username() {
        let users = vec![account("s1", "student1"), account("s2", "student2")];
        assert_eq!(find_account(users.clone(), "student2").unwrap().id, "s2");
        assert!(find_account(users, "nobody").is_none());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghijkl", 8), "abcde...");
        assert_eq!(preview("作業寫得不錯但請加入", 6), "作業寫...");
    }
}
