//! Account commands: init, login, register, logout, whoami, students, quiz.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use classsync_core::storage::kv_store::KvStore;
use classsync_types::user::{QuizResult, RegisterRequest, User};

use super::{print_json, require_student, require_user};
use crate::state::AppState;

/// Quiz subcommands.
#[derive(Subcommand)]
pub enum QuizCommand {
    /// Record the current student's quiz score.
    Submit {
        /// Correct answers.
        score: u32,

        /// Number of questions.
        total: u32,
    },
}

pub fn init(state: &AppState, json: bool) -> Result<()> {
    let keys = state.records.store().list_keys()?;
    let seeded: Vec<&str> = state.seeded.iter().map(|c| c.key()).collect();

    let feedback = &state.config.feedback;

    if json {
        return print_json(&serde_json::json!({
            "data_dir": state.data_dir,
            "seeded": seeded,
            "keys": keys,
            "feedback": {
                "enabled": feedback.enabled,
                "model": feedback.model,
                "configured": state.feedback.is_configured(),
            },
        }));
    }

    println!();
    if seeded.is_empty() {
        println!(
            "  {} Already initialized at {}",
            style("i").blue().bold(),
            style(state.store_dir().display()).cyan()
        );
    } else {
        println!(
            "  {} Seeded {} collections in {}",
            style("ok").green(),
            seeded.len(),
            style(state.store_dir().display()).cyan()
        );
        for key in &seeded {
            println!("     {}", style(key).dim());
        }
    }
    if state.feedback.is_configured() {
        println!("  {} AI feedback via {}", style("ok").green(), style(&feedback.model).cyan());
    } else {
        println!(
            "  {} AI feedback not configured; set GEMINI_API_KEY to enable it",
            style("i").blue().bold()
        );
    }
    println!();
    Ok(())
}

pub fn login(state: &AppState, username: &str, password: &str, json: bool) -> Result<()> {
    let Some(user) = state.auth.login(username, password)? else {
        bail!("Invalid username or password");
    };

    if json {
        return print_json(&user);
    }
    println!();
    println!(
        "  {} Logged in as {} ({})",
        style("ok").green(),
        style(&user.name).cyan().bold(),
        user.role
    );
    println!();
    Ok(())
}

pub fn register(state: &AppState, request: RegisterRequest, json: bool) -> Result<()> {
    let user = state
        .auth
        .register(request)
        .context("Registration failed")?;

    if json {
        return print_json(&user);
    }
    println!();
    println!(
        "  {} Registered {} as {} and logged in",
        style("ok").green(),
        style(&user.username).cyan().bold(),
        user.role
    );
    println!();
    Ok(())
}

pub fn logout(state: &AppState, json: bool) -> Result<()> {
    let previous = state.auth.current_user()?;
    state.auth.logout()?;

    if json {
        return print_json(&serde_json::json!({
            "logged_out": previous.map(|u| u.username),
        }));
    }
    println!();
    match previous {
        Some(user) => println!("  {} Logged out {}", style("ok").green(), style(&user.username).cyan()),
        None => println!("  {} Nobody was logged in", style("i").blue().bold()),
    }
    println!();
    Ok(())
}

pub fn whoami(state: &AppState, json: bool) -> Result<()> {
    let user = require_user(state)?;
    if json {
        return print_json(&user);
    }

    let settings = state.classroom.settings()?;
    println!();
    println!(
        "  {} ({}) {}",
        style(&user.name).cyan().bold(),
        style(&user.username).dim(),
        user.role
    );
    println!("  {:<10} {}", style("Class:").bold(), settings.class_name);
    if let Some(profile) = &user.student {
        println!(
            "  {:<10} {} {}",
            style("Balance:").bold(),
            profile.balance,
            settings.currency_name
        );
        println!("  {:<10} {}", style("Submitted:").bold(), profile.assignments.len());
        if let Some(quiz) = &profile.quiz_result {
            println!("  {:<10} {}/{}", style("Quiz:").bold(), quiz.score, quiz.total);
        }
    }
    println!();
    Ok(())
}

pub fn students(state: &AppState, json: bool) -> Result<()> {
    let students = state.auth.students()?;
    if json {
        return print_json(&students);
    }

    if students.is_empty() {
        println!();
        println!("  {} No students yet.", style("i").blue().bold());
        println!("     Register one with: classsync register --role student ...");
        println!();
        return Ok(());
    }

    let currency = state.classroom.settings()?.currency_name;
    println!();
    println!("  Students ({})", students.len());
    println!();
    println!("{}", student_table(&students, &currency));
    println!();
    Ok(())
}

fn student_table(students: &[User], currency: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Username").fg(Color::White),
        Cell::new(format!("Balance ({currency})")).fg(Color::White),
    ]);

    for student in students {
        let balance = student.student.as_ref().map(|p| p.balance).unwrap_or_default();
        table.add_row(vec![
            Cell::new(&student.id).fg(Color::DarkGrey),
            Cell::new(&student.name).fg(Color::Cyan),
            Cell::new(&student.username),
            Cell::new(balance),
        ]);
    }
    table
}

pub fn handle_quiz_command(cmd: QuizCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        QuizCommand::Submit { score, total } => submit_quiz(state, score, total, json),
    }
}

fn submit_quiz(state: &AppState, score: u32, total: u32, json: bool) -> Result<()> {
    if total == 0 || score > total {
        bail!("Score must be between 0 and the number of questions ({score}/{total})");
    }
    let student = require_student(state)?;
    let result = QuizResult {
        score,
        total,
        completed_at: Utc::now(),
    };
    state.auth.submit_quiz_result(&student.id, result.clone())?;

    if json {
        return print_json(&result);
    }
    println!();
    println!(
        "  {} Recorded quiz result {}/{} for {}",
        style("ok").green(),
        score,
        total,
        style(&student.name).cyan()
    );
    println!();
    Ok(())
}

