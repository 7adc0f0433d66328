//! Chat CLI subcommands: rooms, messages and nicknames.

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use classsync_types::classroom::{ChatMessage, ChatSessionUpdate};
use classsync_types::user::User;

use super::{preview, print_json, require_student, require_teacher, require_user};
use crate::state::AppState;

/// Chat subcommands.
#[derive(Subcommand)]
pub enum ChatCommand {
    /// List chat rooms, newest first.
    Sessions,

    /// Open a new chat room (teacher only).
    Open {
        /// Discussion topic.
        topic: String,
    },

    /// Close a chat room (teacher only).
    Close {
        /// Chat session id.
        id: String,
    },

    /// Show messages of a room, or the lobby when no room is given.
    Messages {
        #[arg(long)]
        session: Option<String>,
    },

    /// Send a message as the current user.
    Send {
        content: String,

        /// Room to post in; the lobby when omitted.
        #[arg(long)]
        session: Option<String>,
    },

    /// Set the nickname you use in a room (students only).
    Nickname {
        /// Chat session id.
        session: String,

        nickname: String,
    },
}

/// Handle a chat subcommand.
pub fn handle_chat_command(cmd: ChatCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ChatCommand::Sessions => sessions(state, json),
        ChatCommand::Open { topic } => open(state, &topic, json),
        ChatCommand::Close { id } => close(state, &id, json),
        ChatCommand::Messages { session } => messages(state, session.as_deref(), json),
        ChatCommand::Send { content, session } => send(state, &content, session.as_deref(), json),
        ChatCommand::Nickname { session, nickname } => set_nickname(state, &session, &nickname, json),
    }
}

fn sessions(state: &AppState, json: bool) -> Result<()> {
    let sessions = state.classroom.chat_sessions()?;
    if json {
        return print_json(&sessions);
    }
    if sessions.is_empty() {
        println!();
        println!("  {} No chat rooms yet.", style("i").blue().bold());
        println!("     Open one with: classsync chat open <topic>");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Topic").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Opened").fg(Color::White),
    ]);
    for session in &sessions {
        let (status, color) = if session.is_active {
            ("active", Color::Green)
        } else {
            ("closed", Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&session.id).fg(Color::DarkGrey),
            Cell::new(&session.topic).fg(Color::Cyan),
            Cell::new(status).fg(color),
            Cell::new(session.created_at.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn open(state: &AppState, topic: &str, json: bool) -> Result<()> {
    require_teacher(state)?;
    if topic.trim().is_empty() {
        bail!("Topic cannot be empty");
    }
    let session = state.classroom.create_chat_session(topic)?;

    if json {
        return print_json(&session);
    }
    println!();
    println!(
        "  {} Opened '{}' ({})",
        style("ok").green(),
        style(&session.topic).cyan(),
        style(&session.id).dim()
    );
    println!();
    Ok(())
}

fn close(state: &AppState, id: &str, json: bool) -> Result<()> {
    require_teacher(state)?;
    let session = state.classroom.update_chat_session(
        id,
        ChatSessionUpdate {
            is_active: Some(false),
            ..ChatSessionUpdate::default()
        },
    )?;

    if json {
        return print_json(&session);
    }
    println!();
    println!("  {} Closed '{}'", style("ok").green(), style(&session.topic).cyan());
    println!();
    Ok(())
}

fn messages(state: &AppState, session: Option<&str>, json: bool) -> Result<()> {
    if let Some(id) = session {
        state.classroom.find_chat_session(id)?;
    }
    let messages = state.classroom.chat_messages_for(session)?;

    if json {
        return print_json(&messages);
    }
    println!();
    if messages.is_empty() {
        println!("  {} No messages yet.", style("i").blue().bold());
    }
    for message in &messages {
        println!(
            "  {} {} {}",
            style(message.timestamp.format("%m-%d %H:%M")).dim(),
            style(format!("{}:", message.sender_name)).cyan().bold(),
            message.content
        );
    }
    println!();
    Ok(())
}

/// The name a user shows in a room: their nickname there, else their name.
fn display_name(user: &User, session: Option<&str>) -> String {
    session
        .and_then(|id| user.student.as_ref()?.chat_nicknames.get(id).cloned())
        .unwrap_or_else(|| user.name.clone())
}

fn send(state: &AppState, content: &str, session: Option<&str>, json: bool) -> Result<()> {
    let user = require_user(state)?;
    if content.trim().is_empty() {
        bail!("Message cannot be empty");
    }
    if let Some(id) = session {
        let room = state.classroom.find_chat_session(id)?;
        if !room.is_active {
            bail!("Chat room '{}' is closed", room.topic);
        }
    }

    let message = ChatMessage {
        id: Uuid::now_v7().to_string(),
        session_id: session.map(str::to_string),
        sender_id: user.id.clone(),
        sender_name: display_name(&user, session),
        content: content.to_string(),
        timestamp: Utc::now(),
    };
    state.classroom.add_chat_message(message.clone())?;

    if json {
        return print_json(&message);
    }
    println!();
    println!(
        "  {} Sent as {}: {}",
        style("ok").green(),
        style(&message.sender_name).cyan(),
        preview(&message.content, 60)
    );
    println!();
    Ok(())
}

fn set_nickname(state: &AppState, session: &str, nickname: &str, json: bool) -> Result<()> {
    let student = require_student(state)?;
    let room = state.classroom.find_chat_session(session)?;
    let nickname = nickname.trim();
    if nickname.is_empty() {
        bail!("Nickname cannot be empty");
    }
    state.auth.save_student_nickname(&student.id, &room.id, nickname)?;

    if json {
        return print_json(&serde_json::json!({
            "session": room.id,
            "nickname": nickname,
        }));
    }
    println!();
    println!(
        "  {} You are '{}' in '{}'",
        style("ok").green(),
        style(nickname).cyan().bold(),
        room.topic
    );
    println!();
    Ok(())
}
