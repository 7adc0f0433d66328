//! Class settings CLI subcommands.

use anyhow::{Result, bail};
use clap::Subcommand;
use console::style;

use classsync_types::classroom::ClassSettings;

use super::{print_json, require_teacher};
use crate::state::AppState;

/// Settings subcommands. `classsync settings` alone shows the settings.
#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Show class settings.
    Show,

    /// Change class settings (teacher only). Omitted fields stay as they are.
    Set {
        #[arg(long)]
        class_name: Option<String>,

        #[arg(long)]
        teacher_name: Option<String>,

        #[arg(long)]
        currency_name: Option<String>,

        /// Announcement shown to everyone; pass "" to clear it.
        #[arg(long)]
        announcement: Option<String>,
    },
}

pub fn handle_settings_command(
    cmd: Option<SettingsCommand>,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd.unwrap_or(SettingsCommand::Show) {
        SettingsCommand::Show => show(&state.classroom.settings()?, json),
        SettingsCommand::Set {
            class_name,
            teacher_name,
            currency_name,
            announcement,
        } => {
            require_teacher(state)?;
            let mut settings = state.classroom.settings()?;
            let changed = apply(
                &mut settings,
                class_name,
                teacher_name,
                currency_name,
                announcement,
            );
            if !changed {
                bail!("Nothing to change. Pass at least one of --class-name, --teacher-name, --currency-name, --announcement");
            }
            state.classroom.save_settings(&settings)?;
            show(&settings, json)
        }
    }
}

/// Overwrite the provided fields. Returns whether anything was provided.
fn apply(
    settings: &mut ClassSettings,
    class_name: Option<String>,
    teacher_name: Option<String>,
    currency_name: Option<String>,
    announcement: Option<String>,
) -> bool {
    let mut changed = false;
    for (slot, value) in [
        (&mut settings.class_name, class_name),
        (&mut settings.teacher_name, teacher_name),
        (&mut settings.currency_name, currency_name),
        (&mut settings.announcement, announcement),
    ] {
        if let Some(value) = value {
            *slot = value;
            changed = true;
        }
    }
    changed
}

fn show(settings: &ClassSettings, json: bool) -> Result<()> {
    if json {
        return print_json(settings);
    }
    println!();
    println!("  {:<14} {}", "Class:", style(&settings.class_name).cyan().bold());
    println!("  {:<14} {}", "Teacher:", settings.teacher_name);
    println!("  {:<14} {}", "Currency:", settings.currency_name);
    if !settings.announcement.is_empty() {
        println!("  {:<14} {}", "Announcement:", style(&settings.announcement).yellow());
    }
    println!();
    Ok(())
}
