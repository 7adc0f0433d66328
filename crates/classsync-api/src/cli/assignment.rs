//! Assignment CLI subcommands: publish, submit, and AI feedback.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use classsync_types::classroom::AssignmentMaster;
use classsync_types::user::{StudentAssignment, User, UserRole};

use super::{print_json, require_student, require_teacher, require_user, resolve_user};
use crate::state::AppState;

/// Assignment subcommands.
#[derive(Subcommand)]
pub enum AssignmentCommand {
    /// List assignments, newest first.
    #[command(alias = "ls")]
    List,

    /// Publish a new assignment (teacher only).
    Create {
        title: String,

        /// Due date (YYYY-MM-DD).
        #[arg(long)]
        deadline: NaiveDate,
    },

    /// Submit your work for an assignment and get AI feedback (students only).
    Submit {
        /// Assignment id.
        assignment: String,

        /// Submission text.
        #[arg(conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        /// Read the submission from a file instead.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Regenerate AI feedback for a stored submission.
    Feedback {
        /// Assignment id.
        assignment: String,

        /// Student id or username (required for the teacher).
        #[arg(long)]
        student: Option<String>,
    },
}

/// Handle an assignment subcommand.
pub async fn handle_assignment_command(
    cmd: AssignmentCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        AssignmentCommand::List => list(state, json),
        AssignmentCommand::Create { title, deadline } => create(state, &title, deadline, json),
        AssignmentCommand::Submit {
            assignment,
            content,
            file,
        } => {
            let content = match (content, file) {
                (Some(content), _) => content,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => bail!("Provide the submission text or --file"),
            };
            submit(state, &assignment, &content, json).await
        }
        AssignmentCommand::Feedback {
            assignment,
            student,
        } => feedback(state, &assignment, student.as_deref(), json).await,
    }
}

fn find_assignment(state: &AppState, id: &str) -> Result<AssignmentMaster> {
    match state
        .classroom
        .assignment_masters()?
        .into_iter()
        .find(|a| a.id == id)
    {
        Some(assignment) => Ok(assignment),
        None => bail!("Assignment '{id}' not found"),
    }
}

fn submission<'a>(student: &'a User, assignment_id: &str) -> Option<&'a StudentAssignment> {
    student
        .student
        .as_ref()?
        .assignments
        .iter()
        .find(|a| a.assignment_id == assignment_id)
}

fn list(state: &AppState, json: bool) -> Result<()> {
    let assignments = state.classroom.assignment_masters()?;
    let me = state.auth.current_user()?.filter(User::is_student);

    if json {
        return print_json(&assignments);
    }
    if assignments.is_empty() {
        println!();
        println!("  {} No assignments yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let mut header = vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Deadline").fg(Color::White),
    ];
    if me.is_some() {
        header.push(Cell::new("Submitted").fg(Color::White));
    }
    table.set_header(header);

    let today = chrono::Utc::now().date_naive();
    for assignment in &assignments {
        let deadline_color = if assignment.deadline < today {
            Color::Red
        } else {
            Color::Yellow
        };
        let mut row = vec![
            Cell::new(&assignment.id).fg(Color::DarkGrey),
            Cell::new(&assignment.title).fg(Color::Cyan),
            Cell::new(assignment.deadline).fg(deadline_color),
        ];
        if let Some(me) = &me {
            let done = submission(me, &assignment.id).is_some();
            row.push(if done {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::DarkGrey)
            });
        }
        table.add_row(row);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn create(state: &AppState, title: &str, deadline: NaiveDate, json: bool) -> Result<()> {
    require_teacher(state)?;
    if title.trim().is_empty() {
        bail!("Title cannot be empty");
    }
    let assignment = state.classroom.create_assignment_master(title, deadline)?;

    if json {
        return print_json(&assignment);
    }
    println!();
    println!(
        "  {} Published '{}' due {} ({})",
        style("ok").green(),
        style(&assignment.title).cyan(),
        assignment.deadline,
        style(&assignment.id).dim()
    );
    println!();
    Ok(())
}

async fn submit(state: &AppState, assignment_id: &str, content: &str, json: bool) -> Result<()> {
    let student = require_student(state)?;
    let assignment = find_assignment(state, assignment_id)?;
    if !assignment.is_active {
        bail!("Assignment '{}' is no longer accepting submissions", assignment.title);
    }
    if content.trim().is_empty() {
        bail!("Submission cannot be empty");
    }

    state
        .auth
        .submit_assignment(&student.id, &assignment.id, content)?;
    let text = state
        .feedback
        .assignment_feedback(content, &assignment.title)
        .await;
    state
        .auth
        .record_feedback(&student.id, &assignment.id, &text)?;

    print_feedback(&assignment, &student, &text, json)
}

async fn feedback(
    state: &AppState,
    assignment_id: &str,
    student: Option<&str>,
    json: bool,
) -> Result<()> {
    let me = require_user(state)?;
    let student = match (me.role, student) {
        (UserRole::Teacher, Some(student)) => resolve_user(state, student)?,
        (UserRole::Teacher, None) => bail!("Pass --student to choose whose submission to review"),
        (UserRole::Student, Some(other)) if other != me.id && other != me.username => {
            bail!("Students can only request feedback on their own work")
        }
        (UserRole::Student, _) => me,
    };
    let assignment = find_assignment(state, assignment_id)?;

    let Some(work) = submission(&student, &assignment.id) else {
        bail!("{} has not submitted '{}'", student.name, assignment.title);
    };
    let text = state
        .feedback
        .assignment_feedback(&work.content, &assignment.title)
        .await;
    state
        .auth
        .record_feedback(&student.id, &assignment.id, &text)?;

    print_feedback(&assignment, &student, &text, json)
}

fn print_feedback(assignment: &AssignmentMaster, student: &User, text: &str, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "assignment_id": assignment.id,
            "student_id": student.id,
            "feedback": text,
        }));
    }
    println!();
    println!(
        "  {} Feedback on '{}' for {}",
        style("ok").green(),
        style(&assignment.title).cyan(),
        style(&student.name).cyan().bold()
    );
    println!();
    for line in text.lines() {
        println!("    {line}");
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use classsync_types::user::StudentProfile;

    #[test]
    fn test_submission_lookup() {
        let student = User {
            id: "s1".to_string(),
            name: "Amy Chen".to_string(),
            username: "student1".to_string(),
            password: "1234".to_string(),
            role: UserRole::Student,
            student: Some(StudentProfile {
                assignments: vec![StudentAssignment {
                    assignment_id: "a1".to_string(),
                    content: "essay".to_string(),
                    submitted_at: Utc::now(),
                    feedback: None,
                }],
                ..StudentProfile::default()
            }),
        };
        assert_eq!(submission(&student, "a1").map(|s| s.content.as_str()), Some("essay"));
        assert!(submission(&student, "a2").is_none());
    }
}
