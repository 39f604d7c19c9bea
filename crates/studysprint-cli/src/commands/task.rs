//! Task management commands against the backend store.

use chrono::NaiveDate;
use clap::Subcommand;
use studysprint_core::{NewTask, TaskPriority, TaskStatus, TaskStore, TaskUpdate};

use crate::common;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a task
    Add {
        /// Task title
        title: String,
        /// Subject the task belongs to
        #[arg(long)]
        subject: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        /// Priority: low, medium or high
        #[arg(long, value_parser = parse_priority)]
        priority: Option<TaskPriority>,
    },
    /// List tasks for the current user
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },
}

fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    match s.to_ascii_lowercase().as_str() {
        "low" => Ok(TaskPriority::Low),
        "medium" => Ok(TaskPriority::Medium),
        "high" => Ok(TaskPriority::High),
        other => Err(format!(
            "unknown priority '{other}' (expected low, medium or high)"
        )),
    }
}

pub async fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = common::context()?;

    match action {
        TaskAction::Add {
            title,
            subject,
            due,
            priority,
        } => {
            let mut new_task = NewTask::new(ctx.config.user.id.clone(), title);
            new_task.subject = subject;
            new_task.due_date = due;
            if let Some(priority) = priority {
                new_task.priority = priority;
            }
            let task = ctx.client.create_task(new_task).await?;
            println!("Task created: {}", task.id);
            common::print_json(&task)?;
        }
        TaskAction::List { json } => {
            let tasks = ctx.client.list_tasks(&ctx.config.user.id).await?;
            if json {
                common::print_json(&tasks)?;
            } else {
                for task in &tasks {
                    let mut line = format!(
                        "{}  [{}]  {}  {}",
                        task.id, task.status, task.priority, task.title
                    );
                    if let Some(subject) = &task.subject {
                        line.push_str(&format!(" ({subject})"));
                    }
                    if let Some(due) = task.due_date {
                        line.push_str(&format!("  due {due}"));
                    }
                    println!("{line}");
                }
            }
        }
        TaskAction::Done { id } => {
            let task = ctx
                .client
                .update_task(&id, &TaskUpdate::status(TaskStatus::Completed))
                .await?;
            common::print_json(&task)?;
        }
        TaskAction::Rm { id } => {
            ctx.client.delete_task(&id).await?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}
