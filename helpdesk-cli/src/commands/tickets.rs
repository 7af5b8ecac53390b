use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use client::{Route, services::tickets::Attachment};
use shared::models::{ResourceId, Ticket, TicketDraft};

use super::{Connection, check_error, parse_pairs, print_json};

/// Ticket subcommands.
#[derive(Subcommand, Debug)]
pub enum TicketCommand {
    /// List tickets, optionally filtered (e.g. `--filter status=open`)
    List {
        #[arg(long, short)]
        filter: Vec<String>,
    },
    /// Show one ticket
    Show { id: ResourceId },
    /// Open a ticket
    Create {
        #[arg(long, short)]
        title: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<ResourceId>,
    },
    /// Edit a ticket
    Update {
        id: ResourceId,
        #[arg(long, short)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<ResourceId>,
    },
    /// Delete a ticket
    Delete { id: ResourceId },
    /// Change the workflow status
    Status { id: ResourceId, status: String },
    /// Assign to a technician
    Assign { id: ResourceId, user_id: ResourceId },
    /// Remove the assignee
    Unassign { id: ResourceId },
    /// Close a ticket
    Close { id: ResourceId },
    /// Mark a ticket resolved
    Resolve { id: ResourceId },
    /// List comments
    Comments { id: ResourceId },
    /// Add a comment
    Comment { id: ResourceId, content: String },
    /// Upload a file
    Attach {
        id: ResourceId,
        file: PathBuf,
        #[arg(long, short)]
        mime: Option<String>,
    },
    /// Show time tracking
    Time { id: ResourceId },
    /// Start time tracking
    Start { id: ResourceId },
    /// Stop time tracking
    Stop { id: ResourceId },
}

pub async fn run(connection: &Connection, command: TicketCommand) -> Result<()> {
    let target = match &command {
        TicketCommand::Create { .. } => Route::NewTicket,
        TicketCommand::Update { .. } => Route::UpdateTicket,
        TicketCommand::List { .. } => Route::Dashboard,
        TicketCommand::Show { id }
        | TicketCommand::Delete { id }
        | TicketCommand::Status { id, .. }
        | TicketCommand::Assign { id, .. }
        | TicketCommand::Unassign { id }
        | TicketCommand::Close { id }
        | TicketCommand::Resolve { id }
        | TicketCommand::Comments { id }
        | TicketCommand::Comment { id, .. }
        | TicketCommand::Attach { id, .. }
        | TicketCommand::Time { id }
        | TicketCommand::Start { id }
        | TicketCommand::Stop { id } => Route::TicketDetail { id: *id },
    };
    connection.enter(target).await?;

    let store = connection.helpdesk().tickets();
    match command {
        TicketCommand::List { filter } => {
            store.fetch_tickets(parse_pairs(&filter)?).await;
            let state = store.snapshot();
            check_error(state.error)?;
            for ticket in &state.tickets {
                print_ticket_line(ticket);
            }
        }
        TicketCommand::Show { id } => {
            store.fetch_ticket(id).await;
            let state = store.snapshot();
            check_error(state.error)?;
            if let Some(ticket) = state.current_ticket {
                print_json(&serde_json::to_value(ticket)?)?;
            }
        }
        TicketCommand::Create {
            title,
            description,
            priority,
            category,
        } => {
            let draft = TicketDraft {
                title: Some(title),
                description,
                priority,
                category_id: category,
            };
            print_json(&store.create_ticket(&draft).await?)?;
        }
        TicketCommand::Update {
            id,
            title,
            description,
            priority,
            category,
        } => {
            let draft = TicketDraft {
                title,
                description,
                priority,
                category_id: category,
            };
            print_json(&store.update_ticket(id, &draft).await?)?;
        }
        TicketCommand::Delete { id } => {
            store.delete_ticket(id).await?;
            println!("Deleted ticket #{id}");
        }
        TicketCommand::Status { id, status } => {
            store.change_status(id, &status).await?;
            println!("Ticket #{id} is now {status}");
        }
        TicketCommand::Assign { id, user_id } => {
            store.assign(id, user_id).await?;
            println!("Ticket #{id} assigned to user #{user_id}");
        }
        TicketCommand::Unassign { id } => {
            store.unassign(id).await?;
            println!("Ticket #{id} unassigned");
        }
        TicketCommand::Close { id } => {
            store.close(id).await?;
            println!("Ticket #{id} closed");
        }
        TicketCommand::Resolve { id } => {
            store.resolve(id).await?;
            println!("Ticket #{id} resolved");
        }
        TicketCommand::Comments { id } => {
            for comment in store.fetch_comments(id).await? {
                let author = comment
                    .user
                    .as_ref()
                    .map_or("unknown", |user| user.name.as_str());
                println!("[{}] {author}: {}", comment.id, comment.content);
            }
        }
        TicketCommand::Comment { id, content } => {
            print_json(&store.add_comment(id, &content).await?)?;
        }
        TicketCommand::Attach { id, file, mime } => {
            let bytes =
                fs::read(&file).with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file.file_name().map_or_else(
                || "attachment".to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            let attachment = Attachment {
                file_name,
                mime,
                bytes,
            };
            print_json(&store.upload_attachment(id, attachment).await?)?;
        }
        TicketCommand::Time { id } => {
            store.fetch_time_tracking(id).await;
            let state = store.snapshot();
            check_error(state.error)?;
            if let Some(tracking) = state.time_tracking {
                print_json(&tracking)?;
            }
        }
        TicketCommand::Start { id } => print_json(&store.start_time_tracking(id).await?)?,
        TicketCommand::Stop { id } => print_json(&store.stop_time_tracking(id).await?)?,
    }

    connection.save()
}

fn print_ticket_line(ticket: &Ticket) {
    println!(
        "#{:<6} {:<12} {}",
        ticket.id,
        ticket.status.as_deref().unwrap_or("-"),
        ticket.title
    );
}
