use anyhow::Result;
use clap::Subcommand;
use client::Route;

use super::{Connection, check_error};

/// Notification subcommands.
#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    /// List notifications
    List {
        /// Only show unread notifications
        #[arg(long, short)]
        unread: bool,
    },
    /// Mark one notification as read
    Read { id: String },
    /// Mark every notification as read
    ReadAll,
    /// Print the number of unread notifications
    UnreadCount,
}

pub async fn run(connection: &Connection, command: NotificationCommand) -> Result<()> {
    connection.enter(Route::Dashboard).await?;

    let store = connection.helpdesk().notifications();
    match command {
        NotificationCommand::List { unread } => {
            store.fetch_notifications().await;
            let state = store.snapshot();
            check_error(state.error)?;
            for notification in state
                .notifications
                .iter()
                .filter(|notification| !unread || !notification.is_read())
            {
                let marker = if notification.is_read() { ' ' } else { '*' };
                println!(
                    "{marker} {} {} {}",
                    notification.id,
                    notification.kind.as_deref().unwrap_or("-"),
                    notification.data
                );
            }
        }
        NotificationCommand::Read { id } => {
            store.mark_as_read(&id).await?;
            println!("Notification {id} marked as read");
        }
        NotificationCommand::ReadAll => {
            store.mark_all_as_read().await?;
            println!("All notifications marked as read");
        }
        NotificationCommand::UnreadCount => {
            println!("{}", store.fetch_unread_count().await);
        }
    }

    connection.save()
}
