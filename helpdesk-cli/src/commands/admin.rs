use anyhow::Result;
use clap::Subcommand;
use client::Route;
use shared::models::ResourceId;

use super::{Connection, check_error, parse_pairs};

/// Administration subcommands.
#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// List accounts, optionally filtered (e.g. `--filter user_type=technician`)
    Users {
        #[arg(long, short)]
        filter: Vec<String>,
    },
    /// Delete an account
    DeleteUser { id: ResourceId },
    /// List the permissions that can be granted
    Permissions,
    /// Replace the permissions granted to an account
    Grant {
        id: ResourceId,
        /// Permission names, e.g. `tickets.assign`
        #[arg(required = true)]
        permissions: Vec<String>,
    },
}

pub async fn run(connection: &Connection, command: AdminCommand) -> Result<()> {
    connection.enter(Route::Admin).await?;

    let store = connection.helpdesk().admin();
    match command {
        AdminCommand::Users { filter } => {
            store.fetch_users(&parse_pairs(&filter)?).await;
            let state = store.snapshot();
            check_error(state.error)?;
            for user in &state.users {
                let roles = user
                    .roles
                    .iter()
                    .map(|role| role.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "#{:<4} {:<28} {:<14} {roles}",
                    user.id, user.email, user.user_type
                );
            }
        }
        AdminCommand::DeleteUser { id } => {
            store.delete_user(id).await?;
            println!("Deleted user #{id}");
        }
        AdminCommand::Permissions => {
            store.fetch_permissions().await;
            let state = store.snapshot();
            check_error(state.error)?;
            for permission in &state.permissions {
                println!("#{:<4} {}", permission.id, permission.name);
            }
        }
        AdminCommand::Grant { id, permissions } => {
            store.assign_roles_permissions(id, &permissions).await?;
            println!("Granted {} to user #{id}", permissions.join(", "));
        }
    }

    connection.save()
}
