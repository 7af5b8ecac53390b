use anyhow::Result;
use clap::Subcommand;
use client::Route;
use shared::models::{CategoryDraft, ResourceId};

use super::{Connection, check_error, print_json};

/// Category subcommands.
#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List categories
    List,
    /// Create a category
    Create {
        name: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Rename or describe a category
    Update {
        id: ResourceId,
        name: String,
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Delete a category
    Delete { id: ResourceId },
}

pub async fn run(connection: &Connection, command: CategoryCommand) -> Result<()> {
    let target = match command {
        CategoryCommand::List => Route::Dashboard,
        _ => Route::Admin,
    };
    connection.enter(target).await?;

    let store = connection.helpdesk().categories();
    match command {
        CategoryCommand::List => {
            store.fetch_categories().await;
            let state = store.snapshot();
            check_error(state.error)?;
            for category in &state.categories {
                match &category.description {
                    Some(description) => {
                        println!("#{:<4} {} ({description})", category.id, category.name);
                    }
                    None => println!("#{:<4} {}", category.id, category.name),
                }
            }
        }
        CategoryCommand::Create { name, description } => {
            let draft = CategoryDraft { name, description };
            print_json(&store.create_category(&draft).await?)?;
        }
        CategoryCommand::Update {
            id,
            name,
            description,
        } => {
            let draft = CategoryDraft { name, description };
            print_json(&store.update_category(id, &draft).await?)?;
        }
        CategoryCommand::Delete { id } => {
            store.delete_category(id).await?;
            println!("Deleted category #{id}");
        }
    }

    connection.save()
}
