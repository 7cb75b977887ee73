// ABOUTME: CLI commands for the buildings page
// ABOUTME: List, add, edit and delete buildings

use clap::Subcommand;
use colored::*;
use inquire::{Confirm, Text};

use defects_client::screens::BuildingsScreen;
use defects_core::dates::format_date;
use defects_core::{BuildingInput, Id};

use super::utils::{cancelled, or_empty, success, table, CliResult};
use super::Context;

#[derive(Subcommand)]
pub enum BuildingsCommands {
    /// List all buildings
    List,
    /// Add a building
    Add {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Edit a building; omitted fields keep their current value
    Edit {
        id: Id,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Delete a building
    Delete {
        id: Id,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle_buildings_command(command: BuildingsCommands, ctx: &Context) -> CliResult {
    let mut screen = BuildingsScreen::load(&ctx.client).await?;

    match command {
        BuildingsCommands::List => {
            if screen.buildings.is_empty() {
                println!("{}", "No buildings yet".yellow());
                println!("Add one with: {}", "defects buildings add".cyan());
                return Ok(());
            }

            let mut table = table(vec!["ID", "Name", "Address", "Created"]);
            for building in &screen.buildings {
                table.add_row(vec![
                    building.id.to_string(),
                    building.name.clone(),
                    or_empty(building.address.as_deref()),
                    format_date(building.created_at.as_deref()),
                ]);
            }
            println!("{}", table);
            println!("{} buildings", screen.buildings.len().to_string().cyan());
            Ok(())
        }
        BuildingsCommands::Add { name, address } => {
            let input = BuildingInput {
                name: match name {
                    Some(name) => name,
                    None => Text::new("Name:").prompt()?,
                },
                address: match address {
                    Some(address) => address,
                    None => Text::new("Address:").prompt()?,
                },
            };
            let building = screen.save(None, input).await?;
            success(format!("Building '{}' added", building.name));
            println!("ID: {}", building.id.to_string().cyan());
            Ok(())
        }
        BuildingsCommands::Edit { id, name, address } => {
            let Some(current) = screen.buildings.iter().find(|b| b.id == id).cloned() else {
                return Err(format!("Building {} not found", id).into());
            };

            let interactive = name.is_none() && address.is_none();
            let input = if interactive {
                BuildingInput {
                    name: Text::new("Name:").with_default(&current.name).prompt()?,
                    address: Text::new("Address:")
                        .with_default(current.address.as_deref().unwrap_or(""))
                        .prompt()?,
                }
            } else {
                BuildingInput {
                    name: name.unwrap_or(current.name),
                    address: address.or(current.address).unwrap_or_default(),
                }
            };

            let building = screen.save(Some(id), input).await?;
            success(format!("Building '{}' updated", building.name));
            Ok(())
        }
        BuildingsCommands::Delete { id, yes } => {
            let name = screen
                .buildings
                .iter()
                .find(|b| b.id == id)
                .map(|b| b.name.clone())
                .unwrap_or_else(|| format!("#{}", id));

            if !yes {
                let confirmed = Confirm::new(&format!(
                    "Are you sure you want to delete building '{}'?",
                    name
                ))
                .with_default(false)
                .prompt()?;
                if !confirmed {
                    cancelled();
                    return Ok(());
                }
            }

            screen.delete(id).await?;
            success(format!("Building '{}' deleted", name));
            Ok(())
        }
    }
}
