// ABOUTME: CLI commands for account management
// ABOUTME: Admin user list, create, edit and delete, plus the technician roster

use clap::Subcommand;
use colored::*;
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};

use defects_client::screens::UsersScreen;
use defects_core::dates::format_date;
use defects_core::{Id, Role, User, UserInput};

use super::utils::{cancelled, success, table, CliResult};
use super::Context;

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List all accounts
    List,
    /// List technicians available for assignment
    Technicians,
    /// Create an account
    Add {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// csr, building_executive, technician or admin
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Edit an account; omitted fields keep their current value
    Edit {
        id: Id,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        role: Option<Role>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    /// Delete an account
    Delete {
        id: Id,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn handle_users_command(command: UsersCommands, ctx: &Context) -> CliResult {
    if let UsersCommands::Technicians = command {
        let technicians = ctx.client.list_technicians().await?;
        print_users(&technicians, "No technicians found");
        return Ok(());
    }

    let mut screen = UsersScreen::load(&ctx.client).await?;

    match command {
        UsersCommands::List => {
            print_users(&screen.users, "No users found");
            Ok(())
        }
        UsersCommands::Add { name, email, role } => {
            let input = UserInput {
                name: match name {
                    Some(name) => name,
                    None => Text::new("Name:").prompt()?,
                },
                email: match email {
                    Some(email) => email,
                    None => Text::new("Email:").prompt()?,
                },
                role: match role {
                    Some(role) => role,
                    None => Select::new("Role:", Role::ALL.to_vec()).prompt()?,
                },
                password: Some(prompt_password()?),
            };

            let user = screen.save(None, input).await?;
            success(format!("User '{}' created ({})", user.name, user.role));
            println!("ID: {}", user.id.to_string().cyan());
            Ok(())
        }
        UsersCommands::Edit {
            id,
            name,
            email,
            role,
            password,
        } => {
            let Some(current) = screen.users.iter().find(|u| u.id == id).cloned() else {
                return Err(format!("User {} not found", id).into());
            };

            let interactive = name.is_none() && email.is_none() && role.is_none() && !password;
            let input = if interactive {
                let start = Role::ALL
                    .iter()
                    .position(|r| *r == current.role)
                    .unwrap_or(0);
                UserInput {
                    name: Text::new("Name:").with_default(&current.name).prompt()?,
                    email: Text::new("Email:").with_default(&current.email).prompt()?,
                    role: Select::new("Role:", Role::ALL.to_vec())
                        .with_starting_cursor(start)
                        .prompt()?,
                    password: None,
                }
            } else {
                UserInput {
                    name: name.unwrap_or(current.name),
                    email: email.unwrap_or(current.email),
                    role: role.unwrap_or(current.role),
                    password: if password { Some(prompt_password()?) } else { None },
                }
            };

            let user = screen.save(Some(id), input).await?;
            success(format!("User '{}' updated", user.name));
            Ok(())
        }
        UsersCommands::Delete { id, yes } => {
            let label = screen
                .users
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.email.clone())
                .unwrap_or_else(|| format!("#{}", id));

            if !yes {
                let confirmed =
                    Confirm::new(&format!("Are you sure you want to delete user '{}'?", label))
                        .with_default(false)
                        .prompt()?;
                if !confirmed {
                    cancelled();
                    return Ok(());
                }
            }

            screen.delete(id).await?;
            success(format!("User '{}' deleted", label));
            Ok(())
        }
        UsersCommands::Technicians => Ok(()),
    }
}

fn prompt_password() -> Result<String, inquire::InquireError> {
    Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
}

fn print_users(users: &[User], empty_message: &str) {
    if users.is_empty() {
        println!("{}", empty_message.yellow());
        return;
    }

    let mut table = table(vec!["ID", "Name", "Email", "Role", "Created"]);
    for user in users {
        table.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.role.label().to_string(),
            format_date(user.created_at.as_deref()),
        ]);
    }
    println!("{}", table);
}
