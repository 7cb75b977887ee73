// ABOUTME: CLI commands for signing in and out of the defect service
// ABOUTME: Login with email and password, self-service signup, logout and whoami

use clap::Subcommand;
use colored::*;
use inquire::{Password, PasswordDisplayMode, Select, Text};

use defects_client::screens::SessionGate;
use defects_core::{Role, SignupInput, User};

use super::utils::{success, CliResult};
use super::Context;

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    Signup {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// csr, building_executive, technician or admin
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user and the pages they can open
    Whoami,
}

pub async fn handle_auth_command(command: AuthCommands, ctx: &Context) -> CliResult {
    match command {
        AuthCommands::Login { email } => login(ctx, email).await,
        AuthCommands::Signup { name, email, role } => signup(ctx, name, email, role).await,
        AuthCommands::Logout => logout(ctx).await,
        AuthCommands::Whoami => whoami(ctx).await,
    }
}

fn prompt_password(message: &str) -> Result<String, inquire::InquireError> {
    Password::new(message)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
}

async fn login(ctx: &Context, email: Option<String>) -> CliResult {
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let password = prompt_password("Password:")?;

    let user = ctx.client.login(email.trim(), &password).await?;
    success(format!("Signed in as {} ({})", user.name.bold(), user.role.label()));
    Ok(())
}

async fn signup(
    ctx: &Context,
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
) -> CliResult {
    println!("{}", "Create Account".blue().bold());
    println!();

    let name = match name {
        Some(name) => name,
        None => Text::new("Name:").prompt()?,
    };
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let role = match role {
        Some(role) => role,
        None => Select::new("Role:", Role::ALL.to_vec())
            .with_starting_cursor(0)
            .prompt()?,
    };
    let password = prompt_password("Password:")?;

    let user = ctx
        .client
        .signup(&SignupInput {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password,
            role,
        })
        .await?;

    success(format!("Account created. Signed in as {}", user.email.cyan()));
    Ok(())
}

async fn logout(ctx: &Context) -> CliResult {
    ctx.client.logout().await?;
    success("Signed out");
    Ok(())
}

async fn whoami(ctx: &Context) -> CliResult {
    let gate = SessionGate::new(&ctx.client);
    let user = gate.user().await?;
    print_user(&user);

    let pages: Vec<&str> = gate
        .navigation()
        .await?
        .iter()
        .map(|item| item.label())
        .collect();
    println!("{:<15} {}", "Pages:".cyan(), pages.join(", "));
    println!("{:<15} {}", "Server:".cyan(), ctx.client.base_url());
    Ok(())
}

pub fn print_user(user: &User) {
    println!("{:<15} {}", "ID:".cyan(), user.id);
    println!("{:<15} {}", "Name:".cyan(), user.name);
    println!("{:<15} {}", "Email:".cyan(), user.email);
    println!("{:<15} {}", "Role:".cyan(), user.role.label());
}
