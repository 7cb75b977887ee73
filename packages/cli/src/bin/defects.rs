use clap::{Parser, Subcommand};
use colored::*;
use std::process;

mod cli;

use cli::analytics::{handle_analytics_command, AnalyticsCommands};
use cli::auth::{handle_auth_command, AuthCommands};
use cli::buildings::{handle_buildings_command, BuildingsCommands};
use cli::dashboard::show_dashboard;
use cli::defects::{handle_defects_command, DefectsCommands};
use cli::users::{handle_users_command, UsersCommands};
use cli::utils::CliResult;
use cli::Context;
use defects_cli::logging::init_tracing;
use defects_cli::Config;
use defects_client::ApiClient;

#[derive(Parser)]
#[command(name = "defects")]
#[command(about = "Building defect tracker - report, assign and close out facility issues")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up and manage the stored session
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Show the dashboard summary
    Dashboard,
    /// Browse and work on defects
    #[command(subcommand)]
    Defects(DefectsCommands),
    /// Manage buildings
    #[command(subcommand)]
    Buildings(BuildingsCommands),
    /// Manage user accounts
    #[command(subcommand)]
    Users(UsersCommands),
    /// Defect statistics and spreadsheet export
    #[command(subcommand)]
    Analytics(AnalyticsCommands),
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

async fn run(command: Commands) -> CliResult {
    let config = Config::from_env()?;
    let client = ApiClient::connect(config.client_config()?).await?;
    let ctx = Context { client, config };

    match command {
        Commands::Auth(cmd) => handle_auth_command(cmd, &ctx).await,
        Commands::Dashboard => show_dashboard(&ctx).await,
        Commands::Defects(cmd) => handle_defects_command(cmd, &ctx).await,
        Commands::Buildings(cmd) => handle_buildings_command(cmd, &ctx).await,
        Commands::Users(cmd) => handle_users_command(cmd, &ctx).await,
        Commands::Analytics(cmd) => handle_analytics_command(cmd, &ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use defects_core::{CommentField, DefectAction, DefectStatus, SortKey};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "defects", "defects", "list", "--status", "ongoing", "--unassigned", "--sort",
            "updated", "--desc", "-q", "boiler",
        ])
        .unwrap();

        match cli.command {
            Commands::Defects(DefectsCommands::List {
                status,
                unassigned,
                sort,
                desc,
                search,
                page,
                ..
            }) => {
                assert_eq!(status, Some(DefectStatus::Ongoing));
                assert!(unassigned);
                assert_eq!(sort, Some(SortKey::UpdatedAt));
                assert!(desc);
                assert_eq!(search.as_deref(), Some("boiler"));
                assert_eq!(page, 1);
            }
            _ => panic!("expected defects list"),
        }
    }

    #[test]
    fn test_unassigned_conflicts_with_technician() {
        let result = Cli::try_parse_from([
            "defects", "defects", "list", "--unassigned", "--technician", "4",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parses_action_and_comment_arguments() {
        let cli = Cli::try_parse_from(["defects", "defects", "action", "7", "assign", "--technician", "3"])
            .unwrap();
        match cli.command {
            Commands::Defects(DefectsCommands::Action {
                id,
                action,
                technician,
                ..
            }) => {
                assert_eq!(id, 7);
                assert_eq!(action, DefectAction::Assign);
                assert_eq!(technician, Some(3));
            }
            _ => panic!("expected defects action"),
        }

        let cli = Cli::try_parse_from([
            "defects", "defects", "comment", "7", "technician_report", "Replaced valve",
        ])
        .unwrap();
        match cli.command {
            Commands::Defects(DefectsCommands::Comment { field, text, .. }) => {
                assert_eq!(field, CommentField::TechnicianReport);
                assert_eq!(text.as_deref(), Some("Replaced valve"));
            }
            _ => panic!("expected defects comment"),
        }
    }

    #[test]
    fn test_rejects_unknown_action() {
        assert!(Cli::try_parse_from(["defects", "defects", "action", "7", "archive"]).is_err());
    }
}
