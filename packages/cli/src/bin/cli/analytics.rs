// ABOUTME: CLI commands for the analytics page
// ABOUTME: Status and priority breakdowns, per-building counts and CSV/XLSX export

use clap::Subcommand;
use colored::*;
use std::path::PathBuf;
use tracing::warn;

use defects_client::screens::AnalyticsScreen;
use defects_export::{write_snapshot, ExportFormat};

use super::utils::{priority_colored, status_colored, success, table, CliResult};
use super::Context;

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// Show defect counts by status, priority and building
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download the defect list as a spreadsheet
    Export {
        /// csv or xlsx; guessed from --output when omitted
        #[arg(short, long)]
        format: Option<String>,
        /// Destination file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle_analytics_command(command: AnalyticsCommands, ctx: &Context) -> CliResult {
    let screen = AnalyticsScreen::load(&ctx.client).await?;

    match command {
        AnalyticsCommands::Summary { json } => {
            if json {
                let value = serde_json::json!({
                    "summary": screen.summary,
                    "per_building": screen.per_building,
                    "status_counts": screen.server_status_counts,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
                return Ok(());
            }
            print_summary(&screen);
            Ok(())
        }
        AnalyticsCommands::Export { format, output } => {
            let format = match (&format, &output) {
                (Some(format), _) => format.parse::<ExportFormat>()?,
                (None, Some(path)) => ExportFormat::from_path(path).unwrap_or(ExportFormat::Xlsx),
                (None, None) => ExportFormat::Xlsx,
            };
            let path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name()));

            let buildings = ctx.client.list_buildings().await.unwrap_or_else(|e| {
                warn!("Building names unavailable for export: {}", e);
                Vec::new()
            });
            let users = ctx.client.list_users().await.unwrap_or_else(|e| {
                warn!("User names unavailable for export: {}", e);
                Vec::new()
            });

            let bytes = write_snapshot(&path, format, &screen.defects, &buildings, &users).await?;
            success(format!(
                "Exported {} defects to {} ({} bytes)",
                screen.defects.len(),
                path.display(),
                bytes
            ));
            Ok(())
        }
    }
}

fn print_summary(screen: &AnalyticsScreen) {
    let summary = &screen.summary;

    println!("{}", "Defect Analytics".blue().bold());
    println!();
    println!("{:<20} {}", "Total defects:".cyan(), summary.total);
    println!(
        "{:<20} {}%",
        "Completion rate:".cyan(),
        summary.completion_rate
    );
    println!(
        "{:<20} {}",
        "Filed this month:".cyan(),
        summary.created_this_month
    );
    println!();

    let mut by_status = table(vec!["Status", "Defects"]);
    for (status, count) in &summary.by_status {
        by_status.add_row(vec![status_colored(*status).to_string(), count.to_string()]);
    }
    println!("{}", by_status);

    let mut by_priority = table(vec!["Priority", "Defects"]);
    for (priority, count) in &summary.by_priority {
        by_priority.add_row(vec![priority_colored(*priority).to_string(), count.to_string()]);
    }
    println!("{}", by_priority);

    if !screen.per_building.is_empty() {
        let mut per_building = table(vec!["Building", "Defects"]);
        for row in &screen.per_building {
            per_building.add_row(vec![row.building_name.clone(), row.defect_count.to_string()]);
        }
        println!("{}", per_building);
    }

    // server counts disagreeing with the list usually means stale data
    for row in &screen.server_status_counts {
        let local = summary.count(row.status) as u64;
        if local != row.count {
            warn!(
                "Server reports {} {} defects, list has {}",
                row.count,
                row.status,
                local
            );
        }
    }
}
