use colored::*;

use defects_client::screens::DashboardScreen;
use defects_core::dates::format_relative;

use super::utils::{status_colored, table, truncate, CliResult};
use super::Context;

pub async fn show_dashboard(ctx: &Context) -> CliResult {
    let screen = DashboardScreen::load(&ctx.client).await?;
    let stats = &screen.stats;

    println!("{}", format!("Welcome back, {}", screen.user.name).blue().bold());
    println!();

    let mut cards = table(vec!["Total", "Open", "Ongoing", "Completed"]);
    cards.add_row(vec![
        stats.total.to_string(),
        stats.open.to_string(),
        stats.ongoing.to_string(),
        stats.completed.to_string(),
    ]);
    println!("{}", cards);

    if stats.recent.is_empty() {
        println!("{}", "No recent activity".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", "Recent defects".blue().bold());
    let mut recent = table(vec!["ID", "Title", "Status", "Updated"]);
    for defect in &stats.recent {
        recent.add_row(vec![
            defect.id.to_string(),
            truncate(&defect.title, 40),
            status_colored(defect.status).to_string(),
            format_relative(defect.updated_at.as_deref()),
        ]);
    }
    println!("{}", recent);
    Ok(())
}
