// ABOUTME: CLI commands for browsing and working on defects
// ABOUTME: List with filters, detail view, create form, report tabs, lifecycle actions and photos

use clap::{Subcommand, ValueEnum};
use colored::*;
use inquire::{Confirm, Select, Text};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};

use defects_client::screens::{
    ActionOutcome, DefectDetailScreen, DefectFormScreen, DefectListScreen, PhotoKind,
};
use defects_core::dates::{format_date, format_date_time, format_relative};
use defects_core::debounce::{SearchDebouncer, SEARCH_DEBOUNCE};
use defects_core::permissions::can_edit_tab;
use defects_core::{
    ActionInput, AssigneeFilter, BuildingFilter, CommentField, DefectAction, DefectStatus, Id,
    Priority, SortConfig, SortDirection, SortKey, StatusFilter,
};
use defects_media::{ImageUpload, PhotoRef};

use super::utils::{
    cancelled, or_empty, priority_colored, status_colored, success, table, truncate, CliResult,
};
use super::Context;

#[derive(Subcommand)]
pub enum DefectsCommands {
    /// List defects with optional filters
    List {
        /// Only this building
        #[arg(short, long)]
        building: Option<Id>,
        /// Only this status
        #[arg(short, long)]
        status: Option<DefectStatus>,
        /// Only defects assigned to this technician
        #[arg(short, long, conflicts_with = "unassigned")]
        technician: Option<Id>,
        /// Only defects nobody is assigned to
        #[arg(long)]
        unassigned: bool,
        /// Match title, building name or id
        #[arg(short = 'q', long)]
        search: Option<String>,
        /// id, title, building, status, assignee, created or updated
        #[arg(long)]
        sort: Option<SortKey>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Page to show
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Print the filtered rows as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a defect with its reports and available actions
    Show {
        id: Id,
    },
    /// File a new defect
    Create {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        building: Option<Id>,
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Initial report text
        #[arg(long)]
        report: Option<String>,
        /// Photo to attach
        #[arg(long)]
        photo: Option<PathBuf>,
        /// External contractor name
        #[arg(long)]
        contractor: Option<String>,
    },
    /// Write one report tab
    Comment {
        id: Id,
        /// initial_report, executive_decision, technician_report, verification_report or final_completion
        field: CommentField,
        /// Report text; prompted when omitted
        text: Option<String>,
    },
    /// Run a lifecycle action: review, assign, ongoing, done, complete, reopen or delete
    Action {
        id: Id,
        action: DefectAction,
        /// Technician to assign
        #[arg(long)]
        technician: Option<Id>,
        /// Completed job photo
        #[arg(long)]
        photo: Option<PathBuf>,
        #[arg(long)]
        executive_decision: Option<String>,
        #[arg(long)]
        technician_report: Option<String>,
        #[arg(long)]
        verification_report: Option<String>,
        #[arg(long)]
        final_completion: Option<String>,
        /// Mark the work as handled by an external contractor
        #[arg(long)]
        external: bool,
        #[arg(long)]
        contractor: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Change status, priority or contractor fields directly
    Set {
        id: Id,
        #[arg(long)]
        status: Option<DefectStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        external: Option<bool>,
        #[arg(long)]
        contractor: Option<String>,
    },
    /// Replace, delete or save a defect photo
    Photo {
        id: Id,
        #[arg(value_enum)]
        kind: PhotoArg,
        /// Image file to upload
        #[arg(long, conflicts_with_all = ["delete", "save"])]
        file: Option<PathBuf>,
        /// Remove the photo
        #[arg(long)]
        delete: bool,
        /// Write the stored image to this path
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Delete a defect
    Delete {
        id: Id,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Filter the list as you type; one search per line, Ctrl-D to stop
    WatchSearch,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PhotoArg {
    Initial,
    Technician,
}

impl From<PhotoArg> for PhotoKind {
    fn from(arg: PhotoArg) -> Self {
        match arg {
            PhotoArg::Initial => PhotoKind::Initial,
            PhotoArg::Technician => PhotoKind::Technician,
        }
    }
}

pub async fn handle_defects_command(command: DefectsCommands, ctx: &Context) -> CliResult {
    match command {
        DefectsCommands::List {
            building,
            status,
            technician,
            unassigned,
            search,
            sort,
            desc,
            page,
            json,
        } => {
            let mut screen = DefectListScreen::load(&ctx.client, ctx.config.page_size).await?;
            let state = screen.state_mut();
            if let Some(id) = building {
                state.set_building(BuildingFilter::Only(id));
            }
            if let Some(status) = status {
                state.set_status(StatusFilter::Only(status));
            }
            if unassigned {
                state.set_assignee(AssigneeFilter::Unassigned);
            } else if let Some(id) = technician {
                state.set_assignee(AssigneeFilter::Technician(id));
            }
            if let Some(search) = search {
                state.set_search(search);
            }
            if let Some(key) = sort {
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                state.set_sort(SortConfig::new(key, direction));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&screen.visible())?);
                return Ok(());
            }

            screen.page();
            screen.state_mut().page_mut().goto(page);
            print_page(&mut screen);
            Ok(())
        }
        DefectsCommands::Show { id } => show_defect(ctx, id).await,
        DefectsCommands::Create {
            title,
            description,
            building,
            priority,
            report,
            photo,
            contractor,
        } => create_defect(ctx, title, description, building, priority, report, photo, contractor).await,
        DefectsCommands::Comment { id, field, text } => comment(ctx, id, field, text).await,
        DefectsCommands::Action {
            id,
            action,
            technician,
            photo,
            executive_decision,
            technician_report,
            verification_report,
            final_completion,
            external,
            contractor,
            yes,
        } => {
            let reports = [
                (CommentField::ExecutiveDecision, executive_decision),
                (CommentField::TechnicianReport, technician_report),
                (CommentField::VerificationReport, verification_report),
                (CommentField::FinalCompletion, final_completion),
            ]
            .into_iter()
            .filter_map(|(field, text)| text.map(|text| (field, text)))
            .collect();

            let input = ActionInput {
                technician_photo: None,
                technician_id: technician,
                reports,
                external_contractor: external.then_some(true),
                contractor_name: contractor,
            };
            run_action(ctx, id, action, input, photo, yes).await
        }
        DefectsCommands::Set {
            id,
            status,
            priority,
            external,
            contractor,
        } => set_attributes(ctx, id, status, priority, external, contractor).await,
        DefectsCommands::Photo {
            id,
            kind,
            file,
            delete,
            save,
        } => photo(ctx, id, kind.into(), file, delete, save).await,
        DefectsCommands::Delete { id, yes } => {
            run_action(ctx, id, DefectAction::Delete, ActionInput::default(), None, yes).await
        }
        DefectsCommands::WatchSearch => watch_search(ctx).await,
    }
}

fn print_page(screen: &mut DefectListScreen) {
    let page = screen.page();
    if page.rows.is_empty() {
        println!("{}", "No defects match".yellow());
        if screen.state().filter().is_active() {
            println!("{}", "Try clearing the filters".dimmed());
        }
        return;
    }

    let mut table = table(vec![
        "ID", "Title", "Building", "Status", "Priority", "Assignee", "Updated",
    ]);
    for defect in &page.rows {
        table.add_row(vec![
            defect.id.to_string(),
            truncate(&defect.title, 30),
            or_empty(screen.building_name(defect.building_id)),
            status_colored(defect.status).to_string(),
            priority_colored(defect.priority).to_string(),
            match defect.assigned_technician_id {
                Some(id) => screen
                    .technician_name(Some(id))
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", id)),
                None => "Unassigned".dimmed().to_string(),
            },
            format_relative(defect.updated_at.as_deref()),
        ]);
    }

    println!("{}", table);
    println!(
        "Page {} of {} ({} defects)",
        page.meta.page.to_string().cyan(),
        page.meta.total_pages,
        page.meta.total_items.to_string().cyan()
    );
}

async fn show_defect(ctx: &Context, id: Id) -> CliResult {
    let screen = DefectDetailScreen::load(&ctx.client, id, ctx.config.policy()).await?;
    print_defect_details(&screen);
    Ok(())
}

fn print_defect_details(screen: &DefectDetailScreen) {
    let defect = &screen.defect;
    println!("{}", format!("Defect #{} - {}", defect.id, defect.title).blue().bold());
    println!();

    println!("{:<15} {}", "Status:".cyan(), status_colored(defect.status));
    println!("{:<15} {}", "Priority:".cyan(), priority_colored(defect.priority));
    println!(
        "{:<15} {}",
        "Building:".cyan(),
        or_empty(screen.building.as_ref().map(|b| b.name.as_str()))
    );
    if let Some(address) = screen.building.as_ref().and_then(|b| b.address.as_deref()) {
        println!("{:<15} {}", "Address:".cyan(), address);
    }
    println!(
        "{:<15} {}",
        "Assigned to:".cyan(),
        screen
            .assignee
            .as_ref()
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string())
    );
    if defect.external_contractor {
        println!(
            "{:<15} {}",
            "Contractor:".cyan(),
            or_empty(defect.contractor_name.as_deref())
        );
    }
    if let Some(description) = defect.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("{:<15} {}", "Description:".cyan(), description);
    }
    println!("{:<15} {}", "Created:".cyan(), format_date_time(defect.created_at.as_deref()));
    println!("{:<15} {}", "Updated:".cyan(), format_date_time(defect.updated_at.as_deref()));
    if defect.done_at.is_some() {
        println!("{:<15} {}", "Done:".cyan(), format_date(defect.done_at.as_deref()));
    }
    if defect.completed_at.is_some() {
        println!("{:<15} {}", "Completed:".cyan(), format_date(defect.completed_at.as_deref()));
    }

    for (label, value) in [
        ("Initial photo:", defect.initial_photo()),
        ("Job photo:", defect.technician_photo()),
    ] {
        if let Some(value) = value {
            let described = PhotoRef::parse(value)
                .map(|photo| photo.describe())
                .unwrap_or_else(|_| "unreadable".to_string());
            println!("{:<15} {}", label.cyan(), described);
        }
    }

    println!();
    println!("{}", "Reports".blue().bold());
    for field in CommentField::ALL {
        let marker = if can_edit_tab(screen.user().role, field) {
            "✎".green()
        } else {
            " ".normal()
        };
        println!(
            "{} {:<20} {}",
            marker,
            field.label(),
            or_empty(screen.comments.get(field))
        );
    }

    let actions = screen.available_actions();
    if !actions.is_empty() {
        println!();
        let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
        println!("{:<15} {}", "Actions:".cyan(), names.join(", "));
    }
}

#[allow(clippy::too_many_arguments)]
async fn create_defect(
    ctx: &Context,
    title: Option<String>,
    description: Option<String>,
    building: Option<Id>,
    priority: Option<Priority>,
    report: Option<String>,
    photo: Option<PathBuf>,
    contractor: Option<String>,
) -> CliResult {
    let screen = DefectFormScreen::load(&ctx.client).await?;
    if let Some(message) = &screen.load_error {
        eprintln!("{}", message.yellow());
    }

    println!("{}", "Report New Defect".blue().bold());
    println!();

    let mut form = DefectFormScreen::blank();
    form.title = match title {
        Some(title) => title,
        None => Text::new("Title:").prompt()?,
    };
    form.description = match description {
        Some(description) => description,
        None => Text::new("Description:").prompt()?,
    };
    form.building_id = match building {
        Some(id) => Some(id),
        None if screen.buildings.is_empty() => None,
        None => {
            let names: Vec<String> = screen.buildings.iter().map(|b| b.name.clone()).collect();
            let choice = Select::new("Building:", names).raw_prompt()?;
            Some(screen.buildings[choice.index].id)
        }
    };
    if let Some(priority) = priority {
        form.priority = Some(priority);
    }
    form.initial_report = report;
    if let Some(name) = contractor {
        form.set_external_contractor(true);
        form.contractor_name = Some(name);
    }
    if let Some(path) = photo {
        let upload = ImageUpload::read(&path).await?;
        form = DefectFormScreen::attach_photo(form, &upload)?;
    }

    let defect = screen.submit(form).await?;
    success(format!("Defect '{}' created", defect.title));
    println!("ID: {}", defect.id.to_string().cyan());
    Ok(())
}

async fn comment(ctx: &Context, id: Id, field: CommentField, text: Option<String>) -> CliResult {
    let mut screen = DefectDetailScreen::load(&ctx.client, id, ctx.config.policy()).await?;
    let text = match text {
        Some(text) => text,
        None => Text::new(&format!("{}:", field.label()))
            .with_default(screen.comments.get(field).unwrap_or(""))
            .prompt()?,
    };

    screen.save_comment(field, &text).await?;
    success(format!("{} saved", field.label()));
    Ok(())
}

async fn run_action(
    ctx: &Context,
    id: Id,
    action: DefectAction,
    mut input: ActionInput,
    photo: Option<PathBuf>,
    yes: bool,
) -> CliResult {
    let mut screen = DefectDetailScreen::load(&ctx.client, id, ctx.config.policy()).await?;

    if let Some(path) = photo {
        let upload = ImageUpload::read(&path).await?;
        screen.stage_technician_photo(&upload)?;
    }

    if action == DefectAction::Assign && input.technician_id.is_none() && !screen.technicians.is_empty() {
        let names: Vec<String> = screen
            .technicians
            .iter()
            .map(|t| format!("{} <{}>", t.name, t.email))
            .collect();
        let choice = Select::new("Technician:", names).raw_prompt()?;
        input.technician_id = Some(screen.technicians[choice.index].id);
    }

    if action == DefectAction::Delete && !yes {
        let confirmed = Confirm::new(&format!(
            "Are you sure you want to delete '{}'?",
            screen.defect.title
        ))
        .with_default(false)
        .prompt()?;
        if !confirmed {
            cancelled();
            return Ok(());
        }
    }

    match screen.perform(action, input).await? {
        ActionOutcome::Updated => {
            success(format!(
                "Defect #{} {} (now {})",
                id,
                action.past_tense(),
                status_colored(screen.defect.status)
            ));
        }
        ActionOutcome::Unchanged => {
            println!("{}", "Nothing to change".yellow());
        }
        ActionOutcome::Deleted => success(format!("Defect #{} deleted", id)),
    }
    Ok(())
}

async fn set_attributes(
    ctx: &Context,
    id: Id,
    status: Option<DefectStatus>,
    priority: Option<Priority>,
    external: Option<bool>,
    contractor: Option<String>,
) -> CliResult {
    if status.is_none() && priority.is_none() && external.is_none() && contractor.is_none() {
        return Err("Nothing to set. Pass --status, --priority, --external or --contractor".into());
    }

    let mut screen = DefectDetailScreen::load(&ctx.client, id, ctx.config.policy()).await?;
    if let Some(status) = status {
        screen.set_status(status).await?;
        success(format!("Status set to {}", status_colored(status)));
    }
    if let Some(priority) = priority {
        screen.set_priority(priority).await?;
        success(format!("Priority set to {}", priority_colored(priority)));
    }
    if let Some(enabled) = external {
        screen.set_external_contractor(enabled).await?;
        success(format!("External contractor {}", if enabled { "on" } else { "off" }));
    }
    if let Some(name) = contractor {
        if screen.save_contractor_name(&name).await? {
            success("Contractor name saved");
        } else {
            println!("{}", "Contractor name unchanged".yellow());
        }
    }
    Ok(())
}

async fn photo(
    ctx: &Context,
    id: Id,
    kind: PhotoKind,
    file: Option<PathBuf>,
    delete: bool,
    save: Option<PathBuf>,
) -> CliResult {
    let mut screen = DefectDetailScreen::load(&ctx.client, id, ctx.config.policy()).await?;

    if let Some(path) = file {
        let upload = ImageUpload::read(&path).await?;
        screen.replace_photo(kind, &upload).await?;
        success(format!("Replaced {}", kind.label()));
        return Ok(());
    }

    let current = match kind {
        PhotoKind::Initial => screen.defect.initial_photo(),
        PhotoKind::Technician => screen.defect.technician_photo(),
    }
    .map(str::to_string);

    let Some(current) = current else {
        println!("{}", format!("No {} on defect #{}", kind.label(), id).yellow());
        return Ok(());
    };

    if delete {
        let confirmed = Confirm::new(&format!("Delete the {}?", kind.label()))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            cancelled();
            return Ok(());
        }
        screen.delete_photo(kind).await?;
        success(format!("Deleted {}", kind.label()));
        return Ok(());
    }

    let photo = PhotoRef::parse(&current)?;
    match save {
        Some(path) => save_photo(&photo, &path).await?,
        None => {
            println!("{:<15} {}", "Photo:".cyan(), photo.describe());
            if let Ok(Some((width, height))) = photo.dimensions() {
                println!("{:<15} {}x{}", "Size:".cyan(), width, height);
            }
        }
    }
    Ok(())
}

async fn save_photo(photo: &PhotoRef, path: &Path) -> CliResult {
    let Some(bytes) = photo.bytes() else {
        return Err(format!("Photo is stored as a link: {}", photo.describe()).into());
    };
    let path = if path.extension().is_none() {
        path.with_extension(photo.extension())
    } else {
        path.to_path_buf()
    };
    tokio::fs::write(&path, bytes).await?;
    success(format!("Saved {}", path.display()));
    Ok(())
}

async fn watch_search(ctx: &Context) -> CliResult {
    let mut screen = DefectListScreen::load(&ctx.client, ctx.config.page_size).await?;
    println!(
        "{}",
        "Type a search and press Enter. Results update once typing settles. Ctrl-D to stop.".dimmed()
    );
    print_page(&mut screen);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut debouncer = SearchDebouncer::default();

    loop {
        let wait = debouncer.remaining(Instant::now());
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(text) => debouncer.input(text, Instant::now()),
                None => break,
            },
            _ = tokio::time::sleep(wait.unwrap_or(Duration::from_secs(3600))), if wait.is_some() => {
                if let Some(search) = debouncer.poll(Instant::now()) {
                    apply_search(&mut screen, search);
                }
            }
        }
    }

    // input closed while a search was still settling
    if let Some(search) = debouncer.poll(Instant::now() + SEARCH_DEBOUNCE) {
        apply_search(&mut screen, search);
    }
    Ok(())
}

fn apply_search(screen: &mut DefectListScreen, search: String) {
    println!();
    println!("{} {}", "Search:".cyan(), if search.is_empty() { "(all)" } else { search.as_str() });
    screen.state_mut().set_search(search);
    print_page(screen);
}
