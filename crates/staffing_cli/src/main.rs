//! Command-line front end for event staffing.
//!
//! # Responsibility
//! - Load configuration and start logging.
//! - Show or replace the staff of one event through `AssignmentEditor`.
//!
//! # Invariants
//! - `assign` always submits the full resulting set, never a delta.
//! - `assign` refuses to save when the current assignments failed to load.
//! - Exit code is non-zero whenever the save did not end in `Success`.

use clap::{Parser, Subcommand};
use log::info;
use staffing_core::{
    AssignmentEditor, AssignmentService, BuilderError, EditorError, EditorState, EmployeeDirectory,
    EventId, HttpStaffingClient, LocalStaffingStore, PageRequest, StaffId, StaffingConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "staffing", version, about = "Assign staff to events")]
struct Cli {
    /// TOML configuration file; defaults plus environment overrides when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use a local SQLite store instead of the remote service.
    #[arg(long, global = true)]
    local_db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current staff of an event.
    Show {
        #[arg(long)]
        event: EventId,
    },
    /// Add staff to an event and save the full set.
    Assign {
        #[arg(long)]
        event: EventId,
        /// `<staff-id>` or `<staff-id>:manager`; repeatable.
        #[arg(long = "staff", value_parser = parse_staff, required = true)]
        staff: Vec<StaffArg>,
    },
}

#[derive(Debug, Clone, Copy)]
struct StaffArg {
    id: StaffId,
    manager: bool,
}

fn parse_staff(raw: &str) -> Result<StaffArg, String> {
    let (id, manager) = match raw.split_once(':') {
        Some((id, "manager")) => (id, true),
        Some((_, flag)) => return Err(format!("unknown staff flag `{flag}`, expected `manager`")),
        None => (raw, false),
    };
    let id = id
        .trim()
        .parse::<StaffId>()
        .map_err(|err| format!("invalid staff id `{id}`: {err}"))?;
    Ok(StaffArg { id, manager })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, String> {
    let config = match cli.config.as_deref() {
        Some(path) => StaffingConfig::load(path),
        None => StaffingConfig::from_env(),
    }
    .map_err(|err| err.to_string())?;
    staffing_core::logging::init_from_config(&config.logging)?;
    info!(
        "event=cli_start module=cli status=ok local_db={}",
        cli.local_db.is_some()
    );

    let first_page = config.directory.first_page();
    match cli.local_db.as_deref() {
        Some(path) => {
            let store = Arc::new(LocalStaffingStore::open(path).map_err(|err| err.to_string())?);
            execute(cli.command, Arc::clone(&store), store, first_page).await
        }
        None => {
            let client = Arc::new(HttpStaffingClient::new(&config.service).map_err(|err| err.to_string())?);
            execute(cli.command, Arc::clone(&client), client, first_page).await
        }
    }
}

async fn execute<S, D>(
    command: Command,
    service: Arc<S>,
    directory: Arc<D>,
    first_page: PageRequest,
) -> Result<ExitCode, String>
where
    S: AssignmentService,
    D: EmployeeDirectory,
{
    match command {
        Command::Show { event } => {
            let rows = service
                .fetch_current(event)
                .await
                .map_err(|err| err.to_string())?;
            if rows.is_empty() {
                println!("event {event} has no staff");
            }
            for row in rows {
                let marker = if row.store_manager { " [manager]" } else { "" };
                println!("{} {} <{}>{marker}", row.staff_id, row.full_name, row.email);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Assign { event, staff } => {
            let mut editor = AssignmentEditor::new(event, service, directory, first_page);
            editor.open().await.map_err(|err| err.to_string())?;
            let report = editor.load_report();
            if report.assignments_degraded {
                editor.close();
                return Err(format!(
                    "current assignments of event {event} could not be loaded; refusing to replace them"
                ));
            }

            for arg in &staff {
                match editor.add_candidate(arg.id) {
                    Ok(()) | Err(EditorError::Builder(BuilderError::AlreadyAssigned(_))) => {}
                    Err(err) => return Err(err.to_string()),
                }
                if arg.manager {
                    editor
                        .toggle_manager(arg.id, true)
                        .map_err(|err| err.to_string())?;
                }
            }

            let state = match editor.save().await {
                Ok(state) => state,
                Err(EditorError::Validation(err)) => {
                    eprintln!("not saved: {err}");
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err.to_string()),
            };
            if let Some(notice) = editor.notice() {
                eprintln!("{:?}: {}", notice.kind, notice.message);
            }
            println!(
                "event {event}: {state}, {} staff assigned",
                editor.loaded().len()
            );
            editor.close();
            Ok(if state == EditorState::Success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
