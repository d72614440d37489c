//! MediCare HMS
//!
//! Command line front-end for the hospital management pages.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::error;

use medicare_hms::config::{self, BackendKind};
use medicare_hms::feedback::Notice;
use medicare_hms::models::{ComplaintStatus, InventoryPatch, OpenEnum};
use medicare_hms::pages::{
    ComplaintDesk, ComplaintForm, Dashboard, LaundryDesk, LaundryForm, PharmacyDesk,
    PrescriptionForm, TriageBoard, TriageForm,
};
use medicare_hms::{console, telemetry, HmsContext, HmsError};

#[derive(Parser)]
#[command(name = "hms", about = "MediCare hospital management system")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Overrides `backend.kind` from the configuration.
    #[arg(long, value_enum)]
    backend: Option<Backend>,
    /// JSON fixture to seed the in-memory store with.
    #[arg(long)]
    fixture: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Hosted,
    Memory,
}

#[derive(Subcommand)]
enum Commands {
    /// Module cards with live statistics
    Dashboard,
    #[command(subcommand)]
    Triage(TriageCommand),
    #[command(subcommand)]
    Pharmacy(PharmacyCommand),
    #[command(subcommand)]
    Complaints(ComplaintsCommand),
    #[command(subcommand)]
    Laundry(LaundryCommand),
}

#[derive(Subcommand)]
enum TriageCommand {
    Queue,
    /// Admit a patient from a JSON form
    Admit { form: PathBuf },
    /// Move a case to its next status
    Advance { id: String },
}

#[derive(Subcommand)]
enum PharmacyCommand {
    Prescriptions,
    Prescribe { form: PathBuf },
    Dispense { id: String },
    Billing,
    LowStock,
    Inventory,
    /// Adjust stock for an inventory item
    Restock {
        id: String,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        reorder_level: Option<i64>,
    },
}

#[derive(Subcommand)]
enum ComplaintsCommand {
    List,
    Submit { form: PathBuf },
    Analytics,
    /// Set a ticket's status
    Status {
        id: String,
        #[arg(value_parser = parse_complaint_status)]
        status: ComplaintStatus,
    },
}

#[derive(Subcommand)]
enum LaundryCommand {
    Requests,
    Request { form: PathBuf },
    Advance { id: String },
    Overview,
}

fn parse_complaint_status(raw: &str) -> Result<ComplaintStatus, String> {
    let status = ComplaintStatus::from(raw.to_string());
    if !status.is_known() {
        return Err(format!(
            "unknown status {}; expected one of {}",
            raw,
            ComplaintStatus::KNOWN.join(", ")
        ));
    }
    Ok(status)
}

async fn read_form<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read form {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse form {}", path.display()))
}

/// Prints the notice and turns a failure into a non-zero exit.
fn report<T>(
    result: Result<T, HmsError>,
    notice: impl FnOnce(&T) -> Notice,
    failed: impl FnOnce(&HmsError) -> Notice,
) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", notice(&value));
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", failed(&e));
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut settings = config::load_config().context("Failed to load configuration")?;
    if let Some(backend) = cli.backend {
        settings.backend.kind = match backend {
            Backend::Hosted => BackendKind::Hosted,
            Backend::Memory => BackendKind::Memory,
        };
    }
    if cli.fixture.is_some() {
        settings.backend.fixture = cli.fixture;
    }

    telemetry::init(&settings.logging).context("Failed to initialise logging")?;

    let ctx = HmsContext::connect(settings).context("Failed to connect to the entity store")?;

    match cli.command {
        Commands::Dashboard => {
            let view = Dashboard::new(ctx).load().await?;
            print!("{}", console::dashboard(&view));
        }
        Commands::Triage(cmd) => {
            let board = TriageBoard::new(ctx);
            match cmd {
                TriageCommand::Queue => {
                    print!("{}", console::triage_queue(&board.queue().await?))
                }
                TriageCommand::Admit { form } => {
                    let form: TriageForm = read_form(&form).await?;
                    report(
                        board.admit(form).await,
                        |case| {
                            let detail = format!("{} ({})", case.patient_name, case.id);
                            Notice::info("Patient Admitted", detail)
                        },
                        |e| Notice::failure("Admission Failed", e),
                    )?;
                }
                TriageCommand::Advance { id } => {
                    report(
                        board.advance_by_id(&id).await,
                        |case| {
                            let detail = format!("{} is now {}", case.id, case.status.as_str());
                            Notice::info("Status Updated", detail)
                        },
                        |e| Notice::failure("Update Failed", e),
                    )?;
                }
            }
        }
        Commands::Pharmacy(cmd) => {
            let desk = PharmacyDesk::new(ctx);
            match cmd {
                PharmacyCommand::Prescriptions => {
                    print!("{}", console::prescriptions(&desk.prescriptions().await?))
                }
                PharmacyCommand::Prescribe { form } => {
                    let form: PrescriptionForm = read_form(&form).await?;
                    report(
                        desk.prescribe(form).await,
                        |rx| {
                            let detail = format!("{} for {}", rx.id, rx.patient_name);
                            Notice::info("Prescription Created", detail)
                        },
                        |e| Notice::failure("Prescription Failed", e),
                    )?;
                }
                PharmacyCommand::Dispense { id } => {
                    report(
                        desk.dispense_by_id(&id).await,
                        Notice::dispensed,
                        Notice::dispense_failed,
                    )?;
                }
                PharmacyCommand::Billing => print!("{}", console::billing(&desk.billing().await?)),
                PharmacyCommand::LowStock => {
                    print!("{}", console::inventory(&desk.low_stock().await?))
                }
                PharmacyCommand::Inventory => {
                    print!("{}", console::inventory(&desk.inventory().await?))
                }
                PharmacyCommand::Restock {
                    id,
                    quantity,
                    reorder_level,
                } => {
                    let patch = InventoryPatch {
                        quantity,
                        reorder_level,
                        unit_price: None,
                    };
                    report(
                        desk.update_inventory(&id, patch).await,
                        |item| {
                            let detail = format!("{} now at {}", item.item_name, item.quantity);
                            Notice::info("Inventory Updated", detail)
                        },
                        |e| Notice::failure("Update Failed", e),
                    )?;
                }
            }
        }
        Commands::Complaints(cmd) => {
            let desk = ComplaintDesk::new(ctx);
            match cmd {
                ComplaintsCommand::List => {
                    for ticket in desk.tickets().await? {
                        println!(
                            "{:<18} {:<20} {:<14} {:<8} {}",
                            ticket.ticket_id,
                            ticket.complainant_name,
                            ticket.category.as_str(),
                            ticket.priority.as_str(),
                            ticket.status.as_str()
                        );
                    }
                }
                ComplaintsCommand::Submit { form } => {
                    let form: ComplaintForm = read_form(&form).await?;
                    report(
                        desk.submit(form).await,
                        Notice::complaint_submitted,
                        Notice::submission_failed,
                    )?;
                }
                ComplaintsCommand::Analytics => {
                    print!("{}", console::complaint_analytics(&desk.analytics().await?))
                }
                ComplaintsCommand::Status { id, status } => {
                    report(
                        desk.update_status(&id, status).await,
                        |t| {
                            let detail = format!("{} is now {}", t.ticket_id, t.status.as_str());
                            Notice::info("Ticket Updated", detail)
                        },
                        |e| Notice::failure("Update Failed", e),
                    )?;
                }
            }
        }
        Commands::Laundry(cmd) => {
            let desk = LaundryDesk::new(ctx);
            match cmd {
                LaundryCommand::Requests => {
                    print!("{}", console::laundry_requests(&desk.requests().await?))
                }
                LaundryCommand::Request { form } => {
                    let form: LaundryForm = read_form(&form).await?;
                    report(
                        desk.request(form).await,
                        |r| {
                            let detail = format!("{} items for {}", r.total_items, r.department);
                            Notice::info("Request Created", detail)
                        },
                        |e| Notice::failure("Request Failed", e),
                    )?;
                }
                LaundryCommand::Advance { id } => {
                    report(
                        desk.advance_by_id(&id).await,
                        |r| {
                            let detail = format!("{} is now {}", r.id, r.status.as_str());
                            Notice::info("Status Updated", detail)
                        },
                        |e| Notice::failure("Update Failed", e),
                    )?;
                }
                LaundryCommand::Overview => {
                    print!("{}", console::laundry_overview(&desk.overview().await?))
                }
            }
        }
    }

    Ok(())
}
