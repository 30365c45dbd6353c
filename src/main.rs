mod code;
mod config;
mod csv_io;
mod error;
mod refno;
mod storage;
mod types;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use code::CodeGenerator;
use error::CareError;
use std::collections::HashSet;
use std::io::IsTerminal;
use storage::Storage;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use types::{Branch, Equipment, EquipmentMasterEntry, PlanStatus, ShipmentPlan};

#[derive(Parser)]
#[command(name = "care")]
#[command(about = "Shipment plans, equipment codes and reference numbers")]
#[command(
    long_about = "A small back-office tool for shipment plans and their reference data.

Data lives as YAML files in .cargo-care/ (override with CARGO_CARE_DIR).

Key concepts:
  - branch: business branch; its code prefixes reference numbers
  - reference: BRANCH + year + 4-digit sequence, e.g. HO20240007
  - master: equipment types with predefined codes
  - equipment code: derived from the type name, unique within a plan

Workflow:
  1. care init
  2. care branch add HO \"Head Office\"
  3. care plan create --branch HO --carrier Maersk
  4. care equip add HO20240001 \"20ft Standard Container\" --quantity 2
  5. care export --output plans.csv"
)]
#[command(version)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a store in the current directory
    Init,

    /// Manage business branches
    #[command(subcommand)]
    Branch(BranchCommand),

    /// Manage equipment master data (predefined codes)
    #[command(subcommand)]
    Master(MasterCommand),

    /// Preview the code an equipment type name would get
    Code {
        /// Equipment type name, e.g. "20ft Standard Container"
        type_name: String,
        /// Codes to treat as taken (comma-separated)
        #[arg(short, long)]
        existing: Option<String>,
    },

    /// Manage shipment plans
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Manage equipment on a shipment plan
    #[command(subcommand)]
    Equip(EquipCommand),

    /// Export all plans as CSV (one row per equipment line)
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import plans from CSV
    Import {
        /// CSV file produced by export or prepared by hand
        file: String,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// Add a branch
    Add { code: String, name: String },
    /// List branches
    #[command(alias = "ls")]
    List,
    /// Remove a branch
    #[command(alias = "rm")]
    Remove { code: String },
}

#[derive(Subcommand)]
enum MasterCommand {
    /// Add or replace a predefined equipment code
    Add { name: String, code: String },
    /// List master data
    #[command(alias = "ls")]
    List,
    /// Remove an entry by name
    #[command(alias = "rm")]
    Remove { name: String },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Create a plan with the next reference number for a branch
    Create {
        /// Branch code
        #[arg(short, long)]
        branch: String,
        /// Year for the reference (defaults to the current year)
        #[arg(short, long, value_parser = clap::value_parser!(i32).range(1000..=9999))]
        year: Option<i32>,
        #[arg(long)]
        carrier: Option<String>,
        #[arg(long)]
        vessel: Option<String>,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        destination: Option<String>,
    },
    /// List plans
    #[command(alias = "ls")]
    List {
        #[arg(short, long)]
        branch: Option<String>,
        #[arg(short, long)]
        year: Option<i32>,
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show plan details
    Show {
        /// Reference (prefix match)
        reference: String,
    },
    /// Change plan status
    Status {
        /// Reference (prefix match)
        reference: String,
        /// New status: draft, booked, shipped, cancelled
        status: String,
    },
    /// Add a timestamped note to a plan
    Note {
        /// Reference (prefix match)
        reference: String,
        /// Note text
        content: String,
    },
    /// Delete a plan permanently
    Delete {
        /// Reference (prefix match)
        reference: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum EquipCommand {
    /// Add equipment; its code is generated from the type name
    Add {
        /// Reference (prefix match)
        reference: String,
        type_name: String,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Remove equipment by code
    #[command(alias = "rm")]
    Remove {
        /// Reference (prefix match)
        reference: String,
        code: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let storage = Storage::new();

    match cli.command {
        Commands::Init => cmd_init(&storage, cli.json),
        Commands::Branch(cmd) => match cmd {
            BranchCommand::Add { code, name } => cmd_branch_add(&storage, &code, &name, cli.json),
            BranchCommand::List => cmd_branch_list(&storage, cli.json),
            BranchCommand::Remove { code } => cmd_branch_remove(&storage, &code, cli.json),
        },
        Commands::Master(cmd) => match cmd {
            MasterCommand::Add { name, code } => cmd_master_add(&storage, &name, &code, cli.json),
            MasterCommand::List => cmd_master_list(&storage, cli.json),
            MasterCommand::Remove { name } => cmd_master_remove(&storage, &name, cli.json),
        },
        Commands::Code {
            type_name,
            existing,
        } => cmd_code(&storage, &type_name, existing, cli.json),
        Commands::Plan(cmd) => match cmd {
            PlanCommand::Create {
                branch,
                year,
                carrier,
                vessel,
                origin,
                destination,
            } => cmd_plan_create(
                &storage,
                &branch,
                year,
                PlanDetails {
                    carrier,
                    vessel,
                    origin,
                    destination,
                },
                cli.json,
            ),
            PlanCommand::List {
                branch,
                year,
                status,
            } => cmd_plan_list(&storage, branch, year, status, cli.json),
            PlanCommand::Show { reference } => cmd_plan_show(&storage, &reference, cli.json),
            PlanCommand::Status { reference, status } => {
                cmd_plan_status(&storage, &reference, &status, cli.json)
            }
            PlanCommand::Note { reference, content } => {
                cmd_plan_note(&storage, &reference, &content, cli.json)
            }
            PlanCommand::Delete { reference, force } => {
                cmd_plan_delete(&storage, &reference, force, cli.json)
            }
        },
        Commands::Equip(cmd) => match cmd {
            EquipCommand::Add {
                reference,
                type_name,
                quantity,
            } => cmd_equip_add(&storage, &reference, &type_name, quantity, cli.json),
            EquipCommand::Remove { reference, code } => {
                cmd_equip_remove(&storage, &reference, &code, cli.json)
            }
        },
        Commands::Export { output } => cmd_export(&storage, output),
        Commands::Import { file } => cmd_import(&storage, &file, cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .init();
}

fn ensure_init(storage: &Storage) -> Result<()> {
    if !storage.is_initialized() {
        storage.init()?;
        info!("initialized {}", storage.root().display());
    }
    Ok(())
}

fn cmd_init(storage: &Storage, json: bool) -> Result<()> {
    if storage.is_initialized() {
        if json {
            println!(r#"{{"status":"already_initialized"}}"#);
        } else {
            println!("Already initialized.");
        }
        return Ok(());
    }

    storage.init()?;

    if json {
        println!(r#"{{"status":"initialized"}}"#);
    } else {
        println!("Initialized {}", storage.root().display());
    }
    Ok(())
}

fn cmd_branch_add(storage: &Storage, code: &str, name: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let branch = Branch::new(code, name);
    if branch.code.is_empty() || !branch.code.chars().all(|c| c.is_ascii_alphanumeric()) {
        anyhow::bail!("Branch code must be letters and digits only: '{}'", code);
    }

    let mut branches = storage.load_branches()?;
    if branches.iter().any(|b| b.code == branch.code) {
        anyhow::bail!("Branch {} already exists", branch.code);
    }
    branches.push(branch.clone());
    branches.sort_by(|a, b| a.code.cmp(&b.code));
    storage.save_branches(&branches)?;

    if json {
        println!("{}", serde_json::to_string(&branch)?);
    } else {
        println!("Added branch {} - {}", branch.code, branch.name);
    }
    Ok(())
}

fn cmd_branch_list(storage: &Storage, json: bool) -> Result<()> {
    ensure_init(storage)?;
    let branches = storage.load_branches()?;

    if json {
        println!("{}", serde_json::to_string(&branches)?);
    } else if branches.is_empty() {
        println!("No branches found.");
    } else {
        for b in branches {
            println!("{:<6} {}", b.code, b.name);
        }
    }
    Ok(())
}

fn cmd_branch_remove(storage: &Storage, code: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let code = code.trim().to_uppercase();
    let mut branches = storage.load_branches()?;
    let orig_len = branches.len();
    branches.retain(|b| b.code != code);
    if branches.len() == orig_len {
        return Err(CareError::UnknownBranch(code).into());
    }
    storage.save_branches(&branches)?;

    if json {
        println!(r#"{{"removed":"{}"}}"#, code);
    } else {
        println!("Removed branch {}", code);
    }
    Ok(())
}

fn cmd_master_add(storage: &Storage, name: &str, code: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let entry = EquipmentMasterEntry {
        name: name.trim().to_string(),
        code: code.trim().to_uppercase(),
    };
    if entry.name.is_empty() || entry.code.is_empty() {
        anyhow::bail!("Both name and code are required");
    }

    let mut entries = storage.load_master()?;
    entries.retain(|e| !e.name.eq_ignore_ascii_case(&entry.name));
    entries.push(entry.clone());
    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    storage.save_master(&entries)?;

    if json {
        println!("{}", serde_json::to_string(&entry)?);
    } else {
        println!("{} -> {}", entry.name, entry.code);
    }
    Ok(())
}

fn cmd_master_list(storage: &Storage, json: bool) -> Result<()> {
    ensure_init(storage)?;
    let entries = storage.load_master()?;

    if json {
        println!("{}", serde_json::to_string(&entries)?);
    } else if entries.is_empty() {
        println!("No master data.");
    } else {
        for e in entries {
            println!("{:<8} {}", e.code, e.name);
        }
    }
    Ok(())
}

fn cmd_master_remove(storage: &Storage, name: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let mut entries = storage.load_master()?;
    let orig_len = entries.len();
    entries.retain(|e| !e.name.eq_ignore_ascii_case(name.trim()));
    if entries.len() == orig_len {
        anyhow::bail!("No master entry named '{}'", name);
    }
    storage.save_master(&entries)?;

    if json {
        println!(r#"{{"removed":true}}"#);
    } else {
        println!("Removed {}", name.trim());
    }
    Ok(())
}

fn cmd_code(storage: &Storage, type_name: &str, existing: Option<String>, json: bool) -> Result<()> {
    let (config, master) = if storage.is_initialized() {
        (storage.load_config()?, storage.load_master()?)
    } else {
        (config::Config::default(), vec![])
    };

    let existing: HashSet<String> = existing
        .map(|e| {
            e.split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let generated = CodeGenerator::new(config.codes).derive(type_name, &existing, &master);

    if json {
        let mut obj = serde_json::json!({
            "type": type_name,
            "code": generated.as_str(),
            "source": generated.kind(),
        });
        if let code::GeneratedCode::Generated {
            conflict_level,
            suffix,
            ..
        } = &generated
        {
            obj["conflict_level"] = serde_json::json!(conflict_level);
            obj["suffix"] = serde_json::json!(suffix);
        }
        println!("{}", obj);
    } else {
        println!("{}", generated);
    }
    Ok(())
}

/// Free-form plan columns set at creation
struct PlanDetails {
    carrier: Option<String>,
    vessel: Option<String>,
    origin: Option<String>,
    destination: Option<String>,
}

fn cmd_plan_create(
    storage: &Storage,
    branch_code: &str,
    year: Option<i32>,
    details: PlanDetails,
    json: bool,
) -> Result<()> {
    ensure_init(storage)?;
    let config = storage.load_config()?;

    let branch = storage
        .find_branch(branch_code)?
        .ok_or_else(|| CareError::UnknownBranch(branch_code.trim().to_uppercase()))?;
    let year = year.unwrap_or_else(|| Utc::now().year());

    let plan = storage.create_plan(
        &branch.code,
        year,
        config.plans.max_insert_attempts,
        |reference| {
            let mut plan = ShipmentPlan::new(reference, branch.code.clone(), year);
            plan.carrier = details.carrier.clone();
            plan.vessel = details.vessel.clone();
            plan.origin = details.origin.clone();
            plan.destination = details.destination.clone();
            plan
        },
    )?;

    if json {
        println!(
            r#"{{"reference":"{}","branch":"{}"}}"#,
            plan.reference, plan.branch
        );
    } else {
        println!("Created {} ({})", plan.reference, branch.name);
    }
    Ok(())
}

fn cmd_plan_list(
    storage: &Storage,
    branch: Option<String>,
    year: Option<i32>,
    status: Option<String>,
    json: bool,
) -> Result<()> {
    ensure_init(storage)?;

    let plans = storage.load_plans()?;
    let branch = branch.map(|b| b.trim().to_uppercase());
    let status_filter: Option<PlanStatus> = status.map(|s| s.parse()).transpose()?;

    let filtered: Vec<_> = plans
        .iter()
        .filter(|p| branch.as_ref().map_or(true, |b| &p.branch == b))
        .filter(|p| year.map_or(true, |y| p.year == y))
        .filter(|p| status_filter.map_or(true, |s| p.status == s))
        .collect();

    if json {
        let items: Vec<_> = filtered
            .iter()
            .map(|p| {
                serde_json::json!({
                    "reference": p.reference,
                    "branch": p.branch,
                    "status": p.status.to_string(),
                    "carrier": p.carrier,
                    "equipment": p.equipment.len(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&items)?);
    } else if filtered.is_empty() {
        println!("No plans found.");
    } else {
        for p in filtered {
            println!(
                "{} [{}] {} {} ({} units)",
                p.reference,
                p.status,
                p.carrier.as_deref().unwrap_or("-"),
                p.route(),
                p.total_units()
            );
        }
    }
    Ok(())
}

fn find_plan(storage: &Storage, reference: &str) -> Result<ShipmentPlan> {
    storage
        .find_plan(reference)?
        .with_context(|| format!("Plan '{}' not found", reference))
}

fn cmd_plan_show(storage: &Storage, reference: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;
    let plan = find_plan(storage, reference)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Reference:   {}", plan.reference);
    println!("Branch:      {}", plan.branch);
    println!("Status:      {}", plan.status);
    if let Some(ref carrier) = plan.carrier {
        println!("Carrier:     {}", carrier);
    }
    if let Some(ref vessel) = plan.vessel {
        println!("Vessel:      {}", vessel);
    }
    println!("Route:       {}", plan.route());
    println!("Created:     {}", plan.created.format("%Y-%m-%d %H:%M"));
    if let Some(updated) = plan.updated {
        println!("Updated:     {}", updated.format("%Y-%m-%d %H:%M"));
    }
    if !plan.equipment.is_empty() {
        println!("\nEquipment:");
        for e in &plan.equipment {
            println!("  {:<8} x{:<3} {}", e.code, e.quantity, e.type_name);
        }
    }
    if !plan.notes.is_empty() {
        println!("\n{}", plan.notes);
    }
    Ok(())
}

fn cmd_plan_status(storage: &Storage, reference: &str, status_str: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let mut plan = find_plan(storage, reference)?;
    let new_status: PlanStatus = status_str.parse()?;
    plan.status = new_status;
    plan.touch();
    storage.save_plan(&plan)?;

    if json {
        println!(
            r#"{{"reference":"{}","status":"{}"}}"#,
            plan.reference, new_status
        );
    } else {
        println!("{} -> {}", plan.reference, new_status);
    }
    Ok(())
}

fn cmd_plan_note(storage: &Storage, reference: &str, content: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    if content.trim().is_empty() {
        anyhow::bail!("Empty note, aborting");
    }
    let mut plan = find_plan(storage, reference)?;
    plan.add_note(content);
    storage.save_plan(&plan)?;

    if json {
        println!(r#"{{"added":"{}"}}"#, plan.reference);
    } else {
        println!("Added note to {}", plan.reference);
    }
    Ok(())
}

fn cmd_plan_delete(storage: &Storage, reference: &str, force: bool, json: bool) -> Result<()> {
    ensure_init(storage)?;
    let plan = find_plan(storage, reference)?;

    if !force {
        eprintln!("Delete {}? Use --force to confirm.", plan.reference);
        std::process::exit(1);
    }

    storage.delete_plan(&plan.reference)?;

    if json {
        println!(r#"{{"deleted":"{}"}}"#, plan.reference);
    } else {
        println!("Deleted {}", plan.reference);
    }
    Ok(())
}

fn cmd_equip_add(
    storage: &Storage,
    reference: &str,
    type_name: &str,
    quantity: u32,
    json: bool,
) -> Result<()> {
    ensure_init(storage)?;

    let type_name = type_name.trim();
    if type_name.is_empty() {
        anyhow::bail!("Equipment type is required");
    }
    if quantity == 0 {
        anyhow::bail!("Quantity must be at least 1");
    }

    let config = storage.load_config()?;
    let master = storage.load_master()?;
    let mut plan = find_plan(storage, reference)?;

    let taken = plan.equipment_codes();
    let generated = CodeGenerator::new(config.codes).derive(type_name, &taken, &master);
    if taken.contains(generated.as_str()) {
        warn!(
            code = generated.as_str(),
            reference = %plan.reference,
            "generated code is already used on this plan"
        );
    }

    let code = generated.into_code();
    plan.equipment.push(Equipment {
        code: code.clone(),
        type_name: type_name.to_string(),
        quantity,
    });
    plan.touch();
    storage.save_plan(&plan)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "reference": plan.reference, "code": code, "quantity": quantity })
        );
    } else {
        println!("Added {} x{} to {}", code, quantity, plan.reference);
    }
    Ok(())
}

fn cmd_equip_remove(storage: &Storage, reference: &str, code: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let mut plan = find_plan(storage, reference)?;
    let code = code.trim().to_uppercase();
    let orig_len = plan.equipment.len();
    plan.equipment.retain(|e| e.code != code);
    if plan.equipment.len() == orig_len {
        anyhow::bail!("No equipment {} on {}", code, plan.reference);
    }
    plan.touch();
    storage.save_plan(&plan)?;

    if json {
        println!(r#"{{"removed":"{}"}}"#, code);
    } else {
        println!("Removed {} from {}", code, plan.reference);
    }
    Ok(())
}

fn cmd_export(storage: &Storage, output: Option<String>) -> Result<()> {
    ensure_init(storage)?;
    let plans = storage.load_plans()?;

    let rows = match output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {}", path))?;
            let rows = csv_io::export_plans(&plans, file)?;
            eprintln!("Exported {} plans ({} rows) to {}", plans.len(), rows, path);
            rows
        }
        None => csv_io::export_plans(&plans, std::io::stdout().lock())?,
    };
    info!(plans = plans.len(), rows, "export finished");
    Ok(())
}

/// A CSV plan that passed validation, waiting to be written
struct PendingPlan {
    line: usize,
    reference: Option<String>,
    plan: ShipmentPlan,
}

/// Check one CSV plan and turn it into a plan template.
/// Nothing is written here; a failure anywhere aborts the whole import.
fn prepare_import(
    storage: &Storage,
    draft: csv_io::PlanDraft,
    generator: &CodeGenerator,
    master: &[EquipmentMasterEntry],
    current_year: i32,
) -> Result<PendingPlan> {
    let branch = storage
        .find_branch(&draft.branch)?
        .ok_or_else(|| CareError::UnknownBranch(draft.branch.trim().to_uppercase()))?;

    let parsed = match &draft.reference {
        Some(reference) => Some(refno::parse_reference(reference, &branch.code).with_context(
            || format!("{} is not a reference issued by branch {}", reference, branch.code),
        )?),
        None => None,
    };

    let year = draft
        .year
        .or(parsed.map(|(year, _)| year))
        .unwrap_or(current_year);
    if !refno::YEARS.contains(&year) {
        anyhow::bail!(
            "Year {} is out of range ({}-{})",
            year,
            refno::YEARS.start(),
            refno::YEARS.end()
        );
    }
    if let (Some(reference), Some((ref_year, _))) = (&draft.reference, parsed) {
        if ref_year != year {
            anyhow::bail!("Reference {} does not match year {}", reference, year);
        }
    }

    let mut codes = HashSet::new();
    let mut equipment = Vec::with_capacity(draft.equipment.len());
    for item in &draft.equipment {
        let code = match &item.code {
            Some(code) => code.to_uppercase(),
            None => generator.generate(&item.type_name, &codes, master),
        };
        codes.insert(code.clone());
        equipment.push(Equipment {
            code,
            type_name: item.type_name.clone(),
            quantity: item.quantity,
        });
    }

    let mut plan = ShipmentPlan::new(draft.reference.clone().unwrap_or_default(), branch.code, year);
    plan.status = draft.status;
    plan.carrier = draft.carrier;
    plan.vessel = draft.vessel;
    plan.origin = draft.origin;
    plan.destination = draft.destination;
    if let Some(created) = draft.created {
        plan.created = created;
    }
    plan.equipment = equipment;

    Ok(PendingPlan {
        line: draft.line,
        reference: draft.reference,
        plan,
    })
}

fn cmd_import(storage: &Storage, path: &str, json: bool) -> Result<()> {
    ensure_init(storage)?;

    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {}", path))?;
    let drafts = csv_io::read_plans(file)?;

    let config = storage.load_config()?;
    let master = storage.load_master()?;
    let generator = CodeGenerator::new(config.codes);
    let current_year = Utc::now().year();

    let mut explicit = Vec::new();
    let mut unnumbered = Vec::new();
    for draft in drafts {
        let line = draft.line;
        let pending = prepare_import(storage, draft, &generator, &master, current_year)
            .with_context(|| format!("Line {}", line))?;
        if pending.reference.is_some() {
            explicit.push(pending);
        } else {
            unnumbered.push(pending);
        }
    }

    let mut imported = Vec::new();
    let mut skipped = Vec::new();

    // Given references go first so sequencing cannot hand one of them out
    for pending in explicit {
        let reference = pending.plan.reference.clone();
        if storage.load(&reference)?.is_some() {
            warn!(%reference, line = pending.line, "plan already exists, skipping");
            skipped.push(reference);
            continue;
        }
        storage.insert_plan(&pending.plan)?;
        imported.push(reference);
    }

    for pending in unnumbered {
        let template = pending.plan;
        let plan = storage.create_plan(
            &template.branch,
            template.year,
            config.plans.max_insert_attempts,
            |reference| ShipmentPlan {
                reference,
                ..template.clone()
            },
        )?;
        imported.push(plan.reference);
    }

    if json {
        println!(
            "{}",
            serde_json::json!({ "imported": imported, "skipped": skipped })
        );
    } else {
        println!(
            "Imported {} plans, skipped {} existing",
            imported.len(),
            skipped.len()
        );
        for reference in &imported {
            println!("  {}", reference);
        }
    }
    Ok(())
}
