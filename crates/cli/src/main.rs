// agrid - headless audit reconciliation

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use auditgrid_cli::exit_codes::{
    EXIT_ERROR, EXIT_NOT_FOUND, EXIT_PLAN_APPLY, EXIT_PLAN_INVALID, EXIT_STORE, EXIT_SUCCESS,
    EXIT_USAGE,
};
use auditgrid_cli::plan::{PlanError, ResolutionPlan};
use auditgrid_config::EditorSettings;
use auditgrid_engine::InputBus;
use auditgrid_io::{AuditGateway, AuditPayload, FieldMapping, LoadSource, RegistryRecord, SqliteStore, StoreError};
use auditgrid_recon::session::layout_from_settings;
use auditgrid_recon::{EditorSession, GroupView};

#[derive(Parser)]
#[command(name = "agrid")]
#[command(about = "Review and reconcile duplicate purchase orders in stored audits")]
#[command(version)]
struct Cli {
    /// Audit database (default: <data dir>/auditgrid/audits.db)
    #[arg(long, global = true, env = "AGRID_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a pre-parsed audit payload ({ matrix, fields, columns? })
    #[command(after_help = "\
Examples:
  agrid import IMO9321483 --json audit.json
  cat audit.json | agrid import IMO9321483 --json -")]
    Import {
        audit_id: String,

        /// Payload file (JSON, or - for stdin)
        #[arg(long)]
        json: String,
    },

    /// List duplicate groups by the configured key field
    Groups {
        audit_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a TOML resolution plan and commit the result
    #[command(after_help = "\
Examples:
  agrid resolve IMO9321483 --plan resolve.toml
  agrid resolve IMO9321483 --plan resolve.toml --dry-run")]
    Resolve {
        audit_id: String,

        /// Resolution plan ([[edit]], [[row]], [[group]] steps)
        #[arg(long)]
        plan: PathBuf,

        /// Report the commit summary without writing it
        #[arg(long)]
        dry_run: bool,

        /// Output the registry record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show registry records (all, or one audit)
    Registry {
        audit_id: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::new(EXIT_STORE, e.to_string())
    }
}

impl From<PlanError> for CliError {
    fn from(e: PlanError) -> Self {
        let code = match e {
            PlanError::Parse(_) | PlanError::Validation(_) => EXIT_PLAN_INVALID,
            PlanError::UnknownGroup(_) | PlanError::Session(_) => EXIT_PLAN_APPLY,
        };
        Self::new(code, e.to_string())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = open_gateway(cli.db.as_deref()).and_then(|mut gateway| match cli.command {
        Commands::Import { audit_id, json } => cmd_import(&mut gateway, &audit_id, &json),
        Commands::Groups { audit_id, json } => cmd_groups(&gateway, &audit_id, json),
        Commands::Resolve { audit_id, plan, dry_run, json } => {
            cmd_resolve(&mut gateway, &audit_id, &plan, dry_run, json)
        }
        Commands::Registry { audit_id, json } => cmd_registry(&gateway, audit_id.as_deref(), json),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("auditgrid").join("audits.db"))
}

fn open_gateway(db: Option<&Path>) -> Result<AuditGateway<SqliteStore>, CliError> {
    let path = match db {
        Some(p) => p.to_path_buf(),
        None => default_db_path()
            .ok_or_else(|| CliError::usage("no data directory on this system").with_hint("pass --db <path>"))?,
    };
    let store = SqliteStore::open(&path)?;
    Ok(AuditGateway::new(store))
}

fn read_input(source: &str) -> Result<String, CliError> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::usage(format!("cannot read stdin: {e}")))?;
        return Ok(buf);
    }
    std::fs::read_to_string(source).map_err(|e| CliError::usage(format!("cannot read {source}: {e}")))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value).map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))
}

/// Load an audit and open an editor session over it. Also returns the
/// audit's field mapping, which commit re-keys onto the final columns.
fn open_session(
    gateway: &AuditGateway<SqliteStore>,
    audit_id: &str,
    settings: &EditorSettings,
    bus: &InputBus,
) -> Result<(FieldMapping, EditorSession), CliError> {
    let loaded = gateway.load(audit_id, &layout_from_settings(settings))?;
    if loaded.source == LoadSource::Placeholder {
        eprintln!("note: audit '{audit_id}' has no usable stored data; using the sample audit");
    }
    let key_column = loaded.key_column(&settings.key_field);
    let session = EditorSession::open(loaded.table, key_column, settings, bus)
        .map_err(|e| CliError::new(EXIT_ERROR, e.to_string()))?;
    Ok((loaded.fields, session))
}

fn cmd_import(gateway: &mut AuditGateway<SqliteStore>, audit_id: &str, source: &str) -> Result<(), CliError> {
    let raw = read_input(source)?;
    let payload: AuditPayload = serde_json::from_str(&raw)
        .map_err(|e| CliError::usage(format!("invalid payload: {e}")).with_hint("expected {\"matrix\": [[...]], \"fields\": {...}}"))?;
    if payload.matrix.is_empty() {
        return Err(CliError::usage("payload matrix has no header row"));
    }
    gateway.import(audit_id, &payload)?;
    println!(
        "imported {}: {} rows, {} columns",
        audit_id,
        payload.matrix.len() - 1,
        payload.matrix[0].len()
    );
    Ok(())
}

fn cmd_groups(gateway: &AuditGateway<SqliteStore>, audit_id: &str, json: bool) -> Result<(), CliError> {
    let settings = EditorSettings::load();
    let bus = InputBus::new();
    let (_, session) = open_session(gateway, audit_id, &settings, &bus)?;
    let groups = session.groups();

    if json {
        println!("{}", to_json(&groups)?);
    } else if let GroupView::AllResolved = session.current_group() {
        println!("no duplicate groups");
    } else {
        let header = session.table().header();
        let key_label = header
            .get(session.key_column())
            .map(|c| c.display())
            .unwrap_or_default();
        println!("{} duplicate group(s) by {}", groups.len(), key_label);
        for group in &groups {
            let rows: Vec<String> = group.members.iter().map(|i| i.to_string()).collect();
            println!("  {:<20} rows {}", group.key, rows.join(", "));
        }
    }
    session.close();
    Ok(())
}

fn cmd_resolve(
    gateway: &mut AuditGateway<SqliteStore>,
    audit_id: &str,
    plan_path: &Path,
    dry_run: bool,
    json: bool,
) -> Result<(), CliError> {
    let plan_src = std::fs::read_to_string(plan_path)
        .map_err(|e| CliError::usage(format!("cannot read plan {}: {e}", plan_path.display())))?;
    let plan = ResolutionPlan::from_toml(&plan_src)?;

    let settings = EditorSettings::load();
    let bus = InputBus::new();
    let (fields, mut session) = open_session(gateway, audit_id, &settings, &bus)?;

    let report = plan.apply(&mut session)?;
    eprintln!(
        "applied {} edit(s), {} row action(s), {} group action(s)",
        report.edits, report.row_actions, report.group_actions
    );

    let unresolved = session.unresolved_in_groups();
    if unresolved > 0 && settings.warn_unresolved {
        eprintln!(
            "warning: {unresolved} row(s) in {} duplicate group(s) are unresolved",
            session.group_count()
        );
    }

    let output = session.commit();
    let today = chrono::Local::now().date_naive();
    let record = if dry_run {
        RegistryRecord::from_summary(audit_id, &output.summary, today)
    } else {
        gateway.commit(audit_id, &output, &fields, today)?
    };

    if json {
        println!("{}", to_json(&record)?);
    } else {
        print_record(&record);
        if dry_run {
            println!("(dry run: nothing written)");
        }
    }
    Ok(())
}

fn cmd_registry(gateway: &AuditGateway<SqliteStore>, audit_id: Option<&str>, json: bool) -> Result<(), CliError> {
    let records = match audit_id {
        Some(id) => match gateway.registry_record(id)? {
            Some(r) => vec![r],
            None => {
                return Err(CliError::new(EXIT_NOT_FOUND, format!("no registry record for '{id}'"))
                    .with_hint("records are written by `agrid resolve`"))
            }
        },
        None => gateway.registry()?,
    };

    if json {
        println!("{}", to_json(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("registry is empty");
    }
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &RegistryRecord) {
    println!("{}", record.imo_or_audit_id);
    println!("  purchase orders:  {}", record.total_purchase_orders);
    println!("  duplicated POs:   {}", record.duplicate_purchase_orders);
    println!("  items:            {}", record.total_items);
    println!("  created:          {}", record.create_date);
}
