//! `duesheet run` — the batch job, and `duesheet validate`.

use std::path::PathBuf;

use serde::Serialize;

use duesheet_import::{ImportError, ImportOptions, ImportProfile, ImportSummary};
use duesheet_recon::{ReconError, StoreError, SyncPlan, SyncReport, WorklistLayout};
use duesheet_sheets::SheetsStore;

use crate::discover;
use crate::exit_codes::{
    EXIT_AUTH, EXIT_BAD_INPUT, EXIT_CAPACITY, EXIT_CUSTOMER_KEY, EXIT_LAYOUT_MISMATCH,
    EXIT_PARTIAL_WRITE, EXIT_STORE_UNAVAILABLE,
};
use crate::CliError;

pub struct RunArgs {
    pub input: String,
    pub sheet_id: String,
    pub credentials: PathBuf,
    pub tab: String,
    pub profile: Option<PathBuf>,
    pub min_days_overdue: i64,
    pub process_all: bool,
    pub dry_run: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct RunSummary {
    source_file: String,
    import: ImportSummary,
    sync: SyncReport,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let profile = load_profile(args.profile.as_deref())?;

    let input_path = discover::newest_matching(&args.input)?;
    let text = std::fs::read_to_string(&input_path).map_err(|e| CliError {
        code: EXIT_BAD_INPUT,
        message: format!("cannot read {}: {e}", input_path.display()),
        hint: None,
    })?;
    let source_file = input_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input_path.display().to_string());

    if !args.quiet {
        eprintln!("ingesting {}", source_file);
    }

    // Wall-clock date captured once; every row in this run ages against it.
    let options = ImportOptions {
        today: chrono::Local::now().date_naive(),
        min_days_overdue: args.min_days_overdue,
        process_all: args.process_all,
    };
    let output = duesheet_import::run(&text, &profile, &options).map_err(import_error)?;

    if let Some(header) = &output.summary.fallback_customer_header {
        eprintln!(
            "warning: no recognized customer column; falling back to {header:?} — check the export and the synonym table"
        );
    }

    let layout = WorklistLayout::default();
    let mut store =
        SheetsStore::connect(&args.sheet_id, &args.credentials).map_err(store_error)?;

    let plan = duesheet_recon::plan(&mut store, &args.tab, &layout, &output.aggregates)
        .map_err(recon_error)?;

    if args.dry_run {
        return print_plan(&plan, args.json);
    }

    let report = duesheet_recon::apply(&mut store, &plan, &layout).map_err(recon_error)?;

    let summary = RunSummary {
        source_file,
        import: output.summary,
        sync: report,
    };
    if args.json {
        // Machine output on stdout; everything else stays on stderr.
        let json = serde_json::to_string_pretty(&summary).map_err(|e| CliError {
            code: crate::exit_codes::EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{json}");
    }
    if !args.quiet {
        print_summary(&summary);
    }
    Ok(())
}

pub fn cmd_validate(path: PathBuf) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::usage(format!("cannot read profile {}: {e}", path.display())))?;
    ImportProfile::from_toml(&text).map_err(import_error)?;
    eprintln!("profile OK: {}", path.display());
    Ok(())
}

fn load_profile(path: Option<&std::path::Path>) -> Result<ImportProfile, CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::usage(format!("cannot read profile {}: {e}", path.display()))
            })?;
            ImportProfile::from_toml(&text).map_err(import_error)
        }
        None => Ok(ImportProfile::default()),
    }
}

// ── Output ──────────────────────────────────────────────────────────

fn print_plan(plan: &SyncPlan, json: bool) -> Result<(), CliError> {
    if json {
        let value = serde_json::json!({
            "dry_run": true,
            "provision": plan.provision,
            "updates": plan.updates.iter().map(|u| serde_json::json!({
                "customer": u.customer,
                "row": u.row,
                "unchanged": u.unchanged,
            })).collect::<Vec<_>>(),
            "inserts": plan.inserts.iter().map(|i| i.customer.clone()).collect::<Vec<_>>(),
        });
        let rendered = serde_json::to_string_pretty(&value).map_err(|e| CliError {
            code: crate::exit_codes::EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{rendered}");
        return Ok(());
    }

    let unchanged = plan.updates.iter().filter(|u| u.unchanged).count();
    eprintln!(
        "dry run: {} update(s) ({} already current), {} insert(s){}",
        plan.updates.len(),
        unchanged,
        plan.inserts.len(),
        if plan.provision { ", worksheet would be provisioned" } else { "" },
    );
    for update in &plan.updates {
        eprintln!("  update row {}: {}", update.row, update.customer);
    }
    for insert in &plan.inserts {
        eprintln!("  append: {}", insert.customer);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let i = &summary.import;
    let s = &summary.sync;
    eprintln!(
        "synced {}: {} rows read, {} qualified, {} customers — {} updated, {} unchanged, {} appended{}",
        summary.source_file,
        i.rows_read,
        i.qualified,
        i.customers,
        s.updated,
        s.unchanged,
        s.inserted,
        if s.provisioned { " (worksheet provisioned)" } else { "" },
    );
    if !i.bad_balances.is_empty() {
        eprintln!(
            "warning: {} unparsable balance(s), e.g. {:?}",
            i.bad_balances.count, i.bad_balances.samples,
        );
    }
    if !i.bad_dates.is_empty() {
        eprintln!(
            "warning: {} unparsable due date(s), e.g. {:?}",
            i.bad_dates.count, i.bad_dates.samples,
        );
    }
}

// ── Error mapping ───────────────────────────────────────────────────

fn import_error(e: ImportError) -> CliError {
    let code = match &e {
        ImportError::ProfileParse(_) | ImportError::ProfileValidation(_) => {
            crate::exit_codes::EXIT_USAGE
        }
        ImportError::CustomerKeyMissing { .. } => EXIT_CUSTOMER_KEY,
        _ => EXIT_BAD_INPUT,
    };
    CliError {
        code,
        message: e.to_string(),
        hint: None,
    }
}

fn recon_error(e: ReconError) -> CliError {
    let (code, hint) = match &e {
        ReconError::StoreUnavailable(_) => (EXIT_STORE_UNAVAILABLE, None),
        ReconError::LayoutMismatch { .. } => (
            EXIT_LAYOUT_MISMATCH,
            Some("point --tab at the collections worklist tab".to_string()),
        ),
        ReconError::CapacityExceeded { .. } => (EXIT_CAPACITY, None),
        ReconError::Provision(_) | ReconError::PartialWrite { .. } => (
            EXIT_PARTIAL_WRITE,
            Some("the run is safe to retry once the store recovers".to_string()),
        ),
    };
    CliError {
        code,
        message: e.to_string(),
        hint,
    }
}

fn store_error(e: StoreError) -> CliError {
    let code = match &e {
        StoreError::Auth(_) => EXIT_AUTH,
        StoreError::Unavailable(_) | StoreError::Backend(_) => EXIT_STORE_UNAVAILABLE,
    };
    CliError {
        code,
        message: e.to_string(),
        hint: None,
    }
}
