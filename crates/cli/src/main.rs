// duesheet - sync the newest AR aging export into the collections worklist

mod discover;
mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "duesheet")]
#[command(about = "Sync the newest AR aging export into a collections worklist")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the newest aging CSV and reconcile the worklist
    #[command(after_help = "\
Examples:
  duesheet run --sheet-id 1AbC... --credentials ~/.config/duesheet/credentials.json
  duesheet run --input 'drops/*.csv' --min-days-overdue 30
  duesheet run --process-all --dry-run
  DUESHEET_SHEET_ID=1AbC... duesheet run --quiet")]
    Run {
        /// Glob for the watched input directory
        #[arg(long, env = "DUESHEET_INPUT_GLOB", default_value = "incoming_csv/*.csv")]
        input: String,

        /// Spreadsheet id of the worklist
        #[arg(long, env = "DUESHEET_SHEET_ID")]
        sheet_id: String,

        /// Path to the OAuth2 credentials JSON file
        #[arg(long, env = "DUESHEET_CREDENTIALS", default_value = "credentials.json")]
        credentials: PathBuf,

        /// Worksheet tab to reconcile into
        #[arg(long, default_value = "Collections Worklist")]
        tab: String,

        /// Import profile TOML (omit for the built-in QuickBooks profile)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Overdue threshold in days
        #[arg(long, default_value_t = 21)]
        min_days_overdue: i64,

        /// Ignore the days filter: every positive balance qualifies
        #[arg(long)]
        process_all: bool,

        /// Plan only; print the diff without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Emit the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate an import profile without running
    #[command(after_help = "\
Examples:
  duesheet validate profiles/quickbooks.toml")]
    Validate {
        /// Path to the profile TOML
        profile: PathBuf,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: exit_codes::EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            sheet_id,
            credentials,
            tab,
            profile,
            min_days_overdue,
            process_all,
            dry_run,
            json,
            quiet,
        } => run::cmd_run(run::RunArgs {
            input,
            sheet_id,
            credentials,
            tab,
            profile,
            min_days_overdue,
            process_all,
            dry_run,
            json,
            quiet,
        }),
        Commands::Validate { profile } => run::cmd_validate(profile),
    };

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
