use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use ses_cli::app::{self, App, CaseDraft, CaseNotFound, RemoveOutcome};
use ses_cli::config::{AppConfig, Overrides};
use ses_cli::logging;
use ses_cli::render::TotalsLine;
use ses_core::format::format_yen;
use ses_core::{CaseField, StepDirection};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Sales and gross-profit calculator for staffing engagements.
///
/// Cases are saved after every change and restored on the next run. The tax
/// mode applies to this invocation only.
#[derive(Debug, Parser)]
#[command(name = "ses-calc", version)]
struct Cli {
    /// TOML config file with [storage] and [logging] sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend to use (`sqlite` or `memory`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Storage connection string.
    /// For SQLite this is a file path (e.g. `ses-calc.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Key the case list is saved under.
    #[arg(long, global = true)]
    key: Option<String>,

    /// Show prices and totals including 10% consumption tax.
    #[arg(long, short = 't', global = true)]
    tax_included: bool,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every case with its period figures and the totals (default).
    List,

    /// Show only the totals.
    Totals,

    /// Add a case. Unset fields start as an empty one-month case.
    Add {
        #[arg(long)]
        name: Option<String>,
        /// Monthly unit sales price.
        #[arg(long, allow_hyphen_values = true)]
        sales: Option<String>,
        /// Monthly unit cost price.
        #[arg(long, allow_hyphen_values = true)]
        cost: Option<String>,
        /// Duration in months.
        #[arg(long, allow_hyphen_values = true)]
        duration: Option<String>,
    },

    /// Set one field of a case (name, sales, cost or duration).
    Set {
        id: i64,
        #[arg(value_parser = parse_field)]
        field: CaseField,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Nudge a numeric field up or down by its stepper increment.
    Step {
        id: i64,
        #[arg(value_parser = parse_field)]
        field: CaseField,
        #[arg(value_parser = parse_direction)]
        direction: StepDirection,
    },

    /// Remove a case.
    Remove {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Write the case table to a CSV file.
    Export { path: PathBuf },

    /// Forget every saved case and start over from the sample case.
    Reset {
        #[arg(long, short)]
        yes: bool,
    },
}

fn parse_field(s: &str) -> Result<CaseField, String> {
    CaseField::parse(s).ok_or_else(|| {
        let names: Vec<_> = CaseField::all().iter().map(CaseField::as_str).collect();
        format!("unknown field '{s}', expected one of: {}", names.join(", "))
    })
}

fn parse_direction(s: &str) -> Result<StepDirection, String> {
    StepDirection::parse(s).ok_or_else(|| format!("unknown direction '{s}', expected up or down"))
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?.apply(Overrides {
        backend: cli.backend,
        db: cli.db,
        key: cli.key,
        log_file: cli.log_file,
    });

    logging::init_logging(&config.logging.level);
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "configuration resolved");

    let mut app = App::open(&config, cli.tax_included).await?;

    match cli.command.unwrap_or(Command::List) {
        Command::List => println!("{}", app.table()),
        Command::Totals => {
            let table = app.table();
            println!("{}", TotalsLine(&table.totals, table.tax_included));
        }
        Command::Add {
            name,
            sales,
            cost,
            duration,
        } => {
            let draft = CaseDraft {
                name,
                sales,
                cost,
                duration,
            };
            let case = app.add_case(&draft).await?;
            println!("added case {}", case.id);
            println!("{}", app.table());
        }
        Command::Set { id, field, value } => {
            let case = app.set_field(id, field, &value).await?;
            println!("case {} {} = {}", case.id, field, describe(&case, field));
            println!("{}", app.table());
        }
        Command::Step {
            id,
            field,
            direction,
        } => {
            if field == CaseField::Name {
                anyhow::bail!("name has no stepper");
            }
            let case = app.step_field(id, field, direction).await?;
            println!("case {} {} = {}", case.id, field, describe(&case, field));
            println!("{}", app.table());
        }
        Command::Remove { id, yes } => {
            let outcome = app
                .remove_case(id, |case| {
                    if yes {
                        return Ok(true);
                    }
                    let label = if case.name.is_empty() {
                        format!("case {}", case.id)
                    } else {
                        format!("case {} ({})", case.id, case.name)
                    };
                    app::confirm(&format!("Remove {label}?"), io::stdin().lock(), io::stderr())
                })
                .await?;

            match outcome {
                RemoveOutcome::Removed(case) => {
                    println!("removed case {}", case.id);
                    println!("{}", app.table());
                }
                RemoveOutcome::NotFound => return Err(CaseNotFound(id).into()),
                RemoveOutcome::Cancelled => println!("kept case {id}"),
            }
        }
        Command::Export { path } => {
            let written = app
                .export(&path)
                .with_context(|| format!("export to '{}' failed", path.display()))?;
            println!("wrote {} cases to {}", written, path.display());
        }
        Command::Reset { yes } => {
            let confirmed = yes
                || app::confirm(
                    "Forget every saved case?",
                    io::stdin().lock(),
                    io::stderr(),
                )?;
            if confirmed {
                app.reset().await?;
                println!("{}", app.table());
            }
        }
    }

    Ok(())
}

fn describe(
    case: &ses_core::Case,
    field: CaseField,
) -> String {
    match field {
        CaseField::Name => format!("{:?}", case.name),
        CaseField::Duration => format!("{} months", case.duration),
        CaseField::Sales | CaseField::Cost => case.amount(field).map(format_yen).unwrap_or_default(),
    }
}
