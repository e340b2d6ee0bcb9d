//! mdwarehouse CLI - load raw feeds and query the warehouse
//!
//! Usage:
//!   mdwarehouse ingest [--raw-dir <dir>] [--air <file>] [--water <file>] [--wages <file>]
//!   mdwarehouse overview [--county <text>] [--year <year>] [--limit <n>]
//!   mdwarehouse enforcements [--county <text>] [--year <year>] [--source air|water]
//!   mdwarehouse wages [--county <text>] [--year <year>]
//!   mdwarehouse counties [--name <text>] [--state <code>]
//!   mdwarehouse health
//!   mdwarehouse variants
//!
//! Examples:
//!   mdwarehouse --database sqlite://data/md.db ingest --raw-dir raw_data
//!   mdwarehouse overview --county balt --year 2020
//!   RUST_LOG=mdwarehouse=debug mdwarehouse enforcements --source water

use clap::{Args, Parser, Subcommand};
use mdwarehouse::config::{Settings, WarehouseTarget};
use mdwarehouse::ingest::{IngestPipeline, RawDocument, SourceKind};
use mdwarehouse::reports::{
    builtin_registry, CountyFilter, EnforcementFilter, EnforcementSource, ReportError,
    ReportFilter, ReportResult, ReportService,
};
use mdwarehouse::resolution::QueryIntent;
use mdwarehouse::warehouse::{AccessMode, SqliteWarehouse};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mdwarehouse")]
#[command(about = "Maryland enforcement and wage warehouse")]
#[command(version)]
struct Cli {
    /// Config file (defaults to MDWAREHOUSE_CONFIG, ./mdwarehouse.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Warehouse URL, overriding configuration and DATABASE_URL
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load raw JSON documents into the warehouse
    Ingest {
        /// Directory holding md_air_enforcement.json, md_water_enforcement.json, md_average_wage.json
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Air enforcement document
        #[arg(long)]
        air: Option<PathBuf>,

        /// Water enforcement document
        #[arg(long)]
        water: Option<PathBuf>,

        /// Wide average-wage document
        #[arg(long)]
        wages: Option<PathBuf>,
    },

    /// Enforcement counts merged with average wages
    Overview(ReportArgs),

    /// Enforcement counts by county and year
    Enforcements {
        #[command(flatten)]
        report: ReportArgs,

        /// Only count one feed
        #[arg(short, long, value_parser = parse_source)]
        source: Option<EnforcementSource>,
    },

    /// Average wage per county and year
    Wages(ReportArgs),

    /// List canonical counties
    Counties {
        /// Substring of the county name
        #[arg(short, long)]
        name: Option<String>,

        /// Exact state code, e.g. MD
        #[arg(short, long)]
        state: Option<String>,

        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Check warehouse connectivity (exit code 1 when degraded)
    Health,

    /// List and validate the registered query variants
    Variants,
}

#[derive(Args)]
struct ReportArgs {
    /// Substring of the county name (case-insensitive)
    #[arg(short, long)]
    county: Option<String>,

    /// Exact year, 1900-2100
    #[arg(short, long)]
    year: Option<i32>,

    /// Maximum rows, clamped to 1-10000
    #[arg(short, long)]
    limit: Option<u32>,
}

impl From<ReportArgs> for ReportFilter {
    fn from(args: ReportArgs) -> Self {
        ReportFilter {
            county: args.county,
            year: args.year,
            limit: args.limit,
        }
    }
}

fn parse_source(s: &str) -> Result<EnforcementSource, String> {
    s.parse().map_err(|e: ReportError| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let target = match &cli.database {
        Some(url) => WarehouseTarget::from_str(url).map_err(|e| e.to_string()),
        None => settings.warehouse_target().map_err(|e| e.to_string()),
    };
    let target = match target {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Ingest {
            raw_dir,
            air,
            water,
            wages,
        } => cmd_ingest(&settings, target, raw_dir, [air, water, wages]),
        Commands::Overview(args) => {
            run_report(&settings, target, |s| s.get_overview(&args.into()))
        }
        Commands::Enforcements { report, source } => {
            let mut filter = EnforcementFilter::from(ReportFilter::from(report));
            filter.source = source;
            run_report(&settings, target, |s| s.get_enforcement_summary(&filter))
        }
        Commands::Wages(args) => run_report(&settings, target, |s| s.list_wages(&args.into())),
        Commands::Counties { name, state, limit } => {
            let filter = CountyFilter { name, state, limit };
            run_report(&settings, target, |s| s.list_counties(&filter))
        }
        Commands::Health => cmd_health(&settings, target),
        Commands::Variants => cmd_variants(),
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

fn cmd_ingest(
    settings: &Settings,
    target: WarehouseTarget,
    raw_dir: Option<PathBuf>,
    files: [Option<PathBuf>; 3],
) -> ExitCode {
    let mut docs = Vec::new();
    if let Some(dir) = &raw_dir {
        match RawDocument::from_dir(dir) {
            Ok(found) => docs.extend(found),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    for (source, path) in SourceKind::ALL.into_iter().zip(files) {
        let Some(path) = path else { continue };
        match RawDocument::from_path(source, &path) {
            Ok(doc) => {
                docs.retain(|d| d.source != source);
                docs.push(doc);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    if docs.is_empty() {
        eprintln!("Error: nothing to ingest; pass --raw-dir or at least one document");
        return ExitCode::FAILURE;
    }

    let warehouse =
        match SqliteWarehouse::open(target, settings.warehouse.pool.clone(), AccessMode::ReadWrite)
        {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        };

    let result = IngestPipeline::new(&warehouse, &settings.ingest)
        .and_then(|mut pipeline| pipeline.run(&docs));
    match result {
        Ok(report) => print_json(&report),
        Err(e) => {
            eprintln!("Ingestion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_service(
    settings: &Settings,
    target: WarehouseTarget,
) -> Result<ReportService<SqliteWarehouse>, ExitCode> {
    let pool = settings.warehouse.pool.clone();
    match SqliteWarehouse::open(target, pool, AccessMode::ReadOnly) {
        Ok(warehouse) => Ok(ReportService::new(warehouse, settings.api.clone())),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn run_report<T, F>(settings: &Settings, target: WarehouseTarget, report: F) -> ExitCode
where
    T: Serialize,
    F: FnOnce(&ReportService<SqliteWarehouse>) -> ReportResult<T>,
{
    let service = match open_service(settings, target) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match report(&service) {
        Ok(rows) => print_json(&rows),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_health(settings: &Settings, target: WarehouseTarget) -> ExitCode {
    let service = match open_service(settings, target) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let health = service.health_check();
    print_json(&health);
    if health.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_variants() -> ExitCode {
    let registry = builtin_registry();

    for intent in QueryIntent::ALL {
        println!("{}", intent);
        for variant in registry.variants_for(intent) {
            println!("  #{} {}", variant.ordinal, variant.name);
            println!("      params: {}", variant.params.join(", "));
        }
    }

    match registry.validate() {
        Ok(()) => {
            println!("\n✓ {} variants valid", registry.len());
            ExitCode::SUCCESS
        }
        Err(issues) => {
            eprintln!();
            for issue in &issues {
                eprintln!("✗ {}", issue);
            }
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    println!("{}", to_json(value));
    ExitCode::SUCCESS
}
