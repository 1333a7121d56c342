//! catalog-meta CLI - Database catalog introspection.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use catalog_meta::{
    CatalogError, ColumnDefinition, Config, ScanReport, SchemaDefinition, Session,
    TableDefinition, TableId,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "catalog-meta")]
#[command(about = "Read database catalog metadata into a dialect-independent model")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "catalog.yaml")]
    config: PathBuf,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the schemas of the database
    Schemas,

    /// List tables, optionally of one schema
    Tables {
        /// Only list tables of this schema
        #[arg(long)]
        schema: Option<String>,
    },

    /// Show the columns of one table
    Columns {
        /// Schema name
        schema: String,
        /// Table name
        table: String,
    },

    /// Scan every selected table and print the definition tree
    Dump {
        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: DumpFormat,
    },

    /// Test the database connection
    HealthCheck,
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct DatabaseDump {
    database: String,
    dialect: String,
    schemas: Vec<SchemaDump>,
}

#[derive(Serialize)]
struct SchemaDump {
    #[serde(flatten)]
    schema: Arc<SchemaDefinition>,
    tables: Vec<TableDump>,
}

#[derive(Serialize)]
struct TableDump {
    #[serde(flatten)]
    table: TableDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Arc<Vec<ColumnDefinition>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), CatalogError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(CatalogError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let session = Session::connect(&config).await?;
    let result = execute(&session, cli.command).await;
    session.close().await;
    result
}

async fn execute(session: &Session, command: Commands) -> Result<(), CatalogError> {
    let db = session.database();

    match command {
        Commands::HealthCheck => {
            session.health_check().await?;
            println!("OK");
        }
        Commands::Schemas => {
            for schema in session.scan().await? {
                match &schema.comment {
                    Some(comment) => println!("{}\t{}", schema.name, comment),
                    None => println!("{}", schema.name),
                }
            }
        }
        Commands::Tables { schema } => {
            let names = match schema {
                Some(name) => vec![db.scan_schema(&name).await?.name.clone()],
                None => session.scan().await?.iter().map(|s| s.name.clone()).collect(),
            };
            for name in names {
                for table in session.tables(&name).await? {
                    println!("{}\t{:?}", table.full_name(), table.kind);
                }
            }
        }
        Commands::Columns { schema, table } => {
            session.scan().await?;
            if db.schema(&schema).await.is_unknown() {
                db.scan_schema(&schema).await?;
            }
            let table = db.table(&schema, &table).await?;
            for column in db.columns(&table.id()).await?.iter() {
                print_column(column);
            }
        }
        Commands::Dump { format } => {
            let cancel = setup_signal_handler();
            let report = session.scan_all(Some(cancel)).await?;
            let dump = build_dump(session, &report).await?;

            let output = match format {
                DumpFormat::Json => serde_json::to_string_pretty(&dump)?,
                DumpFormat::Yaml => serde_yaml::to_string(&dump)?,
            };
            println!("{}", output);

            if let Some(e) = report.tables.into_iter().find_map(|t| t.result.err()) {
                return Err(e);
            }
        }
    }

    Ok(())
}

fn print_column(column: &ColumnDefinition) {
    let t = &column.data_type;
    let mut line = format!(
        "{:>3}  {}  {}  {}",
        column.ordinal_position,
        column.name,
        t.display_type(),
        if t.nullable { "NULL" } else { "NOT NULL" }
    );
    if column.is_identity {
        line.push_str("  IDENTITY");
    }
    if let Some(default) = &t.default_value {
        line.push_str(&format!("  DEFAULT {}", default));
    }
    if t.is_user_defined() && t.udt.is_unresolved() {
        line.push_str(&format!("  (unresolved type {})", t.qualified_name));
    }
    if let Some(comment) = &column.comment {
        line.push_str(&format!("  -- {}", comment));
    }
    println!("{}", line);
}

async fn build_dump(session: &Session, report: &ScanReport) -> Result<DatabaseDump, CatalogError> {
    let db = session.database();
    let mut schemas = Vec::new();

    for schema in db.schemas().await {
        let mut tables = Vec::new();
        for table in session.tables(&schema.name).await? {
            let id: TableId = table.id();
            let scan = report.tables.iter().find(|t| t.table == id);
            let (columns, error) = match scan.map(|t| &t.result) {
                Some(Ok(columns)) => (Some(columns.clone()), None),
                Some(Err(e)) => (None, Some(e.to_string())),
                None => (None, None),
            };
            tables.push(TableDump {
                table,
                columns,
                error,
            });
        }
        schemas.push(SchemaDump { schema, tables });
    }

    Ok(DatabaseDump {
        database: db.name().to_string(),
        dialect: db.dialect().name().to_string(),
        schemas,
    })
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Invalid verbosity '{}'", other)),
    };

    // Logs go to stderr so command output on stdout stays machine-readable.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Invalid log format '{}'. Use text or json", other)),
    }

    Ok(())
}

/// Flip the returned receiver to `true` on Ctrl-C so a running dump stops
/// starting new table scans.
fn setup_signal_handler() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nReceived Ctrl-C. Finishing in-flight table scans...");
            let _ = tx.send(true);
        }
    });

    rx
}
