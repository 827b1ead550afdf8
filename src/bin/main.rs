//! qframe CLI - render and inspect stored query documents
//!
//! Usage:
//!   qframe render <query.json> [--label <name>] [--raw]
//!   qframe validate <query.json> [--label <name>]
//!   qframe ddl <query.json> --table <name> [--schema <name>] [--label <name>]
//!   qframe import <columns.csv> [--output <query.json>] [--label <name>]
//!
//! Examples:
//!   qframe render queries.json --label monthly_sales
//!   qframe ddl queries.json --label monthly_sales --table sales_summary --schema reporting
//!   qframe import columns.csv -o queries.json --label orders

use clap::{Parser, Subcommand, ValueEnum};
use qframe::config::Settings;
use qframe::import;
use qframe::persist;
use qframe::QFrame;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "qframe")]
#[command(about = "qframe - build SQL from declarative query documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a stored query document to SQL
    Render {
        /// Path to the JSON query file
        file: PathBuf,

        /// Label of the query inside a shared file
        #[arg(short, long)]
        label: Option<String>,

        /// Skip the reformat pass and print single-line SQL
        #[arg(long)]
        raw: bool,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Validate a stored query document without rendering it
    Validate {
        /// Path to the JSON query file
        file: PathBuf,

        /// Label of the query inside a shared file
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print CREATE TABLE and INSERT statements for a query's output
    Ddl {
        /// Path to the JSON query file
        file: PathBuf,

        /// Target table name
        #[arg(short, long)]
        table: String,

        /// Target schema
        #[arg(short, long)]
        schema: Option<String>,

        /// Label of the query inside a shared file
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Build a query document from a CSV of column metadata
    Import {
        /// Path to the columns CSV
        file: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store under this label in the output file
        #[arg(short, long)]
        label: Option<String>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with comments
    Verbose,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Render {
            file,
            label,
            raw,
            output,
        } => cmd_render(file, label, raw, output, settings),
        Commands::Validate { file, label } => cmd_validate(file, label),
        Commands::Ddl {
            file,
            table,
            schema,
            label,
        } => cmd_ddl(file, table, schema, label, settings),
        Commands::Import {
            file,
            output,
            label,
        } => cmd_import(file, output, label),
    }
}

fn load_frame(file: &Path, label: Option<&str>) -> Result<QFrame, ExitCode> {
    QFrame::load(file, label).map_err(|e| {
        eprintln!("Error loading '{}': {}", file.display(), e);
        ExitCode::FAILURE
    })
}

fn cmd_render(
    file: PathBuf,
    label: Option<String>,
    raw: bool,
    output: OutputFormat,
    mut settings: Settings,
) -> ExitCode {
    if raw {
        settings.format.enabled = false;
    }
    let mut frame = match load_frame(&file, label.as_deref()) {
        Ok(f) => f.with_settings(settings),
        Err(code) => return code,
    };

    let sql = frame.get_sql().to_string();
    match output {
        OutputFormat::Sql => println!("{}", sql),
        OutputFormat::Verbose => {
            println!("-- qframe rendered SQL");
            println!("-- Source: {}", file.display());
            if let Some(name) = &label {
                println!("-- Label: {}", name);
            }
            if let Some(blocks) = frame.sql_blocks() {
                println!("-- Columns: {}", blocks.select_aliases.join(", "));
            }
            println!();
            println!("{}", sql);
        }
    }
    ExitCode::SUCCESS
}

fn cmd_validate(file: PathBuf, label: Option<String>) -> ExitCode {
    match persist::load(&file, label.as_deref()) {
        Ok(document) => {
            println!(
                "OK: {} is valid ({} source, {} field(s))",
                file.display(),
                document.source.kind(),
                document.fields.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Validation error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_ddl(
    file: PathBuf,
    table: String,
    schema: Option<String>,
    label: Option<String>,
    settings: Settings,
) -> ExitCode {
    let mut frame = match load_frame(&file, label.as_deref()) {
        Ok(f) => f.with_settings(settings),
        Err(code) => return code,
    };

    let statements = frame
        .create_table_sql(&table, schema.as_deref())
        .and_then(|create| {
            let insert = frame.insert_into_sql(&table, schema.as_deref())?;
            Ok((create, insert))
        });

    match statements {
        Ok((create, insert)) => {
            println!("{};", create);
            println!();
            println!("{};", insert);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_import(file: PathBuf, output: Option<PathBuf>, label: Option<String>) -> ExitCode {
    let document = match import::read_columns_csv(&file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error importing '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => match persist::save(&path, &document, label.as_deref()) {
            Ok(()) => {
                println!("Wrote {} field(s) to {}", document.fields.len(), path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error writing '{}': {}", path.display(), e);
                ExitCode::FAILURE
            }
        },
        None => match document.to_value().and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error serializing query: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}
