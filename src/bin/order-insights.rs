//! order-insights — run the order analytics catalog
//!
//! # Usage
//!
//! ```bash
//! # Run every query and print the results
//! order-insights --database-url sqlite://olist.db run
//!
//! # Only the derived reports, as JSON
//! order-insights run --only get_freight_value_weight_relationship --format json
//!
//! # Show the catalog
//! order-insights list
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use order_insights::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "order-insights")]
#[command(version)]
#[command(about = "Batch analytics over the e-commerce order dataset", long_about = None)]
#[command(after_help = "EXAMPLES:
    order-insights --database-url sqlite://olist.db run
    order-insights run --only orders_per_day_and_holidays_2017 --format json
    order-insights sql revenue_per_state")]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, global = true, env = "ORDER_INSIGHTS_DATABASE_URL")]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the catalog and print every result
    Run {
        /// Only run these queries (repeatable)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the catalog in execution order
    List,
    /// Print the SQL behind a query
    Sql {
        /// Query identifier
        query: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = dispatch(&cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "order_insights=debug"
    } else {
        "order_insights=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: &Cli) -> anyhow::Result<()> {
    let mut config = PipelineConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.database_url {
        config.database_url = Some(url.clone());
    }
    let pipeline = Pipeline::from_config(&config);

    match &cli.command {
        Commands::Run { only, format } => run(&pipeline, &config, only, format).await?,
        Commands::List => list(&pipeline),
        Commands::Sql { query } => show_sql(&pipeline, query)?,
    }
    Ok(())
}

async fn run(
    pipeline: &Pipeline,
    config: &PipelineConfig,
    only: &[String],
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let ids: Vec<QueryId> = if only.is_empty() {
        pipeline.catalog().ids().collect()
    } else {
        only.iter()
            .map(|id| id.parse::<QueryId>())
            .collect::<Result<Vec<_>, _>>()?
    };

    let Some(db_url) = config.database_url.as_deref() else {
        anyhow::bail!("No database URL. Use --database-url or set ORDER_INSIGHTS_DATABASE_URL");
    };

    let mut conn = SqlConnection::connect(db_url).await?;
    let outcome = pipeline.run_only(&mut conn, &ids).await;
    conn.close().await;
    let results = outcome?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Table => {
            for result in results.iter() {
                println!("{}", result.name.cyan().bold());
                print_table(&result.table);
                println!();
            }
        }
    }
    Ok(())
}

fn list(pipeline: &Pipeline) {
    println!("{}", "Query catalog".cyan().bold());
    println!();
    for (position, entry) in pipeline.catalog().entries().iter().enumerate() {
        let kind = match &entry.kind {
            EntryKind::Sql { resource } => {
                let path = pipeline.executor().resources().path_for(resource);
                format!("sql  {}", path.display()).dimmed()
            }
            EntryKind::Custom(transform) => format!("transform  {}", transform.name()).yellow(),
        };
        println!("{:>2}. {:40} {}", position + 1, entry.id.as_str().white(), kind);
    }
}

fn show_sql(pipeline: &Pipeline, query: &str) -> anyhow::Result<()> {
    let entry = pipeline.catalog().lookup(query)?;
    match &entry.kind {
        EntryKind::Sql { resource } => {
            let sql = pipeline.executor().resources().load(resource)?;
            println!("{}", sql.trim_end());
        }
        EntryKind::Custom(transform) => {
            let tables = transform
                .prerequisites()
                .iter()
                .map(|source| format!("{:?}", source))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{} is computed in memory by the {} transform from: {}",
                entry.id.as_str().cyan(),
                transform.name().yellow(),
                tables
            );
        }
    }
    Ok(())
}

fn print_table(table: &Table) {
    if table.is_empty() {
        println!("{}", "(no results)".dimmed());
        return;
    }

    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(val_to_string).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.len()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:width$}", c, width = *w))
        .collect();
    println!("{}", header.join(" │ ").white().bold());

    let sep: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", sep.join("─┼─").dimmed());

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:width$}", cell, width = *w))
            .collect();
        println!("{}", line.join(" │ "));
    }

    println!("{} row(s)", table.len().to_string().cyan());
}

fn val_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.clone(),
        _ => val.to_string(),
    }
}
