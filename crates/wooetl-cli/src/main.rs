mod run;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wooetl_core::{AppConfig, TableConfig};
use wooetl_transform::IsoLookup;
use wooetl_warehouse::{table_schema, BigQueryClient, PollPolicy, WarehouseError, WriteMode};
use wooetl_woo::WooClient;

use crate::run::{run_daily, validate_day, yesterday_utc, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "wooetl")]
#[command(about = "Daily WooCommerce order sync into BigQuery")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch one day of orders, transform them and append them to BigQuery
    Run {
        /// Day to sync (YYYY-MM-DD, UTC); defaults to yesterday
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Replace the table's contents with this day's orders instead of appending
        #[arg(long)]
        replace: bool,
    },
    /// Fetch and transform one day of orders and report coercion failures without loading
    Validate {
        /// Day to check (YYYY-MM-DD, UTC); defaults to yesterday
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Create the destination table with daily partitioning
    CreateTable,
    /// Print the BigQuery schema generated from the table definition
    Schema {
        /// Table definition file
        #[arg(
            long,
            env = "WOOETL_TABLE_CONFIG_PATH",
            default_value = "./config/orders_table.yaml"
        )]
        table: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Commands::Schema { table } = &cli.command {
        init_tracing("info")?;
        return print_schema(table);
    }

    let config = wooetl_core::load_app_config().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "loaded configuration");

    let table = load_table(&config)?;
    let result = match cli.command {
        Commands::Run { date, replace } => {
            let mode = if replace {
                WriteMode::Replace
            } else {
                WriteMode::Append
            };
            cmd_run(&config, &table, date.unwrap_or_else(yesterday_utc), mode).await
        }
        Commands::Validate { date } => {
            cmd_validate(&config, &table, date.unwrap_or_else(yesterday_utc)).await
        }
        Commands::CreateTable => cmd_create_table(&config, &table).await,
        Commands::Schema { .. } => Ok(()),
    };

    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "command failed");
    }
    result
}

/// `RUST_LOG` wins over the configured level. Logs go to stderr so `schema`
/// output stays pipeable.
fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_table(config: &AppConfig) -> anyhow::Result<TableConfig> {
    wooetl_core::load_table_config(&config.table_config_path).with_context(|| {
        format!(
            "failed to load table definition {}",
            config.table_config_path.display()
        )
    })
}

fn build_woo_client(config: &AppConfig) -> anyhow::Result<WooClient> {
    WooClient::new(
        &config.woo_store_url,
        &config.woo_consumer_key,
        &config.woo_consumer_secret,
        config.woo_request_timeout_secs,
        &config.woo_user_agent,
        config.woo_page_size,
    )
    .context("failed to build WooCommerce client")
}

fn build_bigquery_client(config: &AppConfig) -> anyhow::Result<BigQueryClient> {
    BigQueryClient::new(
        &config.bq_project,
        &config.bq_access_token,
        config.woo_request_timeout_secs,
        PollPolicy::new(config.bq_poll_interval_ms, config.bq_max_polls),
    )
    .context("failed to build BigQuery client")
}

async fn cmd_run(
    config: &AppConfig,
    table: &TableConfig,
    date: NaiveDate,
    mode: WriteMode,
) -> anyhow::Result<()> {
    let woo = build_woo_client(config)?;
    let warehouse = build_bigquery_client(config)?;

    match run_daily(&woo, &warehouse, table, &IsoLookup, date, mode).await? {
        RunOutcome::Empty => println!("no orders for {date}; nothing loaded"),
        RunOutcome::Loaded { rows, job_id } => println!(
            "loaded {rows} rows for {date} into {} (job {job_id})",
            warehouse.qualified_name(table)
        ),
    }
    Ok(())
}

async fn cmd_validate(
    config: &AppConfig,
    table: &TableConfig,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let woo = build_woo_client(config)?;
    let report = validate_day(&woo, table, &IsoLookup, date).await?;

    println!(
        "{date}: {} orders, {} coercion failures",
        report.orders,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {failure}");
    }

    if !report.failures.is_empty() {
        anyhow::bail!(
            "{} value(s) for {date} would fail type coercion",
            report.failures.len()
        );
    }
    Ok(())
}

async fn cmd_create_table(config: &AppConfig, table: &TableConfig) -> anyhow::Result<()> {
    let warehouse = build_bigquery_client(config)?;
    match warehouse.create_table(table).await {
        Ok(()) => println!("created {}", warehouse.qualified_name(table)),
        Err(WarehouseError::TableExists { table: name }) => println!("{name} already exists"),
        Err(e) => return Err(e).context("failed to create table"),
    }
    Ok(())
}

fn print_schema(path: &Path) -> anyhow::Result<()> {
    let table = wooetl_core::load_table_config(path)
        .with_context(|| format!("failed to load table definition {}", path.display()))?;
    let schema = serde_json::to_string_pretty(&table_schema(&table.columns))
        .context("failed to render schema")?;
    println!("{schema}");
    Ok(())
}
