use anyhow::Result;
use clap::{Parser, Subcommand};
use paisa::config::AppConfig;
use paisa::error::ExtractError;
use paisa::jobs::{Job, RunOptions, run_job};
use paisa::publish::PublishOutcome;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "paisa", about = "Indian financial data extraction jobs")]
struct Cli {
    /// Publish the document to the configured JSON blob.
    #[arg(long, default_value_t = false)]
    save: bool,

    /// Read the source payload from a file instead of fetching it.
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Also write the document to a file.
    #[arg(long)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Currency list from the search API.
    CurrencyList,
    /// Bank directory grouped by sector.
    BanksInIndia,
    /// Income-tax slab tables from the tax portal.
    IncomeTaxSlabs,
    /// RBI policy-rate archive.
    PolicyRates,
    /// IBJA gold and silver session rates.
    GoldRates,
    /// India Post current savings-scheme rates.
    PostOfficeSchemes,
    /// India Post historic savings-scheme rates.
    PostOfficeHistoricRates,
}

impl Commands {
    fn job(&self) -> Job {
        match self {
            Commands::CurrencyList => Job::CurrencyList,
            Commands::BanksInIndia => Job::BanksInIndia,
            Commands::IncomeTaxSlabs => Job::IncomeTaxSlabs,
            Commands::PolicyRates => Job::PolicyRates,
            Commands::GoldRates => Job::GoldRates,
            Commands::PostOfficeSchemes => Job::PostOfficeSchemes,
            Commands::PostOfficeHistoricRates => Job::PostOfficeHistoricRates,
        }
    }
}

fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    let job = cli.command.job();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "configuration rejected");
            return ExitCode::from(err.exit_code());
        }
    };

    let options = RunOptions {
        save: cli.save,
        from_file: cli.from_file,
        out: cli.out,
    };

    match run_job(job, &config, &options) {
        Ok(report) => {
            let published = match report.published {
                Some(PublishOutcome::Saved) => "saved",
                Some(PublishOutcome::SkippedMissingId) => "skipped",
                None => "not requested",
            };
            info!(
                job = report.job.key(),
                rows = report.rows,
                anomalies = report.anomalies,
                published,
                "job complete"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            match &err {
                ExtractError::EmptyResult(_) => {
                    warn!(job = job.key(), error = %err, "nothing to publish");
                }
                _ => error!(job = job.key(), error = %err, "job failed"),
            }
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
