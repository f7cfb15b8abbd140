//! Report per-user translation and review statistics from Zanata.
//!
//! Reads the language-team roster, queries the platform's contributor
//! statistics endpoint for every translator over a date range, and writes
//! a flattened CSV or a JSON report.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use i18n_check::config::Config;
use i18n_check::roster;
use i18n_check::stats::{self, StatsRequest};
use i18n_check::zanata::Client;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "zanata-stats",
    about = "Report per-user translation statistics from a Zanata platform",
    version
)]
struct Cli {
    /// Start of the reporting period (YYYY-MM-DD); default 180 days ago
    #[arg(short = 's', long)]
    start_date: Option<String>,

    /// End of the reporting period (YYYY-MM-DD); default today
    #[arg(short = 'e', long)]
    end_date: Option<String>,

    /// Output file; default zanata_stats_output.{csv,json}
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Project id(s), comma-separated
    #[arg(short = 'p', long, required = true, value_delimiter = ',')]
    project: Vec<String>,

    /// Language code(s) like zh-CN or ja, comma-separated; default all
    /// roster languages
    #[arg(short = 'l', long, value_delimiter = ',')]
    lang: Vec<String>,

    /// Version id(s), comma-separated
    #[arg(short = 't', long, required = true, value_delimiter = ',')]
    target_version: Vec<String>,

    /// User id(s), comma-separated; default every roster translator
    #[arg(short = 'u', long, value_delimiter = ',')]
    user: Vec<String>,

    /// Also output users with no recorded activity
    #[arg(long)]
    include_no_activities: bool,

    /// Output file format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// YAML roster file listing the language teams
    roster: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_check=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // A single project and version per run; the contributor endpoint is
    // queried per (project, version, user) and mixing multiple targets in
    // one report hides which one contributed what.
    if cli.project.len() > 1 || cli.target_version.len() > 1 {
        bail!("specifying multiple projects or multiple target versions is not supported");
    }
    let versions: Vec<String> = cli
        .target_version
        .iter()
        .map(|v| v.replace('/', "-"))
        .collect();

    let today = Utc::now().date_naive();
    let start_date = cli
        .start_date
        .unwrap_or_else(|| (today - chrono::Duration::days(180)).format("%Y-%m-%d").to_string());
    let end_date = cli
        .end_date
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    let teams = roster::load(&cli.roster, &cli.lang)?;
    info!(
        "loaded {} language team(s) from {}",
        teams.len(),
        cli.roster.display()
    );

    let config = Config::from_env()?;
    let client = Client::new(&config.zanata_api_url)?;

    let request = StatsRequest {
        projects: cli.project,
        versions,
        users: cli.user,
        start_date,
        end_date,
    };
    let collected = stats::collect_stats(&client, &teams, &request).await?;
    let rows = stats::report_rows(collected, cli.include_no_activities);

    let output_file = cli.output_file.unwrap_or_else(|| {
        PathBuf::from(format!("zanata_stats_output.{}", cli.format.extension()))
    });
    match cli.format {
        OutputFormat::Csv => stats::write_csv(&output_file, &rows)
            .with_context(|| format!("failed to write {}", output_file.display()))?,
        OutputFormat::Json => stats::write_json(&output_file, &rows)
            .with_context(|| format!("failed to write {}", output_file.display()))?,
    }

    info!("reported {} user(s)", rows.len());
    Ok(())
}
