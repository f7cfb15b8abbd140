use anyhow::Result;
use clap::{Parser, ValueEnum};
use i18n_check::config::Config;
use i18n_check::runner::{self, Gate};
use std::path::PathBuf;
use tracing::info;

/// Named gate environments, mirroring the repository's historical
/// test-runner targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TestEnv {
    /// Documentation build only
    Docs,
    /// Style, catalog, and roster gates
    Pep8,
    /// Everything
    All,
}

impl TestEnv {
    fn gates(self) -> Vec<Gate> {
        match self {
            TestEnv::Docs => vec![Gate::Docs],
            TestEnv::Pep8 => vec![Gate::Style, Gate::Catalogs, Gate::Roster],
            TestEnv::All => vec![Gate::Docs, Gate::Style, Gate::Catalogs, Gate::Roster],
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "i18n-check",
    about = "Run the release validation gates of an i18n repository",
    version
)]
struct Cli {
    /// Repository root to validate
    #[arg(long, env = "REPO_ROOT")]
    repo: Option<PathBuf>,

    /// Which gate environment to run
    #[arg(long, value_enum, default_value_t = TestEnv::All)]
    env: TestEnv,

    /// Roster file, relative to the repository root
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Documentation builder command
    #[arg(long)]
    builder: Option<String>,

    /// Maximum allowed line length for the style gate
    #[arg(long)]
    max_line_length: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in CI)
    let _ = dotenvy::dotenv();

    // Initialize logging; diagnostics belong on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_check=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(repo) = cli.repo {
        config.repo_root = repo;
    }
    if let Some(roster) = cli.roster {
        config.roster_file = roster;
    }
    if let Some(builder) = cli.builder {
        config.docs_builder = builder;
    }
    if let Some(limit) = cli.max_line_length {
        config.max_line_length = limit;
    }

    let gates = cli.env.gates();
    info!(
        "Running {} gate(s) against {}",
        gates.len(),
        config.repo_root.display()
    );

    let outcomes = runner::run_gates(&config, &gates).await;
    if runner::report(&outcomes) {
        info!("All gates passed");
        Ok(())
    } else {
        std::process::exit(1);
    }
}
