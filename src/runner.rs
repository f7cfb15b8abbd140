//! Gate orchestration.
//!
//! The four gates are independent and share nothing, so the runner joins
//! them concurrently and aggregates their outcomes. Per-gate diagnostics
//! are preserved verbatim; the overall run fails if any selected gate
//! fails.

use crate::catalog;
use crate::config::Config;
use crate::docs::DocsBuilder;
use crate::error::CheckError;
use crate::roster;
use crate::style;
use futures::future::BoxFuture;
use tracing::{error, info};

/// One of the validation gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Docs,
    Style,
    Catalogs,
    Roster,
}

impl Gate {
    pub fn name(&self) -> &'static str {
        match self {
            Gate::Docs => "docs",
            Gate::Style => "style",
            Gate::Catalogs => "catalogs",
            Gate::Roster => "roster",
        }
    }
}

/// Result of running one gate.
#[derive(Debug)]
pub struct GateOutcome {
    pub gate: Gate,
    /// `Ok` holds a short human summary; `Err` the gate's failure.
    pub result: Result<String, CheckError>,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

async fn run_gate(config: &Config, gate: Gate) -> GateOutcome {
    let result = match gate {
        Gate::Roster => roster::check_syntax(&config.roster_path())
            .map(|_| format!("{} is well-formed", config.roster_file.display())),
        Gate::Catalogs => catalog::check_catalogs(config)
            .map(|report| format!("{} catalog file(s) clean", report.files_checked)),
        Gate::Style => style::check_style(config)
            .map(|report| format!("{} file(s) style-clean", report.files_checked)),
        Gate::Docs => DocsBuilder::from_config(config)
            .build()
            .await
            .map(|report| format!("built with `{}`", report.command)),
    };
    GateOutcome { gate, result }
}

/// Run the selected gates concurrently and collect their outcomes in the
/// order given.
pub async fn run_gates(config: &Config, gates: &[Gate]) -> Vec<GateOutcome> {
    let mut futures: Vec<BoxFuture<'_, GateOutcome>> = Vec::with_capacity(gates.len());
    for &gate in gates {
        futures.push(Box::pin(run_gate(config, gate)));
    }
    futures::future::join_all(futures).await
}

/// Log a per-gate summary and return whether every gate passed.
pub fn report(outcomes: &[GateOutcome]) -> bool {
    let mut all_passed = true;
    for outcome in outcomes {
        match &outcome.result {
            Ok(summary) => info!("PASS {}: {}", outcome.gate.name(), summary),
            Err(err) => {
                all_passed = false;
                error!("FAIL {} ({})\n{}", outcome.gate.name(), err.kind(), err);
            }
        }
    }
    all_passed
}
