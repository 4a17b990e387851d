//! Single-simulation and batch execution.
//!
//! A batch runs every simulation as a child process of the `tamesis` binary so
//! that a timeout can actually stop a runaway computation: dropping the wait
//! future kills the child.

use crate::config::RunnerConfig;
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tamesis_core::render::RenderOptions;
use tamesis_core::simulations::{self, SimulationReport};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

pub const SUMMARY_FILE: &str = "run_summary.json";

/// Runs one simulation in this process on a blocking worker thread.
pub async fn run_single(
    id: &str,
    seed: Option<u64>,
    out_dir: &Path,
    options: RenderOptions,
) -> Result<SimulationReport> {
    crate::config::validate_simulation_id(id)?;
    let id = id.to_string();
    let out_dir = out_dir.to_path_buf();
    let report = tokio::task::spawn_blocking(move || {
        let simulation = simulations::find(&id)
            .ok_or_else(|| anyhow::anyhow!("Simulation {id} disappeared from the registry"))?;
        simulations::execute(simulation.as_ref(), seed, &out_dir, &options)
    })
    .await
    .map_err(|e| CliError::Simulation(anyhow::anyhow!("Simulation task panicked: {e}")))??;

    for (name, value) in &report.metrics {
        info!(simulation = %report.id, "{name} = {value:.4}");
    }
    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Succeeded,
    Failed { code: Option<i32> },
    TimedOut,
    Error { message: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub id: String,
    #[serde(flatten)]
    pub outcome: RunOutcome,
    pub elapsed_seconds: f64,
    /// Last lines of the child's stderr, when it wrote any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_tail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<String>,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    fn record(&mut self, entry: BatchEntry) {
        self.total += 1;
        if entry.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed.push(entry.id.clone());
        }
        self.entries.push(entry);
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn write_summary(&self) -> Result<PathBuf> {
        let path = self.output_dir.join(SUMMARY_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

fn tail(bytes: &[u8], lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

/// Maps a finished child to its outcome. Non-empty stderr is echoed as a warning
/// and kept in the entry whether or not the child succeeded.
fn classify(id: &str, output: &Output) -> (RunOutcome, Option<String>) {
    debug!(simulation = id, "child stdout: {}", tail(&output.stdout, 5));
    let stderr = tail(&output.stderr, 20);
    let stderr = if stderr.trim().is_empty() {
        None
    } else {
        warn!(simulation = id, "child stderr:\n{stderr}");
        Some(stderr)
    };
    let outcome = if output.status.success() {
        RunOutcome::Succeeded
    } else {
        RunOutcome::Failed {
            code: output.status.code(),
        }
    };
    (outcome, stderr)
}

/// Runs `program run <id> ...` once and classifies how it ended.
pub async fn run_child(
    program: &Path,
    id: &str,
    seed: Option<u64>,
    config: &RunnerConfig,
    timeout: Duration,
) -> BatchEntry {
    let started = Instant::now();
    let options = config.render_options();
    let mut cmd = Command::new(program);
    cmd.arg("run")
        .arg(id)
        .arg("--output-dir")
        .arg(&config.output.directory)
        .arg("--width")
        .arg(options.width.to_string())
        .arg("--height")
        .arg(options.height.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(seed) = seed {
        cmd.arg("--seed").arg(seed.to_string());
    }
    if !options.write_metadata {
        cmd.arg("--no-metadata");
    }

    let mut stderr_tail = None;
    let outcome = match cmd.spawn() {
        Err(e) => RunOutcome::Error {
            message: format!("Failed to spawn {}: {e}", program.display()),
        },
        Ok(child) => match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => RunOutcome::TimedOut,
            Ok(Err(e)) => RunOutcome::Error {
                message: format!("Error waiting for child: {e}"),
            },
            Ok(Ok(output)) => {
                let (outcome, stderr) = classify(id, &output);
                stderr_tail = stderr;
                outcome
            }
        },
    };

    BatchEntry {
        id: id.to_string(),
        outcome,
        elapsed_seconds: started.elapsed().as_secs_f64(),
        stderr_tail,
    }
}

/// Runs every selected simulation in order, continuing past failures, and
/// writes `run_summary.json` into the output directory.
pub async fn run_batch(program: &Path, config: &RunnerConfig) -> Result<BatchReport> {
    std::fs::create_dir_all(&config.output.directory)?;
    let timeout = Duration::from_secs(config.runner.timeout_seconds);
    let selected = config.selected_simulations();
    let mut report = BatchReport {
        output_dir: config.output.directory.clone(),
        ..BatchReport::default()
    };

    info!(count = selected.len(), dir = %config.output.directory.display(), "starting batch");
    for (index, id) in selected.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, selected.len(), id);
        let entry = run_child(program, id, config.seed_for(id), config, timeout).await;
        match &entry.outcome {
            RunOutcome::Succeeded => {
                info!(simulation = %id, elapsed = entry.elapsed_seconds, "succeeded")
            }
            RunOutcome::Failed { code } => error!(simulation = %id, ?code, "failed"),
            RunOutcome::TimedOut => {
                warn!(simulation = %id, timeout_secs = timeout.as_secs(), "timed out")
            }
            RunOutcome::Error { message } => error!(simulation = %id, "{message}"),
        }
        report.record(entry);
    }

    let summary = report.write_summary()?;
    info!(
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        "batch finished, summary at {}",
        summary.display()
    );
    if report.has_failures() {
        warn!("failed simulations: {}", report.failed.join(", "));
    }
    Ok(report)
}
