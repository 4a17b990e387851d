use crate::error::{CliError, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tamesis_core::render::RenderOptions;
use tamesis_core::simulations;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tamesis")]
#[command(about = "Runs the TAMESIS simulation gallery and renders its figures")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List every registered simulation
    List,
    /// Run a single simulation in this process
    Run(RunArgs),
    /// Run a batch of simulations, each in its own child process
    RunAll(RunAllArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Simulation id, as printed by `tamesis list`
    pub id: String,

    #[arg(short, long, default_value = "imgs")]
    pub output_dir: PathBuf,

    /// Override the simulation's default seed
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Skip the JSON sidecar next to each figure
    #[arg(long)]
    pub no_metadata: bool,
}

impl RunArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            write_metadata: !self.no_metadata,
        }
    }
}

impl Validate for RunArgs {
    fn validate(&self) -> Result<()> {
        validate_simulation_id(&self.id)?;
        validate_dimensions(self.width, self.height)
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunAllArgs {
    /// TOML file with output, runner and seed settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overrides `output.directory`
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Overrides `runner.timeout_seconds`
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl RunAllArgs {
    /// Loads the configuration file (or defaults) and applies flag overrides.
    pub fn resolve(&self) -> Result<RunnerConfig> {
        let mut config = match &self.config {
            Some(path) => RunnerConfig::from_file(path)?,
            None => RunnerConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.runner.timeout_seconds = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    pub output: OutputConfig,
    pub runner: BatchConfig,
    /// Per-simulation seed overrides keyed by id.
    pub seeds: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub width: u32,
    pub height: u32,
    pub write_metadata: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            directory: PathBuf::from("imgs"),
            width: render.width,
            height: render.height,
            write_metadata: render.write_metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    pub timeout_seconds: u64,
    /// Empty means every registered simulation, in registry order.
    pub simulations: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            simulations: Vec::new(),
        }
    }
}

impl RunnerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.output.width,
            height: self.output.height,
            write_metadata: self.output.write_metadata,
        }
    }

    pub fn selected_simulations(&self) -> Vec<String> {
        if self.runner.simulations.is_empty() {
            simulations::ids().into_iter().map(String::from).collect()
        } else {
            self.runner.simulations.clone()
        }
    }

    pub fn seed_for(&self, id: &str) -> Option<u64> {
        self.seeds.get(id).copied()
    }
}

impl Validate for RunnerConfig {
    fn validate(&self) -> Result<()> {
        validate_dimensions(self.output.width, self.output.height)?;
        if self.runner.timeout_seconds == 0 {
            return Err(CliError::config("runner.timeout_seconds must be greater than 0"));
        }
        if self.output.directory.as_os_str().is_empty() {
            return Err(CliError::config("output.directory cannot be empty"));
        }
        for id in self.runner.simulations.iter().chain(self.seeds.keys()) {
            validate_simulation_id(id)?;
        }
        Ok(())
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    let options = RenderOptions {
        width,
        height,
        write_metadata: false,
    };
    options.validate().map_err(|e| CliError::config(e.to_string()))
}

pub fn validate_simulation_id(id: &str) -> Result<()> {
    let ids = simulations::ids();
    if ids.iter().any(|known| *known == id) {
        Ok(())
    } else {
        Err(CliError::UnknownSimulation {
            id: id.to_string(),
            available: ids.join(", "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = RunnerConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.output.directory, PathBuf::from("imgs"));
        assert_eq!(config.runner.timeout_seconds, 60);
        assert_eq!(config.selected_simulations().len(), 17);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = RunnerConfig::from_toml_str(
            r#"
[runner]
simulations = ["viral_tardis"]

[seeds]
viral_tardis = 9
"#,
        )
        .expect("parses");
        assert_eq!(config.selected_simulations(), vec!["viral_tardis".to_string()]);
        assert_eq!(config.seed_for("viral_tardis"), Some(9));
        assert_eq!(config.seed_for("entropic_dna"), None);
        assert_eq!(config.output.width, 1200);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = RunnerConfig::from_toml_str("[output]\ncolour = \"red\"\n").expect_err("unknown key");
        assert!(matches!(err, CliError::Toml(_)));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = RunnerConfig::default();
        config.runner.timeout_seconds = 0;
        assert!(matches!(config.validate(), Err(CliError::Config { .. })));

        let mut config = RunnerConfig::default();
        config.output.width = 50;
        assert!(matches!(config.validate(), Err(CliError::Config { .. })));

        let mut config = RunnerConfig::default();
        config.seeds.insert("warp_drive".into(), 1);
        assert!(matches!(config.validate(), Err(CliError::UnknownSimulation { .. })));
    }

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from(["tamesis", "run", "reality_patch", "--seed", "5", "--no-metadata"])
            .expect("valid args");
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.id, "reality_patch");
                assert_eq!(args.seed, Some(5));
                assert!(!args.render_options().write_metadata);
                assert!(args.validate().is_ok());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_config_file_values() {
        let args = RunAllArgs {
            config: None,
            output_dir: Some(PathBuf::from("out")),
            timeout_secs: Some(5),
        };
        let config = args.resolve().expect("valid");
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.runner.timeout_seconds, 5);
    }
}
