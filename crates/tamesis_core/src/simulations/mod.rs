//! The experiment gallery.
//!
//! Every experiment is a unit struct implementing [`Simulation`]; the registry
//! lists them in the order the batch runner executes them.

pub mod abiogenesis_omega;
pub mod base_editing_thermo;
pub mod cas9_flow;
pub mod chrono_telephony;
pub mod consciousness_resonance;
pub mod entropic_dna;
pub mod entropy_reversal;
pub mod epigenetic_bits;
pub mod grna_entropy;
pub mod holographic_dna;
pub mod mind_upload_sim;
pub mod multiverse_map;
pub mod omega_stability;
pub mod pe_entropy;
pub mod population_omega;
pub mod reality_patch;
pub mod viral_tardis;

pub use crate::traits::Simulation;

use crate::plot::Figure;
use crate::render::{save_figure, RenderOptions};
use crate::rng::seeded;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// What a simulation hands back: the figure to render and its headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub figure: Figure,
    pub metrics: BTreeMap<String, f64>,
}

impl SimulationOutput {
    pub fn new(figure: Figure) -> Self {
        Self {
            figure,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.metrics.insert(name.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub id: String,
    pub seed: u64,
    pub output: PathBuf,
    pub metrics: BTreeMap<String, f64>,
    pub elapsed_seconds: f64,
}

pub fn registry() -> Vec<Box<dyn Simulation>> {
    vec![
        Box::new(entropic_dna::EntropicDna),
        Box::new(omega_stability::OmegaStability),
        Box::new(holographic_dna::HolographicDna),
        Box::new(grna_entropy::GrnaEntropy),
        Box::new(cas9_flow::Cas9Flow),
        Box::new(pe_entropy::PrimeEditing),
        Box::new(epigenetic_bits::EpigeneticBits),
        Box::new(base_editing_thermo::BaseEditingThermo),
        Box::new(population_omega::PopulationOmega),
        Box::new(consciousness_resonance::ConsciousnessResonance),
        Box::new(viral_tardis::ViralTardis),
        Box::new(abiogenesis_omega::AbiogenesisOmega),
        Box::new(mind_upload_sim::MindUpload),
        Box::new(reality_patch::RealityPatch),
        Box::new(chrono_telephony::ChronoTelephony),
        Box::new(multiverse_map::MultiverseMap),
        Box::new(entropy_reversal::EntropyReversal),
    ]
}

pub fn find(id: &str) -> Option<Box<dyn Simulation>> {
    registry().into_iter().find(|sim| sim.id() == id)
}

pub fn ids() -> Vec<&'static str> {
    registry().iter().map(|sim| sim.id()).collect()
}

/// Seeds, runs and renders one simulation into `out_dir`.
pub fn execute(
    simulation: &dyn Simulation,
    seed: Option<u64>,
    out_dir: &Path,
    options: &RenderOptions,
) -> Result<SimulationReport> {
    let seed = seed.unwrap_or_else(|| simulation.default_seed());
    tracing::info!(simulation = simulation.id(), seed, "starting {}", simulation.title());
    let started = Instant::now();

    let mut rng = seeded(seed);
    let output = simulation
        .run(&mut rng)
        .with_context(|| format!("Simulation {} failed", simulation.id()))?;

    let path = out_dir.join(simulation.output_file());
    let written = save_figure(&output.figure, &path, options)
        .with_context(|| format!("Failed to save figure to {}", path.display()))?;
    for (name, value) in &output.metrics {
        tracing::debug!(simulation = simulation.id(), metric = %name, value, "metric");
    }
    tracing::info!(simulation = simulation.id(), "figure saved to {}", written.display());

    Ok(SimulationReport {
        id: simulation.id().to_string(),
        seed,
        output: written,
        metrics: output.metrics,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_ids_and_files_are_unique() {
        let sims = registry();
        assert_eq!(sims.len(), 17);
        let ids: HashSet<_> = sims.iter().map(|s| s.id()).collect();
        let files: HashSet<_> = sims.iter().map(|s| s.output_file()).collect();
        assert_eq!(ids.len(), 17);
        assert_eq!(files.len(), 17);
        assert!(sims.iter().all(|s| s.output_file().ends_with(".png")));
    }

    #[test]
    fn find_by_id() {
        let sim = find("reality_patch").expect("registered");
        assert_eq!(sim.default_seed(), 117038);
        assert!(find("warp_drive").is_none());
        assert_eq!(ids().first(), Some(&"entropic_dna"));
    }

    #[test]
    fn execute_writes_figure_and_reports_metrics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sim = find("viral_tardis").expect("registered");
        let options = RenderOptions {
            width: 320,
            height: 240,
            write_metadata: false,
        };
        let report = execute(sim.as_ref(), Some(5), dir.path(), &options).expect("execute");
        assert_eq!(report.seed, 5);
        assert!(report.output.exists());
        assert!(report.metrics.contains_key("collapse_cycle"));
    }

    #[test]
    fn every_simulation_is_deterministic_for_a_fixed_seed() {
        let options = RenderOptions {
            width: 320,
            height: 240,
            write_metadata: false,
        };
        for sim in registry() {
            let first_dir = tempfile::tempdir().expect("tempdir");
            let second_dir = tempfile::tempdir().expect("tempdir");
            let first = execute(sim.as_ref(), None, first_dir.path(), &options).expect("first run");
            let second = execute(sim.as_ref(), None, second_dir.path(), &options).expect("second run");
            assert_eq!(first.seed, sim.default_seed());
            assert!(!first.metrics.is_empty(), "{} reports no metrics", sim.id());
            assert_eq!(first.metrics, second.metrics, "{} differs between runs", sim.id());
        }
    }
}
