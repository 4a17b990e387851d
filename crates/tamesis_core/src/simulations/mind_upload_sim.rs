//! Transfer of a weighted neural graph onto a crystal substrate.

use super::{Simulation, SimulationOutput};
use crate::graph::Graph;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct MindUpload;

const NODES: usize = 50;
const STEPS: usize = 100;
const SWITCH_STEP: usize = 50;
const SILICON_RESISTANCE: f64 = 0.5;

/// Small-world brain whose synapses carry `U(0, 1)` weights.
pub fn neural_graph(rng: &mut impl Rng, nodes: usize) -> Result<Graph> {
    let mut graph = Graph::watts_strogatz(rng, nodes, 6, 0.3)?;
    for (u, v) in graph.edges() {
        graph.set_weight(u, v, rng.random::<f64>())?;
    }
    Ok(graph)
}

#[derive(Debug, Clone, Default)]
pub struct UploadTrace {
    pub integrity: Vec<f64>,
    pub heat: Vec<f64>,
}

/// Integrity and thermal loss per step. The substrate switches to a lossless
/// crystal after `switch`.
pub fn upload(rng: &mut impl Rng, steps: usize, switch: usize) -> UploadTrace {
    let mut trace = UploadTrace::default();
    for t in 0..steps {
        let resistance = if t > switch { 0.0 } else { SILICON_RESISTANCE };
        let integrity = t as f64 / steps as f64 * (1.0 - resistance);
        let heat = resistance * rng.random::<f64>();
        trace.integrity.push(integrity * 100.0);
        trace.heat.push(heat * 100.0);
    }
    trace
}

impl Simulation for MindUpload {
    fn id(&self) -> &'static str {
        "mind_upload_sim"
    }

    fn title(&self) -> &'static str {
        "Mind upload: silicon vs Omega crystal"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "mind_upload_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let brain = neural_graph(rng, NODES)?;
        let crystal = Graph::erdos_renyi(rng, NODES, 0.1)?;
        let source_entropy = brain.spectral_entropy();
        let crystal_entropy = crystal.spectral_entropy();
        tracing::info!(source_entropy, crystal_entropy, "substrates prepared");

        let trace = upload(rng, STEPS, SWITCH_STEP);
        let panel = Panel::new(self.title(), "Upload progress (%)", "Percentage")
            .with_series(Series::indexed(
                "Consciousness integrity (%)",
                Color::BLUE,
                SeriesStyle::Line,
                &trace.integrity,
            ))
            .with_series(Series::indexed(
                "Entropic loss (thermal lobotomy)",
                Color::RED,
                SeriesStyle::Dashed,
                &trace.heat,
            ))
            .with_guide(Guide::VLine {
                x: SWITCH_STEP as f64,
                color: Color::GOLD,
                label: Some("Switch to Omega crystal".to_string()),
            })
            .with_guide(Guide::Annotation {
                x: 25.0,
                y: 25.0,
                text: "Critical loss of self".to_string(),
            })
            .with_guide(Guide::Annotation {
                x: 90.0,
                y: 90.0,
                text: "Successful upload".to_string(),
            });

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("source_entropy", source_entropy)
            .with_metric("crystal_entropy", crystal_entropy)
            .with_metric("final_integrity", trace.integrity.last().copied().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn crystal_phase_is_lossless() {
        let trace = upload(&mut seeded(42), STEPS, SWITCH_STEP);
        assert_eq!(trace.integrity.len(), STEPS);
        assert!(trace.heat[SWITCH_STEP + 1..].iter().all(|&h| h == 0.0));
        assert!(trace.heat[..=SWITCH_STEP].iter().all(|&h| (0.0..=50.0).contains(&h)));
        assert!((trace.integrity[STEPS - 1] - 99.0).abs() < 1e-9);
        assert!((trace.integrity[SWITCH_STEP] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_brain_keeps_topology() {
        let brain = neural_graph(&mut seeded(42), NODES).expect("graph");
        assert_eq!(brain.node_count(), NODES);
        assert_eq!(brain.edge_count(), NODES * 3);
        assert!(brain.spectral_entropy() > 0.0);
    }
}
