//! Polymer growth by random chance versus growth biased by an Ω attractor.

use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct AbiogenesisOmega;

const ATTEMPTS: usize = 1000;
const TARGET_COMPLEXITY: u32 = 50;
const LINK_PROB: f64 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct ChainProgress {
    pub random: Vec<f64>,
    pub omega: Vec<f64>,
    /// Attempt at which the Ω chain reached the target.
    pub life_iteration: Option<usize>,
}

/// Grows both chains for up to `attempts` steps.
///
/// The random chain resets on every failure; the Ω chain only loses one link.
/// Once the Ω chain reaches `target`, both series are padded to `attempts`
/// entries (Ω at the target, random held at its last value) and the loop stops.
pub fn grow_chains(rng: &mut impl Rng, attempts: usize, target: u32) -> ChainProgress {
    let omega_prob = LINK_PROB * OMEGA.ln();
    let mut random_chain = 0u32;
    let mut omega_chain = 0u32;
    let mut progress = ChainProgress::default();

    for t in 0..attempts {
        random_chain = if rng.random::<f64>() < LINK_PROB { random_chain + 1 } else { 0 };
        omega_chain = if rng.random::<f64>() < omega_prob {
            omega_chain + 1
        } else {
            omega_chain.saturating_sub(1)
        };
        progress.random.push(f64::from(random_chain));
        progress.omega.push(f64::from(omega_chain));

        if omega_chain >= target {
            progress.life_iteration = Some(t);
            progress.random.resize(attempts, f64::from(random_chain));
            progress.omega.resize(attempts, f64::from(target));
            break;
        }
    }
    progress
}

impl Simulation for AbiogenesisOmega {
    fn id(&self) -> &'static str {
        "abiogenesis_omega"
    }

    fn title(&self) -> &'static str {
        "Origin of life: random chance vs Omega attractor"
    }

    fn default_seed(&self) -> u64 {
        117
    }

    fn output_file(&self) -> &'static str {
        "abiogenesis_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let progress = grow_chains(rng, ATTEMPTS, TARGET_COMPLEXITY);
        match progress.life_iteration {
            Some(t) => tracing::info!(iteration = t, "Omega chain reached minimum complexity"),
            None => tracing::info!("minimum complexity never reached"),
        }

        let panel = Panel::new(self.title(), "Iterations (cosmic time)", "Polymer complexity")
            .with_series(
                Series::indexed("Random chance", Color::RED, SeriesStyle::Line, &progress.random).with_width(1),
            )
            .with_series(Series::indexed("Omega attractor", Color::BLUE, SeriesStyle::Line, &progress.omega))
            .with_guide(Guide::HLine {
                y: f64::from(TARGET_COMPLEXITY),
                color: Color::GREEN,
                label: Some("Minimum complexity for life".to_string()),
            });

        Ok(SimulationOutput::new(Figure::single(self.title(), panel)).with_metric(
            "life_iteration",
            progress.life_iteration.map_or(-1.0, |t| t as f64),
        ))
    }
}
