//! Entropic selection of short DNA sequences.
//!
//! A population of random 50-mers mutates at a rate that decays with each
//! sequence's Ω resonance; mutations that lose resonance are usually rejected.

use super::{Simulation, SimulationOutput};
use crate::constants::{OMEGA, TEMP_UNRUH};
use crate::numeric::mean;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::sequence::DnaSequence;
use crate::spectral::resonance_amplitude;
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::Rng;

pub struct EntropicDna;

#[derive(Debug, Clone)]
pub struct EvolutionParams {
    pub population: usize,
    pub length: usize,
    pub generations: usize,
    /// Probability of rejecting a mutation that lowered resonance.
    pub rejection: f64,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population: 10,
            length: 50,
            generations: 200,
            rejection: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvolutionHistory {
    pub stability: Vec<f64>,
    pub entropy: Vec<f64>,
}

pub fn omega_resonance(sequence: &DnaSequence) -> Result<f64> {
    resonance_amplitude(&sequence.numeric_signal(), 1.0 / OMEGA.sqrt())
}

/// Attempts a single point mutation; returns whether the sequence changed.
fn entropic_mutation(rng: &mut impl Rng, sequence: &mut DnaSequence) -> Result<bool> {
    let stability = omega_resonance(sequence)? * 0.1;
    let mutation_prob = (-stability / TEMP_UNRUH).exp() * 0.05;
    let idx = rng.random_range(0..sequence.len());
    if rng.random::<f64>() < mutation_prob {
        let bases = sequence.bases_mut();
        bases[idx] = bases[idx].random_other(rng);
        return Ok(true);
    }
    Ok(false)
}

pub fn evolve(rng: &mut impl Rng, params: &EvolutionParams) -> Result<EvolutionHistory> {
    if params.population == 0 || params.length == 0 {
        bail!("Population and sequence length must be positive.");
    }
    let mut population: Vec<DnaSequence> = (0..params.population)
        .map(|_| DnaSequence::random(rng, params.length))
        .collect();
    let mut history = EvolutionHistory::default();

    for generation in 0..params.generations {
        let mut next = Vec::with_capacity(population.len());
        let mut stabilities = Vec::with_capacity(population.len());
        let mut entropies = Vec::with_capacity(population.len());

        for parent in &population {
            let mut child = parent.clone();
            let mutated = entropic_mutation(rng, &mut child)?;
            let child_resonance = omega_resonance(&child)?;

            let reject = mutated
                && child_resonance < omega_resonance(parent)?
                && rng.random::<f64>() < params.rejection;

            entropies.push(child.shannon_entropy());
            stabilities.push(child_resonance);
            next.push(if reject { parent.clone() } else { child });
        }

        population = next;
        history.stability.push(mean(&stabilities));
        history.entropy.push(mean(&entropies));
        if generation % 10 == 0 {
            tracing::debug!(generation, stability = mean(&stabilities), "evolution step");
        }
    }
    Ok(history)
}

fn banded(values: &[f64], label: &str, color: Color) -> (Series, Series) {
    let x: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    let lower: Vec<f64> = values.iter().map(|v| v * 0.95).collect();
    let upper: Vec<f64> = values.iter().map(|v| v * 1.05).collect();
    (
        Series::band(format!("{label} ±5%"), color, &x, &lower, &upper),
        Series::indexed(label, color, SeriesStyle::Line, values).with_width(3),
    )
}

impl Simulation for EntropicDna {
    fn id(&self) -> &'static str {
        "entropic_dna"
    }

    fn title(&self) -> &'static str {
        "Entropic DNA evolution"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "tardis_evolution_plot.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        tracing::info!("Unruh temperature {:.2}", TEMP_UNRUH);
        let history = evolve(rng, &EvolutionParams::default())?;

        let tail = history.stability.len().saturating_sub(20);
        let convergence = mean(&history.stability[tail..]);

        let (stab_band, stab_line) = banded(&history.stability, "Ω resonance", Color::BLUE);
        let stability = Panel::new("(a) Stability evolution", "Generation", "Ω resonance (a.u.)")
            .with_series(stab_band)
            .with_series(stab_line)
            .with_guide(Guide::HLine {
                y: convergence,
                color: Color::GRAY,
                label: Some(format!("Convergence: {convergence:.1}")),
            });

        let (ent_band, ent_line) = banded(&history.entropy, "Shannon entropy", Color::RED);
        let mid = history.entropy.len() / 2;
        let mut entropy = Panel::new("(b) Entropic optimization", "Generation", "Shannon entropy (bits)")
            .with_series(ent_band)
            .with_series(ent_line);
        if let Some(&value) = history.entropy.get(mid) {
            entropy = entropy.with_guide(Guide::Annotation {
                x: mid as f64,
                y: value,
                text: "Selection pressure".to_string(),
            });
        }

        let final_stability = history.stability.last().copied().unwrap_or_default();
        let final_entropy = history.entropy.last().copied().unwrap_or_default();
        tracing::info!(final_stability, final_entropy, convergence, "evolution finished");

        Ok(SimulationOutput::new(Figure::columns(self.title(), vec![stability, entropy]))
            .with_metric("final_stability", final_stability)
            .with_metric("final_entropy", final_entropy)
            .with_metric("convergence", convergence))
    }
}
