//! Radiation resistance of Ω-periodic DNA versus random DNA.

use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA_PERIOD;
use crate::numeric::{linspace, mean};
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::sequence::{Base, DnaSequence};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct OmegaStability;

const SEQUENCES_PER_DOSE: usize = 100;
const SEQUENCE_LENGTH: usize = 500;
const DOSE_STEPS: usize = 20;
const RESONANT_NOISE: f64 = 0.05;
/// Damage probability at a position whose periodic neighbours agree with it.
const PROTECTED_DAMAGE: f64 = 0.2;

/// Irradiates `sequence` in place and returns how many positions changed base.
///
/// Positions far enough from both ends are protected when a neighbour one
/// period away carries the same base as the original.
pub fn radiation_damage(rng: &mut impl Rng, sequence: &mut DnaSequence, dose: f64) -> usize {
    let len = sequence.len();
    let bases = sequence.bases_mut();
    let mut mutations = 0;
    for i in 0..len {
        if rng.random::<f64>() >= dose {
            continue;
        }
        let original = bases[i];
        let protected = i > OMEGA_PERIOD
            && i + OMEGA_PERIOD < len
            && (bases[i - OMEGA_PERIOD] == original || bases[i + OMEGA_PERIOD] == original);
        let damage_prob = if protected { PROTECTED_DAMAGE } else { 1.0 };
        if rng.random::<f64>() < damage_prob {
            bases[i] = Base::random(rng);
            if bases[i] != original {
                mutations += 1;
            }
        }
    }
    mutations
}

#[derive(Debug, Clone, Default)]
pub struct DoseResponse {
    pub doses: Vec<f64>,
    pub random: Vec<f64>,
    pub omega: Vec<f64>,
}

pub fn dose_response(rng: &mut impl Rng, steps: usize, sequences: usize, length: usize) -> DoseResponse {
    let doses = linspace(0.0, 0.5, steps);
    let mut response = DoseResponse::default();
    for &dose in &doses {
        let mut random = Vec::with_capacity(sequences);
        let mut omega = Vec::with_capacity(sequences);
        for _ in 0..sequences {
            let mut control = DnaSequence::random(rng, length);
            random.push(radiation_damage(rng, &mut control, dose) as f64);
            let mut resonant = DnaSequence::omega_resonant(rng, length, RESONANT_NOISE);
            omega.push(radiation_damage(rng, &mut resonant, dose) as f64);
        }
        tracing::debug!(dose, random = mean(&random), omega = mean(&omega), "dose evaluated");
        response.random.push(mean(&random));
        response.omega.push(mean(&omega));
    }
    response.doses = doses;
    response
}

/// Relative reduction of mutations at the dose three quarters along the sweep.
pub fn protection_percent(response: &DoseResponse) -> f64 {
    let idx = response.doses.len() * 3 / 4;
    match (response.random.get(idx), response.omega.get(idx)) {
        (Some(&r), Some(&o)) if r > 0.0 => (r - o) / r * 100.0,
        _ => 0.0,
    }
}

impl Simulation for OmegaStability {
    fn id(&self) -> &'static str {
        "omega_stability"
    }

    fn title(&self) -> &'static str {
        "Radiation resistance: topological protection effect"
    }

    fn default_seed(&self) -> u64 {
        117
    }

    fn output_file(&self) -> &'static str {
        "omega_stability_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let response = dose_response(rng, DOSE_STEPS, SEQUENCES_PER_DOSE, SEQUENCE_LENGTH);
        let protection = protection_percent(&response);
        tracing::info!(protection, "protection at high dose");

        let mut panel = Panel::new(
            self.title(),
            "Radiation dose (mutation probability)",
            "Average mutations per 500 bp",
        )
        .with_series(Series::band(
            "Topological protection",
            Color::PURPLE,
            &response.doses,
            &response.omega,
            &response.random,
        ))
        .with_series(
            Series::xy("Random DNA (control)", Color::RED, SeriesStyle::Line, &response.doses, &response.random)
                .with_width(3),
        )
        .with_series(Series::xy(
            "Random DNA markers",
            Color::RED,
            SeriesStyle::Scatter,
            &response.doses,
            &response.random,
        ))
        .with_series(
            Series::xy("Ω-resonant DNA", Color::BLUE, SeriesStyle::Line, &response.doses, &response.omega)
                .with_width(3),
        )
        .with_series(Series::xy(
            "Ω-resonant markers",
            Color::BLUE,
            SeriesStyle::Scatter,
            &response.doses,
            &response.omega,
        ));

        let idx = response.doses.len() * 3 / 4;
        if let (Some(&x), Some(&y)) = (response.doses.get(idx), response.random.get(idx)) {
            panel = panel.with_guide(Guide::Annotation {
                x,
                y,
                text: format!("Protection: ~{protection:.0}% at high doses"),
            });
        }

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("protection_percent", protection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn zero_dose_never_mutates() {
        let mut rng = seeded(3);
        let mut seq = DnaSequence::random(&mut rng, 200);
        let before = seq.clone();
        assert_eq!(radiation_damage(&mut rng, &mut seq, 0.0), 0);
        assert_eq!(seq, before);
    }

    #[test]
    fn mutation_count_matches_changed_positions() {
        let mut rng = seeded(11);
        let mut seq = DnaSequence::random(&mut rng, 300);
        let before = seq.clone();
        let count = radiation_damage(&mut rng, &mut seq, 0.4);
        let changed = before
            .bases()
            .iter()
            .zip(seq.bases())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(count, changed);
    }

    #[test]
    fn resonant_sequences_resist_more_at_high_dose() {
        let response = dose_response(&mut seeded(117), 8, 20, SEQUENCE_LENGTH);
        assert_eq!(response.doses.len(), 8);
        assert_eq!(response.random[0], 0.0);
        let last = response.doses.len() - 1;
        assert!(response.omega[last] < response.random[last]);
        assert!(protection_percent(&response) > 0.0);
    }

    #[test]
    fn protection_is_zero_without_random_damage() {
        let response = DoseResponse {
            doses: vec![0.0; 4],
            random: vec![0.0; 4],
            omega: vec![0.0; 4],
        };
        assert_eq!(protection_percent(&response), 0.0);
    }
}
