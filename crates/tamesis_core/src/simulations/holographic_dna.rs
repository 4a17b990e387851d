//! Non-coding DNA as a holographic shield around the coding bulk.

use super::{Simulation, SimulationOutput};
use crate::numeric::{argmin, linspace, mean};
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::rng::choose_distinct;
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::Rng;

pub struct HolographicDna;

const GENOME_SIZE: usize = 1000;
const GENOMES_PER_RATIO: usize = 50;
const RATIO_STEPS: usize = 50;
const NOISE_INTENSITY: f64 = 0.2;

/// A genome where `true` marks a coding position.
pub fn genome_segment(rng: &mut impl Rng, size: usize, coding_ratio: f64) -> Result<Vec<bool>> {
    if !(0.0..=1.0).contains(&coding_ratio) {
        bail!("Coding ratio must lie in [0, 1], got {coding_ratio}.");
    }
    let coding = (size as f64 * coding_ratio) as usize;
    let mut genome = vec![false; size];
    for idx in choose_distinct(rng, size, coding)? {
        genome[idx] = true;
    }
    Ok(genome)
}

/// Total damage after `intensity · size` noise hits drawn with replacement.
/// A hit position scores 1.0 when coding and 0.1 otherwise; repeated hits
/// on the same position do not accumulate.
pub fn holographic_noise(rng: &mut impl Rng, genome: &[bool], intensity: f64) -> f64 {
    if genome.is_empty() {
        return 0.0;
    }
    let mut damage = vec![0.0; genome.len()];
    let hits = (genome.len() as f64 * intensity) as usize;
    for _ in 0..hits {
        let idx = rng.random_range(0..genome.len());
        damage[idx] = if genome[idx] { 1.0 } else { 0.1 };
    }
    damage.iter().sum()
}

impl Simulation for HolographicDna {
    fn id(&self) -> &'static str {
        "holographic_dna"
    }

    fn title(&self) -> &'static str {
        "Holographic shielding: role of non-coding DNA"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "holographic_dna_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let ratios = linspace(0.01, 0.99, RATIO_STEPS);
        let mut damages = Vec::with_capacity(ratios.len());
        for &ratio in &ratios {
            let mut samples = Vec::with_capacity(GENOMES_PER_RATIO);
            for _ in 0..GENOMES_PER_RATIO {
                let genome = genome_segment(rng, GENOME_SIZE, ratio)?;
                samples.push(holographic_noise(rng, &genome, NOISE_INTENSITY));
            }
            damages.push(mean(&samples));
        }

        let best = argmin(&damages).unwrap_or(0);
        let min_damage = damages.get(best).copied().unwrap_or_default();
        let optimal_ratio = ratios.get(best).copied().unwrap_or_default() * 100.0;
        tracing::info!(min_damage, optimal_ratio, "damage minimum located");

        let percent: Vec<f64> = ratios.iter().map(|r| r * 100.0).collect();
        let panel = Panel::new(
            self.title(),
            "% of coding genes (volume)",
            "Systemic damage (information loss)",
        )
        .with_series(Series::xy("Mean damage", Color::GREEN, SeriesStyle::Line, &percent, &damages))
        .with_guide(Guide::VLine {
            x: 2.0,
            color: Color::RED,
            label: Some("Human (~2% coding)".to_string()),
        })
        .with_guide(Guide::VLine {
            x: 98.0,
            color: Color::BLUE,
            label: Some("Bacteria (~90%+ coding)".to_string()),
        })
        .with_guide(Guide::Annotation {
            x: 2.0,
            y: min_damage + 5.0,
            text: "TARDIS optima (high complexity)".to_string(),
        });

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("min_damage", min_damage)
            .with_metric("optimal_ratio_percent", optimal_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn genome_has_exact_coding_count() {
        let genome = genome_segment(&mut seeded(42), 1000, 0.25).expect("valid ratio");
        assert_eq!(genome.iter().filter(|&&c| c).count(), 250);
        assert!(genome_segment(&mut seeded(42), 10, 1.5).is_err());
    }

    #[test]
    fn damage_is_bounded_by_hits() {
        let mut rng = seeded(5);
        let all_coding = vec![true; 1000];
        let damage = holographic_noise(&mut rng, &all_coding, 0.2);
        assert!(damage > 0.0 && damage <= 200.0);
        let junk = vec![false; 1000];
        let shielded = holographic_noise(&mut rng, &junk, 0.2);
        assert!(shielded <= 20.0 + 1e-9);
    }

    #[test]
    fn more_coding_means_more_damage() {
        let mut rng = seeded(9);
        let sparse = genome_segment(&mut rng, 1000, 0.02).expect("ratio");
        let dense = genome_segment(&mut rng, 1000, 0.98).expect("ratio");
        let low: f64 = (0..20).map(|_| holographic_noise(&mut rng, &sparse, 0.2)).sum();
        let high: f64 = (0..20).map(|_| holographic_noise(&mut rng, &dense, 0.2)).sum();
        assert!(low < high);
    }
}
