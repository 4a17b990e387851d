//! Off-target prediction for guide RNAs: Hamming versus entropic distance.

use super::{Simulation, SimulationOutput};
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::sequence::{entropic_distance, hamming_distance, Base, DnaSequence};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct GrnaEntropy;

const GUIDE_LENGTH: usize = 20;
const FRAGMENTS: usize = 1000;
const MUTANTS: usize = 10;
const MUTANT_SUBSTITUTIONS: usize = 3;
const HAMMING_THRESHOLD: f64 = 5.0;
const ENTROPIC_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Risk {
    High,
    Cryptic,
    Safe,
}

pub fn classify(hamming: f64, entropic: f64) -> Risk {
    if entropic > ENTROPIC_THRESHOLD {
        Risk::Safe
    } else if hamming <= HAMMING_THRESHOLD {
        Risk::High
    } else {
        Risk::Cryptic
    }
}

/// A copy of `target` with `substitutions` random positions redrawn. A redraw
/// may land on the same base.
fn mutant(rng: &mut impl Rng, target: &DnaSequence, substitutions: usize) -> DnaSequence {
    let mut copy = target.clone();
    let len = copy.len();
    let bases = copy.bases_mut();
    for _ in 0..substitutions {
        bases[rng.random_range(0..len)] = Base::random(rng);
    }
    copy
}

/// Hamming distances and entropic distances rescaled to `[0, 20]`.
pub fn score_fragments(target: &DnaSequence, fragments: &[DnaSequence]) -> (Vec<f64>, Vec<f64>) {
    let hamming: Vec<f64> = fragments
        .iter()
        .map(|f| hamming_distance(target, f) as f64)
        .collect();
    let entropic: Vec<f64> = fragments.iter().map(|f| entropic_distance(target, f)).collect();
    let peak = entropic.iter().copied().fold(0.0, f64::max);
    let normalized = if peak > 0.0 {
        entropic.iter().map(|e| e / peak * 20.0).collect()
    } else {
        vec![0.0; entropic.len()]
    };
    (hamming, normalized)
}

impl Simulation for GrnaEntropy {
    fn id(&self) -> &'static str {
        "grna_entropy"
    }

    fn title(&self) -> &'static str {
        "Off-target prediction: Hamming vs. entropic distance"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "grna_specificity_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let target = DnaSequence::random(rng, GUIDE_LENGTH);
        tracing::info!(target = %target, "guide target");

        let mut fragments: Vec<DnaSequence> = (0..FRAGMENTS)
            .map(|_| DnaSequence::random(rng, GUIDE_LENGTH))
            .collect();
        for _ in 0..MUTANTS {
            fragments.push(mutant(rng, &target, MUTANT_SUBSTITUTIONS));
        }

        let (hamming, entropic) = score_fragments(&target, &fragments);
        let mut high = Vec::new();
        let mut cryptic = Vec::new();
        let mut safe = Vec::new();
        for (&h, &e) in hamming.iter().zip(&entropic) {
            match classify(h, e) {
                Risk::High => high.push((h, e)),
                Risk::Cryptic => cryptic.push((h, e)),
                Risk::Safe => safe.push((h, e)),
            }
        }
        tracing::info!(high = high.len(), cryptic = cryptic.len(), safe = safe.len(), "fragments classified");

        let metrics = [
            ("high_risk", high.len() as f64),
            ("cryptic_risk", cryptic.len() as f64),
            ("safe", safe.len() as f64),
        ];

        let mut panel = Panel::new(
            self.title(),
            "Hamming distance (sequence dissimilarity)",
            "Entropic distance (normalized)",
        )
        .with_x_range(-0.5, 20.0)
        .with_y_range(-1.0, 22.0)
        .with_guide(Guide::Region {
            x0: 0.0,
            x1: HAMMING_THRESHOLD,
            y0: 0.0,
            y1: ENTROPIC_THRESHOLD,
            color: Color::PURPLE,
            label: Some("Danger zone".to_string()),
        })
        .with_guide(Guide::HLine {
            y: ENTROPIC_THRESHOLD,
            color: Color::PURPLE,
            label: Some("Entropic threshold".to_string()),
        })
        .with_guide(Guide::VLine {
            x: HAMMING_THRESHOLD,
            color: Color::GRAY,
            label: None,
        });
        for (label, color, points) in [
            ("Safe targets", Color::BLUE, safe),
            ("Cryptic off-targets", Color::ORANGE, cryptic),
            ("High risk (low Hamming)", Color::RED, high),
        ] {
            if !points.is_empty() {
                panel = panel.with_series(Series::new(label, color, SeriesStyle::Scatter, points));
            }
        }

        let mut output = SimulationOutput::new(Figure::single(self.title(), panel));
        for (name, value) in metrics {
            output = output.with_metric(name, value);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(5.0, 10.0), Risk::High);
        assert_eq!(classify(6.0, 3.0), Risk::Cryptic);
        assert_eq!(classify(0.0, 10.5), Risk::Safe);
        assert_eq!(classify(15.0, 19.0), Risk::Safe);
    }

    #[test]
    fn normalized_entropic_distance_peaks_at_twenty() {
        let mut rng = seeded(1);
        let target = DnaSequence::random(&mut rng, GUIDE_LENGTH);
        let fragments: Vec<DnaSequence> = (0..50).map(|_| DnaSequence::random(&mut rng, GUIDE_LENGTH)).collect();
        let (hamming, entropic) = score_fragments(&target, &fragments);
        assert_eq!(hamming.len(), 50);
        let peak = entropic.iter().copied().fold(0.0, f64::max);
        assert!((peak - 20.0).abs() < 1e-9);
        assert!(hamming.iter().all(|&h| h <= GUIDE_LENGTH as f64));
    }

    #[test]
    fn mutants_stay_close_to_target() {
        let mut rng = seeded(2);
        let target = DnaSequence::random(&mut rng, GUIDE_LENGTH);
        for _ in 0..10 {
            let m = mutant(&mut rng, &target, MUTANT_SUBSTITUTIONS);
            assert!(hamming_distance(&target, &m) <= MUTANT_SUBSTITUTIONS);
        }
    }

    #[test]
    fn classes_cover_every_fragment() {
        let output = GrnaEntropy.run(&mut seeded(42)).expect("run");
        let total: f64 = output.metrics.values().sum();
        assert_eq!(total, (FRAGMENTS + MUTANTS) as f64);
    }
}
