//! Neural-genomic phase synchronisation.
//!
//! Two populations of phase oscillators are coupled through the mean phase
//! difference; the coupling jumps from 0.5 to φ halfway through the run.

use super::{Simulation, SimulationOutput};
use crate::constants::{OMEGA, PHI};
use crate::numeric::mean;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::rng::{normal, uniform};
use anyhow::Result;
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;

pub struct ConsciousnessResonance;

const OSCILLATORS: usize = 100;
const STEPS: usize = 200;
const TRANSITION: usize = 100;
const K_NORMAL: f64 = 0.5;

/// Kuramoto order parameter `|mean(e^{i(a - b)})|` of two phase sets.
pub fn order_parameter(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let sum: Complex<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| Complex::from_polar(1.0, x - y))
        .sum();
    (sum / n as f64).norm()
}

/// Coherence after every step. The neural noise term is one draw per step,
/// shared by every oscillator.
pub fn synchronize(rng: &mut impl Rng, oscillators: usize, steps: usize, transition: usize) -> Result<Vec<f64>> {
    let mut neural: Vec<f64> = (0..oscillators).map(|_| uniform(rng, 0.0, 2.0 * PI)).collect();
    let mut genetic: Vec<f64> = (0..oscillators).map(|_| uniform(rng, 0.0, 2.0 * PI)).collect();
    let mut coherence = Vec::with_capacity(steps);

    for t in 0..steps {
        let coupling = if t > transition { PHI } else { K_NORMAL };
        let differences: Vec<f64> = genetic.iter().zip(&neural).map(|(g, n)| (g - n).sin()).collect();
        let interaction = mean(&differences);
        let noise = normal(rng, 0.0, 0.05)?;
        for phase in &mut neural {
            *phase += 0.1 + coupling * interaction + noise;
        }
        for phase in &mut genetic {
            *phase += 0.1 * OMEGA / 100.0 + coupling * interaction;
        }
        coherence.push(order_parameter(&neural, &genetic));
    }
    Ok(coherence)
}

impl Simulation for ConsciousnessResonance {
    fn id(&self) -> &'static str {
        "consciousness_resonance"
    }

    fn title(&self) -> &'static str {
        "Neural-genomic phase synchronization dynamics"
    }

    fn default_seed(&self) -> u64 {
        117
    }

    fn output_file(&self) -> &'static str {
        "consciousness_resonance_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let coherence = synchronize(rng, OSCILLATORS, STEPS, TRANSITION)?;
        let split = TRANSITION.min(coherence.len());
        let before = mean(&coherence[..split]);
        let after = mean(&coherence[split..]);
        tracing::info!(before, after, "mean coherence per regime");

        let points: Vec<(f64, f64)> = coherence.iter().enumerate().map(|(i, &r)| (i as f64, r)).collect();
        let normal_segment = points[..(split + 1).min(points.len())].to_vec();
        let resonant_segment = points[split.min(points.len())..].to_vec();

        let mut panel = Panel::new(self.title(), "Time (arbitrary units)", "Phase coherence (order parameter r)")
            .with_y_range(0.0, 1.05)
            .with_guide(Guide::VSpan {
                from: 0.0,
                to: TRANSITION as f64,
                color: Color::BLUE,
                label: Some("Normal state".to_string()),
            })
            .with_guide(Guide::VSpan {
                from: TRANSITION as f64,
                to: STEPS as f64,
                color: Color::RED,
                label: Some("Resonant state".to_string()),
            })
            .with_guide(Guide::VLine {
                x: TRANSITION as f64,
                color: Color::ORANGE,
                label: Some("Coupling transition (K_Ω activation)".to_string()),
            })
            .with_series(Series::new("K = 0.5", Color::PURPLE, SeriesStyle::Line, normal_segment).with_width(3))
            .with_series(Series::new("K = φ", Color::RED, SeriesStyle::Line, resonant_segment).with_width(3));
        for (x, text) in [(50, "Low coupling (K = 0.5)"), (150, "High coupling (K = φ ≈ 1.618)")] {
            if let Some(&y) = coherence.get(x) {
                panel = panel.with_guide(Guide::Annotation {
                    x: x as f64,
                    y,
                    text: text.to_string(),
                });
            }
        }

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("mean_coherence_normal", before)
            .with_metric("mean_coherence_resonant", after))
    }
}
