//! Spectral restoration of a glitched harmonic signal.
//!
//! The ideal signal is a sum of an Ω tone and its golden-ratio harmonic. After
//! Gaussian noise and a handful of large glitches are added, only the strongest
//! Fourier bins are kept.

use super::{Simulation, SimulationOutput};
use crate::constants::{OMEGA, PHI};
use crate::numeric::{linspace, mean_squared_error};
use crate::plot::{Color, Figure, Panel, Series, SeriesStyle};
use crate::rng::normal_vec;
use crate::spectral::threshold_filter;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct RealityPatch;

const SAMPLES: usize = 1000;
const GLITCHES: usize = 20;
const GLITCH_AMPLITUDE: f64 = 5.0;
const NOISE_STD: f64 = 0.5;
/// Bins weaker than this fraction of the peak are discarded.
const KEEP_FRACTION: f64 = 0.1;
const SHOWN: usize = 200;

#[derive(Debug, Clone)]
pub struct GlitchSignal {
    pub t: Vec<f64>,
    pub ideal: Vec<f64>,
    pub corrupted: Vec<f64>,
}

pub fn ideal_signal(t: &[f64]) -> Vec<f64> {
    t.iter()
        .map(|&t| (OMEGA * t).sin() + 0.5 * (OMEGA * PHI * t).sin())
        .collect()
}

/// Glitch positions are drawn with replacement, so a sample can be hit twice.
pub fn glitch_signal(rng: &mut impl Rng, samples: usize) -> Result<GlitchSignal> {
    let t = linspace(0.0, 10.0, samples);
    let ideal = ideal_signal(&t);
    let noise = normal_vec(rng, 0.0, NOISE_STD, samples)?;
    let mut corrupted: Vec<f64> = ideal.iter().zip(&noise).map(|(s, n)| s + n).collect();
    if samples > 0 {
        for _ in 0..GLITCHES {
            corrupted[rng.random_range(0..samples)] += GLITCH_AMPLITUDE;
        }
    }
    Ok(GlitchSignal { t, ideal, corrupted })
}

impl Simulation for RealityPatch {
    fn id(&self) -> &'static str {
        "reality_patch"
    }

    fn title(&self) -> &'static str {
        "Reality patch: spectral restoration of a glitched signal"
    }

    fn default_seed(&self) -> u64 {
        117038
    }

    fn output_file(&self) -> &'static str {
        "reality_patch_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let signal = glitch_signal(rng, SAMPLES)?;
        let restored = threshold_filter(&signal.corrupted, KEEP_FRACTION)?;

        let mse_corrupted = mean_squared_error(&signal.ideal, &signal.corrupted)?;
        let mse_restored = mean_squared_error(&signal.ideal, &restored)?;
        let improvement = if mse_corrupted > 0.0 {
            (mse_corrupted - mse_restored) / mse_corrupted * 100.0
        } else {
            0.0
        };
        tracing::info!(mse_corrupted, mse_restored, improvement, "signal restored");

        let shown = SHOWN.min(signal.t.len());
        let t = &signal.t[..shown];
        let panels = vec![
            Panel::new("Source signal", "t", "Amplitude").with_series(Series::xy(
                "Ideal reality (timeline alpha)",
                Color::GREEN,
                SeriesStyle::Line,
                t,
                &signal.ideal[..shown],
            )),
            Panel::new(format!("Corrupted signal (MSE: {mse_corrupted:.2})"), "t", "Amplitude").with_series(
                Series::xy("Corrupted reality (glitch)", Color::RED, SeriesStyle::Line, t, &signal.corrupted[..shown]),
            ),
            Panel::new(format!("Restored signal (improvement: {improvement:.1}%)"), "t", "Amplitude").with_series(
                Series::xy("Restored reality (Omega patch)", Color::BLUE, SeriesStyle::Line, t, &restored[..shown]),
            ),
        ];

        Ok(SimulationOutput::new(Figure::rows(self.title(), panels))
            .with_metric("mse_corrupted", mse_corrupted)
            .with_metric("mse_restored", mse_restored)
            .with_metric("improvement_percent", improvement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn glitches_raise_the_signal() {
        let signal = glitch_signal(&mut seeded(117038), SAMPLES).expect("signal");
        assert_eq!(signal.corrupted.len(), SAMPLES);
        let big = signal
            .corrupted
            .iter()
            .zip(&signal.ideal)
            .filter(|(c, i)| *c - *i > 3.0)
            .count();
        assert!(big > 0 && big <= GLITCHES + 5);
    }

    #[test]
    fn filter_improves_on_corruption() {
        let output = RealityPatch.run(&mut seeded(117038)).expect("run");
        assert!(output.metrics["mse_restored"] < output.metrics["mse_corrupted"]);
        assert!(output.metrics["improvement_percent"] > 0.0);
        assert_eq!(output.figure.panels.len(), 3);
        assert!(output.figure.panels.iter().all(|p| p.series[0].points.len() == SHOWN));
    }
}
