use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::numeric::{linspace, mean, moving_average};
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::rng::normal_vec;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

/// Retro-causal signalling through a noisy barrier.
///
/// The standard transmitter is blocked as soon as its signal beats the barrier;
/// the Ω transmitter tunnels with a logistic probability in the boosted margin.
pub struct ChronoTelephony;

const ATTEMPTS: usize = 200;
const SMOOTHING_WINDOW: usize = 10;
const BARRIER_MEAN: f64 = 5.0;
const BARRIER_STD: f64 = 2.0;

pub fn tunnel_probability(boost: f64, barrier: f64) -> f64 {
    1.0 / (1.0 + (-(boost - barrier)).exp())
}

#[derive(Debug, Clone, Default)]
pub struct Transmission {
    pub signal: Vec<f64>,
    pub standard: Vec<f64>,
    pub omega: Vec<f64>,
}

pub fn transmit(rng: &mut impl Rng, attempts: usize) -> Result<Transmission> {
    let barrier = normal_vec(rng, BARRIER_MEAN, BARRIER_STD, attempts)?;
    let signal = linspace(0.0, 10.0, attempts);
    let mut standard = Vec::with_capacity(attempts);
    let mut omega = Vec::with_capacity(attempts);
    for (&s, &b) in signal.iter().zip(&barrier) {
        standard.push(if s > b { 0.0 } else { s });
        let p = tunnel_probability(s * OMEGA.ln(), b);
        omega.push(if rng.random::<f64>() < p { 1.0 } else { 0.0 });
    }
    Ok(Transmission { signal, standard, omega })
}

impl Simulation for ChronoTelephony {
    fn id(&self) -> &'static str {
        "chrono_telephony"
    }

    fn title(&self) -> &'static str {
        "Chrono-telephony: bypassing the grandfather paradox"
    }

    fn default_seed(&self) -> u64 {
        117
    }

    fn output_file(&self) -> &'static str {
        "chrono_telephony_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let tx = transmit(rng, ATTEMPTS)?;
        let smooth = moving_average(&tx.omega, SMOOTHING_WINDOW);
        let success_rate = mean(&tx.omega);
        tracing::info!(success_rate, "omega transmitter success rate");

        let panel = Panel::new(self.title(), "Energy input (TeV)", "Information received in past (t-1)")
            .with_series(Series::xy(
                "Standard transmitter (paradox blocked)",
                Color::RED,
                SeriesStyle::Dashed,
                &tx.signal,
                &tx.standard,
            ))
            .with_series(
                Series::xy(
                    "TARDIS transmitter (Novikov allowed)",
                    Color::BLUE,
                    SeriesStyle::Line,
                    &tx.signal,
                    &smooth,
                )
                .with_width(3),
            )
            .with_guide(Guide::VLine {
                x: BARRIER_MEAN,
                color: Color::GRAY,
                label: Some("Cosmic censorship barrier".to_string()),
            })
            .with_guide(Guide::Annotation {
                x: 8.0,
                y: 0.8,
                text: "Retro-causal signal confirmed".to_string(),
            });

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("omega_success_rate", success_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn tunnel_probability_is_logistic() {
        assert!((tunnel_probability(5.0, 5.0) - 0.5).abs() < 1e-12);
        assert!(tunnel_probability(50.0, 0.0) > 0.999);
        assert!(tunnel_probability(0.0, 50.0) < 1e-3);
    }

    #[test]
    fn standard_signal_is_blocked_or_passes_unchanged() {
        let tx = transmit(&mut seeded(117), ATTEMPTS).expect("transmit");
        for (&s, &r) in tx.signal.iter().zip(&tx.standard) {
            assert!(r == 0.0 || r == s);
        }
        assert!(tx.omega.iter().all(|&b| b == 0.0 || b == 1.0));
    }

    #[test]
    fn strong_signals_mostly_get_through() {
        let tx = transmit(&mut seeded(117), ATTEMPTS).expect("transmit");
        let upper = &tx.omega[ATTEMPTS / 2..];
        assert!(mean(upper) > 0.9);
    }
}
