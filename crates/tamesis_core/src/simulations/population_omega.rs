//! Competition between a fast-breeding, high-entropy species and a slow,
//! long-lived Ω species sharing one carrying capacity.

use super::{Simulation, SimulationOutput};
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::solvers::iterate_map;
use crate::traits::DynamicalSystem;
use anyhow::Result;
use rand::rngs::StdRng;

pub struct PopulationOmega;

/// Discrete competition map over `[random, omega]` populations.
#[derive(Debug, Clone)]
pub struct Competition {
    pub capacity: f64,
    pub birth_random: f64,
    pub death_random: f64,
    pub birth_omega: f64,
    pub death_omega: f64,
}

impl Default for Competition {
    fn default() -> Self {
        Self {
            capacity: 1000.0,
            birth_random: 0.8,
            death_random: 0.3,
            birth_omega: 0.4,
            death_omega: 0.05,
        }
    }
}

impl DynamicalSystem<f64> for Competition {
    fn dimension(&self) -> usize {
        2
    }

    fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let (random, omega) = (x[0], x[1]);
        let pressure = (random + omega) / self.capacity;
        let d_random =
            random * self.birth_random * (1.0 - pressure) - random * self.death_random * (1.0 + 2.0 * pressure);
        let d_omega =
            omega * self.birth_omega * (1.0 - pressure) - omega * self.death_omega * (1.0 + 0.5 * pressure);
        out[0] = (random + d_random).max(0.0);
        out[1] = (omega + d_omega).max(0.0);
    }
}

/// First generation where the Ω population strictly exceeds the random one.
pub fn crossover(random: &[f64], omega: &[f64]) -> Option<usize> {
    random.iter().zip(omega).position(|(r, o)| o > r)
}

impl Simulation for PopulationOmega {
    fn id(&self) -> &'static str {
        "population_omega"
    }

    fn title(&self) -> &'static str {
        "Population replacement: the victory of information"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "population_omega_results.png"
    }

    fn run(&self, _rng: &mut StdRng) -> Result<SimulationOutput> {
        let history = iterate_map(&Competition::default(), &[500.0, 10.0], 200)?;
        let random: Vec<f64> = history.iter().map(|s| s[0]).collect();
        let omega: Vec<f64> = history.iter().map(|s| s[1]).collect();
        let cross = crossover(&random, &omega);

        let mut panel = Panel::new(self.title(), "Generations", "Individuals")
            .with_series(Series::indexed(
                "Standard species (high entropy)",
                Color::RED,
                SeriesStyle::Dashed,
                &random,
            ))
            .with_series(
                Series::indexed("Omega species (efficient)", Color::BLUE, SeriesStyle::Line, &omega)
                    .with_width(3),
            );
        match cross {
            Some(idx) => {
                tracing::info!(generation = idx, "omega species overtakes");
                panel = panel.with_guide(Guide::Annotation {
                    x: idx as f64,
                    y: omega[idx],
                    text: "Omega singularity".to_string(),
                });
            }
            None => tracing::info!("no crossover within the simulated horizon"),
        }

        let last = |v: &[f64]| v.last().copied().unwrap_or_default();
        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("crossover_generation", cross.map_or(-1.0, |i| i as f64))
            .with_metric("final_random", last(&random))
            .with_metric("final_omega", last(&omega)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn populations_never_go_negative() {
        let harsh = Competition {
            death_random: 5.0,
            death_omega: 5.0,
            ..Competition::default()
        };
        let history = iterate_map(&harsh, &[500.0, 10.0], 20).expect("iterate");
        assert!(history.iter().flatten().all(|&p| p >= 0.0));
        assert_eq!(history[1], vec![0.0, 0.0]);
    }

    #[test]
    fn omega_species_takes_over() {
        let output = PopulationOmega.run(&mut seeded(42)).expect("run");
        let cross = output.metrics["crossover_generation"];
        assert!(cross > 0.0);
        assert!(output.metrics["final_omega"] > output.metrics["final_random"]);
    }

    #[test]
    fn crossover_reports_first_strict_excess() {
        assert_eq!(crossover(&[5.0, 4.0, 3.0], &[1.0, 4.0, 3.5]), Some(2));
        assert_eq!(crossover(&[5.0], &[5.0]), None);
    }
}
