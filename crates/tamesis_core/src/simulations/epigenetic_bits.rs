//! Persistence of a methylation pattern under thermal noise.
//!
//! Methylated cells are `Ω` times harder to flip than unmethylated ones, so a
//! pattern written at resonant positions survives far longer than the noise
//! level alone would suggest.

use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::plot::{Color, Figure, Panel, Series, SeriesStyle};
use rand::rngs::StdRng;
use rand::Rng;

pub struct EpigeneticBits;

const GRID: usize = 100;
const GENERATIONS: usize = 1000;
const TEMPERATURES: [f64; 3] = [10.0, 50.0, 100.0];

/// Row-major methylation grid; `true` is methylated.
pub fn initial_memory(size: usize) -> Vec<bool> {
    let modulus = OMEGA as usize;
    let mut grid = Vec::with_capacity(size * size);
    for i in 0..size {
        for j in 0..size {
            grid.push((i * i + j * j) % modulus < 10);
        }
    }
    grid
}

/// Percentage of the initially methylated cells that are still methylated.
pub fn retention(current: &[bool], initial: &[bool]) -> f64 {
    let written = initial.iter().filter(|&&m| m).count();
    if written == 0 {
        return 0.0;
    }
    let kept = current
        .iter()
        .zip(initial)
        .filter(|(&c, &i)| c && i)
        .count();
    kept as f64 / written as f64 * 100.0
}

/// Retention after each of `generations` noise sweeps at `temperature`.
pub fn memory_decay(rng: &mut impl Rng, initial: &[bool], temperature: f64, generations: usize) -> Vec<f64> {
    let mut grid = initial.to_vec();
    let base_flip = temperature / 1000.0;
    let mut history = Vec::with_capacity(generations);
    for _ in 0..generations {
        for cell in grid.iter_mut() {
            let flip = if *cell { base_flip / OMEGA } else { base_flip };
            if rng.random::<f64>() < flip {
                *cell = !*cell;
            }
        }
        history.push(retention(&grid, initial));
    }
    history
}

impl Simulation for EpigeneticBits {
    fn id(&self) -> &'static str {
        "epigenetic_bits"
    }

    fn title(&self) -> &'static str {
        "Holographic memory persistence: epigenetic stability"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "epigenetic_holography_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> anyhow::Result<SimulationOutput> {
        let initial = initial_memory(GRID);
        let mut panel = Panel::new(self.title(), "Time (generations)", "Memory retention (%)");
        let mut finals = Vec::with_capacity(TEMPERATURES.len());

        let styles = [
            ("Low entropy", Color::BLUE),
            ("Medium entropy", Color::ORANGE),
            ("High entropy (critical)", Color::RED),
        ];
        for (&temperature, (label, color)) in TEMPERATURES.iter().zip(styles) {
            let curve = memory_decay(rng, &initial, temperature, GENERATIONS);
            let last = curve.last().copied().unwrap_or(100.0);
            tracing::info!(temperature, retention = last, "memory decay simulated");
            finals.push((temperature, last));
            panel = panel.with_series(Series::indexed(label, color, SeriesStyle::Line, &curve));
        }

        let mut output = SimulationOutput::new(Figure::single(self.title(), panel));
        for (temperature, value) in finals {
            output = output.with_metric(&format!("retention_t{temperature:.0}"), value);
        }
        Ok(output)
    }
}
