//! Cold spots left on a CMB-like temperature map by resonant "collisions".

use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::plot::{Color, Figure, Heatmap, Panel, Series, SeriesStyle};
use crate::rng::normal_vec;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

pub struct MultiverseMap;

const SIZE: usize = 200;
const CMB_TEMPERATURE: f64 = 2.725;
const CMB_FLUCTUATION: f64 = 2e-5;
const RESONANCE_THRESHOLD: f64 = 0.999;
const COLD_SPOT_DEPTH: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct CmbMap {
    pub size: usize,
    /// Row-major temperatures, `values[i * size + j]`.
    pub values: Vec<f64>,
    /// Impact centres as `(column, row)`.
    pub impacts: Vec<(usize, usize)>,
}

pub fn resonance(i: usize, j: usize, size: usize) -> f64 {
    let geo = (i * i + j * j) as f64 / (size * size) as f64;
    (geo * OMEGA).sin().abs()
}

/// Scans the map in row-major order. Each resonant cell draws a radius in
/// `[2, 5)`; when the whole square of that radius fits, the disc is cooled.
pub fn map_collisions(rng: &mut impl Rng, size: usize) -> Result<CmbMap> {
    let mut values = normal_vec(rng, CMB_TEMPERATURE, CMB_FLUCTUATION, size * size)?;
    let mut impacts = Vec::new();
    for i in 0..size {
        for j in 0..size {
            if resonance(i, j, size) <= RESONANCE_THRESHOLD {
                continue;
            }
            let radius = rng.random_range(2..5usize);
            if i < radius || i + radius >= size || j < radius || j + radius >= size {
                continue;
            }
            for y in (i - radius)..=(i + radius) {
                for x in (j - radius)..=(j + radius) {
                    let (dy, dx) = (y.abs_diff(i), x.abs_diff(j));
                    if dx * dx + dy * dy <= radius * radius {
                        values[y * size + x] -= COLD_SPOT_DEPTH;
                    }
                }
            }
            impacts.push((j, i));
        }
    }
    Ok(CmbMap { size, values, impacts })
}

impl Simulation for MultiverseMap {
    fn id(&self) -> &'static str {
        "multiverse_map"
    }

    fn title(&self) -> &'static str {
        "Multiverse map: CMB cold spots analysis"
    }

    fn default_seed(&self) -> u64 {
        11703
    }

    fn output_file(&self) -> &'static str {
        "multiverse_map_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let map = map_collisions(rng, SIZE)?;
        let collisions = map.impacts.len();
        tracing::info!(collisions, "cold spots detected");

        let points = map.impacts.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
        let panel = Panel::new(
            format!("Multiverse map: CMB cold spots analysis (N={collisions})"),
            "Galactic longitude",
            "Galactic latitude",
        )
        .with_x_range(0.0, (SIZE - 1) as f64)
        .with_y_range(0.0, (SIZE - 1) as f64)
        .with_heatmap(Heatmap {
            rows: map.size,
            cols: map.size,
            values: map.values,
            label: "Temperature (K)".to_string(),
        })
        .with_series(
            Series::new("Parallel universe impact", Color::LIME, SeriesStyle::Scatter, points).with_width(4),
        );

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("collisions", collisions as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn impacts_stay_inside_the_map() {
        let map = map_collisions(&mut seeded(11703), 60).expect("map");
        assert_eq!(map.values.len(), 3600);
        for &(x, y) in &map.impacts {
            assert!(x >= 2 && x + 2 < 60);
            assert!(y >= 2 && y + 2 < 60);
            assert!(resonance(y, x, 60) > RESONANCE_THRESHOLD);
        }
    }

    #[test]
    fn impact_centres_are_cooled() {
        let map = map_collisions(&mut seeded(11703), SIZE).expect("map");
        assert!(!map.impacts.is_empty());
        // The background is the first thing drawn from the stream.
        let background =
            normal_vec(&mut seeded(11703), CMB_TEMPERATURE, CMB_FLUCTUATION, SIZE * SIZE).expect("noise");
        for &(x, y) in &map.impacts {
            let idx = y * SIZE + x;
            assert!(map.values[idx] <= background[idx] - COLD_SPOT_DEPTH + 1e-12);
        }
    }
}
