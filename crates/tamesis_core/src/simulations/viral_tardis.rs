use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::numeric::linspace;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use anyhow::Result;
use rand::rngs::StdRng;

/// Survival under a quadratically growing viral load.
pub struct ViralTardis;

const CYCLES: usize = 100;
const NATURAL_RESISTANCE: f64 = 5.0;

/// Health after each cycle, starting from 100 and clamped at zero for display.
pub fn health_curve(loads: &[f64], resistance: f64) -> Vec<f64> {
    let mut health = 100.0;
    loads
        .iter()
        .map(|&v| {
            health -= (v * v - resistance).max(0.0);
            f64::max(health, 0.0)
        })
        .collect()
}

impl Simulation for ViralTardis {
    fn id(&self) -> &'static str {
        "viral_tardis"
    }

    fn title(&self) -> &'static str {
        "Viral infection survival: standard vs TAMESIS shield"
    }

    fn default_seed(&self) -> u64 {
        0
    }

    fn output_file(&self) -> &'static str {
        "viral_TAMESIS_results.png"
    }

    fn run(&self, _rng: &mut StdRng) -> Result<SimulationOutput> {
        let loads = linspace(0.0, 10.0, CYCLES);
        let natural = health_curve(&loads, NATURAL_RESISTANCE);
        let shielded = health_curve(&loads, NATURAL_RESISTANCE * OMEGA.ln());
        let collapse = natural.iter().position(|&h| h == 0.0);

        let x: Vec<f64> = (0..loads.len()).map(|i| i as f64).collect();
        let zeros = vec![0.0; x.len()];
        let mut panel = Panel::new(self.title(), "Viral cycle (load increase)", "System integrity (%)")
            .with_series(Series::band("", Color::RED, &x, &zeros, &natural))
            .with_series(Series::band("", Color::BLUE, &x, &zeros, &shielded))
            .with_series(Series::indexed(
                "Standard biological immunity",
                Color::RED,
                SeriesStyle::Dashed,
                &natural,
            ))
            .with_series(
                Series::indexed("TAMESIS shield (fractal)", Color::BLUE, SeriesStyle::Line, &shielded)
                    .with_width(3),
            )
            .with_guide(Guide::HLine {
                y: 0.0,
                color: Color::BLACK,
                label: None,
            });
        if let Some(idx) = collapse {
            tracing::info!(cycle = idx, "natural immunity collapsed");
            panel = panel.with_guide(Guide::Annotation {
                x: idx as f64,
                y: 0.0,
                text: "Systemic collapse".to_string(),
            });
        }

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("collapse_cycle", collapse.map_or(-1.0, |i| i as f64))
            .with_metric("final_shielded_health", shielded.last().copied().unwrap_or_default()))
    }
}
