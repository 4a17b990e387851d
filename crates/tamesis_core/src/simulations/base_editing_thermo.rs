//! Thermodynamic comparison of double-strand-break editing and base editing.
//!
//! Fully deterministic: the seed is accepted for uniformity but never consumed.

use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::numeric::linspace;
use crate::plot::{Color, Figure, Panel, Series, SeriesStyle};
use anyhow::Result;
use rand::rngs::StdRng;

pub struct BaseEditingThermo;

/// Activation energy of a double-strand break.
pub const E_DSB: f64 = 50.0;
/// Activation energy of a base edit.
pub const E_BE: f64 = 15.0;
const THERMAL_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct EditingCurves {
    pub time: Vec<f64>,
    pub cas9_success: Vec<f64>,
    pub be_success: Vec<f64>,
    pub cas9_entropy: Vec<f64>,
    pub be_entropy: Vec<f64>,
}

pub fn rate_cas9() -> f64 {
    (-E_DSB / THERMAL_SCALE).exp() / OMEGA.sqrt()
}

pub fn rate_base_editor() -> f64 {
    (-E_BE / THERMAL_SCALE).exp() * OMEGA.sqrt()
}

pub fn editing_curves(steps: usize) -> EditingCurves {
    let time = linspace(0.0, 100.0, steps);
    let (k_cas9, k_be) = (rate_cas9(), rate_base_editor());
    let mut curves = EditingCurves::default();
    for &t in &time {
        let p_cas9 = 1.0 - (-k_cas9 * t).exp();
        let p_be = 1.0 - (-k_be * t).exp();
        curves.cas9_success.push(p_cas9 * 100.0);
        curves.be_success.push(p_be * 100.0);
        curves.cas9_entropy.push(p_cas9 * E_DSB * OMEGA);
        curves.be_entropy.push(p_be * E_BE);
    }
    curves.time = time;
    curves
}

impl Simulation for BaseEditingThermo {
    fn id(&self) -> &'static str {
        "base_editing_thermo"
    }

    fn title(&self) -> &'static str {
        "Thermodynamic comparison: Cas9 vs base editing"
    }

    fn default_seed(&self) -> u64 {
        137
    }

    fn output_file(&self) -> &'static str {
        "base_editing_thermo_results.png"
    }

    fn run(&self, _rng: &mut StdRng) -> Result<SimulationOutput> {
        let c = editing_curves(200);
        let efficiency = Panel::new("Editing efficiency", "Time (simulation steps)", "Editing efficiency (%)")
            .with_series(Series::xy("Cas9 (DSB)", Color::BLUE, SeriesStyle::Dashed, &c.time, &c.cas9_success))
            .with_series(
                Series::xy("Base editor (quantum tunneling)", Color::BLUE, SeriesStyle::Line, &c.time, &c.be_success)
                    .with_width(3),
            );
        let entropy = Panel::new(
            "Collateral entropy",
            "Time (simulation steps)",
            "Collateral entropy (information loss)",
        )
        .with_series(Series::xy("Cas9 entropy", Color::RED, SeriesStyle::Dashed, &c.time, &c.cas9_entropy))
        .with_series(
            Series::xy("BE entropy", Color::RED, SeriesStyle::Line, &c.time, &c.be_entropy).with_width(3),
        );

        let last = |v: &[f64]| v.last().copied().unwrap_or_default();
        Ok(SimulationOutput::new(Figure::columns(self.title(), vec![efficiency, entropy]))
            .with_metric("final_cas9_success", last(&c.cas9_success))
            .with_metric("final_be_success", last(&c.be_success))
            .with_metric("final_cas9_entropy", last(&c.cas9_entropy))
            .with_metric("final_be_entropy", last(&c.be_entropy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn curves_start_at_zero() {
        let c = editing_curves(200);
        assert_eq!(c.time.len(), 200);
        assert_eq!(c.cas9_success[0], 0.0);
        assert_eq!(c.be_entropy[0], 0.0);
    }

    #[test]
    fn base_editor_is_faster_and_cleaner() {
        let c = editing_curves(50);
        let last = c.time.len() - 1;
        assert!(c.be_success[last] > c.cas9_success[last]);
        assert!(c.be_entropy[last] < c.cas9_entropy[last]);
        assert!(c.be_success.windows(2).all(|w| w[1] >= w[0]));
        assert!(c.be_success.iter().all(|&p| p <= 100.0));
    }

    #[test]
    fn output_ignores_seed() {
        let a = BaseEditingThermo.run(&mut seeded(1)).expect("run");
        let b = BaseEditingThermo.run(&mut seeded(2)).expect("run");
        assert_eq!(a.metrics, b.metrics);
    }
}
