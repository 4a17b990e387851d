use super::{Simulation, SimulationOutput};
use crate::constants::OMEGA;
use crate::plot::{Color, Figure, Guide, Panel, Series, SeriesStyle};
use crate::rng::uniform;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;

/// Local entropy reversal after the arrow of time flips.
pub struct EntropyReversal;

const STEPS: usize = 200;
const REVERSAL_STEP: usize = 100;
const INITIAL_ENTROPY: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct EntropyPaths {
    pub normal: Vec<f64>,
    pub tardis: Vec<f64>,
}

/// Both paths start at `INITIAL_ENTROPY` and hold `steps + 1` values.
pub fn entropy_paths(rng: &mut impl Rng, steps: usize, reversal: usize) -> EntropyPaths {
    let mut normal = vec![INITIAL_ENTROPY];
    let mut tardis = vec![INITIAL_ENTROPY];
    let (mut s_normal, mut s_tardis) = (INITIAL_ENTROPY, INITIAL_ENTROPY);
    for t in 0..steps {
        s_normal += uniform(rng, 0.1, 0.5);
        if t > reversal {
            s_tardis -= uniform(rng, 0.1, 0.5) * OMEGA.ln() * 0.2;
        } else {
            s_tardis += uniform(rng, 0.1, 0.5);
        }
        s_tardis = s_tardis.max(0.0);
        normal.push(s_normal);
        tardis.push(s_tardis);
    }
    EntropyPaths { normal, tardis }
}

impl Simulation for EntropyReversal {
    fn id(&self) -> &'static str {
        "entropy_reversal"
    }

    fn title(&self) -> &'static str {
        "The Tenet protocol: local entropy reversal"
    }

    fn default_seed(&self) -> u64 {
        42
    }

    fn output_file(&self) -> &'static str {
        "entropy_reversal_results.png"
    }

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput> {
        let paths = entropy_paths(rng, STEPS, REVERSAL_STEP);
        let final_normal = paths.normal.last().copied().unwrap_or(INITIAL_ENTROPY);
        let final_tardis = paths.tardis.last().copied().unwrap_or(INITIAL_ENTROPY);
        tracing::info!(final_normal, final_tardis, "entropy paths finished");

        let panel = Panel::new(self.title(), "Time (t)", "System entropy (S)")
            .with_series(Series::indexed(
                "Standard universe (decay)",
                Color::RED,
                SeriesStyle::Dashed,
                &paths.normal,
            ))
            .with_series(
                Series::indexed("TARDIS field (rejuvenation)", Color::GREEN, SeriesStyle::Line, &paths.tardis)
                    .with_width(3),
            )
            .with_guide(Guide::VLine {
                x: REVERSAL_STEP as f64,
                color: Color::GOLD,
                label: Some("Reversal of the arrow of time".to_string()),
            })
            .with_guide(Guide::Annotation {
                x: 150.0,
                y: 10.0,
                text: "dS/dt < 0".to_string(),
            });

        Ok(SimulationOutput::new(Figure::single(self.title(), panel))
            .with_metric("final_normal_entropy", final_normal)
            .with_metric("final_tardis_entropy", final_tardis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn normal_entropy_only_grows() {
        let paths = entropy_paths(&mut seeded(42), STEPS, REVERSAL_STEP);
        assert_eq!(paths.normal.len(), STEPS + 1);
        assert!(paths.normal.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn tardis_entropy_reverses_and_stays_non_negative() {
        let paths = entropy_paths(&mut seeded(42), STEPS, REVERSAL_STEP);
        assert!(paths.tardis.iter().all(|&s| s >= 0.0));
        let peak = paths.tardis[REVERSAL_STEP + 1];
        assert!(paths.tardis[STEPS] < peak);
        assert!(paths.tardis[STEPS] < paths.normal[STEPS]);
    }
}
