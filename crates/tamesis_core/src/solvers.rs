use crate::traits::{DynamicalSystem, Scalar, Steppable};
use anyhow::{bail, Result};

/// Discrete Map Stepper
/// Just evaluates x_{n+1} = f(x_n).
/// dt is treated as 1 generation regardless of value, but we track t as t + dt.
pub struct DiscreteMap<T: Scalar> {
    tmp: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T) {
        system.apply(*t, state, &mut self.tmp);
        state.copy_from_slice(&self.tmp);
        *t = *t + dt;
    }
}

/// Iterates `system` for `generations` steps from `initial`, returning every
/// visited state including the initial one.
pub fn iterate_map<T: Scalar>(
    system: &impl DynamicalSystem<T>,
    initial: &[T],
    generations: usize,
) -> Result<Vec<Vec<T>>> {
    let dim = system.dimension();
    if initial.len() != dim {
        bail!(
            "Initial state dimension mismatch. Expected {}, got {}.",
            dim,
            initial.len()
        );
    }
    let mut stepper = DiscreteMap::new(dim);
    let mut state = initial.to_vec();
    let mut t = T::zero();
    let mut history = Vec::with_capacity(generations + 1);
    history.push(state.clone());
    for _ in 0..generations {
        stepper.step(system, &mut t, &mut state, T::one());
        history.push(state.clone());
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doubling;

    impl DynamicalSystem<f64> for Doubling {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, _t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = 2.0 * x[0];
        }
    }

    struct Counter;

    impl DynamicalSystem<f64> for Counter {
        fn dimension(&self) -> usize {
            2
        }

        fn apply(&self, t: f64, x: &[f64], out: &mut [f64]) {
            out[0] = t;
            out[1] = x[1] + x[0];
        }
    }

    #[test]
    fn discrete_map_advances_time_and_state() {
        let mut stepper = DiscreteMap::new(1);
        let mut t = 0.0;
        let mut state = [1.5];
        stepper.step(&Doubling, &mut t, &mut state, 1.0);
        stepper.step(&Doubling, &mut t, &mut state, 1.0);
        assert_eq!(state[0], 6.0);
        assert_eq!(t, 2.0);
    }

    #[test]
    fn iterate_map_records_initial_and_every_generation() {
        let history = iterate_map(&Counter, &[0.0, 0.0], 4).expect("valid dimension");
        assert_eq!(history.len(), 5);
        assert_eq!(history[0], vec![0.0, 0.0]);
        assert_eq!(history[4], vec![3.0, 3.0]);
    }

    #[test]
    fn iterate_map_rejects_dimension_mismatch() {
        let err = iterate_map(&Doubling, &[1.0, 2.0], 3).expect_err("dimension mismatch");
        assert!(err.to_string().contains("dimension mismatch"));
    }
}
