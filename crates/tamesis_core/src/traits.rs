use crate::simulations::SimulationOutput;
use anyhow::Result;
use num_traits::{Float, FromPrimitive};
use rand::rngs::StdRng;
use std::fmt::Debug;

/// Numeric types a discrete-time model can evolve.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A deterministic update rule `x_{n+1} = f(n, x_n)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the update for generation `t`, writing the next state into `out`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// A trait for steppers that advance a system by one generation.
pub trait Steppable<T: Scalar> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// One experiment of the gallery.
///
/// Implementations are stateless: all randomness comes from the `rng` handed to
/// [`Simulation::run`], which the caller seeds from [`Simulation::default_seed`]
/// or a user override.
pub trait Simulation {
    /// Stable identifier used on the command line and in configuration files.
    fn id(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn default_seed(&self) -> u64;

    /// File name of the rendered image, relative to the output directory.
    fn output_file(&self) -> &'static str;

    fn run(&self, rng: &mut StdRng) -> Result<SimulationOutput>;
}
