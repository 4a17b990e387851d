pub mod constants;
pub mod graph;
pub mod numeric;
pub mod plot;
pub mod render;
pub mod rng;
pub mod sequence;
pub mod simulations;
pub mod solvers;
pub mod spectral;
/// The `tamesis_core` crate holds every simulation of the TAMESIS gallery together
/// with the small numeric toolkit they share.
///
/// Key components:
/// - **Traits**: `Scalar`, `DynamicalSystem` and `Steppable` for discrete-time updates.
/// - **Sequence / Spectral / Graph**: DNA sequences, FFT resonance metrics and
///   Laplacian spectra of small graphs.
/// - **Plot / Render**: a serializable figure model rasterized to PNG.
/// - **Simulations**: one module per experiment plus the registry used by the CLI.
pub mod traits;

pub use simulations::{registry, Simulation, SimulationOutput, SimulationReport};
