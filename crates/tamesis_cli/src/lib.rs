//! Command line front end for the TAMESIS gallery: configuration, logging and
//! the single and batch runners used by the `tamesis` binary.
pub mod config;
pub mod error;
pub mod logger;
pub mod runner;
