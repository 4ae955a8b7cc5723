//! Core DSP primitives: the SVF kernel, crossover and all-pass stages, the
//! per-channel splitting network, and the coefficient manager.

pub mod coeffs;
pub mod crossover;
pub mod network;
pub mod svf;
pub mod types;
