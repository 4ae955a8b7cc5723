//! Multiband crossover splitter for stereo audio.
//!
//! Splits a stereo signal into up to five frequency bands through a chain
//! of Linkwitz-Riley crossovers built on state-variable filters. Every
//! band is phase-compensated against the crossovers below it, so the
//! bands sum back without notches. Each band carries its own gain, mute
//! and solo, and a master gain sits after the sum.
//!
//! Two processing modes share one parameter set:
//!
//! - **Minimum phase** (default): the recursive filters run directly,
//!   zero latency.
//! - **Linear phase**: the same crossover magnitudes are rendered into
//!   symmetric FIR filters and applied by overlap-add block convolution,
//!   at a fixed latency reported by [`MultibandSplitter::latency`].
//!
//! # Quick start
//!
//! ```
//! use bandsplit::{MultibandSplitter, SplitterParams};
//!
//! // Three bands, crossovers placed as normalized positions on the
//! // exponential frequency axis, low band pulled down 3 dB.
//! let params = SplitterParams::default()
//!     .with_crossovers(&[0.3, 0.6])
//!     .with_band_gain_db(0, -3.0);
//!
//! let mut splitter = MultibandSplitter::new(params, 48000).unwrap();
//!
//! let input = vec![0.0f32; 512]; // interleaved stereo
//! let mut output = vec![0.0f32; 512];
//! splitter.process(&input, &mut output);
//! ```

#![forbid(unsafe_code)]

pub mod core;
pub mod error;
pub mod fir;
pub mod io;
pub mod splitter;

pub use crate::core::types::{
    AudioBuffer, Channels, FilterOrder, FirQuality, Frame, Sample, SplitterParams, MAX_BANDS,
    MAX_CROSSOVERS,
};
pub use crate::error::SplitterError;
pub use crate::splitter::MultibandSplitter;
