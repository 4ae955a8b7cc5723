//! Coefficient manager: maps user-facing crossover parameters to concrete
//! filter coefficients and gates recomputation behind an explicit
//! snapshot/diff check, so trigonometry and FIR resynthesis only run when
//! something actually changed.

use std::f64::consts::PI;

use crate::core::svf::SvfCoeffs;
use crate::core::types::{
    db_to_linear, FilterOrder, FirQuality, SplitterParams, FIXED_MAX_HZ, GAIN_DB_MAX,
    GAIN_DB_MIN, MAX_CROSSOVERS, MIN_CROSSOVER_HZ,
};

/// Keep mapped cutoffs a hair below the SVF kernel's `PI/2` (Nyquist)
/// pole so the prewarped trigonometry never degenerates.
const MAX_OMEGA: f64 = 0.495 * PI;

/// Upper bound of the frequency axis in Hz for the given configuration.
fn freq_axis_max(sample_rate: u32, fixed_range: bool) -> f64 {
    let nyquist = sample_rate as f64 / 2.0;
    if fixed_range {
        FIXED_MAX_HZ.min(nyquist)
    } else {
        nyquist
    }
}

/// Derives the ordered crossover fractions `F1..F4` from the raw 0-1
/// parameters.
///
/// Cascaded mode treats each raw value as a fraction of the spectrum left
/// above the previous crossover, which is monotonic by construction.
/// Absolute mode takes each raw value directly and forces monotonicity by
/// clamping against the previous result. Either way the returned array
/// satisfies `F1 <= F2 <= F3 <= F4`.
pub fn crossover_fractions(params: &SplitterParams) -> [f64; MAX_CROSSOVERS] {
    let mut fractions = [0.0f64; MAX_CROSSOVERS];
    let mut prev = 0.0f64;
    for (slot, &raw) in fractions.iter_mut().zip(params.crossovers.iter()) {
        let p = raw.clamp(0.0, 1.0) as f64;
        let f = if params.absolute_frequencies {
            // Clamping only against the previous crossover (not the next)
            // keeps the pass single-direction; later values yield to
            // earlier ones and the ordering invariant still holds.
            p.clamp(prev, 1.0)
        } else {
            prev + p * (1.0 - prev)
        };
        *slot = f;
        prev = f;
    }
    fractions
}

/// Maps a 0-1 fraction to a frequency in Hz along the exponential axis
/// from 20 Hz to the configured ceiling.
pub fn hz_for_fraction(fraction: f64, sample_rate: u32, fixed_range: bool) -> f64 {
    let f_max = freq_axis_max(sample_rate, fixed_range);
    let span = (MIN_CROSSOVER_HZ / f_max).ln();
    f_max * ((1.0 - fraction.clamp(0.0, 1.0)) * span).exp()
}

/// Inverse of [`hz_for_fraction`], for display and for placing crossovers
/// at absolute Hz targets.
pub fn fraction_for_hz(hz: f64, sample_rate: u32, fixed_range: bool) -> f64 {
    let f_max = freq_axis_max(sample_rate, fixed_range);
    let span = (MIN_CROSSOVER_HZ / f_max).ln();
    let hz = hz.clamp(MIN_CROSSOVER_HZ, f_max);
    (1.0 - (hz / f_max).ln() / span).clamp(0.0, 1.0)
}

/// Maps a 0-1 fraction to the SVF cutoff `omega = PI * hz / sample_rate`,
/// clamped below the kernel's `PI/2` stability bound.
pub fn omega_for_fraction(fraction: f64, sample_rate: u32, fixed_range: bool) -> f64 {
    let hz = hz_for_fraction(fraction, sample_rate, fixed_range);
    (PI * hz / sample_rate as f64).min(MAX_OMEGA)
}

/// Mapped angular cutoffs for the active crossovers; inactive slots are
/// zero so two snapshots with different active counts never compare equal
/// by accident.
pub fn mapped_omegas(params: &SplitterParams, sample_rate: u32) -> [f64; MAX_CROSSOVERS] {
    let fractions = crossover_fractions(params);
    let mut omegas = [0.0f64; MAX_CROSSOVERS];
    for (slot, &f) in omegas
        .iter_mut()
        .zip(fractions.iter())
        .take(params.num_crossovers.min(MAX_CROSSOVERS))
    {
        *slot = omega_for_fraction(f, sample_rate, params.fixed_frequency_range);
    }
    omegas
}

/// One SVF coefficient set per active crossover.
pub fn crossover_coeffs(params: &SplitterParams, sample_rate: u32) -> Vec<SvfCoeffs> {
    let omegas = mapped_omegas(params, sample_rate);
    let k = params.order.resonance();
    omegas
        .iter()
        .take(params.num_crossovers.min(MAX_CROSSOVERS))
        .map(|&omega| SvfCoeffs::new(omega, k))
        .collect()
}

/// Snapshot of every parameter that affects filter coefficients or FIR
/// spectra. Two equal snapshots mean the recompute step can be skipped
/// entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSnapshot {
    pub omegas: [f64; MAX_CROSSOVERS],
    pub num_crossovers: usize,
    pub order: FilterOrder,
    pub linear_phase: bool,
    pub quality: FirQuality,
}

impl ParamSnapshot {
    /// Captures the coefficient-relevant state of a parameter set.
    pub fn capture(params: &SplitterParams, sample_rate: u32) -> Self {
        Self {
            omegas: mapped_omegas(params, sample_rate),
            num_crossovers: params.num_crossovers.min(MAX_CROSSOVERS),
            order: params.order,
            linear_phase: params.linear_phase,
            quality: params.quality,
        }
    }
}

/// Cached dB-to-linear gain conversion.
///
/// `pow` only runs when the control-rate dB value differs from the last
/// one seen, never per sample.
#[derive(Debug, Clone, Copy)]
pub struct GainCache {
    last_db: f32,
    linear: f32,
}

impl GainCache {
    /// Starts at unity (0 dB).
    pub fn new() -> Self {
        Self {
            last_db: 0.0,
            linear: 1.0,
        }
    }

    /// Returns the linear gain for `db`, recomputing only on change.
    #[inline]
    pub fn update(&mut self, db: f32) -> f32 {
        if db != self.last_db {
            self.last_db = db;
            self.linear = db_to_linear(db.clamp(GAIN_DB_MIN, GAIN_DB_MAX));
        }
        self.linear
    }
}

impl Default for GainCache {
    fn default() -> Self {
        Self::new()
    }
}
