//! Trapezoidally-integrated state-variable filter, the single numerical
//! kernel behind every crossover and all-pass stage in the crate.
//!
//! One coefficient set produces simultaneous low-pass, high-pass, and
//! all-pass outputs from a pair of integrator states, and stays well
//! behaved under parameter modulation (zero-delay feedback form).

/// Coefficients of one SVF stage, derived from a normalized angular cutoff
/// and a resonance constant `k`.
///
/// Coefficients are plain values: they can be copied freely between the
/// left/right channel instances and phase-compensation siblings that must
/// match a crossover exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfCoeffs {
    pub k: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

impl SvfCoeffs {
    /// Computes coefficients for a cutoff `omega = PI * hz / sample_rate`
    /// and resonance constant `k`.
    ///
    /// The trapezoidal identities below fold the usual `g = tan(omega)`
    /// prewarp into `sin`/`cos` terms, so `omega` must stay in
    /// `(0, PI/2)`; at `PI/2` (Nyquist) the prewarp pole makes the filter
    /// blow up.
    pub fn new(omega: f64, k: f64) -> Self {
        let ct = omega.cos();
        let st = omega.sin();
        let div = 1.0 / (1.0 + k * st * ct);
        Self {
            k,
            a1: ct * ct * div,
            a2: st * ct * div,
            a3: st * st * div,
        }
    }

    /// Identity placeholder used before the first coefficient update.
    pub fn flat() -> Self {
        Self::new(std::f64::consts::FRAC_PI_4, std::f64::consts::SQRT_2)
    }
}

/// Simultaneous outputs of one SVF tick.
#[derive(Debug, Clone, Copy)]
pub struct SvfOutputs {
    pub low: f64,
    pub high: f64,
    pub allpass: f64,
}

/// Integrator state of one SVF stage. Owned per stage, per channel;
/// zeroed on any topology change.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvfState {
    ic1: f64,
    ic2: f64,
}

impl SvfState {
    /// Zeroes the integrator memory.
    #[inline]
    pub fn reset(&mut self) {
        self.ic1 = 0.0;
        self.ic2 = 0.0;
    }

    /// Advances the filter by one sample, producing all three outputs.
    #[inline]
    pub fn tick(&mut self, c: &SvfCoeffs, v0: f64) -> SvfOutputs {
        let v3 = v0 - self.ic2;
        let v1 = c.a1 * self.ic1 + c.a2 * v3;
        let v2 = self.ic2 + c.a2 * self.ic1 + c.a3 * v3;
        self.ic1 = 2.0 * v1 - self.ic1;
        self.ic2 = 2.0 * v2 - self.ic2;

        let low = v2;
        let allpass = v0 - 2.0 * c.k * v1;
        SvfOutputs {
            low,
            high: allpass - low,
            allpass,
        }
    }

    /// Advances the filter by one sample, keeping only the low-pass output.
    /// Used for the second stage of a 4-pole cascade.
    #[inline]
    pub fn tick_low(&mut self, c: &SvfCoeffs, v0: f64) -> f64 {
        self.tick(c, v0).low
    }
}
