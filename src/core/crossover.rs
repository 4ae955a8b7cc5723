//! Linkwitz-Riley crossover stages and their phase-compensation siblings.
//!
//! A crossover stage splits one signal into a low/high pair whose sum is
//! the all-pass response of its first SVF stage — not unity. That is the
//! whole reason the phase-compensation stage exists: a band that skipped a
//! crossover is pushed through a coefficient-matched all-pass instead, so
//! every band accumulates the same total phase before re-summation. Using
//! any other coefficient set there desynchronizes the bands and combs the
//! summed output.

use crate::core::svf::{SvfCoeffs, SvfState};
use crate::core::types::FilterOrder;

/// One crossover point for one channel: a low-pass/high-pass pair of
/// selectable order.
///
/// - 2-pole: a single SVF call; low and high taken directly (12 dB/oct).
/// - 4-pole: the first stage's low-pass output runs through a second
///   low-pass with identical coefficients but independent state, and the
///   high output is the first stage's all-pass minus that cascaded low
///   (24 dB/oct Linkwitz-Riley).
#[derive(Debug, Clone)]
pub struct CrossoverStage {
    coeffs: SvfCoeffs,
    order: FilterOrder,
    first: SvfState,
    second: SvfState,
}

impl CrossoverStage {
    /// Creates a stage with placeholder coefficients; call [`configure`]
    /// before processing.
    ///
    /// [`configure`]: CrossoverStage::configure
    pub fn new(order: FilterOrder) -> Self {
        Self {
            coeffs: SvfCoeffs::flat(),
            order,
            first: SvfState::default(),
            second: SvfState::default(),
        }
    }

    /// Installs new coefficients and order. State is left alone; the
    /// coefficient manager decides when a reset is needed.
    pub fn configure(&mut self, coeffs: SvfCoeffs, order: FilterOrder) {
        self.coeffs = coeffs;
        self.order = order;
    }

    /// The active coefficient set, shared verbatim with any sibling
    /// phase-compensation stage.
    pub fn coeffs(&self) -> &SvfCoeffs {
        &self.coeffs
    }

    /// Zeroes all integrator state.
    pub fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    /// Splits one sample into `(low, high)`.
    #[inline]
    pub fn split(&mut self, x: f64) -> (f64, f64) {
        match self.order {
            FilterOrder::TwoPole => {
                let out = self.first.tick(&self.coeffs, x);
                (out.low, out.high)
            }
            FilterOrder::FourPole => {
                let stage1 = self.first.tick(&self.coeffs, x);
                let low = self.second.tick_low(&self.coeffs, stage1.low);
                (low, stage1.allpass - low)
            }
        }
    }
}

/// All-pass stage matched to a sibling [`CrossoverStage`].
///
/// Because `low + high` of a crossover stage equals the all-pass output of
/// its first SVF for both orders, a single matched SVF all-pass reproduces
/// the exact group delay a skipped crossover would have imposed.
#[derive(Debug, Clone)]
pub struct AllpassStage {
    coeffs: SvfCoeffs,
    state: SvfState,
}

impl AllpassStage {
    pub fn new() -> Self {
        Self {
            coeffs: SvfCoeffs::flat(),
            state: SvfState::default(),
        }
    }

    /// Copies the coefficient set of the paired crossover stage.
    pub fn match_stage(&mut self, stage: &CrossoverStage) {
        self.coeffs = *stage.coeffs();
    }

    /// Zeroes the integrator state.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Processes one sample, returning the phase-matched all-pass output.
    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.state.tick(&self.coeffs, x).allpass
    }
}

impl Default for AllpassStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn omega_for(freq_hz: f64, sample_rate: f64) -> f64 {
        PI * freq_hz / sample_rate
    }

    fn configured_stage(order: FilterOrder, freq_hz: f64) -> CrossoverStage {
        let mut stage = CrossoverStage::new(order);
        stage.configure(
            SvfCoeffs::new(omega_for(freq_hz, 48000.0), order.resonance()),
            order,
        );
        stage
    }

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    fn energy(signal: &[f64], skip: usize) -> f64 {
        signal[skip..].iter().map(|s| s * s).sum()
    }

    /// The low/high pair must sum to the matched all-pass output exactly,
    /// for both orders. This is the invariant the phase-compensation
    /// stages rely on.
    #[test]
    fn test_split_sums_to_matched_allpass() {
        for order in [FilterOrder::TwoPole, FilterOrder::FourPole] {
            let mut stage = configured_stage(order, 1000.0);
            let mut reference = AllpassStage::new();
            reference.match_stage(&stage);

            for i in 0..2000 {
                let x = (0.41 * i as f64).sin() * 0.8;
                let (low, high) = stage.split(x);
                let ap = reference.process(x);
                assert!(
                    (low + high - ap).abs() < 1e-12,
                    "{order:?}: low+high {} != allpass {}",
                    low + high,
                    ap
                );
            }
        }
    }

    #[test]
    fn test_low_frequency_routed_to_low_band() {
        let sample_rate = 48000.0;
        let mut stage = configured_stage(FilterOrder::FourPole, 1000.0);

        let input = sine(100.0, sample_rate, 16384);
        let mut low = Vec::with_capacity(input.len());
        let mut high = Vec::with_capacity(input.len());
        for &x in &input {
            let (l, h) = stage.split(x);
            low.push(l);
            high.push(h);
        }

        let settle = 2048;
        assert!(
            energy(&low, settle) > energy(&high, settle) * 100.0,
            "100 Hz should be almost entirely below a 1 kHz crossover"
        );
    }

    #[test]
    fn test_high_frequency_routed_to_high_band() {
        let sample_rate = 48000.0;
        let mut stage = configured_stage(FilterOrder::FourPole, 1000.0);

        let input = sine(10_000.0, sample_rate, 16384);
        let mut low = Vec::with_capacity(input.len());
        let mut high = Vec::with_capacity(input.len());
        for &x in &input {
            let (l, h) = stage.split(x);
            low.push(l);
            high.push(h);
        }

        let settle = 2048;
        assert!(
            energy(&high, settle) > energy(&low, settle) * 100.0,
            "10 kHz should be almost entirely above a 1 kHz crossover"
        );
    }

    #[test]
    fn test_four_pole_steeper_than_two_pole() {
        let sample_rate = 48000.0;
        // One octave above the crossover; compare low-band leakage.
        let input = sine(2000.0, sample_rate, 16384);
        let settle = 2048;

        let mut leakage = Vec::new();
        for order in [FilterOrder::TwoPole, FilterOrder::FourPole] {
            let mut stage = configured_stage(order, 1000.0);
            let low: Vec<f64> = input.iter().map(|&x| stage.split(x).0).collect();
            leakage.push(energy(&low, settle));
        }

        assert!(
            leakage[1] < leakage[0] * 0.2,
            "4-pole low-band leakage {} should be well below 2-pole {}",
            leakage[1],
            leakage[0]
        );
    }

    #[test]
    fn test_reset_clears_state() {
        let mut stage = configured_stage(FilterOrder::FourPole, 500.0);
        for i in 0..200 {
            stage.split((i as f64 * 0.1).sin());
        }
        stage.reset();
        let (low, high) = stage.split(0.0);
        assert_eq!(low, 0.0);
        assert_eq!(high, 0.0);
    }
}
