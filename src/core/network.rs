//! The splitting network: wires crossover stages and phase compensators
//! into the cascade topology for 0-4 active crossovers, for one channel.
//!
//! Crossovers chain on successive high outputs. A band split off at
//! crossover `c` then runs through one all-pass compensator per later
//! crossover, so every band passes the same total number of filtering
//! stages and the bands stay phase-aligned for re-summation.

use crate::core::crossover::{AllpassStage, CrossoverStage};
use crate::core::svf::SvfCoeffs;
use crate::core::types::{FilterOrder, MAX_BANDS, MAX_CROSSOVERS};

/// Per-channel splitting network.
#[derive(Debug, Clone)]
pub struct SplittingNetwork {
    num_crossovers: usize,
    stages: [CrossoverStage; MAX_CROSSOVERS],
    /// `comps[b][c]` compensates band `b` for skipped crossover `c`
    /// (`b < c < num_crossovers`); the rest of the matrix is inert.
    comps: [[AllpassStage; MAX_CROSSOVERS]; MAX_CROSSOVERS],
}

impl SplittingNetwork {
    /// Creates an inert network (passthrough until configured).
    pub fn new() -> Self {
        Self {
            num_crossovers: 0,
            stages: std::array::from_fn(|_| CrossoverStage::new(FilterOrder::FourPole)),
            comps: std::array::from_fn(|_| std::array::from_fn(|_| AllpassStage::new())),
        }
    }

    /// Installs one coefficient set per active crossover and mirrors each
    /// set into the compensators of every earlier band. `coeffs.len()`
    /// (capped at 4) becomes the active crossover count.
    pub fn configure(&mut self, coeffs: &[SvfCoeffs], order: FilterOrder) {
        let n = coeffs.len().min(MAX_CROSSOVERS);
        self.num_crossovers = n;
        for (c, set) in coeffs.iter().take(n).enumerate() {
            self.stages[c].configure(*set, order);
            for b in 0..c {
                self.comps[b][c].match_stage(&self.stages[c]);
            }
        }
    }

    /// Number of active crossover points.
    pub fn num_crossovers(&self) -> usize {
        self.num_crossovers
    }

    /// Number of produced bands.
    pub fn num_bands(&self) -> usize {
        self.num_crossovers + 1
    }

    /// Zeroes every filter state in the network.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        for row in &mut self.comps {
            for comp in row {
                comp.reset();
            }
        }
    }

    /// Splits one sample into its bands. Only the first
    /// [`num_bands`](Self::num_bands) entries are written; the rest are
    /// zeroed and never carry signal.
    #[inline]
    pub fn split(&mut self, x: f64, bands: &mut [f64; MAX_BANDS]) {
        bands.fill(0.0);
        let n = self.num_crossovers;
        if n == 0 {
            bands[0] = x;
            return;
        }

        let mut sig = x;
        for c in 0..n {
            let (low, high) = self.stages[c].split(sig);
            bands[c] = low;
            sig = high;
        }
        bands[n] = sig;

        // Catch lower bands up in phase for every crossover they skipped.
        for b in 0..n.saturating_sub(1) {
            for c in (b + 1)..n {
                bands[b] = self.comps[b][c].process(bands[b]);
            }
        }
    }
}

impl Default for SplittingNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const SAMPLE_RATE: f64 = 48000.0;

    fn omega_for(freq_hz: f64) -> f64 {
        PI * freq_hz / SAMPLE_RATE
    }

    fn coeff_sets(freqs: &[f64], order: FilterOrder) -> Vec<SvfCoeffs> {
        freqs
            .iter()
            .map(|&f| SvfCoeffs::new(omega_for(f), order.resonance()))
            .collect()
    }

    fn sine_mix(freqs: &[f64], len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                freqs
                    .iter()
                    .map(|&f| (2.0 * PI * f * i as f64 / SAMPLE_RATE).sin())
                    .sum::<f64>()
                    / freqs.len() as f64
            })
            .collect()
    }

    #[test]
    fn test_zero_crossovers_is_bit_exact_passthrough() {
        let mut net = SplittingNetwork::new();
        net.configure(&[], FilterOrder::FourPole);

        let mut bands = [0.0f64; MAX_BANDS];
        for i in 0..500 {
            let x = (0.13 * i as f64).sin() * 0.9;
            net.split(x, &mut bands);
            assert_eq!(bands[0], x);
            for &b in &bands[1..] {
                assert_eq!(b, 0.0);
            }
        }
    }

    /// Summing all bands must equal the input run through the matched
    /// all-pass cascade: the network is all-pass complementary by
    /// construction, for every topology and both orders.
    #[test]
    fn test_band_sum_equals_allpass_cascade() {
        for order in [FilterOrder::TwoPole, FilterOrder::FourPole] {
            for freqs in [
                vec![1000.0],
                vec![300.0, 3000.0],
                vec![150.0, 900.0, 5000.0],
                vec![100.0, 500.0, 2000.0, 8000.0],
            ] {
                let coeffs = coeff_sets(&freqs, order);
                let mut net = SplittingNetwork::new();
                net.configure(&coeffs, order);

                // Reference: cascade of matched all-pass stages, one per
                // crossover, applied to the raw input.
                let mut reference: Vec<AllpassStage> = coeffs
                    .iter()
                    .map(|&set| {
                        let mut stage = CrossoverStage::new(order);
                        stage.configure(set, order);
                        let mut ap = AllpassStage::new();
                        ap.match_stage(&stage);
                        ap
                    })
                    .collect();

                let input = sine_mix(&[80.0, 440.0, 1700.0, 6500.0], 4000);
                let mut bands = [0.0f64; MAX_BANDS];
                for &x in &input {
                    net.split(x, &mut bands);
                    let sum: f64 = bands.iter().sum();
                    let expected = reference.iter_mut().fold(x, |acc, ap| ap.process(acc));
                    assert!(
                        (sum - expected).abs() < 1e-9,
                        "{order:?} {freqs:?}: band sum {sum} != all-pass reference {expected}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_four_crossovers_produce_five_live_bands() {
        let freqs = [100.0, 500.0, 2000.0, 8000.0];
        let coeffs = coeff_sets(&freqs, FilterOrder::FourPole);
        let mut net = SplittingNetwork::new();
        net.configure(&coeffs, FilterOrder::FourPole);
        assert_eq!(net.num_bands(), 5);

        // Broadband-ish input: one sine inside each band.
        let input = sine_mix(&[50.0, 250.0, 1000.0, 4000.0, 15000.0], 16384);
        let mut energy = [0.0f64; MAX_BANDS];
        let mut bands = [0.0f64; MAX_BANDS];
        for (i, &x) in input.iter().enumerate() {
            net.split(x, &mut bands);
            if i > 4096 {
                for (e, &b) in energy.iter_mut().zip(bands.iter()) {
                    *e += b * b;
                }
            }
        }
        for (i, &e) in energy.iter().enumerate() {
            assert!(e > 1.0, "band {i} should carry signal, energy {e}");
        }
    }

    #[test]
    fn test_reset_silences_network() {
        let coeffs = coeff_sets(&[200.0, 2000.0], FilterOrder::FourPole);
        let mut net = SplittingNetwork::new();
        net.configure(&coeffs, FilterOrder::FourPole);

        let mut bands = [0.0f64; MAX_BANDS];
        for i in 0..300 {
            net.split((0.21 * i as f64).sin(), &mut bands);
        }
        net.reset();
        net.split(0.0, &mut bands);
        for &b in &bands {
            assert_eq!(b, 0.0);
        }
    }
}
