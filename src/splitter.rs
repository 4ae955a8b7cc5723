//! The multiband splitter: parameter handling, engine selection, per-band
//! gain/mute/solo, and re-summation.
//!
//! Control-rate work (coefficient updates, FIR resynthesis) happens in
//! [`update_settings`](MultibandSplitter::update_settings), gated by a
//! parameter snapshot so unchanged parameters cost nothing. The per-sample
//! path allocates nothing.

use rustfft::num_complex::Complex;

use crate::core::coeffs::{
    crossover_coeffs, crossover_fractions, hz_for_fraction, GainCache, ParamSnapshot,
};
use crate::core::network::SplittingNetwork;
use crate::core::types::{Frame, Sample, SplitterParams, MAX_BANDS};
use crate::error::SplitterError;
use crate::fir::convolver::BlockConvolver;
use crate::fir::synthesis::render_band_spectra;
use crate::fir::transform::Transform;

/// Stereo multiband crossover processor.
///
/// Splits the input into up to five phase-aligned frequency bands, applies
/// per-band gain/mute/solo, and sums the bands back to stereo. Two engines
/// are available: the minimum-phase recursive cascade (zero latency) and a
/// linear-phase FIR mode derived from the same cascade (fixed latency,
/// reported by [`latency`](Self::latency)).
///
/// # Example
///
/// ```
/// use bandsplit::{MultibandSplitter, SplitterParams};
///
/// let params = SplitterParams::new()
///     .with_crossovers(&[0.4, 0.7])
///     .with_band_gain_db(0, -3.0);
/// let mut splitter = MultibandSplitter::new(params, 48000).unwrap();
///
/// let input = vec![0.0f32; 512]; // interleaved stereo
/// let mut output = vec![0.0f32; 512];
/// splitter.process(&input, &mut output);
/// ```
pub struct MultibandSplitter {
    params: SplitterParams,
    sample_rate: u32,
    /// Last applied coefficient-relevant state; `None` forces the first
    /// update.
    snapshot: Option<ParamSnapshot>,
    /// One splitting network per channel (left, right); coefficients are
    /// identical, state is not.
    networks: [SplittingNetwork; 2],
    /// FIR engine state: one convolver and spectrum per active band.
    /// Empty while linear phase is off.
    convolvers: Vec<BlockConvolver>,
    spectra: Vec<Vec<Complex<f32>>>,
    fft: Option<Transform>,
    band_gains: [GainCache; MAX_BANDS],
    master_gain: GainCache,
    /// Post-gain per-band stereo taps from the most recent frame, for
    /// metering and display.
    band_frames: [Frame; MAX_BANDS],
}

impl MultibandSplitter {
    /// Creates a splitter for the given sample rate and applies the
    /// initial parameters.
    ///
    /// # Errors
    /// Returns `SplitterError::InvalidSampleRate` if `sample_rate` is zero.
    pub fn new(params: SplitterParams, sample_rate: u32) -> Result<Self, SplitterError> {
        if sample_rate == 0 {
            return Err(SplitterError::InvalidSampleRate(sample_rate));
        }
        let mut splitter = Self {
            params: params.clamped(),
            sample_rate,
            snapshot: None,
            networks: [SplittingNetwork::new(), SplittingNetwork::new()],
            convolvers: Vec::new(),
            spectra: Vec::new(),
            fft: None,
            band_gains: [GainCache::new(); MAX_BANDS],
            master_gain: GainCache::new(),
            band_frames: [Frame::default(); MAX_BANDS],
        };
        splitter.update_settings();
        Ok(splitter)
    }

    /// Installs a new control-rate parameter set. Takes effect at the next
    /// [`update_settings`](Self::update_settings) (which
    /// [`process`](Self::process) runs automatically per block).
    pub fn set_params(&mut self, params: SplitterParams) {
        self.params = params.clamped();
    }

    /// The active (clamped) parameter set.
    pub fn params(&self) -> &SplitterParams {
        &self.params
    }

    /// Sample rate the splitter was created for.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of active bands.
    pub fn num_bands(&self) -> usize {
        self.params.num_bands()
    }

    /// Fixed processing latency in samples for host delay compensation.
    /// Zero in minimum-phase mode.
    pub fn latency(&self) -> usize {
        if self.params.linear_phase {
            self.convolvers.first().map_or(0, BlockConvolver::latency)
        } else {
            0
        }
    }

    /// The derived crossover frequencies in Hz, ordered, one per active
    /// crossover — display values.
    pub fn crossover_frequencies_hz(&self) -> Vec<f32> {
        let fractions = crossover_fractions(&self.params);
        fractions
            .iter()
            .take(self.params.num_crossovers)
            .map(|&f| hz_for_fraction(f, self.sample_rate, self.params.fixed_frequency_range) as f32)
            .collect()
    }

    /// Post-gain stereo taps of every band from the most recent frame.
    /// Bands beyond the active count stay at zero.
    pub fn band_frames(&self) -> &[Frame; MAX_BANDS] {
        &self.band_frames
    }

    /// Control-rate update: detects parameter drift and, only when found,
    /// recomputes filter coefficients, resets all filter and convolution
    /// state, and (in linear-phase mode) regenerates the band spectra.
    ///
    /// Calling this twice with unchanged parameters performs no work the
    /// second time.
    pub fn update_settings(&mut self) {
        let snapshot = ParamSnapshot::capture(&self.params, self.sample_rate);
        if self.snapshot.as_ref() == Some(&snapshot) {
            return;
        }

        let coeffs = crossover_coeffs(&self.params, self.sample_rate);
        for network in &mut self.networks {
            network.configure(&coeffs, self.params.order);
            network.reset();
        }

        if self.params.linear_phase {
            let size = self.params.quality.transform_size();
            if self.fft.as_ref().map(Transform::size) != Some(size) {
                self.fft = Some(Transform::new(size));
            }
            if let Some(fft) = &self.fft {
                self.spectra =
                    render_band_spectra(&coeffs, self.params.order, self.params.quality, fft);
            }
            self.convolvers = (0..self.spectra.len())
                .map(|_| BlockConvolver::new(self.params.quality))
                .collect();
        } else {
            self.convolvers.clear();
            self.spectra.clear();
            self.fft = None;
        }

        self.band_frames = [Frame::default(); MAX_BANDS];
        self.snapshot = Some(snapshot);
    }

    /// Zeroes all filter and convolution state without touching the
    /// parameters or coefficients.
    pub fn reset(&mut self) {
        for network in &mut self.networks {
            network.reset();
        }
        for convolver in &mut self.convolvers {
            convolver.reset();
        }
        self.band_frames = [Frame::default(); MAX_BANDS];
    }

    /// Processes one stereo frame and returns the summed output.
    ///
    /// Low-level API: does not run the parameter-drift check; call
    /// [`update_settings`](Self::update_settings) after changing
    /// parameters (the block API does this for you).
    #[inline]
    pub fn process_frame(&mut self, frame: Frame) -> Frame {
        let num_bands = self.params.num_bands();

        // Raw band signals from the selected engine.
        let mut raw = [Frame::default(); MAX_BANDS];
        if self.params.linear_phase {
            // Convolvers, spectra and the transform are rebuilt as a unit
            // in update_settings, so they always agree here.
            if let Some(fft) = &self.fft {
                for (band, (convolver, spectrum)) in self
                    .convolvers
                    .iter_mut()
                    .zip(self.spectra.iter())
                    .enumerate()
                {
                    raw[band] = convolver.process_frame(frame, spectrum, fft);
                }
            }
        } else {
            let mut left = [0.0f64; MAX_BANDS];
            let mut right = [0.0f64; MAX_BANDS];
            self.networks[0].split(frame.left as f64, &mut left);
            self.networks[1].split(frame.right as f64, &mut right);
            for band in 0..num_bands {
                raw[band] = Frame::new(left[band] as Sample, right[band] as Sample);
            }
        }

        // Solo precedence: any solo silences every non-soloed band.
        let any_solo = self.params.band_solos[..num_bands].iter().any(|&s| s);

        let mut sum = Frame::default();
        self.band_frames = [Frame::default(); MAX_BANDS];
        for band in 0..num_bands {
            let audible = if any_solo {
                self.params.band_solos[band]
            } else {
                !self.params.band_mutes[band]
            };
            if !audible {
                continue;
            }
            let gain = self.band_gains[band].update(self.params.band_gains_db[band]);
            let tap = Frame::new(raw[band].left * gain, raw[band].right * gain);
            self.band_frames[band] = tap;
            sum.left += tap.left;
            sum.right += tap.right;
        }

        let master = self.master_gain.update(self.params.master_gain_db);
        Frame::new(sum.left * master, sum.right * master)
    }

    /// Processes a block of interleaved stereo samples.
    ///
    /// Runs the control-rate update once, then streams every frame through
    /// the active engine. `output` receives the summed stereo signal.
    ///
    /// # Panics
    /// Panics if `input` has an odd length or `output` is shorter than
    /// `input`.
    pub fn process(&mut self, input: &[Sample], output: &mut [Sample]) {
        assert!(
            input.len() % 2 == 0,
            "interleaved stereo input must have even length, got {}",
            input.len()
        );
        assert!(
            output.len() >= input.len(),
            "output buffer too short: {} < {}",
            output.len(),
            input.len()
        );

        self.update_settings();

        for (i, pair) in input.chunks_exact(2).enumerate() {
            let out = self.process_frame(Frame::new(pair[0], pair[1]));
            output[2 * i] = out.left;
            output[2 * i + 1] = out.right;
        }
    }
}
