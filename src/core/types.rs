//! Core data types: samples, frames, buffers, and the control-rate
//! parameter set.

use serde::{Deserialize, Serialize};

use crate::error::SplitterError;

/// A single audio sample (32-bit float, nominal range -1.0 to 1.0).
pub type Sample = f32;

/// Maximum number of output bands.
pub const MAX_BANDS: usize = 5;

/// Maximum number of crossover points (bands - 1).
pub const MAX_CROSSOVERS: usize = 4;

/// Lower bound of the crossover frequency axis in Hz.
pub const MIN_CROSSOVER_HZ: f64 = 20.0;

/// Upper bound of the crossover frequency axis when the fixed range is
/// enabled (half of 44.1 kHz).
pub const FIXED_MAX_HZ: f64 = 22050.0;

/// Band gain bounds in dB. Values outside are clamped before use.
pub const GAIN_DB_MIN: f32 = -60.0;
pub const GAIN_DB_MAX: f32 = 24.0;

/// A stereo frame containing left and right samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: Sample,
    pub right: Sample,
}

impl Frame {
    /// Create a new stereo frame.
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a mono frame (same value in both channels).
    pub fn mono(value: Sample) -> Self {
        Self {
            left: value,
            right: value,
        }
    }
}

/// Channel layout of an [`AudioBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Number of interleaved channels.
    pub fn count(&self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }

    /// Maps a raw channel count to a layout.
    pub fn from_count(n: u16) -> Result<Self, SplitterError> {
        match n {
            1 => Ok(Channels::Mono),
            2 => Ok(Channels::Stereo),
            n => Err(SplitterError::InvalidChannels(n)),
        }
    }
}

/// Buffer holding audio samples in interleaved format.
///
/// For mono audio, samples are stored sequentially: `[s0, s1, s2, ...]`.
/// For stereo audio, samples are interleaved: `[L0, R0, L1, R1, ...]`.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Raw interleaved sample data.
    pub data: Vec<Sample>,
    /// Channel layout.
    pub channels: Channels,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    ///
    /// # Errors
    /// Returns `SplitterError::InvalidSampleRate` if `sample_rate` is zero.
    pub fn new(
        data: Vec<Sample>,
        channels: Channels,
        sample_rate: u32,
    ) -> Result<Self, SplitterError> {
        if sample_rate == 0 {
            return Err(SplitterError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            data,
            channels,
            sample_rate,
        })
    }

    /// Number of frames in the buffer (total samples / channels).
    pub fn num_frames(&self) -> usize {
        self.data.len() / self.channels.count()
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a single channel's data as a new vector.
    pub fn channel_data(&self, channel: usize) -> Vec<Sample> {
        let num_ch = self.channels.count();
        if channel >= num_ch {
            return Vec::new();
        }
        self.data
            .iter()
            .skip(channel)
            .step_by(num_ch)
            .copied()
            .collect()
    }

    /// Returns a stereo copy, duplicating the channel if the source is mono.
    pub fn to_stereo(&self) -> AudioBuffer {
        match self.channels {
            Channels::Stereo => self.clone(),
            Channels::Mono => {
                let mut data = Vec::with_capacity(self.data.len() * 2);
                for &s in &self.data {
                    data.push(s);
                    data.push(s);
                }
                AudioBuffer {
                    data,
                    channels: Channels::Stereo,
                    sample_rate: self.sample_rate,
                }
            }
        }
    }
}

/// Crossover filter slope: 2-pole (12 dB/oct) or 4-pole Linkwitz-Riley
/// (24 dB/oct).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOrder {
    TwoPole,
    FourPole,
}

impl FilterOrder {
    /// SVF resonance constant for a stage of this order. The 2-pole value
    /// of 2 yields Q = 0.5, which is what a Linkwitz-Riley pair built from
    /// a single stage requires; 4-pole stages use Butterworth damping.
    pub fn resonance(&self) -> f64 {
        match self {
            FilterOrder::TwoPole => 2.0,
            FilterOrder::FourPole => std::f64::consts::SQRT_2,
        }
    }
}

/// Linear-phase quality level, selecting the FIR/transform sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirQuality {
    Normal,
    High,
    Extreme,
}

impl FirQuality {
    /// Size multiplier applied to the base transform (1024) and FIR (512)
    /// lengths.
    pub fn multiplier(&self) -> usize {
        match self {
            FirQuality::Normal => 4,
            FirQuality::High => 8,
            FirQuality::Extreme => 16,
        }
    }

    /// FFT size used for synthesis and convolution.
    pub fn transform_size(&self) -> usize {
        1024 * self.multiplier()
    }

    /// Length of the generated FIR impulse responses.
    pub fn fir_length(&self) -> usize {
        512 * self.multiplier()
    }
}

/// Control-rate parameters for the multiband splitter.
///
/// This is the complete persisted state of the processor: a host that
/// serializes this struct (serde) and restores it later reproduces the
/// exact same splitter configuration.
///
/// All values are clamped into their valid domains before use, so any
/// combination is safe to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitterParams {
    /// Number of active crossover points (0-4); bands = crossovers + 1.
    pub num_crossovers: usize,
    /// Raw crossover frequency parameters, each in 0.0-1.0. Interpretation
    /// depends on `absolute_frequencies` (see the coefficient manager).
    pub crossovers: [f32; MAX_CROSSOVERS],
    /// Per-band gain in dB, clamped to [-60, +24].
    pub band_gains_db: [f32; MAX_BANDS],
    /// Per-band mute flags.
    pub band_mutes: [bool; MAX_BANDS],
    /// Per-band solo flags. Any solo mutes all non-soloed bands.
    pub band_solos: [bool; MAX_BANDS],
    /// Master output gain in dB.
    pub master_gain_db: f32,
    /// Crossover slope.
    pub order: FilterOrder,
    /// Enables the linear-phase (FIR convolution) engine.
    pub linear_phase: bool,
    /// FIR quality level (ignored while `linear_phase` is off).
    pub quality: FirQuality,
    /// Treat each raw crossover parameter as an absolute position on the
    /// frequency axis instead of a fraction of the remaining spectrum.
    pub absolute_frequencies: bool,
    /// Pin the frequency axis ceiling to 22.05 kHz instead of half the
    /// sample rate.
    pub fixed_frequency_range: bool,
}

impl Default for SplitterParams {
    fn default() -> Self {
        Self {
            num_crossovers: 1,
            crossovers: [0.5; MAX_CROSSOVERS],
            band_gains_db: [0.0; MAX_BANDS],
            band_mutes: [false; MAX_BANDS],
            band_solos: [false; MAX_BANDS],
            master_gain_db: 0.0,
            order: FilterOrder::FourPole,
            linear_phase: false,
            quality: FirQuality::Normal,
            absolute_frequencies: false,
            fixed_frequency_range: false,
        }
    }
}

impl SplitterParams {
    /// Creates the default parameter set (one crossover at mid-band, unity
    /// gains, minimum-phase, 4-pole).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the raw crossover parameters and the active crossover count
    /// from the slice length (capped at 4).
    pub fn with_crossovers(mut self, raw: &[f32]) -> Self {
        let n = raw.len().min(MAX_CROSSOVERS);
        self.num_crossovers = n;
        for (slot, &value) in self.crossovers.iter_mut().zip(raw.iter().take(n)) {
            *slot = value;
        }
        self
    }

    /// Sets the gain of one band in dB.
    pub fn with_band_gain_db(mut self, band: usize, db: f32) -> Self {
        if band < MAX_BANDS {
            self.band_gains_db[band] = db;
        }
        self
    }

    /// Sets the mute flag of one band.
    pub fn with_band_mute(mut self, band: usize, mute: bool) -> Self {
        if band < MAX_BANDS {
            self.band_mutes[band] = mute;
        }
        self
    }

    /// Sets the solo flag of one band.
    pub fn with_band_solo(mut self, band: usize, solo: bool) -> Self {
        if band < MAX_BANDS {
            self.band_solos[band] = solo;
        }
        self
    }

    /// Sets the master gain in dB.
    pub fn with_master_gain_db(mut self, db: f32) -> Self {
        self.master_gain_db = db;
        self
    }

    /// Sets the crossover slope.
    pub fn with_order(mut self, order: FilterOrder) -> Self {
        self.order = order;
        self
    }

    /// Enables or disables the linear-phase engine.
    pub fn with_linear_phase(mut self, enabled: bool) -> Self {
        self.linear_phase = enabled;
        self
    }

    /// Sets the FIR quality level.
    pub fn with_quality(mut self, quality: FirQuality) -> Self {
        self.quality = quality;
        self
    }

    /// Selects absolute crossover placement.
    pub fn with_absolute_frequencies(mut self, absolute: bool) -> Self {
        self.absolute_frequencies = absolute;
        self
    }

    /// Pins the frequency axis ceiling to 22.05 kHz.
    pub fn with_fixed_frequency_range(mut self, fixed: bool) -> Self {
        self.fixed_frequency_range = fixed;
        self
    }

    /// Number of active bands.
    pub fn num_bands(&self) -> usize {
        self.num_crossovers.min(MAX_CROSSOVERS) + 1
    }

    /// Returns a copy with every field forced into its valid domain.
    /// The splitter applies this before any coefficient work, so no filter
    /// ever sees an out-of-domain value.
    pub fn clamped(&self) -> Self {
        let mut p = self.clone();
        p.num_crossovers = p.num_crossovers.min(MAX_CROSSOVERS);
        for c in &mut p.crossovers {
            *c = c.clamp(0.0, 1.0);
        }
        for g in &mut p.band_gains_db {
            *g = g.clamp(GAIN_DB_MIN, GAIN_DB_MAX);
        }
        p.master_gain_db = p.master_gain_db.clamp(GAIN_DB_MIN, GAIN_DB_MAX);
        p
    }
}

/// Converts a gain in dB to a linear factor.
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}
