//! Thin facade over the FFT library.
//!
//! The synthesis and convolution code only ever needs three things: an
//! unnormalized forward transform, an unnormalized inverse transform, and
//! a pointwise complex multiply. Keeping those behind this seam is what
//! makes the rest of the FIR path transform-library-agnostic. rustfft
//! already produces natural bin order, so no bit-reversal permutation is
//! involved anywhere.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Zero-valued complex number, used for buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Planned forward/inverse FFT pair of one fixed size.
///
/// Both directions are unnormalized (a forward/inverse round trip scales
/// by the transform size); the impulse-scaling in the synthesizer accounts
/// for that.
pub struct Transform {
    size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Transform {
    /// Plans both directions for `size` points (must be a power of two for
    /// the sizes this crate uses, though rustfft itself does not care).
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Transform size in complex points.
    pub fn size(&self) -> usize {
        self.size
    }

    /// In-place forward transform.
    pub fn forward(&self, buf: &mut [Complex<f32>]) {
        debug_assert_eq!(buf.len(), self.size);
        self.forward.process(buf);
    }

    /// In-place inverse transform (unnormalized).
    pub fn inverse(&self, buf: &mut [Complex<f32>]) {
        debug_assert_eq!(buf.len(), self.size);
        self.inverse.process(buf);
    }
}

/// Pointwise complex multiply of `buf` by `spectrum`.
#[inline]
pub fn multiply_spectra(buf: &mut [Complex<f32>], spectrum: &[Complex<f32>]) {
    debug_assert_eq!(buf.len(), spectrum.len());
    for (b, &s) in buf.iter_mut().zip(spectrum.iter()) {
        *b *= s;
    }
}
