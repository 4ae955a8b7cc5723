//! Linear-phase synthesizer: turns the recursive splitting cascade into
//! per-band symmetric FIR filters, kept in the frequency domain.
//!
//! Each band's impulse response is captured by exciting a fresh,
//! zero-state copy of the splitting network with a scaled unit impulse.
//! The response is forward-transformed and its phase replaced by a fixed
//! ramp, which yields a symmetric (linear-phase) impulse centered inside
//! the causal convolution window. The spectra are retained as-is: the
//! block convolver works directly in the frequency domain.

use rustfft::num_complex::Complex;

use crate::core::network::SplittingNetwork;
use crate::core::svf::SvfCoeffs;
use crate::core::types::{FilterOrder, FirQuality, MAX_BANDS};
use crate::fir::transform::{Transform, COMPLEX_ZERO};

/// `(cos, sin)` of `1.5 * PI * i` for integer `i` — the phase ramp applied
/// to every bin. The ramp is 4-periodic and exact in this form. Its slope
/// is a tuned constant: it centers the symmetric impulse at a quarter of
/// the transform rather than at time zero, which would need negative-time
/// samples. For power-of-two transforms this ramp is odd-symmetric across
/// the spectrum, so the phase-stripped spectra stay Hermitian and the
/// underlying FIR stays real.
#[inline]
fn phase_ramp(bin: usize) -> (f32, f32) {
    match bin % 4 {
        0 => (1.0, 0.0),
        1 => (0.0, -1.0),
        2 => (-1.0, 0.0),
        _ => (0.0, 1.0),
    }
}

/// Renders one frequency-domain FIR spectrum per band.
///
/// `coeffs` holds one SVF coefficient set per active crossover (so
/// `coeffs.len() + 1` spectra come back), and `fft` must be planned at
/// `quality.transform_size()`.
pub fn render_band_spectra(
    coeffs: &[SvfCoeffs],
    order: FilterOrder,
    quality: FirQuality,
    fft: &Transform,
) -> Vec<Vec<Complex<f32>>> {
    let size = quality.transform_size();
    let fir_length = quality.fir_length();
    debug_assert_eq!(fft.size(), size);

    let num_bands = coeffs.len() + 1;
    let mut network = SplittingNetwork::new();
    network.configure(coeffs, order);
    network.reset();

    // Run the cascade on a 1/size impulse; the scaling pre-compensates the
    // two unnormalized forward transforms and one unnormalized inverse
    // that the signal will pass through in total.
    let scale = 1.0 / size as f64;
    let mut buffers = vec![vec![COMPLEX_ZERO; size]; num_bands];
    let mut bands = [0.0f64; MAX_BANDS];
    for i in 0..fir_length {
        let x = if i == 0 { scale } else { 0.0 };
        network.split(x, &mut bands);
        for (buffer, &band) in buffers.iter_mut().zip(bands.iter()) {
            buffer[i] = Complex::new(band as f32, 0.0);
        }
    }

    // Transform and strip phase, keeping only the magnitude under the
    // fixed ramp.
    for buffer in &mut buffers {
        fft.forward(buffer);
        for (bin, value) in buffer.iter_mut().enumerate() {
            let magnitude = value.norm();
            let (cos, sin) = phase_ramp(bin);
            *value = Complex::new(magnitude * cos, magnitude * sin);
        }
    }

    buffers
}
