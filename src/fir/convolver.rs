//! Overlap-add block convolution against a precomputed frequency-domain
//! impulse response.
//!
//! One convolver serves one band for the stereo pair: incoming frames are
//! packed as `re = left, im = right`. That packing is exact because the
//! band spectra are Hermitian (the underlying FIR is real), so the complex
//! product distributes over the two channels without crosstalk.

use rustfft::num_complex::Complex;

use crate::core::types::{FirQuality, Frame};
use crate::fir::transform::{multiply_spectra, Transform, COMPLEX_ZERO};

/// Per-band overlap-add convolution engine.
///
/// Two transform-sized buffers ping-pong: one accumulates incoming frames
/// while the other, already convolved, supplies output plus the
/// overlap-add tail of the block before it. The chunk length
/// `transform_size - fir_length - 1` guarantees one block's convolution
/// never wraps around the transform.
pub struct BlockConvolver {
    transform_size: usize,
    fir_length: usize,
    chunk: usize,
    current: Vec<Complex<f32>>,
    previous: Vec<Complex<f32>>,
    cursor: usize,
}

impl BlockConvolver {
    /// Creates a convolver sized for the given quality level.
    pub fn new(quality: FirQuality) -> Self {
        let transform_size = quality.transform_size();
        let fir_length = quality.fir_length();
        let chunk = transform_size - fir_length - 1;
        Self {
            transform_size,
            fir_length,
            chunk,
            current: vec![COMPLEX_ZERO; transform_size],
            previous: vec![COMPLEX_ZERO; transform_size],
            cursor: 0,
        }
    }

    /// Fixed processing latency in samples: the chunk buffering plus half
    /// the FIR length (the symmetric impulse is centered there). Identical
    /// for every band of the same quality, which keeps bands time-aligned.
    pub fn latency(&self) -> usize {
        self.chunk + self.fir_length / 2
    }

    /// Zeroes all buffered audio and restarts the accumulation cursor.
    pub fn reset(&mut self) {
        self.current.fill(COMPLEX_ZERO);
        self.previous.fill(COMPLEX_ZERO);
        self.cursor = 0;
    }

    /// Processes one stereo frame against the band spectrum.
    ///
    /// `fft` must be planned at the same transform size and `spectrum`
    /// must hold one bin per transform point.
    #[inline]
    pub fn process_frame(
        &mut self,
        frame: Frame,
        spectrum: &[Complex<f32>],
        fft: &Transform,
    ) -> Frame {
        if self.cursor == self.chunk {
            // Accumulation buffer is full: it becomes the new output block.
            std::mem::swap(&mut self.current, &mut self.previous);
            for slot in &mut self.current[self.chunk..] {
                *slot = COMPLEX_ZERO;
            }
            fft.forward(&mut self.current);
            multiply_spectra(&mut self.current, spectrum);
            fft.inverse(&mut self.current);
            self.cursor = 0;
        }

        let tail = if self.cursor < self.transform_size - self.chunk {
            self.previous[self.chunk + self.cursor]
        } else {
            COMPLEX_ZERO
        };
        let out = self.current[self.cursor] + tail;

        self.previous[self.cursor] = Complex::new(frame.left, frame.right);
        self.cursor += 1;

        Frame::new(out.re, out.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FilterOrder;
    use crate::fir::synthesis::render_band_spectra;

    #[test]
    fn test_latency_formula() {
        for quality in [FirQuality::Normal, FirQuality::High, FirQuality::Extreme] {
            let conv = BlockConvolver::new(quality);
            let expected =
                (quality.transform_size() - quality.fir_length() - 1) + quality.fir_length() / 2;
            assert_eq!(conv.latency(), expected);
        }
    }

    /// Convolving against the passthrough spectrum must reproduce the
    /// input delayed by exactly the reported latency, on both channels.
    #[test]
    fn test_passthrough_spectrum_is_pure_delay() {
        let quality = FirQuality::Normal;
        let fft = Transform::new(quality.transform_size());
        let spectrum =
            render_band_spectra(&[], FilterOrder::FourPole, quality, &fft).remove(0);

        let mut conv = BlockConvolver::new(quality);
        let latency = conv.latency();
        let len = latency + 3000;

        let left: Vec<f32> = (0..len).map(|i| (i as f32 * 0.0137).sin()).collect();
        let right: Vec<f32> = (0..len).map(|i| (i as f32 * 0.0291).cos()).collect();

        let mut out_l = Vec::with_capacity(len);
        let mut out_r = Vec::with_capacity(len);
        for i in 0..len {
            let out = conv.process_frame(Frame::new(left[i], right[i]), &spectrum, &fft);
            out_l.push(out.left);
            out_r.push(out.right);
        }

        for i in latency..len {
            assert!(
                (out_l[i] - left[i - latency]).abs() < 1e-4,
                "left sample {i}: {} vs delayed {}",
                out_l[i],
                left[i - latency]
            );
            assert!(
                (out_r[i] - right[i - latency]).abs() < 1e-4,
                "right sample {i}: {} vs delayed {}",
                out_r[i],
                right[i - latency]
            );
        }
        // Nothing but (near) silence before the delay elapses.
        for (i, &s) in out_l[..latency.saturating_sub(8)].iter().enumerate() {
            assert!(s.abs() < 1e-3, "pre-latency leakage at {i}: {s}");
        }
    }

    #[test]
    fn test_reset_clears_buffers() {
        let quality = FirQuality::Normal;
        let fft = Transform::new(quality.transform_size());
        let spectrum =
            render_band_spectra(&[], FilterOrder::FourPole, quality, &fft).remove(0);

        let mut conv = BlockConvolver::new(quality);
        for i in 0..conv.latency() + 100 {
            conv.process_frame(Frame::mono((i as f32 * 0.3).sin()), &spectrum, &fft);
        }
        conv.reset();
        for _ in 0..conv.latency() + 100 {
            let out = conv.process_frame(Frame::mono(0.0), &spectrum, &fft);
            assert_eq!(out, Frame::mono(0.0));
        }
    }
}
