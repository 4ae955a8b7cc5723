//! Linear-phase engine: FFT facade, impulse-response synthesis, and the
//! block convolution replay path.

pub mod convolver;
pub mod synthesis;
pub mod transform;
