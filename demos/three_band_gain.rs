//! Three-band splitting example.
//!
//! Demonstrates the simplest usage of the bandsplit library: splitting a
//! two-tone stereo signal at 200 Hz and 2 kHz, cutting the low band and
//! boosting the top.
//!
//! Run with: cargo run --example three_band_gain

use std::f32::consts::PI;

use bandsplit::core::coeffs::fraction_for_hz;
use bandsplit::{MultibandSplitter, SplitterParams};

fn main() {
    let sample_rate = 48000u32;
    let duration_secs = 1.0f32;

    // 100 Hz on the left, 5 kHz on the right
    let num_frames = (duration_secs * sample_rate as f32) as usize;
    let input: Vec<f32> = (0..num_frames)
        .flat_map(|i| {
            let t = i as f32 / sample_rate as f32;
            [(2.0 * PI * 100.0 * t).sin(), (2.0 * PI * 5000.0 * t).sin()]
        })
        .collect();

    println!("Input: {} frames ({:.2}s)", num_frames, duration_secs);

    let params = SplitterParams::default()
        .with_absolute_frequencies(true)
        .with_crossovers(&[
            fraction_for_hz(200.0, sample_rate, false) as f32,
            fraction_for_hz(2000.0, sample_rate, false) as f32,
        ])
        .with_band_gain_db(0, -12.0)
        .with_band_gain_db(2, 6.0);

    let mut splitter = MultibandSplitter::new(params, sample_rate).expect("bad sample rate");

    println!("Bands: {}", splitter.num_bands());
    println!(
        "Crossovers: {:?} Hz",
        splitter.crossover_frequencies_hz()
    );

    let mut output = vec![0.0f32; input.len()];
    splitter.process(&input, &mut output);

    let rms = |data: &[f32]| {
        (data.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / data.len() as f64).sqrt()
    };
    println!("Input RMS:  {:.4}", rms(&input));
    println!("Output RMS: {:.4}", rms(&output));
}
