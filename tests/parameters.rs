//! Parameter handling: clamping, serialization, gain/mute/solo
//! orchestration, and live reconfiguration.

use std::f32::consts::PI;

use bandsplit::{FilterOrder, FirQuality, MultibandSplitter, SplitterParams};

const SAMPLE_RATE: u32 = 48000;

fn sine_stereo(freq: f32, num_frames: usize) -> Vec<f32> {
    (0..num_frames)
        .flat_map(|i| {
            let s = (2.0 * PI * freq * i as f32 / SAMPLE_RATE as f32).sin();
            [s, s]
        })
        .collect()
}

fn output_rms(params: SplitterParams, input: &[f32]) -> f64 {
    let mut splitter = MultibandSplitter::new(params, SAMPLE_RATE).unwrap();
    let mut output = vec![0.0f32; input.len()];
    splitter.process(input, &mut output);
    (output.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / output.len() as f64).sqrt()
}

#[test]
fn test_gain_clamping() {
    let params = SplitterParams::default()
        .with_band_gain_db(0, -200.0)
        .with_band_gain_db(1, 99.0)
        .with_master_gain_db(1000.0)
        .clamped();
    assert_eq!(params.band_gains_db[0], -60.0);
    assert_eq!(params.band_gains_db[1], 24.0);
    assert_eq!(params.master_gain_db, 24.0);
}

#[test]
fn test_crossover_count_clamped_to_four() {
    let params = SplitterParams::default().with_crossovers(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
    assert_eq!(params.num_crossovers, 4);
    assert_eq!(params.num_bands(), 5);
}

#[test]
fn test_out_of_range_band_index_ignored() {
    let params = SplitterParams::default()
        .with_band_gain_db(17, -12.0)
        .with_band_mute(9, true)
        .with_band_solo(5, true);
    assert_eq!(params, SplitterParams::default());
}

#[test]
fn test_params_json_round_trip() {
    let params = SplitterParams::default()
        .with_crossovers(&[0.25, 0.7])
        .with_band_gain_db(1, -4.5)
        .with_band_mute(2, true)
        .with_master_gain_db(3.0)
        .with_order(FilterOrder::TwoPole)
        .with_linear_phase(true)
        .with_quality(FirQuality::Extreme)
        .with_absolute_frequencies(true);

    let json = serde_json::to_string(&params).unwrap();
    let restored: SplitterParams = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, params);
}

#[test]
fn test_band_gain_scales_band_energy() {
    // 100 Hz sits well below a mid crossover: the low band carries it.
    let input = sine_stereo(100.0, 48000);
    let base = SplitterParams::default().with_crossovers(&[0.6]);

    let flat = output_rms(base.clone(), &input);
    let cut = output_rms(base.with_band_gain_db(0, -20.0), &input);

    let ratio_db = 20.0 * (cut / flat).log10();
    assert!(
        (ratio_db + 20.0).abs() < 0.5,
        "expected -20 dB on the carrying band, got {ratio_db:.2} dB"
    );
}

#[test]
fn test_mute_silences_band() {
    let input = sine_stereo(100.0, 24000);
    let base = SplitterParams::default().with_crossovers(&[0.6]);

    let flat = output_rms(base.clone(), &input);
    let muted = output_rms(base.with_band_mute(0, true), &input);
    assert!(
        muted < flat * 0.02,
        "muted carrying band still audible: {muted} vs {flat}"
    );
}

#[test]
fn test_solo_takes_precedence_over_other_bands() {
    let input = sine_stereo(100.0, 24000);
    let base = SplitterParams::default().with_crossovers(&[0.6]);

    // Solo the high band: the 100 Hz tone (low band) must disappear.
    let soloed = output_rms(base.clone().with_band_solo(1, true), &input);
    let flat = output_rms(base.clone(), &input);
    assert!(soloed < flat * 0.05, "solo did not exclude the low band");

    // A soloed band plays even while muted.
    let solo_and_mute = output_rms(
        base.with_band_solo(0, true).with_band_mute(0, true),
        &input,
    );
    assert!(
        solo_and_mute > flat * 0.9,
        "soloed band should override its own mute"
    );
}

#[test]
fn test_master_gain_applies_after_sum() {
    let input = sine_stereo(440.0, 24000);
    let base = SplitterParams::default().with_crossovers(&[0.5]);

    let flat = output_rms(base.clone(), &input);
    let halved = output_rms(base.with_master_gain_db(-6.020_6), &input);
    assert!(
        (halved / flat - 0.5).abs() < 0.01,
        "-6.02 dB master should halve the level: {}",
        halved / flat
    );
}

#[test]
fn test_live_crossover_move_changes_split() {
    let input = sine_stereo(1000.0, 24000);

    // Solo the low band with the crossover above 1 kHz: tone passes.
    let mut splitter = MultibandSplitter::new(
        SplitterParams::default()
            .with_crossovers(&[0.9])
            .with_band_solo(0, true),
        SAMPLE_RATE,
    )
    .unwrap();
    let mut output = vec![0.0f32; input.len()];
    splitter.process(&input, &mut output);
    let high_cut: f64 =
        (output.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / output.len() as f64).sqrt();

    // Move the crossover below 1 kHz: the soloed low band loses the tone.
    let params = splitter.params().clone().with_crossovers(&[0.1]);
    splitter.set_params(params);
    splitter.process(&input, &mut output);
    let low_cut: f64 = (output[4096..].iter().map(|&s| s as f64 * s as f64).sum::<f64>()
        / (output.len() - 4096) as f64)
        .sqrt();

    assert!(
        low_cut < high_cut * 0.1,
        "moving the crossover had no effect: {low_cut} vs {high_cut}"
    );
}

#[test]
fn test_crossover_frequencies_are_ordered() {
    let splitter = MultibandSplitter::new(
        SplitterParams::default().with_crossovers(&[0.5, 0.5, 0.5, 0.5]),
        SAMPLE_RATE,
    )
    .unwrap();
    let hz = splitter.crossover_frequencies_hz();
    assert_eq!(hz.len(), 4);
    assert!(
        hz.windows(2).all(|w| w[0] < w[1]),
        "cascaded crossovers out of order: {hz:?}"
    );
}

#[test]
fn test_zero_sample_rate_rejected() {
    assert!(MultibandSplitter::new(SplitterParams::default(), 0).is_err());
}
