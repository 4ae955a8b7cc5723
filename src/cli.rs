use bandsplit::core::coeffs::fraction_for_hz;
use bandsplit::{FilterOrder, FirQuality, Frame, MultibandSplitter, SplitterParams};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    // Parse remaining arguments
    let mut crossovers_hz: Vec<f64> = Vec::new();
    let mut band_gains: Vec<(usize, f32)> = Vec::new();
    let mut band_mutes: Vec<usize> = Vec::new();
    let mut band_solos: Vec<usize> = Vec::new();
    let mut master_db: Option<f32> = None;
    let mut order: Option<FilterOrder> = None;
    let mut linear_phase = false;
    let mut quality: Option<FirQuality> = None;
    let mut bands_out: Option<String> = None;
    let mut params_file: Option<String> = None;
    let mut save_params: Option<String> = None;
    let mut format_float = false;
    let mut verbose = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--xover" | "-x" => {
                i += 1;
                crossovers_hz = parse_hz_list(&args, i);
            }
            "--gain" | "-g" => {
                i += 1;
                band_gains.push(parse_band_value(&args, i, "gain"));
            }
            "--mute" => {
                i += 1;
                band_mutes.push(parse_usize(&args, i, "mute"));
            }
            "--solo" => {
                i += 1;
                band_solos.push(parse_usize(&args, i, "solo"));
            }
            "--master" | "-m" => {
                i += 1;
                master_db = Some(parse_f32(&args, i, "master"));
            }
            "--order" => {
                i += 1;
                order = Some(parse_order(&args, i));
            }
            "--fir" => linear_phase = true,
            "--quality" | "-q" => {
                i += 1;
                quality = Some(parse_quality(&args, i));
            }
            "--bands-out" => {
                i += 1;
                bands_out = Some(require_value(&args, i, "bands-out").to_string());
            }
            "--params" => {
                i += 1;
                params_file = Some(require_value(&args, i, "params").to_string());
            }
            "--save-params" => {
                i += 1;
                save_params = Some(require_value(&args, i, "save-params").to_string());
            }
            "--float" => format_float = true,
            "--verbose" | "-v" => verbose = true,
            other => {
                eprintln!("ERROR: Unknown option '{}'", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Read input
    let buffer = match bandsplit::io::wav::read_wav_file(input_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "Input: {} frames, {} Hz, {:?}, {:.2}s",
        buffer.num_frames(),
        buffer.sample_rate,
        buffer.channels,
        buffer.duration_secs()
    );

    let sample_rate = buffer.sample_rate;

    // Start from a saved parameter file when given, otherwise defaults.
    let mut params = if let Some(path) = &params_file {
        match load_params(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("ERROR: Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        }
    } else {
        SplitterParams::default()
    };

    if !crossovers_hz.is_empty() {
        // CLI positions are absolute frequencies; map them onto the
        // exponential axis directly.
        params = params.with_absolute_frequencies(true);
        let fractions: Vec<f32> = crossovers_hz
            .iter()
            .map(|&hz| fraction_for_hz(hz, sample_rate, params.fixed_frequency_range) as f32)
            .collect();
        params = params.with_crossovers(&fractions);
    }

    for &(band, db) in &band_gains {
        params = params.with_band_gain_db(band, db);
    }
    for &band in &band_mutes {
        params = params.with_band_mute(band, true);
    }
    for &band in &band_solos {
        params = params.with_band_solo(band, true);
    }
    if let Some(db) = master_db {
        params = params.with_master_gain_db(db);
    }
    if let Some(o) = order {
        params = params.with_order(o);
    }
    if linear_phase {
        params = params.with_linear_phase(true);
    }
    if let Some(q) = quality {
        params = params.with_quality(q);
    }

    if let Some(path) = &save_params {
        if let Err(e) = store_params(path, &params) {
            eprintln!("ERROR: Failed to write {}: {}", path, e);
            std::process::exit(1);
        }
        eprintln!("Parameters saved to {}", path);
    }

    let mut splitter = match MultibandSplitter::new(params, sample_rate) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if verbose {
        let hz = splitter.crossover_frequencies_hz();
        eprintln!("Bands: {}", splitter.num_bands());
        eprintln!(
            "Crossovers: {}",
            hz.iter()
                .map(|f| format!("{:.1} Hz", f))
                .collect::<Vec<_>>()
                .join(", ")
        );
        eprintln!("Order: {:?}", splitter.params().order);
        eprintln!("Linear phase: {}", splitter.params().linear_phase);
        if splitter.params().linear_phase {
            eprintln!("Quality: {:?}", splitter.params().quality);
        }
        eprintln!("Latency: {} samples", splitter.latency());
    }

    let stereo = buffer.to_stereo();
    let num_frames = stereo.num_frames();
    let num_bands = splitter.num_bands();
    let latency = splitter.latency();

    let start = std::time::Instant::now();

    // Process frame by frame so the per-band taps can be captured, feeding
    // `latency` extra silent frames and dropping the same amount from the
    // front so the output lines up with the input.
    splitter.update_settings();
    let mut out_data: Vec<f32> = Vec::with_capacity(num_frames * 2);
    let mut band_data: Vec<Vec<f32>> = vec![Vec::new(); if bands_out.is_some() { num_bands } else { 0 }];

    for i in 0..num_frames + latency {
        let frame = if i < num_frames {
            Frame::new(stereo.data[2 * i], stereo.data[2 * i + 1])
        } else {
            Frame::mono(0.0)
        };
        let out = splitter.process_frame(frame);
        if i < latency {
            continue;
        }
        out_data.push(out.left);
        out_data.push(out.right);
        if bands_out.is_some() {
            let taps = splitter.band_frames();
            for (band, data) in band_data.iter_mut().enumerate() {
                data.push(taps[band].left);
                data.push(taps[band].right);
            }
        }
    }

    let elapsed = start.elapsed();

    if verbose {
        let processing_secs = elapsed.as_secs_f64();
        let realtime_factor = if processing_secs > 0.0 {
            stereo.duration_secs() / processing_secs
        } else {
            f64::INFINITY
        };
        eprintln!(
            "Processing time: {:.3}s ({:.1}x realtime)",
            processing_secs, realtime_factor
        );
    }

    let output = bandsplit::AudioBuffer::new(out_data, bandsplit::Channels::Stereo, sample_rate)
        .unwrap_or_else(|e| {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        });

    if let Err(e) = write_output(output_path, &output, format_float) {
        eprintln!("ERROR: Failed to write {}: {}", output_path, e);
        std::process::exit(1);
    }
    eprintln!("Written to {}", output_path);

    if let Some(prefix) = &bands_out {
        for (band, data) in band_data.into_iter().enumerate() {
            let path = format!("{}{}.wav", prefix, band + 1);
            let band_buffer =
                bandsplit::AudioBuffer::new(data, bandsplit::Channels::Stereo, sample_rate)
                    .unwrap_or_else(|e| {
                        eprintln!("ERROR: {}", e);
                        std::process::exit(1);
                    });
            if let Err(e) = write_output(&path, &band_buffer, format_float) {
                eprintln!("ERROR: Failed to write {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written band {} to {}", band + 1, path);
        }
    }
}

fn write_output(
    path: &str,
    buffer: &bandsplit::AudioBuffer,
    float: bool,
) -> Result<(), bandsplit::SplitterError> {
    if float {
        bandsplit::io::wav::write_wav_file_float(path, buffer)
    } else {
        bandsplit::io::wav::write_wav_file_16bit(path, buffer)
    }
}

fn load_params(path: &str) -> Result<SplitterParams, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn store_params(path: &str, params: &SplitterParams) -> Result<(), String> {
    let text = serde_json::to_string_pretty(params).map_err(|e| e.to_string())?;
    std::fs::write(path, text).map_err(|e| e.to_string())
}

fn print_usage() {
    eprintln!("Usage: bandsplit <input.wav> <output.wav> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --xover <hz,hz,...>    Crossover frequencies in Hz (up to 4)");
    eprintln!("  --gain <band>:<db>     Gain for band N (1-based), repeatable");
    eprintln!("  --mute <band>          Mute band N, repeatable");
    eprintln!("  --solo <band>          Solo band N, repeatable");
    eprintln!("  --master <db>          Master output gain");
    eprintln!("  --order <2|4>          Crossover slope: 2-pole or 4-pole (default: 4)");
    eprintln!("  --fir                  Linear-phase (FIR) mode");
    eprintln!("  --quality <name>       FIR quality: normal, high, extreme");
    eprintln!("  --bands-out <prefix>   Also write each band to <prefix>N.wav");
    eprintln!("  --params <file>        Load parameters from a JSON file");
    eprintln!("  --save-params <file>   Save the effective parameters as JSON");
    eprintln!("  --float                Write 32-bit float output (default: 16-bit)");
    eprintln!("  --verbose, -v          Show configuration and timing");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  bandsplit in.wav out.wav --xover 120,2000 --gain 1:-3 --solo 2");
    eprintln!("  bandsplit in.wav out.wav --xover 800 --fir --quality high");
    eprintln!("  bandsplit in.wav out.wav --xover 100,800,5000 --bands-out band_");
}

fn require_value<'a>(args: &'a [String], idx: usize, name: &str) -> &'a str {
    if idx >= args.len() {
        eprintln!("ERROR: --{} requires a value", name);
        std::process::exit(1);
    }
    &args[idx]
}

fn parse_f32(args: &[String], idx: usize, name: &str) -> f32 {
    match require_value(args, idx, name).parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    }
}

fn parse_usize(args: &[String], idx: usize, name: &str) -> usize {
    let band: usize = match require_value(args, idx, name).parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("ERROR: Invalid {}: {}", name, args[idx]);
            std::process::exit(1);
        }
    };
    if band == 0 {
        eprintln!("ERROR: Bands are numbered from 1");
        std::process::exit(1);
    }
    band - 1
}

fn parse_hz_list(args: &[String], idx: usize) -> Vec<f64> {
    let raw = require_value(args, idx, "xover");
    let mut out = Vec::new();
    for part in raw.split(',') {
        match part.trim().parse::<f64>() {
            Ok(hz) if hz > 0.0 => out.push(hz),
            _ => {
                eprintln!("ERROR: Invalid crossover frequency '{}'", part);
                std::process::exit(1);
            }
        }
    }
    if out.is_empty() || out.len() > 4 {
        eprintln!("ERROR: --xover takes 1 to 4 frequencies");
        std::process::exit(1);
    }
    out
}

fn parse_band_value(args: &[String], idx: usize, name: &str) -> (usize, f32) {
    let raw = require_value(args, idx, name);
    let parsed = raw.split_once(':').and_then(|(band, value)| {
        let band: usize = band.trim().parse().ok()?;
        let value: f32 = value.trim().parse().ok()?;
        (band >= 1).then_some((band - 1, value))
    });
    match parsed {
        Some(pair) => pair,
        None => {
            eprintln!("ERROR: Invalid --{} '{}' (expected <band>:<value>)", name, raw);
            std::process::exit(1);
        }
    }
}

fn parse_order(args: &[String], idx: usize) -> FilterOrder {
    match require_value(args, idx, "order") {
        "2" => FilterOrder::TwoPole,
        "4" => FilterOrder::FourPole,
        other => {
            eprintln!("ERROR: Unknown order '{}' (use 2 or 4)", other);
            std::process::exit(1);
        }
    }
}

fn parse_quality(args: &[String], idx: usize) -> FirQuality {
    match require_value(args, idx, "quality") {
        "normal" => FirQuality::Normal,
        "high" => FirQuality::High,
        "extreme" => FirQuality::Extreme,
        other => {
            eprintln!("ERROR: Unknown quality '{}' (use normal, high, extreme)", other);
            std::process::exit(1);
        }
    }
}
