use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Level;

use hum_remover::analysis::HumCandidate;
use hum_remover::audio::{read_wav, write_wav, AudioBuffer};
use hum_remover::config::AppConfig;
use hum_remover::engine::{
    design_harmonics, HumRemover, ProcessingRequest, TargetFrequency, MAX_HARMONIC_COUNT,
};
use hum_remover::error::{log_codec_error, log_dsp_error, CodecError, DspError};
use hum_remover::filter::{design_notch, FilterSpec};
use hum_remover::testing::synthetic::DEFAULT_SEED;
use hum_remover::testing::SyntheticHum;

#[derive(Parser, Debug)]
#[command(
    name = "hum_cli",
    about = "Detect and remove power-line hum from WAV recordings"
)]
struct Cli {
    /// JSON config file (defaults to $HUM_REMOVER_CONFIG, then hum_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove hum from a WAV file and write a 16-bit WAV
    Process {
        input: PathBuf,
        output: PathBuf,
        /// "auto" or a fundamental in Hz
        #[arg(long)]
        frequency: Option<TargetFrequency>,
        /// Fundamental plus harmonics to notch
        #[arg(long)]
        harmonics: Option<u32>,
        #[arg(long)]
        quality: Option<f64>,
        /// Also write the JSON report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Score the hum candidates of a WAV file
    Detect { input: PathBuf },
    /// Print notch coefficients for a fundamental and its harmonics
    Design {
        #[arg(long)]
        frequency: f64,
        #[arg(long)]
        sample_rate: u32,
        #[arg(long)]
        quality: Option<f64>,
        #[arg(long, default_value_t = 1)]
        harmonics: u32,
    },
    /// Write a deterministic hum-contaminated test WAV
    Synth {
        output: PathBuf,
        #[arg(long, default_value_t = 60.0)]
        fundamental: f64,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
        #[arg(long, default_value_t = 3.0)]
        seconds: f64,
        #[arg(long, default_value_t = 1)]
        channels: usize,
        /// Hum lines to render, each at half the previous amplitude
        #[arg(
            long,
            default_value_t = 3,
            value_parser = clap::value_parser!(u32).range(0..=MAX_HARMONIC_COUNT as i64)
        )]
        harmonics: u32,
        /// Amplitude of the fundamental
        #[arg(long, default_value_t = 0.3)]
        amplitude: f64,
        /// Wanted tone mixed under the hum (Hz)
        #[arg(long, default_value_t = 440.0)]
        tone: f64,
        /// Amplitude of the wanted tone; 0 disables it
        #[arg(long, default_value_t = 0.2)]
        tone_amplitude: f64,
        #[arg(long, default_value_t = 0.01)]
        noise: f64,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },
    /// Serve the HTTP API
    #[cfg(feature = "http")]
    Serve {
        /// Listen address, overrides the config
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DetectReport {
    input: String,
    frequency: f64,
    score: f64,
    confident: bool,
    candidates: Vec<HumCandidate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DesignReport {
    filters: Vec<FilterSpec>,
    skipped: Vec<f64>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());
    init_logging(cli.verbose || config.debug);

    match cli.command {
        Commands::Process {
            input,
            output,
            frequency,
            harmonics,
            quality,
            report,
        } => {
            let harmonic_count = config
                .processing
                .check_harmonics(harmonics.unwrap_or(config.processing.harmonic_count))
                .map_err(anyhow::Error::msg)?;
            let request = ProcessingRequest {
                target: frequency.unwrap_or(config.processing.target),
                harmonic_count,
                quality_factor: quality.unwrap_or(config.processing.quality_factor),
            };
            run_process(&config, &input, &output, &request, report)
        }
        Commands::Detect { input } => run_detect(&config, &input),
        Commands::Design {
            frequency,
            sample_rate,
            quality,
            harmonics,
        } => run_design(
            frequency,
            sample_rate,
            quality.unwrap_or(config.processing.quality_factor),
            config
                .processing
                .check_harmonics(harmonics)
                .map_err(anyhow::Error::msg)?,
        ),
        Commands::Synth {
            output,
            fundamental,
            sample_rate,
            seconds,
            channels,
            harmonics,
            amplitude,
            tone,
            tone_amplitude,
            noise,
            seed,
        } => {
            let hum = SyntheticHum {
                fundamental,
                harmonic_amplitudes: (0..harmonics)
                    .map(|index| amplitude * 0.5f64.powi(index as i32))
                    .collect(),
                tone: (tone_amplitude > 0.0).then_some((tone, tone_amplitude)),
                noise_amplitude: noise,
                seed,
            };
            run_synth(&hum, &output, sample_rate, seconds, channels)
        }
        #[cfg(feature = "http")]
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            hum_remover::http::serve_blocking(&config, &addr)?;
            Ok(ExitCode::from(0))
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run_process(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    request: &ProcessingRequest,
    report_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let buffer = load(input)?;
    tracing::info!(
        input = %input.display(),
        target = %request.target,
        harmonics = request.harmonic_count,
        "removing hum"
    );

    let remover = HumRemover::from_config(&config.detection);
    let result = remover
        .remove_hum(buffer, request)
        .map_err(|err| dsp_failure(err, "process"))
        .with_context(|| format!("processing {}", input.display()))?;

    if !result.harmonics_skipped.is_empty() {
        tracing::warn!(
            "skipped harmonics at or above Nyquist: {:?}",
            result.harmonics_skipped
        );
    }
    if result.clipped_samples > 0 {
        tracing::warn!("{} samples clipped to ±1.0", result.clipped_samples);
    }

    write_wav(output, &result.buffer)
        .map_err(|err| codec_failure(err, "process"))
        .with_context(|| format!("writing {}", output.display()))?;

    let summary = result.summary();
    let json = serde_json::to_string_pretty(&summary)?;
    if let Some(path) = report_path {
        fs::write(&path, &json).with_context(|| format!("writing report {}", path.display()))?;
    }
    println!("{json}");
    tracing::info!("{}", summary.message);

    Ok(ExitCode::from(0))
}

fn run_detect(config: &AppConfig, input: &Path) -> Result<ExitCode> {
    let buffer = load(input)?;
    let detection = HumRemover::from_config(&config.detection)
        .detect(&buffer)
        .map_err(|err| dsp_failure(err, "detect"))
        .with_context(|| format!("detecting hum in {}", input.display()))?;

    let report = DetectReport {
        input: input.display().to_string(),
        frequency: detection.best.frequency,
        score: detection.best.score,
        confident: detection.best.confident,
        candidates: detection.candidates,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

fn run_design(
    frequency: f64,
    sample_rate: u32,
    quality_factor: f64,
    harmonics: u32,
) -> Result<ExitCode> {
    let plan = design_harmonics(frequency, harmonics, quality_factor, sample_rate);
    if plan.specs.is_empty() {
        // Surface the designer's reason for rejecting the fundamental itself
        if let Err(err) = design_notch(frequency, quality_factor, sample_rate) {
            return Err(dsp_failure(err, "design").into());
        }
        bail!("no notch could be designed for {frequency} Hz");
    }

    let report = DesignReport {
        filters: plan.specs,
        skipped: plan.skipped,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

fn run_synth(
    hum: &SyntheticHum,
    output: &Path,
    sample_rate: u32,
    seconds: f64,
    channels: usize,
) -> Result<ExitCode> {
    let buffer = hum
        .render(sample_rate, seconds, channels)
        .map_err(|err| dsp_failure(err, "synth"))?;
    write_wav(output, &buffer)
        .map_err(|err| codec_failure(err, "synth"))
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        frames = buffer.frames(),
        channels = buffer.channel_count(),
        "wrote synthetic hum"
    );
    Ok(ExitCode::from(0))
}

fn load(input: &Path) -> Result<AudioBuffer> {
    read_wav(input)
        .map_err(|err| codec_failure(err, "read"))
        .with_context(|| format!("reading {}", input.display()))
}

fn dsp_failure(err: DspError, context: &str) -> DspError {
    log_dsp_error(&err, context);
    err
}

fn codec_failure(err: CodecError, context: &str) -> CodecError {
    log_codec_error(&err, context);
    err
}
