//! article-tts-rs CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use article_tts_rs::audio::{MODEL_SAMPLE_RATE, PreparedReference, prepare_reference};
use article_tts_rs::cli::Args;
use article_tts_rs::engine::{BatchOutcome, SynthesisRunner};
use article_tts_rs::model::{HttpModel, SynthesisParameters};
use article_tts_rs::output::{OutputWriter, RunDirectory, RunDirectoryManager};
use article_tts_rs::text::{SentenceUnit, segment};
use article_tts_rs::voice::{SampleLibrary, find_default_reference};

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Fatal before any processing: the input text must exist.
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input text: {}", args.input.display()))?;

    println!("Processing text of {} characters...", text.chars().count());
    let sentences = segment(&text);
    println!("Split into {} sentences", sentences.len());

    println!("Loading TTS model...");
    let model = HttpModel::load(args.device, &args.host)
        .context("Failed to load model on the server")?;
    println!("Using device: {}", model.info().device);

    if args.samples_dir.is_some() {
        run_multi_sample(&args, &model, &sentences)
    } else {
        run_single(&args, &model, &sentences)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Single-reference mode: flat output, one optional reference voice.
fn run_single(args: &Args, model: &HttpModel, sentences: &[SentenceUnit]) -> Result<()> {
    let mut params = args.parameters();

    let reference_path = args
        .reference
        .clone()
        .or_else(|| find_default_reference(args.input.parent().unwrap_or(Path::new("."))));

    match &reference_path {
        Some(path) => match prepare_reference(path, MODEL_SAMPLE_RATE, args.max_reference_secs) {
            Ok(prepared) => {
                println!("Using reference audio for voice cloning: {}", path.display());
                println!("{}", prepared.status());
                params = params.with_reference(prepared.path());
            }
            Err(e) => {
                log::warn!("reference preparation failed: {e}");
                println!("Reference processing failed: {e}. Using default voice.");
            }
        },
        None => {
            println!("No reference audio found. Using default voice.");
        }
    }

    print_parameters(&params);

    let writer = OutputWriter::new(&args.output_root)?;
    let runner = SynthesisRunner::new(model);
    let outcome = runner.run(sentences, &params, args.sentence_limit, &writer);

    report_outcome(&outcome)?;

    let combined = writer.write_combined(
        outcome
            .combined
            .as_ref()
            .context("no combined waveform after a successful run")?,
    )?;
    println!("Complete audio saved to {}", combined.display());

    println!("Generated files:");
    for file in writer.list_audio()? {
        println!("  {}", file.display());
    }

    Ok(())
}

/// Multi-sample mode: one run directory, one subdirectory per voice.
fn run_multi_sample(args: &Args, model: &HttpModel, sentences: &[SentenceUnit]) -> Result<()> {
    let samples_dir = args
        .samples_dir
        .as_ref()
        .context("multi-sample mode requires --samples-dir")?;

    let samples = SampleLibrary::new(samples_dir)
        .discover()
        .with_context(|| format!("Failed to scan samples directory: {}", samples_dir.display()))?;
    if samples.is_empty() {
        bail!(
            "No audio samples found in {}. Add audio files and try again.",
            samples_dir.display()
        );
    }

    println!("Found {} audio samples:", samples.len());
    for sample in &samples {
        println!("  - {}", sample.name);
    }

    let manager = RunDirectoryManager::new(&args.output_root);
    let run = manager.create_run()?;
    println!("Run output directory: {}", run.path().display());

    let mut successful_samples = 0usize;
    let mut written: Vec<PathBuf> = Vec::new();

    for sample in &samples {
        println!("{}", "=".repeat(60));
        println!("Processing with audio sample: {}", sample.name);
        println!("{}", "=".repeat(60));

        let prepared =
            match prepare_reference(&sample.path, MODEL_SAMPLE_RATE, args.max_reference_secs) {
                Ok(prepared) => prepared,
                Err(e) => {
                    log::warn!("skipping sample {}: {e}", sample.name);
                    println!("Failed to process reference audio: {e}");
                    continue;
                }
            };
        println!("{}", prepared.status());

        let params = args.parameters().with_reference(prepared.path());
        print_parameters(&params);

        match synthesize_sample(args, model, sentences, &manager, &run, sample.name.as_str(), &params) {
            Ok(files) => {
                written.extend(files);
                successful_samples += 1;
            }
            Err(e) => {
                log::warn!("sample {} produced no audio: {e}", sample.name);
                println!("{e}");
            }
        }

        cleanup_reference(&prepared);
    }

    println!("{}", "=".repeat(60));
    println!("PROCESSING COMPLETE");
    println!("{}", "=".repeat(60));
    println!(
        "Successfully processed {}/{} audio samples",
        successful_samples,
        samples.len()
    );
    println!("Run directory: {}", run.path().display());
    println!("'latest' alias points to the most recent run.");

    println!("Generated output structure:");
    written.sort();
    for file in &written {
        println!("  {}", file.display());
    }

    Ok(())
}

/// Run one voice's batch into its subdirectory; returns the files written.
fn synthesize_sample(
    args: &Args,
    model: &HttpModel,
    sentences: &[SentenceUnit],
    manager: &RunDirectoryManager,
    run: &RunDirectory,
    name: &str,
    params: &SynthesisParameters,
) -> Result<Vec<PathBuf>> {
    let dir = manager.sample_dir(run, name)?;
    let writer = OutputWriter::new(dir)?;

    let runner = SynthesisRunner::new(model);
    let outcome = runner.run(sentences, params, args.sentence_limit, &writer);

    report_outcome(&outcome)?;

    writer.write_combined(
        outcome
            .combined
            .as_ref()
            .context("no combined waveform after a successful run")?,
    )?;

    Ok(writer.list_audio()?)
}

fn print_parameters(params: &SynthesisParameters) {
    println!("TTS Parameters:");
    for line in params.describe() {
        println!("{line}");
    }
}

/// Print the per-run summary; an all-failed batch is terminal for the run.
fn report_outcome(outcome: &BatchOutcome) -> Result<()> {
    for line in outcome.log.lines() {
        println!("{line}");
    }

    if outcome.failed() {
        bail!(
            "No audio was successfully generated ({} sentences attempted).",
            outcome.attempts()
        );
    }

    Ok(())
}

fn cleanup_reference(prepared: &PreparedReference) {
    if let Err(e) = prepared.remove() {
        log::warn!(
            "could not remove processed reference {}: {e}",
            prepared.path().display()
        );
    }
}
