mod analyst;
mod render;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use voxscreen_audio::AudioRecorder;
use voxscreen_core::{ApiKey, AppPhase, format_elapsed};
use voxscreen_engine::engine::ScreeningEngine;
use voxscreen_providers::gemini::GeminiAnalysisConfig;

use analyst::GeminiAnalyst;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cfg = config_from_env()?;
    log::info!("VoxScreen starting (model: {})", cfg.model);

    let mut engine = ScreeningEngine::new(Arc::new(GeminiAnalyst::new(cfg)));
    let mut recorder = AudioRecorder::new();

    println!("VoxScreen voice health screening");
    println!("{}", render::DISCLAIMER);

    loop {
        println!();
        println!("{}", render::INSTRUCTIONS);
        print!("Press Enter to start recording (q to quit): ");
        std::io::stdout().flush()?;

        if read_line()?.trim().eq_ignore_ascii_case("q") {
            break;
        }

        engine.start_recording()?;

        if let Err(e) = recorder.start() {
            log::error!("failed to start recording: {e}");
            engine.recording_failed()?;
            show_failure_and_reset(&mut engine)?;
            continue;
        }

        run_elapsed_ticker(&recorder).await?;

        match recorder.stop() {
            Ok(payload) => {
                println!("Analyzing your voice... this may take a moment.");
                engine.analyze(&payload).await?;
            }
            Err(e) => {
                log::error!("recording failed: {e}");
                engine.recording_failed()?;
            }
        }

        match engine.phase() {
            AppPhase::Results => {
                if let Some(report) = engine.report() {
                    println!();
                    println!("{}", render::render_report(report));
                }
                wait_for_enter("Press Enter to record again: ")?;
                engine.reset()?;
            }
            _ => show_failure_and_reset(&mut engine)?,
        }
    }

    Ok(())
}

/// The API key is the one required credential; a missing or empty key is a
/// fatal configuration error. Base URL and model have sensible defaults.
fn config_from_env() -> anyhow::Result<GeminiAnalysisConfig> {
    let api_key = ApiKey::new(
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY must be set")?,
    );
    anyhow::ensure!(!api_key.is_empty(), "GEMINI_API_KEY must not be empty");

    let mut cfg = GeminiAnalysisConfig::new(api_key);
    if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
        cfg.base_url = base_url;
    }
    if let Ok(model) = std::env::var("GEMINI_MODEL") {
        cfg.model = model;
    }
    Ok(cfg)
}

/// Redraw the MM:SS counter once per second until the user presses Enter.
/// The first tick fires immediately, so the display starts at 00:00.
async fn run_elapsed_ticker(recorder: &AudioRecorder) -> anyhow::Result<()> {
    let mut input = tokio::task::spawn_blocking(read_line);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(secs) = recorder.elapsed_secs() {
                    print!("\rRecording {}  (press Enter to stop)", format_elapsed(secs));
                    std::io::stdout().flush()?;
                }
            }
            res = &mut input => {
                res.context("stdin reader task failed")??;
                println!();
                return Ok(());
            }
        }
    }
}

fn show_failure_and_reset(engine: &mut ScreeningEngine) -> anyhow::Result<()> {
    println!();
    println!(
        "An error occurred: {}",
        engine.error_message().unwrap_or("An unknown error occurred.")
    );
    wait_for_enter("Press Enter to try again: ")?;
    engine.reset()?;
    Ok(())
}

fn wait_for_enter(prompt: &str) -> anyhow::Result<()> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    read_line()?;
    Ok(())
}

fn read_line() -> std::io::Result<String> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}
