use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{pin_mut, StreamExt};
use tracing_subscriber::EnvFilter;

use skillet_core::{
    provider_from_env, ExtractionPipeline, ExtractionRequest, FakeClassifier, FakeDetector,
    FakeRecognizer, FakeTranscriber, HfInferenceClient, InstagramMediaSource, MockAudioStrategy,
    MockMediaSource, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "skillet")]
#[command(about = "Multi-modal recipe extraction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a recipe from a post URL
    Extract {
        /// The post URL to extract from
        url: String,
        /// Skip the video-frame analysis phase
        #[arg(long)]
        no_visual: bool,
        /// Skip the audio transcription phase
        #[arg(long)]
        no_audio: bool,
        /// Processing budget in seconds
        #[arg(long, default_value_t = 30)]
        max_seconds: u64,
        /// Print only the final recipe instead of streaming events
        #[arg(long)]
        batch: bool,
        /// Use offline fake capabilities instead of hosted inference
        #[arg(long, env = "SKILLET_OFFLINE")]
        offline: bool,
        /// Run the LLM refinement pass (provider from SKILLET_REFINER)
        #[arg(long)]
        refine: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            url,
            no_visual,
            no_audio,
            max_seconds,
            batch,
            offline,
            refine,
        } => {
            let pipeline = build_pipeline(offline, refine, &url)?;

            let request = ExtractionRequest {
                source_url: url,
                enable_visual: !no_visual,
                enable_audio: !no_audio,
                max_processing_secs: max_seconds,
            };

            if batch {
                let recipe = pipeline
                    .run_to_completion(request)
                    .await
                    .context("extraction failed")?;
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            } else {
                let stream = pipeline.run(request);
                pin_mut!(stream);
                while let Some(event) = stream.next().await {
                    println!("{}", serde_json::to_string(&event)?);
                }
            }
        }
    }

    Ok(())
}

/// Wire the pipeline: hosted inference plus metadata scraping by default,
/// deterministic fakes in offline mode.
fn build_pipeline(offline: bool, refine: bool, url: &str) -> Result<ExtractionPipeline> {
    let config = PipelineConfig::from_env();

    let pipeline = if offline {
        let media = MockMediaSource::new().with_text_post(
            url,
            "Quick vegan pasta with tomatoes, garlic and basil, ready in 15 minutes",
            "Weeknight pasta",
        );
        ExtractionPipeline::new(
            Arc::new(media),
            Arc::new(FakeClassifier::new().with_default("Main Course", 0.6)),
            Arc::new(FakeDetector::with_labels(&[("tomato", 0.8)])),
            Arc::new(FakeRecognizer::new()),
            Arc::new(FakeTranscriber::with_text(
                "add the pasta and stir for 10 minutes",
                0.8,
            )),
            vec![Arc::new(MockAudioStrategy::working("demux"))],
            config,
        )
    } else {
        let inference = Arc::new(
            HfInferenceClient::from_env().context("hosted inference is not configured")?,
        );
        let media =
            Arc::new(InstagramMediaSource::new().context("failed to build media source")?);
        // No video downloader is wired here, so frame and audio analysis
        // only engage for sources that expose handles; the thumbnail path
        // still works through the media source.
        ExtractionPipeline::new(
            media,
            inference.clone(),
            inference.clone(),
            inference.clone(),
            inference,
            Vec::new(),
            config,
        )
    };

    if refine {
        let provider = provider_from_env().context("failed to build refinement provider")?;
        Ok(pipeline.with_refiner(Arc::from(provider)))
    } else {
        Ok(pipeline)
    }
}
