use anyhow::{bail, Context};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use squeeze_compare::cli::{Args, Commands, EncoderChoice, ViewChoice};
use squeeze_compare::constants::DEFAULT_MAX_SIZE_BYTES;
use squeeze_compare::utils::{create_progress_spinner, print_statistics};
use squeeze_compare::{
    console_info, console_verbose, console_warn, generate_report, logger, print_source_info,
    render_comparison, save_rendering, save_result, sweep_settings, ComparisonMode,
    ComparisonTarget, CompositeRenderer, CompressionError, CompressionSession, CompressionSettings,
    CompressorEncoder, Encoder, EncoderId, OutputFormat, SizeTargetEncoder, SourceImage,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init(args.verbose, args.quiet);
    setup_thread_pool(args.threads);

    match args.command {
        Commands::Compress {
            input,
            encoder,
            quality,
            width,
            height,
            format,
            output_dir,
            view,
            view_output,
            slider_position,
            max_size_kb,
        } => {
            let settings = build_settings(quality, width, height, format)?;
            let options = CompressOptions {
                encoder,
                view,
                view_output,
                slider_position,
                output_dir,
                max_size_bytes: max_size_bytes(max_size_kb),
            };
            compress(&input, settings, options).await?;
        }
        Commands::Sweep {
            input,
            qualities,
            encoder,
            width,
            height,
            format,
            report,
            max_size_kb,
        } => {
            let encoder: Arc<dyn Encoder> = match encoder {
                EncoderChoice::A => Arc::new(CompressorEncoder::default()),
                EncoderChoice::B => Arc::new(SizeTargetEncoder::new(max_size_bytes(max_size_kb))),
                EncoderChoice::Both => bail!("sweep runs a single encoder; choose -e a or -e b"),
            };
            let settings = qualities
                .iter()
                .map(|&q| build_settings(Some(q), width, height, format.clone()))
                .collect::<anyhow::Result<Vec<_>>>()?;
            sweep(&input, encoder.as_ref(), &settings, report.as_deref()).await?;
        }
        Commands::Info { input } => {
            console_info!("📋 Getting info for: {:?}", input);
            let source = SourceImage::open(&input)
                .with_context(|| format!("failed to load {}", input.display()))?;
            print_source_info(&source);
        }
    }

    Ok(())
}

struct CompressOptions {
    encoder: EncoderChoice,
    view: ViewChoice,
    view_output: Option<PathBuf>,
    slider_position: f32,
    output_dir: PathBuf,
    max_size_bytes: u64,
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if let Err(e) = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
        {
            console_warn!("Failed to set thread pool size: {}", e);
        }
    }
}

fn max_size_bytes(max_size_kb: Option<u64>) -> u64 {
    max_size_kb
        .map(|kb| kb.saturating_mul(1024))
        .unwrap_or(DEFAULT_MAX_SIZE_BYTES)
}

fn build_settings(
    quality: Option<f32>,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
) -> anyhow::Result<CompressionSettings> {
    let output_type = format
        .map(|f| f.parse::<OutputFormat>())
        .transpose()
        .context("invalid output format")?;
    Ok(CompressionSettings::new(quality, width, height, output_type)?)
}

fn comparison_mode(view: ViewChoice) -> ComparisonMode {
    match view {
        ViewChoice::None => ComparisonMode::None,
        ViewChoice::SideBySide => ComparisonMode::SideBySide,
        ViewChoice::Slider => ComparisonMode::Slider,
    }
}

async fn compress(
    input: &Path,
    settings: CompressionSettings,
    options: CompressOptions,
) -> anyhow::Result<()> {
    let session = CompressionSession::with_default_encoders(options.max_size_bytes);

    let source = SourceImage::open(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    console_info!(
        "🖼️  Source: {}x{} {} ({} bytes)",
        source.width(),
        source.height(),
        source.mime_type(),
        source.size()
    );
    session.set_source(source);

    console_verbose!(
        "Settings: quality {}%, max {:?}x{:?}, output {}",
        settings.quality_percent(),
        settings.max_width,
        settings.max_height,
        settings.output_type
    );
    if !settings.output_type.is_lossy() {
        console_verbose!("Lossless output: quality only selects the PNG optimizer level");
    }

    let spinner = create_progress_spinner("Compressing...");
    let outcome = match options.encoder {
        EncoderChoice::A => session.encode_with(EncoderId::A, settings).await.map(|_| ()),
        EncoderChoice::B => session.encode_with(EncoderId::B, settings).await.map(|_| ()),
        EncoderChoice::Both => session.compare_both(settings).await.map(|_| ()),
    };
    spinner.finish_and_clear();

    // a comparison where one encoder failed still reports the other
    let failure = match outcome {
        Ok(()) => None,
        Err(e @ CompressionError::CompareFailed(_)) if session.latest_result().is_ok() => {
            console_warn!("{}", e);
            Some(e)
        }
        Err(e) => return Err(e).context("compression failed"),
    };

    for id in EncoderId::ALL {
        if let Ok(stats) = session.statistics_for(id) {
            let label = format!("Encoder {} ({})", id, session.encoder_name(id));
            print_statistics(&label, &stats);
        }
    }

    // slider after a successful compress is the default view
    let mode = comparison_mode(options.view);
    let target = if session.result(EncoderId::A).is_some() && session.result(EncoderId::B).is_some()
    {
        ComparisonTarget::ResultPair
    } else {
        ComparisonTarget::SourceVsLatest
    };
    session.select_comparison_mode(mode, target)?;

    if let Some(path) = &options.view_output {
        match session.comparison_images() {
            Some(images) => {
                let renderer = CompositeRenderer::new(options.slider_position);
                if let Some(rendering) =
                    render_comparison(&renderer, session.comparison().mode, &images)?
                {
                    save_rendering(&rendering, path)?;
                    console_info!(
                        "🔀 Comparison ({} vs {}) written to {:?}",
                        images.before_label,
                        images.after_label,
                        path
                    );
                }
            }
            None => console_warn!("No comparison selected; nothing rendered"),
        }
    }

    let latest = session.latest_result()?;
    let saved = save_result(&latest, &options.output_dir)?;
    console_info!("💾 Saved encoder {} result to {:?}", latest.encoder(), saved);

    match failure {
        Some(e) => Err(e).context("comparison finished with failures"),
        None => Ok(()),
    }
}

async fn sweep(
    input: &Path,
    encoder: &dyn Encoder,
    settings: &[CompressionSettings],
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let source = Arc::new(
        SourceImage::open(input).with_context(|| format!("failed to load {}", input.display()))?,
    );

    console_info!("🚀 Sweeping {} settings with {}", settings.len(), encoder.name());
    let entries = sweep_settings(encoder, Arc::clone(&source), settings).await;
    if entries.is_empty() {
        bail!("every sweep run failed");
    }

    let json = generate_report(&source, &entries).to_json()?;
    match report_path {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            console_info!("📄 Report written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
