mod cli;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vconv_core::config::DEFAULT_CONFIG_FILE;
use vconv_core::{
    load_config, load_config_or_default, validate_config, BatchController, BatchInvoker,
    BatchRequest, Config, ConversionOptions, Provisioner,
};

use cli::{Cli, Command, ConvertArgs};
use render::{BarRenderer, EventRenderer, JsonRenderer};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(&cli)?;

    // Provision ffmpeg before anything else needs it
    let provisioner =
        Provisioner::http(config.provisioner.clone()).context("Failed to create HTTP client")?;
    let executable = provisioner
        .ensure_binary()
        .await
        .context("Failed to provision ffmpeg")?;

    match cli.command {
        Command::Install => {
            println!("{}", executable.display());
            Ok(())
        }
        Command::Convert(args) => {
            let search_path = provisioner
                .layout()
                .search_path(std::env::var_os("PATH"))
                .context("Failed to build PATH for ffmpeg")?;
            let mut invoker_config = config.invoker.clone().with_search_path(search_path);
            if args.overwrite {
                invoker_config = invoker_config.with_overwrite(true);
            }
            let invoker = BatchInvoker::new(executable, invoker_config);
            convert(BatchController::new(invoker), args).await
        }
    }
}

/// Loads config from `--config`/`VCONV_CONFIG` or `./vconv.toml`, then applies
/// command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => load_config_or_default(Path::new(DEFAULT_CONFIG_FILE))
            .context("Failed to load configuration")?,
    };

    if let Some(ref root) = cli.install_root {
        config.provisioner.install_root = root.clone();
    }

    validate_config(&config).context("Configuration validation failed")?;
    info!(
        "Install root: {:?}",
        absolute_or_given(&config.provisioner.install_root)
    );
    Ok(config)
}

fn absolute_or_given(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

async fn convert(controller: BatchController, args: ConvertArgs) -> Result<()> {
    let mut options = ConversionOptions::default().with_gpu(args.gpu);
    if let Some(resolution) = args.resolution {
        options = options.with_resolution(resolution);
    }
    if let Some(bitrate) = args.bitrate {
        options = options.with_bitrate(bitrate);
    }
    if let Some(codec) = args.codec.0 {
        options = options.with_codec(codec);
    }

    let files = args.inputs.len();
    let request = BatchRequest::new(args.inputs, args.output_dir, args.format, options);

    let mut batch = match controller.start(request) {
        Ok(batch) => batch,
        Err(e) if e.is_warning() => {
            warn!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to start conversion"),
    };
    info!("Started batch {}", batch.batch_id());

    let mut renderer: Box<dyn EventRenderer> = if args.json {
        Box::new(JsonRenderer::new(std::io::stdout()))
    } else {
        Box::new(BarRenderer::new(files))
    };

    while let Some(envelope) = batch.next_event().await {
        renderer.render(&envelope)?;
    }
    renderer.finish();

    batch.join().await.context("Conversion batch failed")
}
