use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cloud_ocr::{
    config::{AppConfig, Config, OcrServiceList, ServiceOverrides},
    ImageTextExtractor, RecognizedWords,
};

#[derive(Parser)]
#[command(name = "cloud-ocr")]
#[command(about = "Send an image to a cloud OCR service and print the recognized text")]
#[command(version)]
struct Cli {
    /// Image to read
    #[arg(default_value = "check.jpg")]
    image: PathBuf,

    /// OCR service to use, overrides `config.json`
    #[arg(long, env = "OCR_PROVIDER", value_enum)]
    provider: Option<Provider>,

    /// Service endpoint, eg. `https://westus.api.cognitive.microsoft.com`
    #[arg(long, env = "OCR_ENDPOINT")]
    endpoint: Option<String>,

    /// Subscription / API key for the service
    #[arg(long, env = "OCR_SUBSCRIPTION_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Language hint (Azure only), `unk` to auto-detect
    #[arg(long)]
    language: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Directory holding `config.json` and `ocr_services/`
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Write the effective configuration back after a successful run
    #[arg(long)]
    save_config: bool,

    /// Print one word per line
    #[arg(long)]
    words: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Azure,
    Vision,
}

impl From<Provider> for OcrServiceList {
    fn from(value: Provider) -> Self {
        match value {
            Provider::Azure => Self::Azure,
            Provider::Vision => Self::Vision,
        }
    }
}

/// Text printed for a successful run: the joined words, or one word per line.
fn render(words: &RecognizedWords, one_per_line: bool) -> String {
    if one_per_line {
        words.iter().collect::<Vec<_>>().join("\n")
    } else {
        words.join()
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };

    // RUST_LOG, when set, wins over -v
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => AppConfig::default_dir()?,
    };

    let mut config =
        AppConfig::load_in(&config_dir).context("Could not load main configuration file")?;
    if let Some(provider) = cli.provider {
        config.ocr_service = provider.into();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let overrides = ServiceOverrides {
        endpoint: cli.endpoint,
        key: cli.key,
        language: cli.language,
    };
    let (service, service_config) = config
        .ocr_service
        .create_service(&config_dir, &overrides, config.timeout())
        .with_context(|| format!("Failed to initialise OCR service `{:?}`", config.ocr_service))?;

    let extractor = ImageTextExtractor::new(service);
    log::info!(
        "Extracting text from `{}` with {}",
        cli.image.display(),
        extractor.service_name()
    );

    let words = extractor
        .extract_words(&cli.image)
        .with_context(|| format!("Could not extract text from `{}`", cli.image.display()))?;

    println!("{}", render(&words, cli.words));

    if cli.save_config {
        config
            .save_in(&config_dir)
            .context("Failed to save main configuration file")?;
        service_config
            .save_in(&config_dir)
            .context("Failed to save OCR service configuration file")?;
    }

    Ok(())
}
