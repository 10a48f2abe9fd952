use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use eztr_garble::core::MessagePipeline;
use eztr_garble::env::{core::LogLevel, EnvVar};
use eztr_garble::translation::{
    ConfigManager, HttpTranslationBackend, RunOutcome, TranslationConfig,
};

/// 被中断时的退出码
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "eztr-garble",
    version,
    about = "Compile DEFINE_MESSAGE blocks into EZTR replacement calls, garbling the text through a chain of machine translations"
)]
struct Cli {
    /// Source file containing DEFINE_MESSAGE blocks
    #[arg(required_unless_present = "generate_config")]
    input: Option<PathBuf>,

    /// Where to write the generated C file
    #[arg(short, long)]
    output: Option<String>,

    /// Checkpoint file used to resume an interrupted run
    #[arg(long)]
    checkpoint: Option<String>,

    /// Load configuration from this file instead of the default locations
    #[arg(long)]
    config: Option<String>,

    /// Translation service endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Number of blocks processed concurrently
    #[arg(short = 'j', long = "jobs")]
    jobs: Option<usize>,

    /// Seed for the language path, makes runs reproducible
    #[arg(long)]
    seed: Option<u64>,

    /// Compile without translating
    #[arg(long)]
    no_translate: bool,

    /// Ignore an existing checkpoint and start from the first block
    #[arg(long)]
    fresh: bool,

    /// Write the default configuration to this path and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut TranslationConfig) {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(checkpoint) = &self.checkpoint {
            config.checkpoint_path = checkpoint.clone();
        }
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(jobs) = self.jobs {
            config.max_concurrent_requests = jobs;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_translate {
            config.enabled = false;
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = LogLevel::get().unwrap_or_else(|e| {
            eprintln!("Warning: {e}");
            "info".to_string()
        });
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<TranslationConfig, Box<dyn std::error::Error>> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };

    let mut config = manager.into_config();
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Some(path) = &cli.generate_config {
        if let Err(e) = ConfigManager::generate_example_config(path) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
        println!("Wrote default configuration to {path}");
        return;
    }

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    // required_unless_present guarantees the input when no config is generated
    let Some(input_path) = &cli.input else {
        eprintln!("Error: no input file given");
        process::exit(1);
    };
    let input = fs::read_to_string(input_path).unwrap_or_else(|e| {
        eprintln!("Error: cannot read {}: {e}", input_path.display());
        process::exit(1);
    });

    let backend = HttpTranslationBackend::new(&config.api_url);
    let pipeline = MessagePipeline::new(backend, config);

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    match pipeline.run(&input, !cli.fresh, shutdown).await {
        Ok(RunOutcome::Completed(_)) => {}
        Ok(RunOutcome::Interrupted { watermark }) => {
            eprintln!(
                "Interrupted, progress saved at {} (resume from block {})",
                pipeline.config().checkpoint_path,
                watermark + 1
            );
            process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
