use clap::Parser;
use loopsheet_etl::adapters::xlsx;
use loopsheet_etl::core::{ConfigProvider, Storage};
use loopsheet_etl::utils::{logger, validation::Validate};
use loopsheet_etl::{EtlEngine, LocalStorage, LoopListPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-clean")]
#[command(about = "Loop-list cleaning driven by a TOML job file")]
struct Args {
    /// Path to the TOML job file
    #[arg(short, long, default_value = "clean-job.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from the job file
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the dedupe setting from the job file
    #[arg(long)]
    dedupe: Option<bool>,

    /// Dry run - decode the input and report its shape without writing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load job file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-driven loop-list cleaning");
    tracing::info!("📁 Job file: {}", args.config);

    if let Some(dedupe) = args.dedupe {
        let transform = config.transform.get_or_insert_with(Default::default);
        transform.dedupe = Some(dedupe);
        tracing::info!("🔧 Dedupe overridden to: {}", dedupe);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Job validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Job '{}' loaded and validated", config.job.name);
    display_job_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no outputs will be written");
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = LoopListPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Cleaning completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!("❌ Cleaning failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn display_job_summary(config: &TomlConfig) {
    let rules = config.rules();
    let outputs = config.outputs();

    tracing::info!("📋 Job: {} v{}", config.job.name, config.job.version);
    tracing::info!("📋 Input: {}", config.input_file());
    tracing::info!(
        "📋 Columns: key='{}', id='{}', guard='{}'",
        rules.key_column,
        rules.id_column,
        rules.guard_column
    );
    tracing::info!(
        "📋 Offsets: prune from {}, merge from {}",
        rules.prune_from,
        rules.merge_from
    );
    tracing::info!(
        "📋 Outputs: {} / {} / {} (csv: {})",
        outputs.pruned,
        outputs.checkpoint,
        outputs.cleaned,
        outputs.csv.as_deref().unwrap_or("off")
    );
}

async fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let storage = LocalStorage::new(config.output_path().to_string());
    let bytes = storage.read_file(config.input_file()).await?;
    let sheet = xlsx::decode_first_worksheet(&bytes, config.skip_rows())?;

    let (rows, cols) = sheet.shape();
    println!("🔍 {} would be cleaned:", config.input_file());
    println!("🔍 {} rows x {} columns", rows, cols);
    println!("🔍 Columns: {}", sheet.columns.join(", "));

    Ok(())
}
