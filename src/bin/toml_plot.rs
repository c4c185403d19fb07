use clap::Parser;
use dynamic_plot::core::ConfigProvider;
use dynamic_plot::utils::error::ErrorSeverity;
use dynamic_plot::utils::{logger, validation::Validate};
use dynamic_plot::{
    ColorSource, LocalStorage, MalformedRecordPolicy, PlotEngine, PlotPipeline, TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-plot")]
#[command(about = "Coordinate plotting driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "plot-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override which field drives the circle color
    #[arg(long, value_enum)]
    color_source: Option<ColorSource>,

    /// Override what happens to malformed lines
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedRecordPolicy>,

    /// Log output format: compact or json
    #[arg(long, default_value = "compact")]
    log_format: String,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_logger(&args.log_format, args.verbose);

    tracing::info!("🚀 Starting TOML-based plot tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 套用命令列覆蓋設定
    if let Some(source) = args.color_source {
        config.render.color_source = Some(source);
        tracing::info!("🔧 Color source overridden to: {}", source);
    }
    if let Some(policy) = args.on_malformed {
        config.parse.on_malformed = Some(policy);
        tracing::info!("🔧 Malformed line policy overridden to: {:?}", policy);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config)?;
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string())
        .with_asset_root(config.assets_dir().to_string());
    let pipeline = PlotPipeline::new(storage, config);
    let engine = PlotEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Plot completed successfully!");
            println!("✅ Plot completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Plot failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let camera = config.camera();

    println!("📋 Configuration Summary:");
    println!("  Plot: {}", config.plot.name);
    if let Some(version) = &config.plot.version {
        println!("  Version: {}", version);
    }
    println!("  Input: {}/{}", config.assets_dir(), config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!(
        "  Camera: ({}, {}) zoom {}",
        camera.target.latitude, camera.target.longitude, camera.zoom
    );
    println!("  Color Source: {}", config.color_source());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📄 Parsing:");
    println!("  Header line: always skipped");
    println!("  Malformed lines: {:?}", config.malformed_policy());

    let settings = config.cluster_settings();
    println!();
    println!("🗺️ Clustering:");
    println!("  Radius: {}px", settings.max_distance_px);
    println!("  Min cluster size: {}", settings.min_cluster_size);

    let classifier = config.depth_classifier()?;
    println!();
    println!("🎨 Color Buckets ({}):", config.color_source());
    for bucket in classifier.buckets() {
        println!("  [{}, {}] -> {}", bucket.min, bucket.max, bucket.color);
    }
    println!("  otherwise -> {}", classifier.fallback());
    println!("  Circle radius: {}m", config.circle_radius_m());

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if let Some(archive) = config.archive_name() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
