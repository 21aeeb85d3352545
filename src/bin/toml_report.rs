use clap::Parser;
use therapy_etl::adapters::source::SnapshotSource;
use therapy_etl::core::ConfigProvider;
use therapy_etl::utils::error::ErrorSeverity;
use therapy_etl::utils::{logger, validation::Validate};
use therapy_etl::{EtlEngine, LocalStorage, ReportPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Therapy adherence reports driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "therapy-report.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the patient filter from config
    #[arg(long)]
    patient: Option<String>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based report run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(patient) = args.patient.clone() {
        tracing::info!("🔧 Patient filter overridden to: {}", patient);
        config.filter.patient_id = Some(patient);
    }

    // 驗證配置
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

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReportPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Report run completed successfully!");
            println!("✅ Report run completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Report run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

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
    println!("📋 Configuration Summary:");
    println!("  Report: {}", config.report.name);
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!("  Prescriptions: {}", config.prescriptions_source());
    println!("  Sessions: {}", config.sessions_source());
    println!("  Output: {}/{}", config.output_path(), config.archive_name());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Chart view: {:?}", config.chart_view());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Snapshot Sources:");
    for (label, location) in [
        ("Prescriptions", config.prescriptions_source()),
        ("Sessions", config.sessions_source()),
    ] {
        match SnapshotSource::parse(location)? {
            SnapshotSource::Http(url) => println!("  {}: GET {}", label, url),
            SnapshotSource::File(path) => println!("  {}: file {}", label, path.display()),
        }
    }

    let headers = config.request_headers();
    if !headers.is_empty() {
        println!("  Headers: {} custom headers", headers.len());
    }
    let parameters = config.request_parameters();
    if !parameters.is_empty() {
        println!("  Parameters: {} query parameters", parameters.len());
    }
    if let Some(timeout) = config.request_timeout() {
        println!("  Timeout: {:?}", timeout);
    }

    println!();
    println!("⚙️ Filters:");
    println!("  Patient: {}", config.patient_filter().unwrap_or("(all)"));
    println!("  Exercise: {}", config.exercise_filter().unwrap_or("(all)"));
    match (config.requested_start(), config.requested_end()) {
        (None, None) => println!("  Window: full data range"),
        (start, end) => println!(
            "  Window: {} .. {}",
            start.map_or("(earliest)".to_string(), |d| d.to_string()),
            end.map_or("(latest)".to_string(), |d| d.to_string())
        ),
    }
    match config.reference_date() {
        Some(date) => println!("  Adherence measured on: {}", date),
        None => println!("  Adherence measured on: today (UTC)"),
    }

    println!();
    println!("💾 Archive contents:");
    if config.wants_format("csv") {
        println!("  adherence.csv, sessions/<patient>__<exercise>.csv");
    }
    if config.wants_format("json") {
        println!("  charts.json, schedule.json, reminders.json");
    }
    println!("  rejected.json (only when records are rejected)");

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
