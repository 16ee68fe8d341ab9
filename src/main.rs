use clap::Parser;
use room_dashboard::adapters::render::{render_dashboard, render_no_data};
use room_dashboard::config::toml_config::DashboardConfig;
use room_dashboard::utils::error::{DashboardError, ErrorSeverity};
use room_dashboard::utils::{logger, validation::Validate};
use room_dashboard::{
    build_source, CliArgs, DashboardEngine, DashboardPipeline, LocalStorage, RunOutcome,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting room-dashboard");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match DashboardConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    if args.dry_run {
        display_config_summary(&config, &args);
        return Ok(());
    }

    let source = match build_source(&config) {
        Ok(source) => source,
        Err(e) => fail(&e),
    };

    let title = config.dashboard.title.clone();
    let interval = config.refresh_interval();
    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = DashboardPipeline::new(source, storage, config).with_selection(args.selection());
    let engine = DashboardEngine::new(pipeline);

    if args.watch {
        tracing::info!("🔁 Refreshing every {:?}", interval);
        let runs = engine
            .watch(interval, args.max_runs, |outcome| match outcome {
                Ok(outcome) => present(&title, &outcome),
                Err(e) => eprintln!("❌ {}", e.user_friendly_message()),
            })
            .await;
        tracing::info!("Stopped after {} runs", runs);
        return Ok(());
    }

    match engine.run().await {
        Ok(outcome) => present(&title, &outcome),
        Err(e) => fail(&e),
    }

    Ok(())
}

fn present(title: &str, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::NoData { source } => print!("{}", render_no_data(title, source)),
        RunOutcome::Completed(report) => {
            print!("{}", render_dashboard(&report.dashboard));
            for artifact in &report.artifacts {
                println!("📁 Exported: {}", artifact);
            }
        }
    }
}

fn fail(e: &DashboardError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}

fn display_config_summary(config: &DashboardConfig, args: &CliArgs) {
    let source = &config.source;
    println!("📋 Configuration Summary:");
    println!("  Dashboard: {}", config.dashboard.title);
    println!("  Source type: {:?}", source.kind);
    if let Some(spreadsheet) = &source.spreadsheet {
        println!("  Spreadsheet: {}", spreadsheet);
    }
    if let Some(worksheet) = &source.worksheet {
        println!("  Worksheet: {}", worksheet);
    }
    if let Some(path) = &source.path {
        println!("  CSV file: {}", path);
    }
    if let Some(url) = &source.url {
        println!("  CSV URL: {}", url);
    }
    println!("  Credentials: {}", source.credentials.describe());
    println!("  Group by: {}", config.dashboard.group_field);
    println!("  Filter: {}", args.selection());
    println!("  Output: {}", config.load.output_path);
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if args.watch {
        println!("  Refresh: every {}s", config.refresh.interval_seconds);
    }
    println!("  🔍 DRY RUN - nothing was fetched");
}
