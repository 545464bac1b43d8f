use clap::Parser;
use lead_etl::config::cli::prompt_missing_query;
use lead_etl::config::toml_config::TomlConfig;
use lead_etl::utils::error::ErrorSeverity;
use lead_etl::utils::{logger, validation::Validate};
use lead_etl::{
    CliConfig, GooglePlacesClient, HarvestConfig, HarvestEngine, HunterClient, LeadError,
    LocalStorage, RunSummary,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先載入 .env，讓 API 金鑰可以從檔案讀取
    dotenvy::dotenv().ok();

    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting lead-etl CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let file = match cli.config.as_deref().map(TomlConfig::from_file).transpose() {
        Ok(file) => file,
        Err(e) => exit_with_config_error(&e),
    };
    if let Some(file) = &file {
        tracing::info!("📁 Loaded configuration file");
        if let Err(e) = file.validate() {
            exit_with_config_error(&e);
        }
    }

    // 查詢條件：命令列 > 設定檔 > 互動輸入
    let (business, area) = prompt_missing_query(
        cli.business
            .clone()
            .or_else(|| file.as_ref().and_then(|f| f.query_business())),
        cli.area
            .clone()
            .or_else(|| file.as_ref().and_then(|f| f.query_area())),
    )?;

    let mut overrides = cli.overrides();
    overrides.business = Some(business);
    overrides.area = Some(area);

    let config = match HarvestConfig::from_env(overrides, file.as_ref()) {
        Ok(config) => config,
        Err(e) => exit_with_config_error(&e),
    };

    let places = GooglePlacesClient::new(config.places.clone())?;
    let finder = HunterClient::new(config.email_finder.clone())?;
    let engine = HarvestEngine::new(LocalStorage::default(), config, places, finder);

    match engine.run().await {
        Ok(summary) => report(&summary),
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn exit_with_config_error(e: &LeadError) -> ! {
    tracing::error!("❌ Configuration failed: {}", e);
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

fn report(summary: &RunSummary) {
    match &summary.aborted {
        None => println!("✅ Lead harvest completed"),
        Some(reason) => {
            eprintln!("🛑 Run stopped early: {}", reason);
            eprintln!("💡 {}", reason.recovery_suggestion());
        }
    }

    let skipped = &summary.skipped;
    println!("📁 Output: {}", summary.output_path);
    println!(
        "   {} places found, {} processed, {} new rows",
        summary.places_found, summary.places_processed, summary.rows_appended
    );
    println!(
        "   Skipped: {} duplicates, {} without website, {} without email, {} unnamed, {} provider errors",
        skipped.duplicate,
        skipped.no_website,
        skipped.no_email,
        skipped.missing_name,
        skipped.provider_error
    );
    println!(
        "   Took {}s",
        (summary.finished_at - summary.started_at).num_seconds()
    );
}
