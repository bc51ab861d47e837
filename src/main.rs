use caseload_etl::adapters::http::HttpStore;
use caseload_etl::adapters::memory::{MemoryCaseStore, MemoryClientStore, MemoryDirectory};
use caseload_etl::config::profile::FirmProfile;
use caseload_etl::core::team::extract_team;
use caseload_etl::core::validator::{validate, write_rejects_csv};
use caseload_etl::domain::model::ImportResult;
use caseload_etl::domain::ports::ProgressCallback;
use caseload_etl::utils::error::ImportError;
use caseload_etl::utils::{logger, validation::Validate};
use caseload_etl::{parse_case_file, CliConfig, ImportEngine, ImportOptions, ImportRun};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting caseload-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    // 載入事務所設定檔(可選)
    let profile = match &config.profile {
        Some(path) => {
            let profile = FirmProfile::from_file(path)?;
            profile.validate()?;
            Some(profile)
        }
        None => None,
    };
    let options = profile
        .as_ref()
        .map(|p| p.import_options())
        .unwrap_or_default();

    let text = std::fs::read_to_string(&config.input)?;

    let outcome = if config.import {
        run_import(&config, profile.as_ref(), options, &text)
            .await
            .map(|run| (run, None))
    } else {
        review_only(&options, &text).map(|(run, accepted)| (run, Some(accepted)))
    };

    let (run, reviewed) = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("❌ Import failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    print_summary(&config, &run, reviewed);

    if let Some(path) = &config.rejects {
        let file = std::fs::File::create(path)?;
        write_rejects_csv(&run.rejected, file)?;
        tracing::info!("📁 Rejected rows written to: {}", path);
    }

    if let Some(path) = &config.report {
        std::fs::write(path, serde_json::to_string_pretty(&run)?)?;
        tracing::info!("📁 Run report written to: {}", path);
    }

    Ok(())
}

/// 完整匯入:設定檔有 store 就走 REST API,否則落到記憶體試算。
async fn run_import(
    config: &CliConfig,
    profile: Option<&FirmProfile>,
    options: ImportOptions,
    text: &str,
) -> Result<ImportRun, ImportError> {
    let progress: Box<ProgressCallback> = Box::new(|current, total, percentage, label| {
        println!("  [{}/{}] {}% {}", current, total, percentage, label);
    });

    match profile.and_then(|p| p.store_url()) {
        Some(url) => {
            let store = HttpStore::new(url)?;
            ImportEngine::new(store.clone(), store.clone(), store)
                .with_options(options)
                .with_progress(progress)
                .run(&config.firm_id, text)
                .await
        }
        None => {
            tracing::warn!("⚠️ No store configured, running against the in-memory dry-run store");
            let staff = profile.map(|p| p.staff.clone()).unwrap_or_default();
            ImportEngine::new(
                MemoryDirectory::new(staff),
                MemoryClientStore::new(),
                MemoryCaseStore::new(),
            )
            .with_options(options)
            .with_progress(progress)
            .run(&config.firm_id, text)
            .await
        }
    }
}

/// 只解析與驗證,不寫入任何儲存。回傳通過驗證的列數供摘要顯示。
fn review_only(options: &ImportOptions, text: &str) -> Result<(ImportRun, usize), ImportError> {
    let parsed = parse_case_file(text, &options.synonyms)?;
    let team = extract_team(&parsed.records);
    let report = validate(parsed.records);
    let accepted = report.accepted.len();

    let run = ImportRun {
        header: parsed.header,
        header_line: parsed.header_line,
        realigned: parsed.realigned,
        rejected: report.rejected,
        result: ImportResult {
            skipped_rows: parsed.skipped_rows,
            team,
            ..Default::default()
        },
    };
    Ok((run, accepted))
}

fn print_summary(config: &CliConfig, run: &ImportRun, reviewed: Option<usize>) {
    println!(
        "✅ Header found at line {} ({} columns)",
        run.header_line,
        run.header.len()
    );

    if !run.realigned.is_empty() {
        println!(
            "🔧 {} row(s) realigned, original values kept for audit",
            run.realigned.len()
        );
    }

    if !run.rejected.is_empty() {
        println!("⚠️ {} row(s) rejected:", run.rejected.len());
        for row in &run.rejected {
            println!("   line {}: {}", row.line, row.errors.join("; "));
        }
    }

    if let Some(accepted) = reviewed {
        println!(
            "📋 {} row(s) passed validation, run again with --import to write them",
            accepted
        );
    }

    print!("{}", run.result.report(&config.input));
}
