use anyhow::Context;
use clap::Parser;
use small_theater::core::report;
use small_theater::utils::error::ErrorCategory;
use small_theater::utils::{logger, validation::Validate};
use small_theater::{
    build_router, AppState, CliConfig, Command, InMemoryStore, PgStore, Settings, TheaterError,
    TheaterService, TheaterStore, TomlConfig,
};
use std::sync::Arc;

fn exit_with(e: &TheaterError) -> ! {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.category() {
        ErrorCategory::Config => 1,
        ErrorCategory::Input | ErrorCategory::Rule => 2,
        ErrorCategory::Storage => 3,
    };
    std::process::exit(exit_code);
}

async fn open_store(settings: &Settings) -> small_theater::Result<Arc<dyn TheaterStore>> {
    match &settings.database_url {
        Some(url) => {
            let store = PgStore::connect(url, settings.max_connections)
                .await?
                .with_overlap_policy(settings.overlap_policy);
            store.migrate().await?;
            tracing::info!("🗄️  Connected to PostgreSQL");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("No database configured, using in-memory store (data is lost on exit)");
            Ok(Arc::new(
                InMemoryStore::new().with_overlap_policy(settings.overlap_policy),
            ))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入 TOML 配置（可選）
    let file = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let settings = Settings::resolve(
        file.as_ref(),
        cli.overrides(),
        std::env::var("DATABASE_URL").ok(),
    );

    // 初始化日誌
    if settings.json_logs {
        logger::init_json_logger(cli.verbose, settings.log_level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, settings.log_level.as_deref());
    }
    tracing::debug!("Settings: {:?}", settings);

    // 驗證配置
    if let Some(file) = &file {
        if let Err(e) = file.validate() {
            exit_with(&e);
        }
    }
    if let Err(e) = settings.validate() {
        exit_with(&e);
    }

    let store = match open_store(&settings).await {
        Ok(store) => store,
        Err(e) => exit_with(&e),
    };
    let service = TheaterService::new(store);

    match cli.command() {
        Command::Serve { .. } => {
            let addr = settings.socket_addr()?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;

            tracing::info!("🎬 small-theater listening on http://{}", addr);
            tracing::info!("Overlap policy: {:?}", settings.overlap_policy);

            axum::serve(listener, build_router(AppState::new(service)))
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("server error")?;
        }
        Command::Report { kind, format } => {
            let snapshot = match service.store().snapshot().await {
                Ok(snapshot) => snapshot,
                Err(e) => exit_with(&e),
            };
            let output = report::render(&snapshot, kind, format)?;
            print!("{}", output);
        }
        Command::RemoveRoom { id } => match service.remove_room(id).await {
            Ok(true) => println!("✅ Room {} removed with its movies and tickets", id),
            Ok(false) => {
                eprintln!("❌ Room {} not found", id);
                std::process::exit(2);
            }
            Err(e) => exit_with(&e),
        },
    }

    Ok(())
}
