use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use venue_catalog::config::toml_config::StoreKind;
use venue_catalog::config::Command;
use venue_catalog::core::catalog::cancellable;
use venue_catalog::utils::error::ErrorSeverity;
use venue_catalog::utils::{logger, validation::Validate};
use venue_catalog::{
    CatalogConfig, CatalogEngine, CliConfig, ConfigProvider, InMemoryStore,
    ListingStore, RawParams, RestStore, ReviewInput, SchemaRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // Config file
    let file_config = match &cli.config {
        Some(path) => match CatalogConfig::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => None,
    };

    // Logging
    match &file_config {
        Some(config) if cli.json_logs || config.json_logs() => {
            logger::init_json_logger(if cli.verbose { "debug" } else { config.log_level() })
        }
        _ if cli.json_logs => logger::init_json_logger(if cli.verbose { "debug" } else { "info" }),
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::debug!("CLI config: {:?}", cli);

    // Validate both config sources before touching the store
    let validation = cli
        .validate()
        .and_then(|_| file_config.as_ref().map_or(Ok(()), |c| c.validate()));
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let registry = file_config
        .as_ref()
        .map(CatalogConfig::build_registry)
        .unwrap_or_else(SchemaRegistry::with_builtin_categories);

    let outcome = match build_store(&cli, file_config.as_ref()).await {
        Ok(store) => {
            let engine = match &file_config {
                Some(config) if cli.concurrent_requests.is_none() => {
                    CatalogEngine::from_config(config, registry, store)
                }
                _ => CatalogEngine::from_config(&cli, registry, store),
            };
            run(cli.command.clone(), &engine).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Err(e) => {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // Exit code follows severity; a cancelled request exits cleanly
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

async fn build_store(
    cli: &CliConfig,
    file_config: Option<&CatalogConfig>,
) -> venue_catalog::Result<Arc<dyn ListingStore>> {
    if cli.store_base_url().is_some() {
        tracing::info!("🌐 Using remote listing service {:?}", cli.store_url);
        return Ok(Arc::new(RestStore::from_config(cli)?));
    }
    if let Some(seed_file) = cli.seed_file() {
        return Ok(Arc::new(InMemoryStore::from_json_file(seed_file).await?));
    }

    if let Some(config) = file_config {
        return match config.store.kind {
            StoreKind::Rest => Ok(Arc::new(RestStore::from_config(config)?)),
            StoreKind::Memory => match config.seed_file() {
                Some(seed_file) => Ok(Arc::new(InMemoryStore::from_json_file(seed_file).await?)),
                None => Ok(Arc::new(InMemoryStore::new())),
            },
        };
    }

    tracing::warn!("No store configured, starting with an empty in-memory catalog");
    Ok(Arc::new(InMemoryStore::new()))
}

async fn run(command: Command, engine: &CatalogEngine) -> venue_catalog::Result<serde_json::Value> {
    match command {
        Command::Categories => {
            let registry = engine.registry();
            let mut categories = Vec::new();
            for key in registry.keys() {
                categories.push(registry.describe(key)?);
            }
            Ok(serde_json::to_value(categories)?)
        }
        Command::List { category, filters } => {
            let params: RawParams = filters.into_iter().collect();
            let listings = engine.catalog().search(&category, &params).await?;
            Ok(json!({ "count": listings.len(), "data": listings }))
        }
        Command::ListAll { categories, filters } => {
            let params: RawParams = filters.into_iter().collect();
            let keys: Vec<&str> = categories.iter().map(String::as_str).collect();

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let report = cancellable(&cancel, engine.catalog().search_all(&keys, &params)).await?;
            if !report.failed.is_empty() {
                tracing::warn!("⚠️ Partial results, failed categories: {}", report.failed.join(", "));
            }
            Ok(json!({
                "count": report.listings.len(),
                "failed": report.failed,
                "data": report.listings,
            }))
        }
        Command::Get { category, id } => {
            let listing = engine.catalog().get(&category, &id).await?;
            Ok(serde_json::to_value(listing)?)
        }
        Command::Price { category, id } => {
            let listing = engine.catalog().get(&category, &id).await?;
            let range = engine.prices().resolve(&listing)?;
            Ok(serde_json::to_value(range)?)
        }
        Command::Review {
            category,
            id,
            user,
            rating,
            comment,
        } => {
            let input = ReviewInput::new(&user, rating, &comment);
            let ratings = engine.reviews().submit(&category, &id, input).await?;
            tracing::info!("✅ Review saved");
            Ok(serde_json::to_value(ratings)?)
        }
        Command::Flow { category } => {
            let flow = engine.booking().resolve_booking_flow(&category)?;
            Ok(json!({ "category": category, "flow": flow }))
        }
        Command::Intent { category, id } => {
            let intent = engine.booking().intent(&category, &id).await?;
            Ok(serde_json::to_value(intent)?)
        }
    }
}
