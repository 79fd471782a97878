use hearth::migration::builtin::builtin_registry;
use hearth::service::{ConfiguredAppDirectory, DatabaseInitializer};
use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = hearth::config::Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        app_name = %cfg.app_name,
        data_dir = %cfg.data_dir.display(),
        work_factor = cfg.hasher.work_factor,
        algorithm = %cfg.hasher.algorithm,
        loglevel = %cfg.loglevel
    );

    let initializer = DatabaseInitializer::new(
        ConfiguredAppDirectory::from_config(&cfg),
        cfg.clone(),
        builtin_registry()?,
    );
    let report = initializer.initialize_database().await?;
    info!(
        path = %report.path.display(),
        mode = ?report.mode,
        applied = ?report.applied,
        "initialization finished"
    );
    Ok(())
}
