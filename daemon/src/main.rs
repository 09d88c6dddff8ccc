use anyhow::Result;
use memguard_daemon::{
    collector::LinuxProcessCollector,
    config::Config,
    detector::ThresholdDetector,
    executor::SystemDispatcher,
    monitor::Monitor,
    notifier::Notifier,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn load_config() -> Config {
    let config_path = Config::config_path();
    if config_path.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        info!("No config file found at {:?}, using defaults", config_path);
        Config::default()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("memguard starting...");

    let config = Arc::new(load_config());
    info!(
        threshold_mb = config.memory.threshold_mb,
        interval_secs = config.general.sample_interval_seconds,
        kill_targets = config.kill_targets.len(),
        "configuration loaded"
    );

    let monitor = Monitor::new(
        Arc::clone(&config),
        LinuxProcessCollector::new(),
        ThresholdDetector::from_config(&config),
        SystemDispatcher::new(Notifier::new(&config.general)),
    );
    monitor.run().await;
    Ok(())
}
