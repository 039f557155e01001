mod config;
mod session;
mod world;

use anyhow::Context;
use config::WiretapConfig;
use rampart_protocol_core::{ChannelSink, ConnectionBinding};
use rampart_protocol_dialects::standard_registry;
use session::PendingDetails;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use world::WorldFixture;

const CONFIG_PATH: &str = "config/wiretap.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = Path::new(CONFIG_PATH);
    let config = WiretapConfig::load(config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    info!("Starting Rampart wiretap...");
    if !config_path.exists() {
        info!("No config file found at {}, using defaults", config_path.display());
    }

    let world = Arc::new(WorldFixture::load(&config.world)?);

    let mut registry = standard_registry().context("building the version registry")?;
    if !config.versions.is_empty() {
        registry = registry
            .restrict(&config.protocol_versions())
            .context("restricting protocol versions")?;
    }
    let registry = registry
        .with_limits(config.limits.overrides())
        .context("applying limit overrides")?;

    if let Some(player) = &world.player {
        info!("Replaying as {} ({})", player.name, player.internal_id);
    }
    let requests = session::login_sequence(&world);
    info!(
        "Replaying {} requests against {} versions (udp={})",
        requests.len(),
        registry.versions().count(),
        config.udp
    );

    let mut writers = Vec::new();
    for version in registry.versions() {
        let (sink, rx) = ChannelSink::channel();
        writers.push((version, tokio::spawn(session::write_frames(version, rx))));

        let pending = Arc::new(PendingDetails::default());
        let binding = ConnectionBinding::new(world.clone(), Arc::new(sink))
            .with_details(pending.clone());
        let encoder = registry.negotiate(version, binding)?;
        encoder.set_udp_confirmed(config.udp);

        let packets = session::drive(&encoder, &world, &pending, &requests)
            .with_context(|| format!("encoding for client {}", version))?;
        info!("[{}] {} packets encoded", version, packets);
        encoder.close();
    }

    let mut total = 0;
    for (version, writer) in writers {
        let stats = writer
            .await
            .with_context(|| format!("writer task for client {}", version))?;
        total += stats.bytes;
    }
    info!("Done, {} bytes framed", total);
    Ok(())
}
