//! Bootstrap and wiring of the running service

use crate::heartbeat;
use anyhow::{Context, Result};
use huedmx_control::dmx::{find_ftdi_port, DmxTransport, FrameSink, SerialDmxPort, StubTransport};
use huedmx_control::hue::{EventSource, HueBridge};
use huedmx_control::pipeline::{ChangeAggregator, FixtureRegistry, UpdateScheduler};
use huedmx_core::{AppConfig, ConfigError, Fixture};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Bound on parsed events waiting for the aggregator
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Every fixture must mirror a light the bridge knows.
pub fn check_fixture_lights(
    fixtures: &[Fixture],
    lights: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for fixture in fixtures {
        if !lights.contains_key(fixture.light_id()) {
            return Err(ConfigError::UnknownLight {
                fixture: fixture.name().to_string(),
                light_id: fixture.light_id().to_string(),
            });
        }
    }
    Ok(())
}

async fn validate_lights(bridge: &HueBridge, fixtures: &[Fixture]) -> Result<()> {
    let lights = bridge
        .list_lights()
        .await
        .context("Failed to list lights on the Hue bridge")?;

    info!("Bridge reports {} lights:", lights.len());
    for (id, name) in &lights {
        info!("  {}: {}", id, name);
    }
    match bridge.list_devices().await {
        Ok(devices) => info!("Bridge reports {} devices", devices.len()),
        Err(e) => warn!("Could not list devices: {}", e),
    }

    check_fixture_lights(fixtures, &lights)?;
    Ok(())
}

fn open_transport(config: &AppConfig) -> Result<Box<dyn DmxTransport>> {
    if config.stub_dmx {
        info!("Stub mode: frames are rendered and logged, the bus is never touched");
        return Ok(Box::new(StubTransport::new()));
    }

    let path = match &config.dmx.port {
        Some(path) => path.clone(),
        None => find_ftdi_port()
            .context("Failed to enumerate serial ports")?
            .ok_or(ConfigError::NoSerialPort)?,
    };
    info!("Using DMX port {}", path);
    Ok(Box::new(SerialDmxPort::new(path, &config.dmx)))
}

/// Run until SIGINT or SIGTERM.
pub async fn run(config: AppConfig) -> Result<()> {
    let fixtures = config.build_fixtures();
    if fixtures.is_empty() {
        warn!("No fixtures configured, nothing will be mirrored");
    }
    for fixture in &fixtures {
        info!(
            "Fixture {} ({:?}) at {}..={} mirrors light {}",
            fixture.name(),
            fixture.kind(),
            fixture.address(),
            fixture.end_address(),
            fixture.light_id()
        );
    }

    let bridge = HueBridge::new(&config.bridge).context("Failed to create Hue client")?;
    validate_lights(&bridge, &fixtures).await?;

    let sink = FrameSink::new(open_transport(&config)?);
    let heartbeat_light = fixtures.first().map(|f| f.light_id().to_string());
    let registry = Arc::new(FixtureRegistry::new(fixtures));

    let (aggregator, changes) =
        ChangeAggregator::new(config.pipeline.debounce(), registry.light_ids());
    let scheduler = UpdateScheduler::new(
        registry.clone(),
        Arc::new(bridge.clone()),
        sink,
        config.pipeline.max_concurrent_updates,
    );
    let scheduler_task = tokio::spawn(scheduler.run(changes));

    let (event_tx, mut event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let source_task = tokio::spawn(EventSource::new(bridge.clone(), &config.bridge).run(event_tx));

    let forwarder = aggregator.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            forwarder.register_event(&event);
        }
    });

    // Bring the bus in line with the bridge before the first event arrives
    aggregator.register_many(registry.light_ids());

    let heartbeat_task = match (config.bridge.heartbeat_interval(), heartbeat_light) {
        (Some(interval), Some(light_id)) => {
            info!("Heartbeat every {:?} on light {}", interval, light_id);
            Some(tokio::spawn(heartbeat::run(bridge, light_id, interval)))
        }
        _ => None,
    };

    shutdown_signal().await;
    info!("Shutting down");

    source_task.abort();
    forward_task.abort();
    if let Some(task) = heartbeat_task {
        task.abort();
    }
    drop(aggregator);
    scheduler_task.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
