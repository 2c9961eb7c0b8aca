//! Bounded fan-out of fixture updates

use super::aggregator::{ChangeBatch, ChangeReceiver};
use super::registry::{FixtureRegistry, PatchedFixture};
use super::LightStateSource;
use crate::dmx::FrameSink;
use crate::error::{ControlError, ErrorClass};
use crate::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Outcome of one dispatched batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Fixtures fetched, rendered and written
    pub updated: usize,
    /// Class of each fixture update whose fetch, render or write failed
    pub failed: Vec<ErrorClass>,
    /// Light ids no fixture tracks
    pub ignored: usize,
}

/// Turns batches of changed lights into bus writes
///
/// At most `max_concurrent` fixture updates are in flight; further work
/// waits for a free slot.
pub struct UpdateScheduler<S> {
    registry: Arc<FixtureRegistry>,
    source: Arc<S>,
    sink: FrameSink,
    slots: Arc<Semaphore>,
}

impl<S: LightStateSource> UpdateScheduler<S> {
    pub fn new(
        registry: Arc<FixtureRegistry>,
        source: Arc<S>,
        sink: FrameSink,
        max_concurrent: usize,
    ) -> Self {
        Self {
            registry,
            source,
            sink,
            slots: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Dispatch batches until the aggregator side closes.
    ///
    /// The next batch is taken only after the previous one finished, so
    /// changes arriving meanwhile are merged by the aggregator.
    pub async fn run(self, mut changes: ChangeReceiver) {
        while let Some(batch) = changes.recv().await {
            let report = self.dispatch(batch).await;
            debug!(
                "Batch done: {} updated, {} failed, {} ignored",
                report.updated,
                report.failed.len(),
                report.ignored
            );
        }
        info!("Update scheduler stopped");
    }

    /// Update every fixture mirroring a light in `batch` and wait for all of them.
    pub async fn dispatch(&self, batch: ChangeBatch) -> BatchReport {
        let mut report = BatchReport::default();
        let mut tasks = JoinSet::new();

        for light_id in &batch {
            let targets: Vec<Arc<PatchedFixture>> =
                self.registry.for_light(light_id).cloned().collect();
            if targets.is_empty() {
                debug!("No fixture mirrors light {}", light_id);
                report.ignored += 1;
                continue;
            }

            for patched in targets {
                let Ok(permit) = self.slots.clone().acquire_owned().await else {
                    warn!("Update slots closed, abandoning batch");
                    break;
                };
                let source = self.source.clone();
                let sink = self.sink.clone();
                tasks.spawn(async move {
                    let result = update_fixture(&patched, source.as_ref(), &sink).await;
                    drop(permit);
                    (patched, result)
                });
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => report.updated += 1,
                Ok((patched, Err(e))) => {
                    let fixture = patched.fixture();
                    error!(
                        "Error updating fixture {} (light {}): {} [{:?}]",
                        fixture.name(),
                        fixture.light_id(),
                        e,
                        e.class()
                    );
                    report.failed.push(e.class());
                }
                Err(e) => {
                    let e = ControlError::Task(e.to_string());
                    error!("Fixture update task failed: {} [{:?}]", e, e.class());
                    report.failed.push(e.class());
                }
            }
        }

        report
    }
}

async fn update_fixture<S: LightStateSource>(
    patched: &PatchedFixture,
    source: &S,
    sink: &FrameSink,
) -> Result<()> {
    let fixture = patched.fixture();
    let update = source.fetch_light(fixture.light_id()).await?;
    let state = patched.apply(&update);
    let frame = fixture.render(&state)?;
    sink.write(fixture.address(), &frame).await?;
    debug!(
        "Updated {} at {}: {:?}",
        fixture.name(),
        fixture.address(),
        frame.as_bytes()
    );
    Ok(())
}
