//! Debounced application
//!
//! Rapid edits each call [`ApplyScheduler::schedule`]; only the last document
//! within the debounce window reaches the surface. A pending application is
//! aborted and replaced whenever a newer document arrives.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use themesync_document::ConfigurationDocument;
use tokio::task::JoinHandle;

use crate::applicator::{force_refresh, ApplyReport, ConfigApplicator};
use crate::surface::SharedSurface;

/// Default debounce window
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Debounces document application onto a shared surface
#[derive(Debug)]
pub struct ApplyScheduler {
    surface: SharedSurface,
    applicator: Arc<Mutex<ConfigApplicator>>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ApplyScheduler {
    /// Scheduler over `surface`
    #[must_use]
    pub fn new(surface: SharedSurface, debounce: Duration) -> Self {
        Self {
            surface,
            applicator: Arc::new(Mutex::new(ConfigApplicator::new())),
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Target surface
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// Debounce window
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Apply `doc` after the debounce window unless superseded.
    ///
    /// Must be called within a tokio runtime.
    pub fn schedule(&self, doc: ConfigurationDocument) {
        let surface = Arc::clone(&self.surface);
        let applicator = Arc::clone(&self.applicator);
        let debounce = self.debounce;

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            apply_locked(&applicator, &surface, &doc);
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Cancel anything pending and apply `doc` now
    pub fn apply_now(&self, doc: &ConfigurationDocument) -> ApplyReport {
        self.cancel_pending();
        apply_locked(&self.applicator, &self.surface, doc)
    }

    /// Cancel anything pending, apply `doc` and force a reflow
    pub fn apply_forced(&self, doc: &ConfigurationDocument) -> ApplyReport {
        let report = self.apply_now(doc);
        self.force_refresh();
        report
    }

    /// Force the surface to recompute styles
    pub fn force_refresh(&self) {
        if let Err(e) = force_refresh(&mut *self.surface.lock()) {
            tracing::warn!(error = %e, "forced refresh failed");
        }
    }

    /// Whether a debounced application has not run yet
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Wait for the pending application, if any
    pub async fn flush(&self) {
        let task = self.pending.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "scheduled application panicked");
                }
            }
        }
    }

    /// Drop the pending application without running it
    pub fn cancel_pending(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }
}

impl Drop for ApplyScheduler {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn apply_locked(
    applicator: &Mutex<ConfigApplicator>,
    surface: &SharedSurface,
    doc: &ConfigurationDocument,
) -> ApplyReport {
    let mut applicator = applicator.lock();
    let mut surface = surface.lock();
    applicator.apply(doc, &mut *surface)
}
