//! Shared utilities for integration tests.
//!
//! Provides an instrumented in-memory sound backend so player behavior can be
//! tested end to end without a sound card, plus catalog fixtures.

use async_trait::async_trait;
use sonocli::audio::{AudioError, PreparedSound, SoundBackend};
use sonocli::catalog::{SoundCatalog, SoundItem};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Counters shared between a [`CountingBackend`] and the test body.
#[derive(Clone, Default)]
pub struct BackendProbe {
    acquires: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl BackendProbe {
    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Resources currently held: acquisitions minus releases.
    pub fn live_handles(&self) -> usize {
        self.acquires() - self.releases()
    }
}

/// A backend whose prepared sounds just wait for their stop signal, counting
/// acquisitions and releases along the way.
pub struct CountingBackend {
    probe: BackendProbe,
    failing: Arc<Mutex<Vec<String>>>,
}

impl CountingBackend {
    pub fn new() -> (Self, BackendProbe) {
        let probe = BackendProbe::default();
        (
            CountingBackend {
                probe: probe.clone(),
                failing: Arc::new(Mutex::new(Vec::new())),
            },
            probe,
        )
    }

    /// Makes `prepare` fail for the named sound from now on.
    pub fn fail_for(&self, name: &str) {
        self.failing.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl SoundBackend for CountingBackend {
    async fn prepare(&self, item: &SoundItem) -> Result<Box<dyn PreparedSound>, AudioError> {
        if self.failing.lock().unwrap().iter().any(|n| n == &item.name) {
            return Err(AudioError::LoadFailure(format!(
                "Failed to load source for '{}'",
                item.name
            )));
        }
        self.probe.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSound {
            releases: Arc::clone(&self.probe.releases),
        }))
    }
}

struct CountingSound {
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl PreparedSound for CountingSound {
    async fn run(
        self: Box<Self>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), AudioError> {
        // Loop "forever" like real playback would, until told to stop.
        let _ = shutdown_rx.recv().await;
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// The three-sound catalog used throughout the integration tests.
pub fn test_catalog() -> SoundCatalog {
    SoundCatalog::from_items(vec![
        SoundItem::new("Riacho", "/sounds/riacho.mp3"),
        SoundItem::new("Vento", "/sounds/vento.mp3"),
        SoundItem::new("Chuva", "/sounds/chuva.mp3"),
    ])
    .expect("fixture catalog has unique names")
}
