//! Background retrieval of the manifest and document text
//!
//! Retrievals run on a small tokio runtime; results are delivered over a
//! channel that the UI drains once per frame.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::error::FetchError;
use super::manifest::Manifest;
use super::session::DocumentRequest;
use super::source::LibrarySource;

/// Completion of a retrieval
#[derive(Debug)]
pub enum FetchEvent {
    Manifest(Result<Manifest, FetchError>),
    Document {
        ticket: u64,
        path: String,
        result: Result<String, FetchError>,
    },
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Runs retrievals against a library source
pub struct Fetcher {
    runtime: Runtime,
    source: Arc<dyn LibrarySource>,
    tx: UnboundedSender<FetchEvent>,
    rx: UnboundedReceiver<FetchEvent>,
    waker: Option<Waker>,
    manifest_requested: bool,
}

impl Fetcher {
    pub fn new(source: Arc<dyn LibrarySource>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(4)
            .thread_name("studyshelf-fetch")
            .build()
            .context("Failed to start fetch runtime")?;

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            source,
            tx,
            rx,
            waker: None,
            manifest_requested: false,
        })
    }

    /// Call `waker` whenever a result becomes available
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn source(&self) -> &Arc<dyn LibrarySource> {
        &self.source
    }

    /// Start the one manifest retrieval of this session
    pub fn fetch_manifest(&mut self, path: &str) {
        if self.manifest_requested {
            tracing::warn!("Manifest already requested; not fetching {} again", path);
            return;
        }
        self.manifest_requested = true;

        tracing::info!("Loading manifest: {}", self.source.locate(path));
        let path = path.to_string();
        self.spawn(move |source| {
            let result = source
                .fetch_text(&path)
                .and_then(|text| Manifest::parse(&text));
            FetchEvent::Manifest(result)
        });
    }

    /// Start retrieving a document's text
    pub fn fetch_document(&self, request: DocumentRequest) {
        tracing::debug!("Loading document #{}: {}", request.ticket, request.path);
        self.spawn(move |source| {
            let result = source.fetch_text(&request.path);
            FetchEvent::Document {
                ticket: request.ticket,
                path: request.path,
                result,
            }
        });
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce(&dyn LibrarySource) -> FetchEvent + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let waker = self.waker.clone();

        self.runtime.spawn_blocking(move || {
            let event = job(source.as_ref());
            if tx.send(event).is_err() {
                return; // Receiver dropped
            }
            if let Some(waker) = waker {
                waker();
            }
        });
    }

    /// Take all results delivered so far (non-blocking)
    pub fn poll(&mut self) -> Vec<FetchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until the next result arrives
    #[cfg(test)]
    pub fn wait(&mut self) -> Option<FetchEvent> {
        self.rx.blocking_recv()
    }
}
