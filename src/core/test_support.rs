//! In-memory library used by unit tests

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use super::error::FetchError;
use super::source::LibrarySource;

/// Library backed by a map, recording every retrieval
#[derive(Default)]
pub struct MemorySource {
    files: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Receiver<()>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, text: &str) -> Self {
        self.files.insert(path.to_string(), text.to_string());
        self
    }

    /// Hold retrievals of `path` until the returned sender fires
    pub fn gate(&self, path: &str) -> Sender<()> {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(path.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl LibrarySource for MemorySource {
    fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(path.to_string());

        let gate = self.gates.lock().unwrap().remove(path);
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        self.files.get(path).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            path: path.to_string(),
        })
    }

    fn locate(&self, path: &str) -> String {
        format!("memory://{}", path.trim_start_matches('/'))
    }
}
