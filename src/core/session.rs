//! Viewer session: the single state container behind the UI
//!
//! Holds the manifest, the current selection, the loaded document text, the
//! navigation tree's expansion map and the sidebar flag. The UI reads derived
//! views from it every frame and feeds user actions and retrieval results
//! back in.

use std::collections::HashMap;

use super::error::FetchError;
use super::manifest::{document_path, DocumentRef, FileKind, Manifest, Subject};

/// Content shown in place of a Markdown document that could not be loaded
pub fn fallback_content(path: &str) -> String {
    format!("# Error\n\nUnable to load file: {}", path)
}

/// Startup phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
}

/// Viewport class driving sidebar behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Sidebar floats over the content behind a scrim
    Narrow,
    /// Sidebar is a side panel collapsing in place
    Wide,
}

impl LayoutMode {
    pub fn from_width(width: f32, narrow_below: f32) -> Self {
        if width < narrow_below {
            LayoutMode::Narrow
        } else {
            LayoutMode::Wide
        }
    }
}

/// A selected document, addressed by position in the manifest.
///
/// Subject and file are always set together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub subject: usize,
    pub file: usize,
}

/// Observable selection state
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    NoSelection,
    FileSelected,
}

/// A document text retrieval the UI must start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    /// Identifies the selection the request was made for
    pub ticket: u64,
    pub path: String,
}

/// What the content pane should display
#[derive(Debug, Clone, PartialEq)]
pub enum ContentView<'a> {
    /// Nothing selected yet
    Empty,
    Markdown {
        title: &'a str,
        source: &'a str,
        /// Text not yet retrieved
        pending: bool,
    },
    Pdf {
        title: &'a str,
        /// Document path, exactly as computed from the manifest
        src: String,
    },
    Unsupported {
        title: &'a str,
        tag: &'a str,
    },
}

/// Viewer state container
#[derive(Debug)]
pub struct Session {
    manifest: Manifest,
    phase: LoadPhase,
    selection: Option<Selection>,
    content: String,
    content_pending: bool,
    ticket: u64,
    expanded: HashMap<String, bool>,
    sidebar_open: bool,
    materials_root: String,
    narrow_below: f32,
}

impl Session {
    pub fn new(materials_root: impl Into<String>, narrow_below: f32) -> Self {
        Self {
            manifest: Manifest::default(),
            phase: LoadPhase::Loading,
            selection: None,
            content: String::new(),
            content_pending: false,
            ticket: 0,
            expanded: HashMap::new(),
            sidebar_open: true,
            materials_root: materials_root.into(),
            narrow_below,
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    #[cfg(test)]
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LoadPhase::Ready
    }

    /// Install the startup manifest and pick the initial document.
    ///
    /// A failed retrieval still completes startup with an empty library.
    pub fn apply_manifest(
        &mut self,
        result: Result<Manifest, FetchError>,
        viewport_width: f32,
    ) -> Option<DocumentRequest> {
        if self.is_ready() {
            tracing::warn!("Ignoring manifest delivered after startup");
            return None;
        }
        self.phase = LoadPhase::Ready;

        let manifest = match result {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!("Failed to load manifest: {}", e);
                return None;
            }
        };

        tracing::info!("Loaded manifest with {} subjects", manifest.subjects.len());
        self.manifest = manifest;

        let first = self.manifest.subjects.first()?;
        self.expanded.insert(first.name.clone(), true);
        if first.files.is_empty() {
            return None;
        }

        self.select_file(0, 0, viewport_width)
    }

    /// Select a document together with its subject.
    ///
    /// Returns the text retrieval to start for Markdown documents. Every call
    /// supersedes any retrieval still in flight.
    pub fn select_file(
        &mut self,
        subject: usize,
        file: usize,
        viewport_width: f32,
    ) -> Option<DocumentRequest> {
        let Some((subject_ref, file_ref)) = self.manifest.get(subject, file) else {
            tracing::warn!("No document at subject {} file {}", subject, file);
            return None;
        };

        let path = document_path(&self.materials_root, subject_ref, file_ref);
        let is_markdown = file_ref.kind == FileKind::Markdown;
        tracing::debug!("Selected {}", path);

        self.selection = Some(Selection { subject, file });
        if self.layout(viewport_width) == LayoutMode::Narrow {
            self.sidebar_open = false;
        }

        self.ticket += 1;
        self.content.clear();
        self.content_pending = is_markdown;

        is_markdown.then(|| DocumentRequest {
            ticket: self.ticket,
            path,
        })
    }

    /// Commit a document retrieval result if it still belongs to the
    /// current selection. Returns whether it was applied.
    pub fn apply_document(
        &mut self,
        ticket: u64,
        path: &str,
        result: Result<String, FetchError>,
    ) -> bool {
        if ticket != self.ticket || !self.content_pending {
            tracing::debug!("Discarding stale response for {}", path);
            return false;
        }

        self.content = match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to load document: {}", e);
                fallback_content(path)
            }
        };
        self.content_pending = false;
        true
    }

    pub fn toggle_subject(&mut self, name: &str) {
        let expanded = self.expanded.entry(name.to_string()).or_insert(false);
        *expanded = !*expanded;
    }

    pub fn is_expanded(&self, name: &str) -> bool {
        self.expanded.get(name).copied().unwrap_or(false)
    }

    pub fn sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
    }

    pub fn layout(&self, viewport_width: f32) -> LayoutMode {
        LayoutMode::from_width(viewport_width, self.narrow_below)
    }

    /// Whether the dismissible overlay covers the content
    pub fn shows_scrim(&self, viewport_width: f32) -> bool {
        self.sidebar_open && self.layout(viewport_width) == LayoutMode::Narrow
    }

    #[cfg(test)]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    #[cfg(test)]
    pub fn selection_state(&self) -> SelectionState {
        match self.selection {
            Some(_) => SelectionState::FileSelected,
            None => SelectionState::NoSelection,
        }
    }

    pub fn selected(&self) -> Option<(&Subject, &DocumentRef)> {
        let selection = self.selection?;
        self.manifest.get(selection.subject, selection.file)
    }

    pub fn is_selected(&self, subject: usize, file: usize) -> bool {
        self.selection == Some(Selection { subject, file })
    }

    /// Subject name and document title of the current selection
    pub fn breadcrumb(&self) -> Option<(&str, &str)> {
        self.selected()
            .map(|(subject, file)| (subject.name.as_str(), file.title.as_str()))
    }

    /// Current Markdown text; empty until loaded
    #[cfg(test)]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_view(&self) -> ContentView<'_> {
        let Some((subject, file)) = self.selected() else {
            return ContentView::Empty;
        };

        match &file.kind {
            FileKind::Markdown => ContentView::Markdown {
                title: &file.title,
                source: &self.content,
                pending: self.content_pending,
            },
            FileKind::Pdf => ContentView::Pdf {
                title: &file.title,
                src: document_path(&self.materials_root, subject, file),
            },
            FileKind::Other(tag) => ContentView::Unsupported {
                title: &file.title,
                tag,
            },
        }
    }

    /// Path of the selected document, if any
    pub fn selected_path(&self) -> Option<String> {
        self.selected()
            .map(|(subject, file)| document_path(&self.materials_root, subject, file))
    }
}
