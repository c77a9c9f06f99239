//! Main application state and UI coordination

use eframe::egui;

use crate::core::config::AppConfig;
use crate::core::error::FetchError;
use crate::core::loader::{FetchEvent, Fetcher};
use crate::core::session::{DocumentRequest, LayoutMode, Session};
use crate::core::source::open_source;
use crate::ui::content_pane::{ContentPane, MarkdownCache};
use crate::ui::header::HeaderBar;
use crate::ui::loading::LoadingScreen;
use crate::ui::nav_tree::{NavAction, NavTreePanel};

/// Main application state
pub struct ShelfApp {
    /// Viewer state
    pub session: Session,
    /// Background retrieval of manifest and documents; `None` when the
    /// library could not be opened
    pub fetcher: Option<Fetcher>,
    /// Application configuration
    pub config: AppConfig,
    /// Parsed blocks of the document on screen
    pub markdown: MarkdownCache,
    /// Width of the window in points, refreshed every frame
    pub viewport_width: f32,
}

impl ShelfApp {
    /// Create a new application instance and start loading the manifest
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self::configure_style(&cc.egui_ctx, &config);
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let width = cc.egui_ctx.screen_rect().width();
        let ctx = cc.egui_ctx.clone();
        let fetcher = open_source(&config.library.base)
            .and_then(Fetcher::new)
            .map(|fetcher| fetcher.with_waker(move || ctx.request_repaint()));

        match fetcher {
            Ok(fetcher) => Self::from_parts(config, fetcher, width),
            Err(e) => Self::offline(config, e, width),
        }
    }

    /// Assemble the app around a fetcher and issue the manifest retrieval
    pub fn from_parts(config: AppConfig, mut fetcher: Fetcher, viewport_width: f32) -> Self {
        let session = Session::new(
            config.library.materials_root.clone(),
            config.ui.narrow_width,
        );
        fetcher.fetch_manifest(&config.library.manifest_path);

        Self {
            session,
            fetcher: Some(fetcher),
            config,
            markdown: MarkdownCache::default(),
            viewport_width,
        }
    }

    /// Empty, ready shell for a library that cannot be read at all
    pub fn offline(config: AppConfig, error: anyhow::Error, viewport_width: f32) -> Self {
        tracing::error!("Library unavailable: {:#}", error);

        let mut session = Session::new(
            config.library.materials_root.clone(),
            config.ui.narrow_width,
        );
        session.apply_manifest(
            Err(FetchError::Network {
                path: config.library.manifest_path.clone(),
                message: format!("{:#}", error),
            }),
            viewport_width,
        );

        Self {
            session,
            fetcher: None,
            config,
            markdown: MarkdownCache::default(),
            viewport_width,
        }
    }

    fn configure_style(ctx: &egui::Context, config: &AppConfig) {
        if config.dark_mode() {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }
    }

    /// Commit every retrieval result delivered since the last frame
    pub fn process_events(&mut self) {
        let Some(fetcher) = self.fetcher.as_mut() else {
            return;
        };

        for event in fetcher.poll() {
            match event {
                FetchEvent::Manifest(result) => {
                    let request = self.session.apply_manifest(result, self.viewport_width);
                    self.dispatch(request);
                }
                FetchEvent::Document {
                    ticket,
                    path,
                    result,
                } => {
                    self.session.apply_document(ticket, &path, result);
                }
            }
        }
    }

    fn dispatch(&self, request: Option<DocumentRequest>) {
        if let (Some(request), Some(fetcher)) = (request, &self.fetcher) {
            fetcher.fetch_document(request);
        }
    }

    /// Select a document from the navigation tree
    pub fn select_file(&mut self, subject: usize, file: usize) {
        let request = self.session.select_file(subject, file, self.viewport_width);
        self.dispatch(request);
    }

    pub fn apply_nav_action(&mut self, action: NavAction) {
        match action {
            NavAction::ToggleSubject(name) => self.session.toggle_subject(&name),
            NavAction::SelectFile { subject, file } => self.select_file(subject, file),
        }
    }

    /// Hand a URL or file location to the system
    pub fn open_location(&self, location: &str) {
        tracing::info!("Opening {}", location);
        if let Err(e) = open::that_detached(location) {
            tracing::error!("Failed to open {}: {}", location, e);
        }
    }

    /// Sidebar as a side panel that collapses in place
    fn render_docked_sidebar(&mut self, ctx: &egui::Context) {
        if !self.session.sidebar_open() {
            return;
        }

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(self.config.ui.sidebar_width)
            .show(ctx, |ui| {
                NavTreePanel::show(ui, self);
            });
    }

    /// Scrim plus floating sidebar for narrow windows
    fn render_overlay_sidebar(&mut self, ctx: &egui::Context) {
        if !self.session.shows_scrim(self.viewport_width) {
            return;
        }

        let screen = ctx.screen_rect();

        egui::Area::new(egui::Id::new("scrim"))
            .order(egui::Order::Middle)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                let response = ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(60));
                if response.clicked() {
                    self.session.close_sidebar();
                }
            });

        let width = self.config.ui.sidebar_width.min(screen.width());
        egui::Area::new(egui::Id::new("sidebar_overlay"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(ctx, |ui| {
                egui::Frame::side_top_panel(&ctx.style()).show(ui, |ui| {
                    ui.set_width(width);
                    ui.set_height(screen.height());
                    NavTreePanel::show(ui, self);
                });
            });
    }
}

impl eframe::App for ShelfApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.viewport_width = ctx.screen_rect().width();
        self.process_events();

        if !self.session.is_ready() {
            LoadingScreen::show(ctx);
            return;
        }

        // Handle keyboard shortcuts
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::B)) {
            self.session.toggle_sidebar();
        }

        let layout = self.session.layout(self.viewport_width);
        if layout == LayoutMode::Wide {
            self.render_docked_sidebar(ctx);
        }

        egui::TopBottomPanel::top("header")
            .exact_height(48.0)
            .show(ctx, |ui| {
                HeaderBar::show(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ContentPane::show(ui, self);
        });

        if layout == LayoutMode::Narrow {
            self.render_overlay_sidebar(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::core::session::ContentView;
    use crate::core::test_support::MemorySource;

    const MANIFEST: &str = r#"{
        "subjects": [
            {
                "name": "Geography",
                "folder": "geo",
                "files": [
                    { "filename": "rivers.md", "title": "Rivers", "type": "md" },
                    { "filename": "maps.pdf", "title": "Maps", "type": "pdf" }
                ]
            }
        ]
    }"#;

    fn app(source: Arc<MemorySource>, width: f32) -> ShelfApp {
        let fetcher = Fetcher::new(source).unwrap();
        ShelfApp::from_parts(AppConfig::default(), fetcher, width)
    }

    /// Drive frames until `done` holds
    fn run_until(app: &mut ShelfApp, done: impl Fn(&ShelfApp) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) {
            assert!(Instant::now() < deadline, "timed out waiting for retrievals");
            std::thread::sleep(Duration::from_millis(5));
            app.process_events();
        }
    }

    #[test]
    fn test_startup_renders_first_document() {
        let source = Arc::new(
            MemorySource::new()
                .with_file("config.json", MANIFEST)
                .with_file("/materials/geo/rivers.md", "# Nile\n\n| a | b |\n|---|---|\n| 1 | 2 |"),
        );
        let mut app = app(source, 1280.0);
        assert!(!app.session.is_ready());

        run_until(&mut app, |app| !app.session.content().is_empty());
        assert!(app.session.is_expanded("Geography"));
        assert!(matches!(
            app.session.content_view(),
            ContentView::Markdown { title: "Rivers", pending: false, .. }
        ));
    }

    #[test]
    fn test_failed_manifest_still_becomes_ready() {
        let mut app = app(Arc::new(MemorySource::new()), 1280.0);
        run_until(&mut app, |app| app.session.is_ready());

        assert!(app.session.manifest().is_empty());
        assert_eq!(app.session.content_view(), ContentView::Empty);
    }

    #[test]
    fn test_failed_document_shows_fallback() {
        let source = Arc::new(MemorySource::new().with_file("config.json", MANIFEST));
        let mut app = app(source, 1280.0);

        run_until(&mut app, |app| !app.session.content().is_empty());
        assert_eq!(
            app.session.content(),
            "# Error\n\nUnable to load file: /materials/geo/rivers.md"
        );
    }

    #[test]
    fn test_offline_shell_is_ready_and_empty() {
        let mut app = ShelfApp::offline(
            AppConfig::default(),
            anyhow::anyhow!("Failed to start fetch runtime"),
            1280.0,
        );

        assert!(app.session.is_ready());
        assert!(app.session.manifest().is_empty());
        assert!(app.session.sidebar_open());

        app.process_events();
        app.select_file(0, 0);
        assert_eq!(app.session.content_view(), ContentView::Empty);
    }

    #[test]
    fn test_nav_actions() {
        let source = Arc::new(
            MemorySource::new()
                .with_file("config.json", MANIFEST)
                .with_file("/materials/geo/rivers.md", "# Nile"),
        );
        let mut app = app(source.clone(), 500.0);
        run_until(&mut app, |app| app.session.is_ready());
        assert!(!app.session.sidebar_open());

        app.session.toggle_sidebar();
        app.apply_nav_action(NavAction::SelectFile { subject: 0, file: 1 });
        assert!(!app.session.sidebar_open());
        assert!(matches!(app.session.content_view(), ContentView::Pdf { .. }));

        app.apply_nav_action(NavAction::ToggleSubject("Geography".to_string()));
        assert!(!app.session.is_expanded("Geography"));

        run_until(&mut app, |_| source.calls().len() >= 2);
        assert!(!source.calls().iter().any(|call| call.ends_with("maps.pdf")));
    }
}
