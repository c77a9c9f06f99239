//! Content pane: renders the selected document according to its type

use eframe::egui::{self, RichText};

use super::block_renderer::{render_blocks, BlockAction, RenderContext};
use super::markdown_blocks::{parse_blocks, Block};
use super::ACCENT;
use crate::app::ShelfApp;
use crate::core::session::ContentView;

/// Reading column width for Markdown documents
const READING_WIDTH: f32 = 900.0;

/// Parsed blocks of the Markdown text currently on screen
#[derive(Default)]
pub struct MarkdownCache {
    source: String,
    blocks: Vec<Block>,
}

impl MarkdownCache {
    /// Re-parse only when the text changed
    pub fn update(&mut self, source: &str) -> &[Block] {
        if source != self.source {
            self.blocks = parse_blocks(source);
            self.source = source.to_string();
        }
        &self.blocks
    }
}

/// Document display area
pub struct ContentPane;

impl ContentPane {
    pub fn show(ui: &mut egui::Ui, app: &mut ShelfApp) {
        let document_path = app.session.selected_path().unwrap_or_default();
        let Some(fetcher) = app.fetcher.as_ref() else {
            Self::show_empty(ui);
            return;
        };
        let source = fetcher.source().as_ref();

        let action = match app.session.content_view() {
            ContentView::Empty => {
                Self::show_empty(ui);
                None
            }
            ContentView::Markdown {
                title,
                source: text,
                pending,
            } => {
                let blocks = app.markdown.update(text);
                let ctx = RenderContext {
                    document_path: &document_path,
                    source,
                };
                Self::show_markdown(ui, title, blocks, pending, &ctx)
            }
            ContentView::Pdf { title, src } => Self::show_pdf(ui, title, &src, &source.locate(&src)),
            ContentView::Unsupported { title, tag } => {
                Self::show_unsupported(ui, title, tag);
                None
            }
        };

        if let Some(BlockAction::Open(location)) = action {
            app.open_location(&location);
        }
    }

    fn show_markdown(
        ui: &mut egui::Ui,
        title: &str,
        blocks: &[Block],
        pending: bool,
        ctx: &RenderContext<'_>,
    ) -> Option<BlockAction> {
        let mut action = None;

        egui::ScrollArea::vertical()
            .id_salt("content_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let width = ui.available_width().min(READING_WIDTH);
                let margin = ((ui.available_width() - width) / 2.0).max(0.0);

                ui.horizontal(|ui| {
                    ui.add_space(margin);
                    ui.vertical(|ui| {
                        ui.set_width(width);
                        ui.add_space(24.0);
                        ui.label(RichText::new(title).size(30.0).strong());
                        ui.add_space(8.0);
                        ui.separator();
                        ui.add_space(12.0);

                        if pending && blocks.is_empty() {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                ui.label(RichText::new("Loading document...").weak());
                            });
                        } else {
                            action = render_blocks(ui, blocks, ctx);
                        }
                        ui.add_space(24.0);
                    });
                });
            });

        action
    }

    fn show_pdf(ui: &mut egui::Ui, title: &str, src: &str, location: &str) -> Option<BlockAction> {
        let mut action = None;

        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new("\u{1F4C4}").size(64.0).color(ACCENT));
            ui.add_space(16.0);
            ui.heading(title);
            ui.add_space(8.0);
            ui.label(RichText::new(src).monospace().weak())
                .on_hover_text(location);
            ui.add_space(16.0);

            if ui
                .button(RichText::new("Open PDF").size(16.0))
                .on_hover_text("Open in the system PDF viewer")
                .clicked()
            {
                action = Some(BlockAction::Open(location.to_string()));
            }
        });

        action
    }

    fn show_unsupported(ui: &mut egui::Ui, title: &str, tag: &str) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.label(RichText::new("\u{26A0}").size(64.0).weak());
            ui.add_space(16.0);
            ui.label(RichText::new("This file format cannot be previewed").weak());
            ui.label(RichText::new(format!("{} ({})", title, tag)).small().weak());
        });
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(120.0);
            ui.label(RichText::new("\u{1F4D6}").size(64.0).color(ACCENT));
            ui.add_space(24.0);
            ui.label(RichText::new("Select a file on the left to start studying").size(20.0));
            ui.add_space(8.0);
            ui.label(RichText::new("Markdown notes and PDF documents are supported").weak());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_reparses_only_on_change() {
        let mut cache = MarkdownCache::default();
        assert!(cache.update("").is_empty());
        assert_eq!(cache.update("# One").len(), 1);
        assert_eq!(cache.update("# One\n\ntext").len(), 2);
        assert!(cache.update("").is_empty());
    }
}
