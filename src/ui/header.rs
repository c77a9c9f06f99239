//! Header bar: sidebar toggle, breadcrumb and document type badge

use eframe::egui::{self, RichText};

use super::ACCENT;
use crate::app::ShelfApp;
use crate::core::session::LayoutMode;

/// Header bar above the content pane
pub struct HeaderBar;

impl HeaderBar {
    pub fn show(ui: &mut egui::Ui, app: &mut ShelfApp) {
        let session = &app.session;
        let hint = if session.sidebar_open() {
            "Collapse sidebar"
        } else {
            "Expand sidebar"
        };

        let mut toggle = false;
        ui.horizontal_centered(|ui| {
            if ui
                .button(RichText::new("\u{2630}").size(18.0))
                .on_hover_text(hint)
                .clicked()
            {
                toggle = true;
            }

            ui.add_space(8.0);

            // Breadcrumb
            ui.label("\u{1F3E0}");
            ui.label(RichText::new("\u{203A}").weak());
            match session.breadcrumb() {
                Some((subject, title)) => {
                    ui.label(RichText::new(subject).strong());
                    ui.label(RichText::new("\u{203A}").weak());
                    ui.add(egui::Label::new(RichText::new(title).strong().color(ACCENT)).truncate());
                }
                None => {
                    ui.label("Home");
                }
            }

            // Type badge, wide layouts only
            if session.layout(app.viewport_width) == LayoutMode::Wide {
                if let Some((_, file)) = session.selected() {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(file.kind.tag().to_uppercase())
                                .small()
                                .strong()
                                .background_color(ui.visuals().faint_bg_color),
                        );
                    });
                }
            }
        });

        if toggle {
            app.session.toggle_sidebar();
        }
    }
}
