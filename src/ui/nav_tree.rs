//! Navigation tree of subjects and their documents

use eframe::egui::{self, RichText};

use super::{ACCENT, FOLDER};
use crate::app::ShelfApp;
use crate::core::manifest::FileKind;
use crate::core::session::Session;

/// One visible row of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRow<'a> {
    Subject {
        index: usize,
        name: &'a str,
        expanded: bool,
    },
    File {
        subject: usize,
        file: usize,
        title: &'a str,
        kind: &'a FileKind,
        selected: bool,
    },
    /// Placeholder under an expanded subject without documents
    NoFiles { subject: usize },
}

/// Rows currently visible, in display order
pub fn nav_rows(session: &Session) -> Vec<NavRow<'_>> {
    let mut rows = Vec::new();

    for (index, subject) in session.manifest().subjects.iter().enumerate() {
        let expanded = session.is_expanded(&subject.name);
        rows.push(NavRow::Subject {
            index,
            name: &subject.name,
            expanded,
        });

        if !expanded {
            continue;
        }

        if subject.files.is_empty() {
            rows.push(NavRow::NoFiles { subject: index });
        }
        for (file, doc) in subject.files.iter().enumerate() {
            rows.push(NavRow::File {
                subject: index,
                file,
                title: &doc.title,
                kind: &doc.kind,
                selected: session.is_selected(index, file),
            });
        }
    }

    rows
}

/// User intent collected while drawing the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    ToggleSubject(String),
    SelectFile { subject: usize, file: usize },
}

/// Sidebar with header, tree and footer
pub struct NavTreePanel;

impl NavTreePanel {
    /// Show the sidebar contents
    pub fn show(ui: &mut egui::Ui, app: &mut ShelfApp) {
        let mut action = None;

        ui.vertical(|ui| {
            // Header
            ui.add_space(12.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("\u{1F4D6}").size(20.0).color(ACCENT));
                ui.heading("Materials");
            });
            ui.add_space(8.0);
            ui.separator();

            let footer_height = 32.0;
            egui::ScrollArea::vertical()
                .id_salt("nav_tree_scroll")
                .auto_shrink([false, false])
                .max_height((ui.available_height() - footer_height).max(0.0))
                .show(ui, |ui| {
                    action = Self::show_rows(ui, &app.session);
                });

            ui.separator();
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(format!(
                        "v{} \u{B7} local study library",
                        env!("CARGO_PKG_VERSION")
                    ))
                    .small()
                    .weak(),
                );
            });
        });

        if let Some(action) = action {
            app.apply_nav_action(action);
        }
    }

    fn show_rows(ui: &mut egui::Ui, session: &Session) -> Option<NavAction> {
        if session.manifest().is_empty() {
            ui.add_space(10.0);
            ui.label(RichText::new("No subjects").italics().weak());
            return None;
        }

        let mut action = None;
        for row in nav_rows(session) {
            match row {
                NavRow::Subject {
                    name, expanded, ..
                } => {
                    let chevron = if expanded { "\u{25BE}" } else { "\u{25B8}" };
                    let (icon, color) = if expanded {
                        ("\u{1F4C2}", ACCENT)
                    } else {
                        ("\u{1F4C1}", FOLDER)
                    };

                    let response = ui.horizontal(|ui| {
                        ui.label(RichText::new(chevron).weak());
                        ui.label(RichText::new(icon).color(color));
                        ui.selectable_label(false, RichText::new(name).strong())
                    });
                    if response.inner.clicked() {
                        action = Some(NavAction::ToggleSubject(name.to_string()));
                    }
                }
                NavRow::File {
                    subject,
                    file,
                    title,
                    kind,
                    selected,
                } => {
                    let icon = match kind {
                        FileKind::Markdown => "\u{1F4DD}",
                        _ => "\u{1F4C4}",
                    };
                    let text = if selected {
                        RichText::new(format!("{} {}", icon, title)).color(ACCENT)
                    } else {
                        RichText::new(format!("{} {}", icon, title))
                    };

                    let clicked = ui
                        .horizontal(|ui| {
                            ui.add_space(28.0); // Indent for files
                            ui.selectable_label(selected, text).clicked()
                        })
                        .inner;
                    if clicked {
                        action = Some(NavAction::SelectFile { subject, file });
                    }
                }
                NavRow::NoFiles { .. } => {
                    ui.horizontal(|ui| {
                        ui.add_space(28.0);
                        ui.label(RichText::new("No files").small().italics().weak());
                    });
                }
            }
        }

        action
    }
}
