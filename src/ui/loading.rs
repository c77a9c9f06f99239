//! Full-window loading indicator shown until the manifest has been handled

use eframe::egui::{self, RichText};

pub struct LoadingScreen;

impl LoadingScreen {
    pub fn show(ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space((ui.available_height() / 2.0 - 40.0).max(0.0));
                ui.add(egui::Spinner::new().size(32.0));
                ui.add_space(16.0);
                ui.label(RichText::new("Loading library...").weak());
            });
        });
    }
}
