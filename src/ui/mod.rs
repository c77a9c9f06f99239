//! UI components for StudyShelf

use eframe::egui::Color32;

pub mod block_renderer;
pub mod content_pane;
pub mod header;
pub mod loading;
pub mod markdown_blocks;
pub mod nav_tree;

/// Accent for the selected document and expanded subjects
pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);

/// Folder color for collapsed subjects
pub const FOLDER: Color32 = Color32::from_rgb(251, 191, 36);
