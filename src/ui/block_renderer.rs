//! Block rendering for the content pane
//!
//! Draws the blocks produced by `markdown_blocks` as formatted prose.

use eframe::egui::{self, FontId, RichText, Ui};

use super::markdown_blocks::{
    resolve_target, Block, Inline, LinkTarget, ListItem, SpanStyle, TableAlignment, TableCell,
};
use crate::core::source::LibrarySource;

/// Action that can be triggered by block interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockAction {
    /// Open a URL or library location with the system handler
    Open(String),
}

/// Where the rendered document lives, for resolving relative targets
pub struct RenderContext<'a> {
    pub document_path: &'a str,
    pub source: &'a dyn LibrarySource,
}

impl RenderContext<'_> {
    /// Location to hand to the system for a link target
    fn link_location(&self, target: &str) -> Option<String> {
        match resolve_target(self.document_path, target) {
            LinkTarget::External(url) if url.starts_with('#') => None,
            LinkTarget::External(url) => Some(url),
            LinkTarget::Library(path) => Some(self.source.locate(&path)),
        }
    }

    /// URI the image loaders understand
    fn image_uri(&self, target: &str) -> String {
        let location = match resolve_target(self.document_path, target) {
            LinkTarget::External(url) => return url,
            LinkTarget::Library(path) => self.source.locate(&path),
        };

        if location.contains("://") {
            location
        } else {
            format!("file://{}", location)
        }
    }
}

/// Render a sequence of blocks
pub fn render_blocks(ui: &mut Ui, blocks: &[Block], ctx: &RenderContext<'_>) -> Option<BlockAction> {
    let mut action = None;
    for (idx, block) in blocks.iter().enumerate() {
        ui.push_id(idx, |ui| {
            if let Some(a) = render_block(ui, block, ctx) {
                action = Some(a);
            }
        });
    }
    action
}

/// Render a parsed block to the UI
pub fn render_block(ui: &mut Ui, block: &Block, ctx: &RenderContext<'_>) -> Option<BlockAction> {
    match block {
        Block::Heading { level, content } => render_heading(ui, *level, content, ctx),
        Block::Paragraph(content) => {
            let action = render_inlines(ui, content, ctx, 16.0);
            ui.add_space(8.0);
            action
        }
        Block::CodeBlock { lang, code } => {
            render_code_block(ui, lang.as_deref(), code);
            None
        }
        Block::List {
            ordered,
            start,
            items,
        } => render_list(ui, items, *ordered, *start, ctx),
        Block::BlockQuote(content) => render_blockquote(ui, content, ctx),
        Block::Table {
            alignments,
            header,
            rows,
        } => render_table(ui, alignments, header, rows, ctx),
        Block::Html(html) => {
            ui.label(
                RichText::new(html)
                    .font(FontId::monospace(13.0))
                    .color(ui.visuals().weak_text_color()),
            );
            ui.add_space(8.0);
            None
        }
        Block::FootnoteDefinition { label, blocks } => {
            let mut action = None;
            ui.horizontal_top(|ui| {
                ui.label(RichText::new(format!("[{}]", label)).small().weak());
                ui.vertical(|ui| {
                    action = render_blocks(ui, blocks, ctx);
                });
            });
            action
        }
        Block::Rule => {
            render_horizontal_rule(ui);
            None
        }
    }
}

/// Render a heading
pub fn render_heading(
    ui: &mut Ui,
    level: u8,
    content: &[Inline],
    ctx: &RenderContext<'_>,
) -> Option<BlockAction> {
    let font_size = match level {
        1 => 28.0,
        2 => 24.0,
        3 => 20.0,
        4 => 18.0,
        5 => 16.0,
        _ => 14.0,
    };

    ui.add_space(4.0);
    let action = render_inlines_with(ui, content, ctx, font_size, true);
    ui.add_space(match level {
        1 => 12.0,
        2 => 10.0,
        _ => 6.0,
    });

    action
}

/// Render inline content with word wrapping
pub fn render_inlines(
    ui: &mut Ui,
    content: &[Inline],
    ctx: &RenderContext<'_>,
    size: f32,
) -> Option<BlockAction> {
    render_inlines_with(ui, content, ctx, size, false)
}

fn render_inlines_with(
    ui: &mut Ui,
    content: &[Inline],
    ctx: &RenderContext<'_>,
    size: f32,
    heading: bool,
) -> Option<BlockAction> {
    let mut action = None;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;

        for inline in content {
            match inline {
                Inline::Span { text, style, link } => {
                    let rich = styled_text(ui, text, *style, size, heading);
                    match link {
                        Some(target) => {
                            let response = ui.link(rich).on_hover_text(target.as_str());
                            if response.clicked() {
                                action = ctx.link_location(target).map(BlockAction::Open);
                            }
                        }
                        None => {
                            ui.label(rich);
                        }
                    }
                }
                Inline::Image { url, alt } => {
                    let image = egui::Image::new(ctx.image_uri(url))
                        .max_width(ui.available_width())
                        .corner_radius(egui::CornerRadius::same(4));
                    let response = ui.add(image);
                    if !alt.is_empty() {
                        response.on_hover_text(alt.as_str());
                    }
                }
                Inline::LineBreak => {
                    ui.end_row();
                }
            }
        }
    });

    action
}

fn styled_text(ui: &Ui, text: &str, style: SpanStyle, size: f32, heading: bool) -> RichText {
    let mut rich = if style.code {
        RichText::new(text)
            .font(FontId::monospace(size - 2.0))
            .background_color(ui.visuals().code_bg_color)
    } else {
        RichText::new(text).size(size)
    };

    if style.strong || heading {
        rich = rich.strong();
    }
    if style.emphasis {
        rich = rich.italics();
    }
    if style.strikethrough {
        rich = rich.strikethrough();
    }
    rich
}

/// Render a code block
pub fn render_code_block(ui: &mut Ui, lang: Option<&str>, code: &str) {
    let visuals = ui.visuals();
    let bg_color = visuals.extreme_bg_color;
    let border_color = visuals.widgets.noninteractive.bg_stroke.color;
    let weak = visuals.weak_text_color();

    egui::Frame::new()
        .fill(bg_color)
        .stroke(egui::Stroke::new(1.0, border_color))
        .inner_margin(egui::Margin::same(8))
        .outer_margin(egui::Margin::symmetric(0, 4))
        .corner_radius(egui::CornerRadius::same(4))
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());

            // Language label
            if let Some(lang) = lang {
                ui.label(RichText::new(lang).font(FontId::monospace(12.0)).color(weak));
                ui.add_space(4.0);
            }

            ui.label(RichText::new(code.trim_end_matches('\n')).font(FontId::monospace(14.0)));
        });

    ui.add_space(8.0);
}

/// Render a list (ordered or unordered)
pub fn render_list(
    ui: &mut Ui,
    items: &[ListItem],
    ordered: bool,
    start: u64,
    ctx: &RenderContext<'_>,
) -> Option<BlockAction> {
    let mut action = None;
    let marker_color = ui.visuals().weak_text_color();

    for (idx, item) in items.iter().enumerate() {
        ui.push_id(idx, |ui| {
            ui.horizontal_top(|ui| {
                // Indent
                ui.add_space(16.0);

                if let Some(checked) = item.checkbox {
                    // Task list item, read-only
                    let mut checked = checked;
                    ui.add_enabled(false, egui::Checkbox::without_text(&mut checked));
                } else if ordered {
                    let num = start + idx as u64;
                    ui.label(RichText::new(format!("{}.", num)).color(marker_color));
                } else {
                    ui.label(RichText::new("\u{2022}").color(marker_color));
                }

                ui.add_space(4.0);

                ui.vertical(|ui| {
                    if let Some(a) = render_blocks(ui, &item.blocks, ctx) {
                        action = Some(a);
                    }
                });
            });
        });
    }

    ui.add_space(4.0);
    action
}

/// Render a blockquote
pub fn render_blockquote(
    ui: &mut Ui,
    content: &[Block],
    ctx: &RenderContext<'_>,
) -> Option<BlockAction> {
    let mut action = None;
    let bar_color = ui.visuals().widgets.noninteractive.bg_stroke.color;

    egui::Frame::new()
        .fill(ui.visuals().faint_bg_color)
        .inner_margin(egui::Margin {
            left: 12,
            right: 8,
            top: 8,
            bottom: 8,
        })
        .show(ui, |ui| {
            // Left border effect
            let rect = ui.max_rect();
            ui.painter().rect_filled(
                egui::Rect::from_min_size(
                    rect.min - egui::vec2(12.0, 8.0),
                    egui::vec2(4.0, rect.height() + 16.0),
                ),
                0.0,
                bar_color,
            );

            action = render_blocks(ui, content, ctx);
        });

    ui.add_space(8.0);
    action
}

/// Render a horizontal rule
pub fn render_horizontal_rule(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

/// Render a table
pub fn render_table(
    ui: &mut Ui,
    alignments: &[TableAlignment],
    header: &[TableCell],
    rows: &[Vec<TableCell>],
    ctx: &RenderContext<'_>,
) -> Option<BlockAction> {
    use egui_extras::{Column, TableBuilder};

    let num_cols = header.len().max(1);
    let mut action = None;

    let layout = |col: usize| match alignments.get(col).copied().unwrap_or_default() {
        TableAlignment::Left => egui::Layout::left_to_right(egui::Align::Center),
        TableAlignment::Center => egui::Layout::centered_and_justified(egui::Direction::LeftToRight),
        TableAlignment::Right => egui::Layout::right_to_left(egui::Align::Center),
    };

    egui::Frame::new()
        .stroke(egui::Stroke::new(
            1.0,
            ui.visuals().widgets.noninteractive.bg_stroke.color,
        ))
        .inner_margin(egui::Margin::same(4))
        .show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), num_cols)
                .header(22.0, |mut header_row| {
                    for (col, cell) in header.iter().enumerate() {
                        header_row.col(|ui| {
                            ui.with_layout(layout(col), |ui| {
                                if let Some(a) = render_inlines_with(ui, cell, ctx, 14.0, true) {
                                    action = Some(a);
                                }
                            });
                        });
                    }
                })
                .body(|mut body| {
                    for row in rows {
                        body.row(20.0, |mut row_ui| {
                            for (col, cell) in row.iter().enumerate() {
                                row_ui.col(|ui| {
                                    ui.with_layout(layout(col), |ui| {
                                        if let Some(a) = render_inlines(ui, cell, ctx, 14.0) {
                                            action = Some(a);
                                        }
                                    });
                                });
                            }
                        });
                    }
                });
        });

    ui.add_space(8.0);
    action
}
