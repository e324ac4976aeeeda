use crate::app::registry::CommandRegistry;
use crate::app::results::ResultItem;
use crate::app::state::PaletteState;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Widget},
};

use super::helpers::{centered_rect, draw_drop_shadow};

/// The palette overlay: query line, optional command-mode badge, separator
/// and the navigable result list.
pub struct PaletteOverlay<'a> {
    pub theme: &'a Theme,
    pub state: &'a PaletteState<'a>,
    pub registry: &'a CommandRegistry,
    pub executing: bool,
}

fn modal_area(area: Rect) -> Rect {
    centered_rect(60, 60, area)
}

fn inner_area(modal: Rect) -> Rect {
    Rect {
        x: modal.x + 1,
        y: modal.y + 1,
        width: modal.width.saturating_sub(2),
        height: modal.height.saturating_sub(2),
    }
}

/// Rows above the list inside the inner area.
fn header_rows(command_mode: bool) -> u16 {
    if command_mode {
        3
    } else {
        2
    }
}

/// First visible list index, keeping the cursor inside the window.
fn list_offset(active_index: usize, height: u16) -> usize {
    let height = height as usize;
    if height == 0 {
        return 0;
    }
    (active_index + 1).saturating_sub(height)
}

/// Maps a click position to a result index, mirroring the render geometry.
#[must_use]
pub fn hit_test(area: Rect, state: &PaletteState<'_>, column: u16, row: u16) -> Option<usize> {
    let inner = inner_area(modal_area(area));
    let top = inner.y + header_rows(state.command_mode);
    if column < inner.x || column >= inner.x + inner.width || row < top {
        return None;
    }
    let height = (inner.y + inner.height).saturating_sub(top);
    if row >= top + height {
        return None;
    }
    let offset = list_offset(state.active_index, height);
    let index = offset + (row - top) as usize;
    (index < state.results.len()).then_some(index)
}

impl Widget for PaletteOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal = modal_area(area);
        if modal.width < 4 || modal.height < 4 {
            return;
        }

        draw_drop_shadow(buf, modal, area);
        Clear.render(modal, buf);

        let locked = self
            .state
            .locked_command
            .map(|id| self.registry.get(id));

        let hints = if self.state.command_mode {
            Line::from(vec![
                Span::styled(" Space", self.theme.footer_segment_key),
                Span::raw(": select "),
                Span::styled("Ctrl+A", self.theme.footer_segment_key),
                Span::raw(": all "),
                Span::styled("Shift+Enter", self.theme.footer_segment_key),
                Span::raw(": run "),
                Span::styled("Esc", self.theme.footer_segment_key),
                Span::raw(": back "),
            ])
        } else {
            Line::from(vec![
                Span::styled(" Tab", self.theme.footer_segment_key),
                Span::raw(": command mode "),
                Span::styled("Enter", self.theme.footer_segment_key),
                Span::raw(": open "),
                Span::styled("`", self.theme.footer_segment_key),
                Span::raw(": quick close "),
                Span::styled("Esc", self.theme.footer_segment_key),
                Span::raw(": close "),
            ])
        };

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(" COMMAND PALETTE ", self.theme.header_active),
                Span::raw(" "),
            ]))
            .title_bottom(hints)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_focus);

        let inner = block.inner(modal);
        block.render(modal, buf);
        let mut y = inner.y;

        // Query line with a pseudo-cursor while the input has focus.
        let mut query_spans = vec![
            Span::styled(" > ", self.theme.footer_segment_key),
            Span::styled(self.state.query_text(), self.theme.footer_segment_val),
        ];
        if self.state.input_focused {
            query_spans.push(Span::styled(
                "_",
                self.theme
                    .footer_segment_val
                    .add_modifier(ratatui::style::Modifier::SLOW_BLINK),
            ));
        }
        buf.set_line(inner.x, y, &Line::from(query_spans), inner.width);
        y += 1;

        // Command-mode badge.
        if self.state.command_mode {
            let mut badge = vec![Span::raw(" ")];
            if let Some(spec) = locked {
                badge.push(Span::styled(
                    format!("[{}]", spec.name),
                    self.theme.header_item,
                ));
            }
            let selected = self.state.selection.len();
            if selected > 0 {
                badge.push(Span::styled(
                    format!(" {selected} selected"),
                    self.theme.highlight,
                ));
            }
            if self.executing {
                badge.push(Span::styled(" running…", self.theme.header_warn));
            }
            buf.set_line(inner.x, y, &Line::from(badge), inner.width);
            y += 1;
        }

        // Separator.
        let separator = "─".repeat(inner.width as usize);
        buf.set_string(inner.x, y, separator, self.theme.border_focus);
        y += 1;

        // Result list.
        let list_area = Rect {
            x: inner.x,
            y,
            width: inner.width,
            height: (inner.y + inner.height).saturating_sub(y),
        };
        if list_area.height == 0 {
            return;
        }

        if self.state.results.is_empty() {
            let empty = Line::from(Span::styled(
                "  No results.",
                self.theme.dimmed,
            ));
            buf.set_line(list_area.x, list_area.y, &empty, list_area.width);
            return;
        }

        let offset = list_offset(self.state.active_index, list_area.height);
        let multi = locked.is_some_and(|spec| spec.multi_select);
        let items: Vec<ListItem> = self
            .state
            .results
            .iter()
            .enumerate()
            .skip(offset)
            .take(list_area.height as usize)
            .map(|(i, item)| self.render_item(i, item, multi))
            .collect();

        List::new(items).render(list_area, buf);
    }
}

impl PaletteOverlay<'_> {
    fn render_item(&self, index: usize, item: &ResultItem, multi: bool) -> ListItem<'static> {
        let is_active = index == self.state.active_index;
        let base = if is_active {
            self.theme.list_selected
        } else {
            self.theme.list_item
        };
        let cursor = if is_active { "▸ " } else { "  " };

        let mut spans = vec![Span::styled(cursor.to_string(), base)];

        if multi {
            if let Some(id) = item.tab_id() {
                let mark = if self.state.selection.contains(id) {
                    "[x] "
                } else {
                    "[ ] "
                };
                spans.push(Span::styled(mark.to_string(), self.theme.highlight));
            }
        }

        match item {
            ResultItem::Tab {
                title, url, active, ..
            } => {
                if *active {
                    spans.push(Span::styled("● ".to_string(), self.theme.highlight));
                }
                spans.push(Span::styled(title.clone(), base));
                spans.push(Span::styled(format!("  {url}"), self.theme.list_url));
            }
            ResultItem::CloseTab { title, .. } => {
                spans.push(Span::styled(
                    format!("Close: {title}"),
                    if is_active {
                        base
                    } else {
                        self.theme.status_error
                    },
                ));
            }
            ResultItem::Action { label, .. } => {
                spans.push(Span::styled(label.clone(), base));
            }
            ResultItem::Group { title, .. } => {
                spans.push(Span::styled(title.clone(), base));
                spans.push(Span::styled("  tab group".to_string(), self.theme.dimmed));
            }
        }

        ListItem::new(Line::from(spans))
    }
}
