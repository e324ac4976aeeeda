use crate::app::state::{AppMode, AppState};
use crate::components::error::ErrorModal;
use crate::components::helpers::dim_area;
use crate::components::input_dialog::InputDialog;
use crate::components::palette::PaletteOverlay;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
    Frame,
};

pub struct AppLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

pub fn get_layout(area: Rect) -> AppLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);
    AppLayout {
        header: rows[0],
        body: rows[1],
        footer: rows[2],
    }
}

pub fn draw(f: &mut Frame, app_state: &mut AppState) {
    if f.area().width == 0 || f.area().height == 0 {
        return;
    }
    let theme = app_state.theme.clone();
    let layout = get_layout(f.area());

    // --- Header ---
    if layout.header.width > 0 {
        let stats = format!(
            " {} tabs · {} groups ",
            app_state.tabs.len(),
            app_state.groups.len()
        );
        let padding = (f.area().width as usize).saturating_sub(stats.len() + 10);
        let header = Paragraph::new(Line::from(vec![
            Span::styled(" TABPILOT ", theme.header_logo),
            Span::styled(stats, theme.header),
            Span::styled(" ".repeat(padding), theme.header),
        ]))
        .style(theme.header);
        f.render_widget(header, layout.header);
    }

    // --- Session pane (backdrop) ---
    let session_block = Block::default()
        .title(Line::from(vec![
            Span::raw(" "),
            Span::styled("SESSION", theme.header_item),
            Span::raw(" "),
        ]))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if app_state.mode == AppMode::Hidden {
            theme.border_focus
        } else {
            theme.border
        });

    let items: Vec<ListItem> = app_state
        .tabs
        .iter()
        .map(|tab| {
            let mut spans = vec![Span::raw("  ")];
            if tab.active {
                spans.push(Span::styled("● ", theme.highlight));
            }
            spans.push(Span::styled(tab.title.clone(), theme.list_item));
            if let Some(group_id) = tab.group {
                if let Some(group) = app_state.groups.iter().find(|g| g.id == group_id) {
                    spans.push(Span::styled(format!("  [{}]", group.label()), theme.header_item));
                }
            }
            spans.push(Span::styled(format!("  {}", tab.url), theme.list_url));
            ListItem::new(Line::from(spans))
        })
        .collect();
    let session = List::new(items).block(session_block);
    f.render_widget(session, layout.body);

    // --- Footer ---
    if layout.footer.width > 0 {
        let footer = if let Some(message) = &app_state.status_message {
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {message} "), theme.status_info),
            ]))
            .style(theme.footer)
        } else {
            Paragraph::new(Line::from(vec![
                Span::styled(" Ctrl+Space ×2", theme.footer_segment_key),
                Span::raw(": palette  "),
                Span::styled("q", theme.footer_segment_key),
                Span::raw(": quit "),
            ]))
            .style(theme.footer)
        };
        f.render_widget(footer, layout.footer);
    }

    // --- Overlays ---
    let overlay_active = app_state.mode != AppMode::Hidden || app_state.last_error.is_some();
    if overlay_active {
        let area = f.area();
        dim_area(f.buffer_mut(), area);
    }

    if app_state.palette_open() || app_state.mode == AppMode::Input {
        let overlay = PaletteOverlay {
            theme: &theme,
            state: &app_state.palette,
            registry: app_state.registry.as_ref(),
            executing: app_state.executing,
        };
        f.render_widget(overlay, f.area());
    }

    if app_state.mode == AppMode::Input {
        if let (Some(pending), Some(text_area)) = (&app_state.pending_input, &app_state.dialog) {
            let dialog = InputDialog {
                theme: &theme,
                pending,
                text_area,
            };
            f.render_widget(dialog, f.area());
        }
    }

    if let Some(error) = &app_state.last_error {
        let modal = ErrorModal {
            theme: &theme,
            error,
        };
        f.render_widget(modal, f.area());
    }
}
