use crate::app::state::{AppTextArea, PendingInput};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};

use super::helpers::{centered_rect_fixed_height, draw_drop_shadow};

/// Follow-up input collection for a command that suspended with
/// `needs_input` (e.g. naming a new tab group).
pub struct InputDialog<'a> {
    pub theme: &'a Theme,
    pub pending: &'a PendingInput,
    pub text_area: &'a AppTextArea<'a>,
}

impl Widget for InputDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let modal_area = centered_rect_fixed_height(50, 3, area);
        if modal_area.width == 0 || modal_area.height == 0 {
            return;
        }

        draw_drop_shadow(buf, modal_area, area);
        Clear.render(modal_area, buf);

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    format!(" {} ", self.pending.request.title.to_uppercase()),
                    self.theme.header_active,
                ),
                Span::raw(" "),
            ]))
            .title_bottom(Line::from(vec![
                Span::raw(" "),
                Span::styled("Enter", self.theme.footer_segment_key),
                Span::raw(": confirm "),
                Span::styled("Esc", self.theme.footer_segment_key),
                Span::raw(": cancel "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(self.theme.border_focus);

        let inner_area = block.inner(modal_area);
        block.render(modal_area, buf);

        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        Widget::render(self.text_area, inner_area, buf);
        // Placeholder hint after the cursor cell while the buffer is empty.
        if self.text_area.text().is_empty() && inner_area.width > 2 {
            let placeholder = Line::from(Span::styled(
                self.pending.request.placeholder.clone(),
                self.theme.dimmed,
            ));
            buf.set_line(
                inner_area.x + 2,
                inner_area.y,
                &placeholder,
                inner_area.width - 2,
            );
        }
    }
}
