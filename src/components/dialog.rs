use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::dialog::{ButtonVariant, ConfirmDialog, DialogLayout};
use crate::theme::Theme;

/// Centred modal with the question and its buttons.
pub struct DialogWidget<'a> {
    dialog: &'a ConfirmDialog,
    theme: &'a Theme,
}

impl<'a> DialogWidget<'a> {
    pub fn new(dialog: &'a ConfirmDialog, theme: &'a Theme) -> Self {
        Self { dialog, theme }
    }

    fn button_style(&self, variant: ButtonVariant, focused: bool) -> Style {
        let bg = match variant {
            ButtonVariant::Default => self.theme.button_bg,
            ButtonVariant::Primary => self.theme.border_focused_fg,
            ButtonVariant::Success => self.theme.success_fg,
            ButtonVariant::Warning => self.theme.warning_fg,
            ButtonVariant::Error => self.theme.error_fg,
        };
        let fg = if variant == ButtonVariant::Default {
            self.theme.button_fg
        } else {
            self.theme.panel_bg
        };
        let style = Style::default().bg(bg).fg(fg);
        if focused {
            style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            style
        }
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = DialogLayout::compute(self.dialog, area);
        if layout.frame.width < 3 || layout.frame.height < 3 {
            return;
        }

        Clear.render(layout.frame, buf);
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent_fg))
            .style(Style::default().bg(self.theme.panel_bg).fg(self.theme.fg))
            .render(layout.frame, buf);

        buf.set_stringn(
            layout.label.x,
            layout.label.y,
            &self.dialog.label,
            usize::from(layout.label.width),
            Style::default().fg(self.theme.fg),
        );

        for (index, (button, rect)) in self.dialog.buttons.iter().zip(&layout.buttons).enumerate() {
            let style = self.button_style(button.variant, index == self.dialog.focused());
            Paragraph::new(Line::from(button.label.as_str()))
                .alignment(Alignment::Center)
                .style(style)
                .render(*rect, buf);
        }
    }
}
