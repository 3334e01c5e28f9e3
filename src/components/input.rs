use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::input::TextInput;
use crate::theme::Theme;

/// Single-line text field. The cursor cell is drawn reversed while focused.
pub struct TextInputWidget<'a> {
    input: &'a TextInput,
    theme: &'a Theme,
    focused: bool,
}

impl<'a> TextInputWidget<'a> {
    pub fn new(input: &'a TextInput, theme: &'a Theme, focused: bool) -> Self {
        Self {
            input,
            theme,
            focused,
        }
    }
}

impl<'a> Widget for TextInputWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let width = usize::from(area.width);
        let chars: Vec<char> = self.input.value.chars().collect();
        let cursor = self.input.cursor_column();

        // Scroll so the cursor cell stays inside the field
        let skip = (cursor + 1).saturating_sub(width);
        let style = Style::default().bg(self.theme.input_bg).fg(self.theme.fg);
        buf.set_style(Rect::new(area.x, area.y, area.width, 1), style);

        let before: String = chars[skip..cursor].iter().collect();
        let mut spans = vec![Span::styled(before, style)];
        if self.focused {
            let at = chars.get(cursor).map_or(" ".to_string(), char::to_string);
            spans.push(Span::styled(at, style.add_modifier(Modifier::REVERSED)));
            let after: String = chars.iter().skip(cursor + 1).collect();
            spans.push(Span::styled(after, style));
        } else {
            let after: String = chars[cursor..].iter().collect();
            spans.push(Span::styled(after, style));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
