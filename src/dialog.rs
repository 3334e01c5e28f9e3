//! Modal question with a row of buttons.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use unicode_width::UnicodeWidthStr;

/// Colour role of a dialog button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Default,
    Primary,
    Success,
    Warning,
    Error,
}

impl ButtonVariant {
    pub fn parse(name: &str) -> Self {
        match name {
            "primary" => ButtonVariant::Primary,
            "success" => ButtonVariant::Success,
            "warning" => ButtonVariant::Warning,
            "error" => ButtonVariant::Error,
            _ => ButtonVariant::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub label: String,
    pub id: String,
    pub variant: ButtonVariant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Redraw,
    /// Closed with the pressed button's id, or `None` for Escape.
    Dismissed(Option<String>),
}

const BUTTON_GAP: u16 = 2;
const BUTTON_PADDING: u16 = 2;
const DIALOG_HEIGHT: u16 = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogLayout {
    pub frame: Rect,
    pub label: Rect,
    pub buttons: Vec<Rect>,
}

impl DialogLayout {
    /// Centred frame 80% of the screen wide: label on the second inner
    /// row, buttons on the fourth.
    pub fn compute(dialog: &ConfirmDialog, screen: Rect) -> Self {
        let width = (u32::from(screen.width) * 80 / 100) as u16;
        let height = DIALOG_HEIGHT.min(screen.height);
        let frame = Rect::new(
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
            width,
            height,
        );
        let inner_x = frame.x.saturating_add(2);
        let inner_right = frame.right().saturating_sub(2);
        let label = Rect::new(
            inner_x,
            frame.y + 2,
            inner_right.saturating_sub(inner_x),
            1,
        )
        .intersection(frame);
        let row = frame.y + 4;
        let mut buttons = Vec::with_capacity(dialog.buttons.len());
        let mut x = inner_x;
        for button in &dialog.buttons {
            let w = (button.label.width() as u16).saturating_add(BUTTON_PADDING * 2);
            let w = w.min(inner_right.saturating_sub(x));
            buttons.push(Rect::new(x, row, w, 1).intersection(frame));
            x = x.saturating_add(w + BUTTON_GAP).min(inner_right);
        }
        Self {
            frame,
            label,
            buttons,
        }
    }
}

/// Built per question; nothing is shared between invocations.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub label: String,
    pub buttons: Vec<DialogButton>,
    focused: usize,
    pressed: Option<usize>,
}

impl ConfirmDialog {
    /// `buttons` are `(label, id, variant)` triples.
    pub fn new(label: impl Into<String>, buttons: &[(&str, &str, &str)]) -> Self {
        Self {
            label: label.into(),
            buttons: buttons
                .iter()
                .map(|(label, id, variant)| DialogButton {
                    label: label.to_string(),
                    id: id.to_string(),
                    variant: ButtonVariant::parse(variant),
                })
                .collect(),
            focused: 0,
            pressed: None,
        }
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    fn press(&self, index: usize) -> DialogAction {
        match self.buttons.get(index) {
            Some(button) => DialogAction::Dismissed(Some(button.id.clone())),
            None => DialogAction::None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogAction {
        let count = self.buttons.len();
        match key.code {
            KeyCode::Esc => DialogAction::Dismissed(None),
            KeyCode::Enter | KeyCode::Char(' ') => self.press(self.focused),
            KeyCode::Right | KeyCode::Tab if count > 0 => {
                self.focused = (self.focused + 1) % count;
                DialogAction::Redraw
            }
            KeyCode::Left | KeyCode::BackTab if count > 0 => {
                self.focused = (self.focused + count - 1) % count;
                DialogAction::Redraw
            }
            _ => DialogAction::None,
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, screen: Rect) -> DialogAction {
        let pos = Position::new(mouse.column, mouse.row);
        let layout = DialogLayout::compute(self, screen);
        let hit = layout.buttons.iter().position(|r| r.contains(pos));
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = hit;
                match hit {
                    Some(index) if index != self.focused => {
                        self.focused = index;
                        DialogAction::Redraw
                    }
                    _ => DialogAction::None,
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let pressed = self.pressed.take();
                match hit {
                    Some(index) if pressed == Some(index) => self.press(index),
                    _ => DialogAction::None,
                }
            }
            _ => DialogAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn quit_dialog() -> ConfirmDialog {
        ConfirmDialog::new(
            "Do you really want to quit?",
            &[("Quit", "quit", "error"), ("Cancel", "cancel", "primary")],
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn click(kind: MouseEventKind, rect: Rect) -> MouseEvent {
        MouseEvent {
            kind,
            column: rect.x + 1,
            row: rect.y,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn variants_parse() {
        let dialog = quit_dialog();
        assert_eq!(dialog.buttons[0].variant, ButtonVariant::Error);
        assert_eq!(dialog.buttons[1].variant, ButtonVariant::Primary);
        assert_eq!(ButtonVariant::parse("bogus"), ButtonVariant::Default);
    }

    #[test]
    fn enter_presses_focused_button() {
        let mut dialog = quit_dialog();
        assert_eq!(
            dialog.handle_key(key(KeyCode::Enter)),
            DialogAction::Dismissed(Some("quit".into()))
        );
        dialog.handle_key(key(KeyCode::Right));
        assert_eq!(
            dialog.handle_key(key(KeyCode::Char(' '))),
            DialogAction::Dismissed(Some("cancel".into()))
        );
    }

    #[test]
    fn focus_wraps() {
        let mut dialog = quit_dialog();
        dialog.handle_key(key(KeyCode::Left));
        assert_eq!(dialog.focused(), 1);
        dialog.handle_key(key(KeyCode::Tab));
        assert_eq!(dialog.focused(), 0);
    }

    #[test]
    fn escape_dismisses_without_id() {
        let mut dialog = quit_dialog();
        assert_eq!(dialog.handle_key(key(KeyCode::Esc)), DialogAction::Dismissed(None));
    }

    #[test]
    fn click_presses_button() {
        let mut dialog = quit_dialog();
        let cancel = DialogLayout::compute(&dialog, SCREEN).buttons[1];
        assert_eq!(
            dialog.handle_mouse(click(MouseEventKind::Down(MouseButton::Left), cancel), SCREEN),
            DialogAction::Redraw
        );
        assert_eq!(
            dialog.handle_mouse(click(MouseEventKind::Up(MouseButton::Left), cancel), SCREEN),
            DialogAction::Dismissed(Some("cancel".into()))
        );
    }

    #[test]
    fn release_elsewhere_does_not_press() {
        let mut dialog = quit_dialog();
        let layout = DialogLayout::compute(&dialog, SCREEN);
        dialog.handle_mouse(click(MouseEventKind::Down(MouseButton::Left), layout.buttons[0]), SCREEN);
        assert_eq!(
            dialog.handle_mouse(click(MouseEventKind::Up(MouseButton::Left), layout.buttons[1]), SCREEN),
            DialogAction::None
        );
    }

    #[test]
    fn layout_is_centred_and_buttons_fit() {
        let dialog = quit_dialog();
        let layout = DialogLayout::compute(&dialog, SCREEN);
        assert_eq!(layout.frame, Rect::new(8, 8, 64, 7));
        assert_eq!(layout.buttons[0], Rect::new(10, 12, 8, 1));
        assert_eq!(layout.buttons[1], Rect::new(20, 12, 10, 1));
    }
}
