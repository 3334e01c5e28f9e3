use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{App, Modal, SelectorPurpose, BUTTON_WIDGET, LOG_WIDGET};
use crate::focus::Focus;

/// Route a key: open menus first, then the top modal, then the host.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.menus.is_open() {
        let event = app.menus.handle_key(key);
        app.menu_event(event);
        return;
    }

    if let Some(modal) = app.modals.last_mut() {
        match modal {
            Modal::Selector { selector, .. } => {
                let action = selector.handle_key(key);
                app.selector_action(action);
            }
            Modal::Confirm { dialog, .. } => {
                let action = dialog.handle_key(key);
                app.dialog_action(action);
            }
        }
        return;
    }

    if let Focus::MenuHeader(index) = app.focus {
        let bar_row = app.layout().bar;
        let mut focus = app.focus;
        app.bar.handle_key(index, key, bar_row, &mut app.menus, &mut focus);
        app.focus = focus;
        return;
    }

    match key.code {
        KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_context_menu(None)
        }
        KeyCode::Char('q') => app.confirm_quit(),
        KeyCode::Char('m') => app.activate_menu_bar(),
        KeyCode::Char('f') => app.open_selector(SelectorPurpose::Open),
        KeyCode::Char('s') => app.open_selector(SelectorPurpose::Save),
        KeyCode::Char('d') => app.open_selector(SelectorPurpose::ChooseDirectory),
        KeyCode::Tab | KeyCode::BackTab => app.cycle_focus(),
        KeyCode::Enter | KeyCode::Char(' ') if app.focus == Focus::Widget(BUTTON_WIDGET) => {
            app.press_button(true)
        }
        KeyCode::Up if app.focus == Focus::Widget(LOG_WIDGET) => app.scroll_log(1),
        KeyCode::Down if app.focus == Focus::Widget(LOG_WIDGET) => app.scroll_log(-1),
        _ => {}
    }
}

/// Route a mouse event the same way as keys; the menus capture the
/// pointer while open.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.menus.is_open() {
        let event = app.menus.handle_mouse(mouse);
        app.menu_event(event);
        return;
    }

    if let Some(modal) = app.modals.last_mut() {
        let screen = app.screen;
        match modal {
            Modal::Selector { selector, .. } => {
                let action = selector.handle_mouse(mouse);
                app.selector_action(action);
            }
            Modal::Confirm { dialog, .. } => {
                let action = dialog.handle_mouse(mouse, screen);
                app.dialog_action(action);
            }
        }
        return;
    }

    let layout = app.layout();
    let pos = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if layout.bar.contains(pos) => {
            let focus = app.focus;
            app.bar.handle_mouse(mouse, layout.bar, &mut app.menus, focus);
        }
        MouseEventKind::Down(MouseButton::Left) if layout.button.contains(pos) => {
            app.press_button(false);
        }
        MouseEventKind::Down(MouseButton::Left) if layout.log.contains(pos) => {
            app.focus = Focus::Widget(LOG_WIDGET);
        }
        MouseEventKind::Down(MouseButton::Right) => app.open_context_menu(Some(pos)),
        MouseEventKind::ScrollUp if layout.log.contains(pos) => app.scroll_log(3),
        MouseEventKind::ScrollDown if layout.log.contains(pos) => app.scroll_log(-3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CONTEXT_MENU;
    use crate::config::AppConfig;
    use crate::event::Event;
    use crate::menu::screen::MenuMode;
    use ratatui::layout::Rect;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn app(dir: &Path) -> (App, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut config = AppConfig::default();
        config.watcher.enabled = Some(false);
        (App::new(config, dir, Rect::new(0, 0, 100, 30), tx), rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn q_then_enter_quits() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.has_modal());
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(app.should_quit);
    }

    #[test]
    fn q_then_escape_stays() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.should_quit);
        assert!(!app.has_modal());
    }

    #[test]
    fn menu_bar_keyboard_flow() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.focus, Focus::MenuHeader(0));
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.menus.open_ids(), vec!["app_menu"]);
        assert_eq!(app.menus.mode(), MenuMode::Key);
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.menus.is_open());
        assert!(app.log.last().unwrap().contains("demo"));
        assert_eq!(app.focus, Focus::Widget(LOG_WIDGET));
    }

    #[test]
    fn escape_on_bar_restores_focus() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Tab));
        handle_key_event(&mut app, key(KeyCode::Char('m')));
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.focus, Focus::MenuHeader(1));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.focus, Focus::Widget(BUTTON_WIDGET));
    }

    #[test]
    fn ctrl_a_opens_context_menu_in_key_mode() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        assert_eq!(app.menus.open_ids(), vec![CONTEXT_MENU]);
        assert_eq!(app.menus.mode(), MenuMode::Key);
        handle_key_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.menus.open_ids(), vec![CONTEXT_MENU, "test_menu"]);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.menus.is_open());
    }

    #[test]
    fn missing_sub_menu_keeps_stack() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL));
        handle_key_event(&mut app, key(KeyCode::Right));
        for _ in 0..4 {
            handle_key_event(&mut app, key(KeyCode::Down));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.menus.open_ids(), vec![CONTEXT_MENU, "test_menu"]);
    }

    #[test]
    fn right_click_opens_context_menu_at_pointer() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Right), 30, 10));
        assert_eq!(app.menus.mode(), MenuMode::Click);
        let region = app.menus.stack()[0].region;
        assert_eq!((region.x, region.y), (30, 10));
    }

    #[test]
    fn header_press_and_release_on_item_triggers() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_mouse_event(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 1, 0));
        assert_eq!(app.menus.mode(), MenuMode::Drag);
        let region = app.menus.stack()[0].region;
        handle_mouse_event(
            &mut app,
            mouse(MouseEventKind::Up(MouseButton::Left), region.x + 2, region.y + 1),
        );
        assert!(!app.menus.is_open());
        assert!(app.log.last().unwrap().contains("demo"));
    }

    #[test]
    fn f_opens_selector_and_escape_cancels() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Char('f')));
        assert!(matches!(app.modals.last(), Some(Modal::Selector { .. })));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_modal());
        assert_eq!(app.log.last().unwrap(), "Open: cancelled");
    }

    #[test]
    fn save_typed_name_returns_joined_path() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = app(tmp.path());
        handle_key_event(&mut app, key(KeyCode::Char('s')));
        for c in "out.txt".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.has_modal());
        let expected = format!("Save: {}", tmp.path().join("out.txt").display());
        assert_eq!(app.log.last().unwrap(), &expected);
    }
}
