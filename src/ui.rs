use ratatui::{
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, HostLayout, Modal, BUTTON_WIDGET, LOG_WIDGET};
use crate::components::dialog::DialogWidget;
use crate::components::menu::{MenuBarWidget, MenuOverlay};
use crate::components::selector::SelectorWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::focus::Focus;

/// Render the host, then its modals bottom to top, then any open menus.
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let layout = app.layout();
    let theme = &app.theme;

    frame.render_widget(MenuBarWidget::new(&app.bar, theme, app.focus), layout.bar);

    let button_focused = app.focus == Focus::Widget(BUTTON_WIDGET);
    frame.render_widget(
        Paragraph::new(HostLayout::button_label()).style(theme.button(button_focused)),
        layout.button,
    );

    let log_focused = app.focus == Focus::Widget(LOG_WIDGET);
    let block = Block::default()
        .title(" Log ")
        .borders(Borders::ALL)
        .border_style(theme.border(log_focused))
        .style(Style::default().bg(theme.panel_bg).fg(theme.fg));
    let inner = block.inner(layout.log);
    let end = app.log.len().saturating_sub(app.log_scroll);
    let start = end.saturating_sub(usize::from(inner.height));
    let lines: Vec<Line> = app.log[start..end].iter().map(|l| Line::from(l.as_str())).collect();
    frame.render_widget(Paragraph::new(lines).block(block), layout.log);

    frame.render_widget(
        StatusBarWidget::new(&app.status, theme).error(app.status_is_error),
        layout.status,
    );

    for modal in &app.modals {
        match modal {
            Modal::Selector { selector, .. } => {
                frame.render_widget(SelectorWidget::new(selector, theme), area)
            }
            Modal::Confirm { dialog, .. } => frame.render_widget(DialogWidget::new(dialog, theme), area),
        }
    }

    if app.menus.is_open() {
        frame.render_widget(MenuOverlay::new(&app.menus, theme), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SelectorPurpose;
    use crate::components::buffer_to_string;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, layout::Rect, Terminal};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    fn app(tmp: &TempDir) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut config = AppConfig::default();
        config.watcher.enabled = Some(false);
        App::new(config, tmp.path(), Rect::new(0, 0, 100, 30), tx)
    }

    #[test]
    fn host_shows_bar_button_and_log() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        app.log_line("first entry");
        let content = draw(&app);
        assert!(content.contains("App"));
        assert!(content.contains("Actions ▾"));
        assert!(content.contains(" Log "));
        assert!(content.contains("first entry"));
    }

    #[test]
    fn scrolled_log_hides_newest_lines() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        for i in 0..60 {
            app.log_line(format!("entry-{i:02}"));
        }
        assert!(draw(&app).contains("entry-59"));
        app.scroll_log(10);
        let content = draw(&app);
        assert!(!content.contains("entry-59"));
        assert!(content.contains("entry-49"));
    }

    #[test]
    fn modals_and_menus_draw_on_top() {
        let tmp = TempDir::new().unwrap();
        let mut app = app(&tmp);
        app.open_selector(SelectorPurpose::Open);
        app.confirm_quit();
        let content = draw(&app);
        assert!(content.contains("Open file"));
        assert!(content.contains("Do you really want to quit?"));

        app.press_button(true);
        assert!(draw(&app).contains("Log via callback"));
    }
}
