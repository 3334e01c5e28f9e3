//! The fixed colour palette used by every widget.

use ratatui::style::{Color, Modifier, Style};

/// All runtime colors used in the UI (Catppuccin Mocha).
#[derive(Debug, Clone)]
pub struct Theme {
    pub fg: Color,
    pub dim_fg: Color,
    pub accent_fg: Color,
    pub panel_bg: Color,
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // File list
    pub header_bg: Color,
    pub header_fg: Color,
    pub row_focus_bg: Color,
    pub dir_fg: Color,
    pub grip_fg: Color,

    // Breadcrumb
    pub path_valid_fg: Color,
    pub path_invalid_fg: Color,
    pub path_current_bg: Color,

    // Buttons and inputs
    pub button_bg: Color,
    pub button_fg: Color,
    pub button_focus_bg: Color,
    pub input_bg: Color,

    // Menus
    pub menu_bg: Color,
    pub menu_fg: Color,
    pub menu_focus_bg: Color,
    pub menu_hover_bg: Color,
    pub menu_disabled_fg: Color,
    pub menu_bar_bg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::Rgb(205, 214, 244),            // #cdd6f4 (text)
            dim_fg: Color::Rgb(108, 112, 134),        // #6c7086 (overlay0)
            accent_fg: Color::Rgb(137, 220, 235),     // #89dceb (sky)
            panel_bg: Color::Rgb(30, 30, 46),         // #1e1e2e (base)
            border_fg: Color::Rgb(88, 91, 112),       // #585b70 (surface2)
            border_focused_fg: Color::Rgb(137, 180, 250), // #89b4fa (blue)

            header_bg: Color::Rgb(49, 50, 68), // #313244 (surface0)
            header_fg: Color::Rgb(186, 194, 222),
            row_focus_bg: Color::Rgb(69, 71, 90), // #45475a (surface1)
            dir_fg: Color::Rgb(137, 180, 250),
            grip_fg: Color::Rgb(108, 112, 134),

            path_valid_fg: Color::Rgb(166, 227, 161),  // #a6e3a1 (green)
            path_invalid_fg: Color::Rgb(243, 139, 168), // #f38ba8 (red)
            path_current_bg: Color::Rgb(69, 71, 90),

            button_bg: Color::Rgb(49, 50, 68),
            button_fg: Color::Rgb(205, 214, 244),
            button_focus_bg: Color::Rgb(137, 180, 250),
            input_bg: Color::Rgb(24, 24, 37), // #181825 (mantle)

            menu_bg: Color::Rgb(49, 50, 68),
            menu_fg: Color::Rgb(205, 214, 244),
            menu_focus_bg: Color::Rgb(137, 180, 250),
            menu_hover_bg: Color::Rgb(69, 71, 90),
            menu_disabled_fg: Color::Rgb(108, 112, 134),
            menu_bar_bg: Color::Rgb(24, 24, 37),

            status_bg: Color::Rgb(49, 50, 68),
            status_fg: Color::Rgb(205, 214, 244),

            error_fg: Color::Rgb(243, 139, 168),
            warning_fg: Color::Rgb(249, 226, 175),
            success_fg: Color::Rgb(166, 227, 161),
        }
    }
}

impl Theme {
    /// Style of a push button.
    pub fn button(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .bg(self.button_focus_bg)
                .fg(self.panel_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(self.button_bg).fg(self.button_fg)
        }
    }

    /// Border style for a panel that may hold the focus.
    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused_fg
        } else {
            self.border_fg
        })
    }
}
