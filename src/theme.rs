use ratatui::style::{Color, Modifier, Style};

/// Colors and styles used by the renderer. Built once at startup and handed
/// to every draw call.
pub struct Theme {
    pub focus_border: Color,
    pub blurred_border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub selection_fg: Color,
    pub modal_border: Color,

    // Specific components
    pub stash_title: Style,
    pub stash_meta: Style,
    pub file_path: Style,
    pub file_marked: Style,
    pub file_status_staged: Style,
    pub file_status_unstaged: Style,
    pub tab_highlight: Style,
    pub loading: Style,
    pub error: Style,
    pub footer: Style,
    pub status: Style,
    pub popup_title: Style,
    pub popup_text: Style,
    pub danger: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            focus_border: Color::Cyan,
            blurred_border: Color::DarkGray,
            text: Color::White,
            text_secondary: Color::Gray,
            selection_fg: Color::Yellow,
            modal_border: Color::Magenta,

            stash_title: Style::default().fg(Color::White),
            stash_meta: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            file_path: Style::default().fg(Color::White),
            file_marked: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            file_status_staged: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            file_status_unstaged: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            tab_highlight: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            loading: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            status: Style::default().fg(Color::Gray),
            popup_title: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            popup_text: Style::default().fg(Color::White),
            danger: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }
}

impl Theme {
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.focus_border).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.blurred_border)
        }
    }
}
