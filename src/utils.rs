use anyhow::Result;
use arboard::Clipboard;
use once_cell::sync::Lazy;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const BORDERS: u16 = 2;

// Any CSI sequence; only the `m` (SGR) ones carry styling.
static CSI_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[([0-9;?]*)([A-Za-z])").unwrap());

/// Inner sizes of the list and diff panels for a given terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSizes {
    pub width: u16,
    pub height: u16,
    pub list_height: u16,
    pub diff_height: u16,
}

impl PanelSizes {
    pub fn for_terminal(width: u16, height: u16) -> Self {
        let body = height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT);
        let inner = body.saturating_sub(BORDERS);
        Self { width, height, list_height: inner, diff_height: inner }
    }
}

impl Default for PanelSizes {
    fn default() -> Self {
        Self::for_terminal(80, 24)
    }
}

pub fn calculate_max_scroll(content: &str, view_height: u16) -> u16 {
    let content_lines = content.lines().count().min(u16::MAX as usize) as u16;
    content_lines.saturating_sub(view_height)
}

/// Removes terminal escape sequences, e.g. before copying a diff.
pub fn strip_ansi(text: &str) -> String {
    CSI_REGEX.replace_all(text, "").into_owned()
}

/// Turns git's colored output into styled lines. Styles carry over line
/// breaks the way a terminal would apply them.
pub fn ansi_to_lines(text: &str, base: Style) -> Vec<Line<'static>> {
    let mut style = base;
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut spans = Vec::new();
        let mut last = 0;
        for caps in CSI_REGEX.captures_iter(raw) {
            let Some(m) = caps.get(0) else { continue };
            if m.start() > last {
                spans.push(Span::styled(raw[last..m.start()].to_owned(), style));
            }
            if &caps[2] == "m" {
                style = apply_sgr(style, base, &caps[1]);
            }
            last = m.end();
        }
        if last < raw.len() {
            spans.push(Span::styled(raw[last..].to_owned(), style));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn apply_sgr(mut style: Style, base: Style, params: &str) -> Style {
    let codes: Vec<u16> = if params.is_empty() {
        vec![0]
    } else {
        params.split(';').map(|p| p.parse().unwrap_or(0)).collect()
    };
    let mut iter = codes.into_iter();
    while let Some(code) = iter.next() {
        style = match code {
            0 => base,
            1 => style.add_modifier(Modifier::BOLD),
            2 => style.add_modifier(Modifier::DIM),
            3 => style.add_modifier(Modifier::ITALIC),
            4 => style.add_modifier(Modifier::UNDERLINED),
            7 => style.add_modifier(Modifier::REVERSED),
            22 => style.remove_modifier(Modifier::BOLD | Modifier::DIM),
            23 => style.remove_modifier(Modifier::ITALIC),
            24 => style.remove_modifier(Modifier::UNDERLINED),
            27 => style.remove_modifier(Modifier::REVERSED),
            30..=37 => style.fg(basic_color(code - 30)),
            39 => match base.fg {
                Some(fg) => style.fg(fg),
                None => style.fg(Color::Reset),
            },
            40..=47 => style.bg(basic_color(code - 40)),
            49 => match base.bg {
                Some(bg) => style.bg(bg),
                None => style.bg(Color::Reset),
            },
            90..=97 => style.fg(bright_color(code - 90)),
            100..=107 => style.bg(bright_color(code - 100)),
            38 | 48 => match extended_color(&mut iter) {
                Some(color) if code == 38 => style.fg(color),
                Some(color) => style.bg(color),
                None => style,
            },
            _ => style,
        };
    }
    style
}

fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color> {
    match iter.next()? {
        5 => Some(Color::Indexed(iter.next()?.min(255) as u8)),
        2 => {
            let r = iter.next()?.min(255) as u8;
            let g = iter.next()?.min(255) as u8;
            let b = iter.next()?.min(255) as u8;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

fn basic_color(n: u16) -> Color {
    match n {
        0 => Color::Black,
        1 => Color::Red,
        2 => Color::Green,
        3 => Color::Yellow,
        4 => Color::Blue,
        5 => Color::Magenta,
        6 => Color::Cyan,
        _ => Color::Gray,
    }
}

fn bright_color(n: u16) -> Color {
    match n {
        0 => Color::DarkGray,
        1 => Color::LightRed,
        2 => Color::LightGreen,
        3 => Color::LightYellow,
        4 => Color::LightBlue,
        5 => Color::LightMagenta,
        6 => Color::LightCyan,
        _ => Color::White,
    }
}

pub fn copy_to_clipboard(text: String) -> Result<()> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
