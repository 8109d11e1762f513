use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Tabs, Wrap},
    symbols,
};
use crate::app::App;
use crate::git::GatewayFailure;
use crate::models::{FocusArea, ListEntry, Modal, Mode};
use crate::theme::Theme;
use crate::utils::ansi_to_lines;

/// Draws the whole screen for the current state.
pub fn render(f: &mut Frame, app: &App, theme: &Theme) {
    if let Some(failure) = &app.bootstrap_error {
        render_bootstrap_error(f, failure, theme);
        return;
    }

    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.area());

    render_header(f, app, theme, vertical_chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(vertical_chunks[1]);

    match app.mode {
        Mode::Explore => render_stash_list(f, app, theme, columns[0]),
        Mode::Build => render_file_list(f, app, theme, columns[0]),
    }
    render_diff_panel(f, app, theme, columns[1]);
    render_footer(f, app, theme, vertical_chunks[2]);

    match app.modal {
        Modal::None => {}
        Modal::DeleteConfirm => {
            let target = app.pending_target().unwrap_or("this stash");
            render_confirm(f, theme, "Drop stash", &format!("Drop {target}? This cannot be undone."), true);
        }
        Modal::ApplyConfirm => {
            let target = app.pending_target().unwrap_or("this stash");
            render_confirm(f, theme, "Apply stash", &format!("Apply {target} onto the working tree?"), false);
        }
        Modal::RestoreConfirm => render_confirm(
            f,
            theme,
            "Restore working tree",
            "Discard every tracked change and delete all untracked files?",
            true,
        ),
        Modal::StashMessage => render_message_input(f, app, theme),
    }
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut title = vec![Span::styled(" stashpeek ", theme.popup_title)];
    if app.loading {
        title.push(Span::styled("loading… ", theme.loading));
    }
    let tabs = Tabs::new(["Explore [Tab]", "Build [Tab]"])
        .block(Block::default().borders(Borders::ALL).title(Line::from(title)))
        .style(Style::default().fg(theme.text))
        .highlight_style(theme.tab_highlight)
        .select(app.mode.as_index())
        .divider(symbols::DOT)
        .padding(" ", " ");
    f.render_widget(tabs, area);
}

fn render_stash_list(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(format!("Stashes ({})", app.stashes.len()))
        .borders(Borders::ALL)
        .border_style(theme.border(app.focus == FocusArea::List));

    if app.stashes.is_empty() {
        let text = if app.loading { "Loading stashes…" } else { "No stashes found." };
        let placeholder = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_secondary));
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app.stashes.iter().map(|stash| {
        ListItem::new(vec![
            Line::from(Span::styled(stash.title(), theme.stash_title)),
            Line::from(Span::styled(stash.subtitle(), theme.stash_meta)),
        ])
    }).collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol("→ ")
        .highlight_style(Style::default().fg(theme.selection_fg).add_modifier(Modifier::BOLD));
    let mut state = ListState::default();
    state.select(app.selected_stash);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_file_list(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let block = Block::default()
        .title(format!("Working tree ({} selected)", app.selected.len()))
        .borders(Borders::ALL)
        .border_style(theme.border(app.focus == FocusArea::List));

    if app.files.is_empty() {
        let text = if app.loading { "Scanning working tree…" } else { "Working tree clean." };
        let placeholder = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.text_secondary));
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app.files.iter().map(|file| {
        let marked = app.is_selected(&file.path);
        let star = if marked { "*" } else { " " };
        let path_style = if marked { theme.file_marked } else { theme.file_path };
        let status_style = if file.staged { theme.file_status_staged } else { theme.file_status_unstaged };
        ListItem::new(Line::from(vec![
            Span::styled(format!("{star} "), theme.file_marked),
            Span::styled(file.title(), path_style),
            Span::raw("  "),
            Span::styled(file.subtitle(), status_style),
        ]))
    }).collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol("→")
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(app.selected_file);
    f.render_stateful_widget(list, area, &mut state);
}

fn render_diff_panel(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let title = match app.mode {
        Mode::Explore if app.stash_diff_title.is_empty() => "Diff".to_string(),
        Mode::Explore => format!("Diff {}", app.stash_diff_title),
        Mode::Build => format!("Selection ({} files)", app.selected.len()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.border(app.focus == FocusArea::Diff));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = app.panel_text();
    if text.is_empty() {
        let hint = match app.mode {
            Mode::Explore => "Press Enter to show the highlighted stash.",
            Mode::Build => "Press Enter or Space to select files for a new stash.",
        };
        f.render_widget(Paragraph::new(hint).style(Style::default().fg(theme.text_secondary)), inner);
        return;
    }

    let detail_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let para = Paragraph::new(ansi_to_lines(&text, Style::default().fg(theme.text)))
        .scroll((app.diff_scroll, 0));
    f.render_widget(para, detail_chunks[0]);

    let mut ds = ScrollbarState::default()
        .position(app.diff_scroll as usize)
        .content_length(text.lines().count());
    f.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        detail_chunks[1],
        &mut ds,
    );
}

fn key_hints(app: &App) -> &'static str {
    match app.mode {
        Mode::Explore => "Tab Build | ↑/↓ Navigate | ←/→ Focus | Enter Show | a Apply | d Drop | c Copy | q Quit",
        Mode::Build => "Tab Explore | ↑/↓ Navigate | Enter Select | Space Expand | s Stash | r Restore | c Copy | q Quit",
    }
}

fn render_footer(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let status = match &app.last_error {
        Some(err) => Span::styled(format!(" {} ", err.operation), theme.error),
        None => Span::styled(format!(" {} ", app.status), theme.status),
    };
    let footer = Paragraph::new(key_hints(app))
        .block(Block::default().borders(Borders::ALL).title(Line::from(status)))
        .style(theme.footer);
    f.render_widget(footer, area);
}

fn render_confirm(f: &mut Frame, theme: &Theme, title: &str, question: &str, destructive: bool) {
    let popup_area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, popup_area);
    let question_style = if destructive { theme.danger } else { theme.popup_text };
    let lines = vec![
        Line::from(Span::styled(question.to_string(), question_style)),
        Line::from(""),
        Line::from("[y] yes    [n] no"),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default()
            .title(Span::styled(title.to_string(), theme.popup_title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border)))
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);
    f.render_widget(para, popup_area);
}

fn render_message_input(f: &mut Frame, app: &App, theme: &Theme) {
    let popup_area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, popup_area);
    let lines = vec![
        Line::from(vec![
            Span::styled(app.message_input.clone(), theme.popup_text),
            Span::styled("█", Style::default().fg(theme.selection_fg)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Enter stashes {} file(s) · Esc cancels", app.selected.len()),
            theme.footer,
        )),
    ];
    let para = Paragraph::new(lines)
        .block(Block::default()
            .title(Span::styled("Stash message", theme.popup_title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.modal_border)))
        .wrap(Wrap { trim: false });
    f.render_widget(para, popup_area);
}

fn render_bootstrap_error(f: &mut Frame, failure: &GatewayFailure, theme: &Theme) {
    let area = f.area();
    f.render_widget(Clear, area);
    let mut lines = vec![
        Line::from(Span::styled(format!("Could not read stashes: {} failed", failure.operation), theme.error)),
        Line::from(""),
    ];
    lines.extend(failure.output.lines().map(|l| Line::from(l.to_string())));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press q to quit.", theme.footer)));
    let para = Paragraph::new(lines)
        .block(Block::default().title("stashpeek").borders(Borders::ALL).border_style(theme.error))
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage((100-percent_y)/2), Constraint::Percentage(percent_y), Constraint::Percentage((100-percent_y)/2)]).split(r)[1];
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage((100-percent_x)/2), Constraint::Percentage(percent_x), Constraint::Percentage((100-percent_x)/2)]).split(vertical)[1]
}
