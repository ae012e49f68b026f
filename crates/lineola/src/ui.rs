use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Mode};

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(0),    // Editor area
            Constraint::Length(2), // Status bar
        ])
        .split(f.size());

    draw_title_bar(f, app, chunks[0]);
    draw_editor(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let title = match app.buffer.path() {
        Some(path) => format!("  Lineola -- {}", path.display()),
        None => String::from("  Lineola -- [New File]"),
    };

    let modified_str = if app.is_modified() { " [Modified]" } else { "" };
    let title = format!("{}{}", title, modified_str);

    let title_bar = Paragraph::new(title)
        .style(Style::default().bg(Color::Blue).fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(title_bar, area);
}

fn draw_editor(f: &mut Frame, app: &mut App, area: Rect) {
    let editor_area = if app.config.editor.line_numbers {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(6), // Line numbers
                Constraint::Min(0),    // Editor content
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(0), Constraint::Min(0)])
            .split(area)
    };

    // Update viewport height before asking for the visible slice
    app.set_viewport_height(area.height as usize);

    let lines = app.visible_lines();
    let (cursor_line, cursor_col) = app.cursor_position();
    let viewport_offset = app.viewport_offset();

    if app.config.editor.line_numbers {
        draw_line_numbers(f, viewport_offset, lines.len(), editor_area[0]);
    }

    let mut text_lines = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if app.config.editor.highlight_current_line && viewport_offset + i == cursor_line {
            text_lines.push(Line::from(vec![Span::styled(
                line.as_str(),
                Style::default().bg(Color::DarkGray),
            )]));
        } else {
            text_lines.push(Line::from(line.as_str()));
        }
    }

    let editor_content = Paragraph::new(text_lines)
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::NONE));

    f.render_widget(editor_content, editor_area[1]);

    // Place the terminal cursor in edit mode
    if matches!(app.mode(), Mode::Edit) && cursor_line >= viewport_offset {
        let screen_line = cursor_line - viewport_offset;
        let x = editor_area[1].x + cursor_col as u16;
        let y = editor_area[1].y + screen_line as u16;
        if x < editor_area[1].x + editor_area[1].width && y < editor_area[1].y + editor_area[1].height
        {
            f.set_cursor(x, y);
        }
    }
}

fn draw_line_numbers(f: &mut Frame, start_line: usize, count: usize, area: Rect) {
    let mut line_numbers = Vec::new();
    for i in 0..count {
        line_numbers.push(Line::from(format!("{:>4} ", start_line + i + 1)));
    }

    let line_number_widget = Paragraph::new(line_numbers)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::RIGHT));

    f.render_widget(line_number_widget, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Command input or shortcuts
            Constraint::Length(1), // Status message
        ])
        .split(area);

    match app.command_text() {
        Some(command) => {
            let input = Paragraph::new(format!(":{}", command))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(input, chunks[0]);
        }
        None => {
            let shortcuts = vec![
                Span::styled(
                    "^P",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" Command  "),
                Span::styled(
                    "^S",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" Save  "),
                Span::styled(
                    "^C",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" Quit  "),
                Span::styled(
                    "Arrows",
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" Move"),
            ];

            let shortcut_bar =
                Paragraph::new(Line::from(shortcuts)).style(Style::default().bg(Color::DarkGray));
            f.render_widget(shortcut_bar, chunks[0]);
        }
    }

    let (cursor_line, cursor_col) = app.cursor_position();
    let status = Line::from(vec![
        Span::styled(
            app.ui_state.get_status_message().to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{}:{}", cursor_line + 1, cursor_col + 1),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(status), chunks[1]);
}
