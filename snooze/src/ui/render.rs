//! Render orchestration for the story TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use snooze_core::Story;

use crate::app::{App, Form, View};

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_bar(frame, app, chunks[0]);
    render_story_list(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
    render_key_hints(frame, app, chunks[3]);

    if let Some(form) = app.form() {
        render_form(frame, form, area);
    }

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

/// Render the title bar
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let account = match app.session.current_user() {
        Some(user) => format!("logged in as {}", user.username),
        None => "anonymous".to_string(),
    };
    let title = format!(" Snooze | {} | {account} ", app.view.title());

    let line = Line::from(Span::styled(
        title,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the story list for the current view
fn render_story_list(frame: &mut Frame, app: &App, area: Rect) {
    let stories = app.visible_stories();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.view.title()));

    if stories.is_empty() {
        let message = match app.view {
            View::Stories => "No stories yet. Press r to refresh.",
            View::Favorites => "No favorites yet!",
            View::MyStories => "No stories posted yet!",
        };
        let paragraph = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
    }

    let show_star = app.session.is_logged_in();
    let items: Vec<ListItem> = stories
        .iter()
        .map(|story| ListItem::new(story_line(app, story, show_star)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.cursor.min(stories.len() - 1)));
    frame.render_stateful_widget(list, area, &mut state);
}

/// One story row: star, title, hostname, author, submitter.
fn story_line<'a>(app: &App, story: &'a Story, show_star: bool) -> Line<'a> {
    let mut spans = Vec::new();

    if show_star {
        let star = if app.session.is_favorite(&story.id) {
            Span::styled("★ ", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("☆ ", Style::default().fg(Color::DarkGray))
        };
        spans.push(star);
    }

    spans.push(Span::styled(
        story.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled(
        format!(" ({})", story.host_name().unwrap_or("?")),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!(" by {}", story.author),
        Style::default().fg(Color::Gray),
    ));
    spans.push(Span::styled(
        format!(" posted by {}", story.username),
        Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let message = app.status_message().unwrap_or("");
    let line = Line::from(Span::styled(
        format!(" {message}"),
        Style::default().fg(Color::LightYellow),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the key hint line
fn render_key_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints = if app.form().is_some() {
        " Tab next field | Enter submit | Esc cancel"
    } else if app.session.is_logged_in() {
        " j/k move | 1/2/3 feeds | f favorite | s submit | e edit | d delete | o logout | ? help | q quit"
    } else {
        " j/k move | r refresh | l login | n sign up | ? help | q quit"
    };

    let line = Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(line), area);
}

/// Render an open form as a centered overlay
fn render_form(frame: &mut Frame, form: &Form, area: Rect) {
    let height = form.fields.len() as u16 * 3 + 2;
    let popup_area = centered_rect_fixed(50, height, area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", form.kind.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|_| Constraint::Length(3))
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (index, field) in form.fields.iter().enumerate() {
        let focused = index == form.focused;
        let mut value = if field.masked {
            "*".repeat(field.value.chars().count())
        } else {
            field.value.clone()
        };
        if focused {
            value.push('█');
        }

        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let field_block = Block::default()
            .title(field.label)
            .borders(Borders::ALL)
            .border_style(style);
        let paragraph = Paragraph::new(value).block(field_block);
        frame.render_widget(paragraph, rows[index]);
    }
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect_fixed(52, 23, area);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            " Snooze - Help ",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Feeds:",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from("  1       All stories"),
        Line::from("  2       Favorites"),
        Line::from("  3       My stories"),
        Line::from(""),
        Line::from(Span::styled(
            "Stories:",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from("  j/k     Move selection"),
        Line::from("  r       Refresh the story list"),
        Line::from("  f       Toggle favorite on the selection"),
        Line::from("  s       Submit a new story"),
        Line::from("  e/d     Edit/delete (My Stories view)"),
        Line::from(""),
        Line::from(Span::styled(
            "Account:",
            Style::default().add_modifier(Modifier::UNDERLINED),
        )),
        Line::from("  l/n/o   Log in / sign up / log out"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default().title(" Help ").borders(Borders::ALL);
    let paragraph = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, popup_area);
}

/// A fixed-size rect centered in the given area, clamped to fit.
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
