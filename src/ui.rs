//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a feed list on the left, the selected photo's details on
//!   the right, and a one-line status bar at the bottom.
//! * The list block's bottom title doubles as the loading indicator and the
//!   end-of-feed marker.
//! * Drawing records how many rows the list had so the scroll sensor in
//!   [`App::near_bottom`] can tell whether the whole feed is on screen.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::source::Photo;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [list_area, detail_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(main_area);

    draw_feed_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area);
}

/// Render the scrollable photo list.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    app.viewport_rows = area.height.saturating_sub(2) as usize;

    // Borrow through `feed` so `list_state` can still be borrowed mutably.
    let list_items: Vec<ListItem> = app.feed.items().iter().map(list_row).collect();

    let footer = if app.feed.in_flight() {
        Line::styled(" Loading… ", Style::default().fg(Color::Yellow))
    } else if app.feed.is_exhausted() {
        Line::styled(" End of feed ", Style::default().fg(Color::DarkGray))
    } else if app.feed.last_error().is_some() {
        Line::styled(" r: retry ", Style::default().fg(Color::Red))
    } else {
        Line::raw("")
    };

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Spacefeed ")
                .title_bottom(footer)
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn list_row(photo: &Photo) -> ListItem<'_> {
    let mut spans = vec![
        Span::styled(format!("{:<11}", photo.date), Style::default().fg(Color::DarkGray)),
        Span::styled(&photo.title, Style::default().fg(Color::White)),
    ];
    if photo.is_video() {
        spans.push(Span::styled("  [video]", Style::default().fg(Color::Magenta)));
    }
    if let Some(likes) = photo.likes {
        spans.push(Span::styled(format!("  ♥ {likes}"), Style::default().fg(Color::Red)));
    }
    ListItem::new(Line::from(spans))
}

/// Render details for the selected photo.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);

    let Some(photo) = app.selected_item() else {
        let hint = Paragraph::new("Select a photo with ↑/↓").block(block);
        frame.render_widget(hint, area);
        return;
    };

    let mut lines = vec![
        Line::styled(photo.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Line::styled(photo.date.as_str(), Style::default().fg(Color::DarkGray)),
    ];
    if let Some(copyright) = &photo.copyright {
        lines.push(Line::styled(
            format!("© {}", copyright.trim()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        photo.hdurl.as_deref().unwrap_or(photo.url.as_str()),
        Style::default().fg(Color::Cyan),
    ));
    lines.push(Line::raw(""));
    lines.push(Line::raw(photo.explanation.as_str()));

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} photos", app.items().len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  Home/End: jump  r: load more"),
    ]));
    frame.render_widget(status, area);
}
