//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout areas
pub struct MainLayout {
    pub tabs: Rect,
    pub body: Rect,
    pub status: Option<Rect>,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Calculate main screen layout: tabs, body, optional status line, help bar
pub fn calculate_main_layout(area: Rect, has_status: bool) -> MainLayout {
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(0)];
    if has_status {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (status, help) = if has_status {
        (Some(chunks[2]), chunks[3])
    } else {
        (None, chunks[2])
    };

    MainLayout {
        tabs: chunks[0],
        body: chunks[1],
        status,
        help,
    }
}
