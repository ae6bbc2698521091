//! Gallery component - receipt photo grid
//!
//! Renders a `GalleryUiState` snapshot in one of three branches: loading,
//! empty, or header card plus a two-column card grid. The component itself
//! only owns the grid cursor.

use crate::action::Action;
use crate::component::Component;
use crate::components::format::{category_label, icon_glyph, truncate_to_width, Formatter};
use crate::model::expense::ExpenseWithCategory;
use crate::model::gallery::GalleryUiState;
use crate::model::ui::Screen;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Cards per grid row
pub const GRID_COLUMNS: usize = 2;

/// Card height including borders
const CARD_HEIGHT: u16 = 6;

/// Cursor over the gallery grid
#[derive(Debug, Default)]
pub struct GalleryComponent {
    /// Index of the focused card
    pub cursor: usize,
    /// Number of cards in the current snapshot
    len: usize,
    /// First visible grid row
    scroll_row: usize,
}

impl GalleryComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the item count of the latest snapshot, clamping the cursor
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.len == 0 {
            return;
        }
        let target = self.cursor as isize + delta;
        if (0..self.len as isize).contains(&target) {
            self.cursor = target as usize;
        }
    }

    /// Keep the cursor row inside the visible window
    fn scroll_into_view(&mut self, visible_rows: usize) {
        let row = self.cursor / GRID_COLUMNS;
        let visible_rows = visible_rows.max(1);
        if row < self.scroll_row {
            self.scroll_row = row;
        } else if row >= self.scroll_row + visible_rows {
            self.scroll_row = row + 1 - visible_rows;
        }
    }
}

impl Component for GalleryComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('l') | KeyCode::Right => {
                self.move_by(1);
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.move_by(-1);
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_by(GRID_COLUMNS as isize);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_by(-(GRID_COLUMNS as isize));
                None
            }
            KeyCode::Enter if self.len > 0 => Some(Action::SelectItem(self.cursor)),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('a') => Some(Action::AddExpense),
            KeyCode::Tab | KeyCode::BackTab => Some(Action::NextScreen),
            KeyCode::Char('1') => Some(Action::SwitchScreen(Screen::Daily)),
            KeyCode::Char('2') => Some(Action::SwitchScreen(Screen::Gallery)),
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing is done through draw_gallery_screen which takes the snapshot
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Draw the gallery screen for one snapshot
pub fn draw_gallery_screen(
    frame: &mut Frame,
    area: Rect,
    state: &GalleryUiState,
    gallery: &mut GalleryComponent,
    formatter: &Formatter,
) {
    gallery.set_len(state.items().len());

    let area = match state.error() {
        Some(error) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(0)])
                .split(area);
            render_error_banner(frame, chunks[0], error);
            chunks[1]
        }
        None => area,
    };

    if state.is_loading() {
        render_loading(frame, area);
    } else if state.items().is_empty() {
        render_empty_state(frame, area);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);
        render_header_card(frame, chunks[0], state, formatter);
        render_grid(frame, chunks[1], state.items(), gallery, formatter);
    }
}

/// One-line error banner with the retry hint
pub fn render_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let line = Line::from(vec![
        Span::styled(
            format!(" Failed to load: {} ", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" r ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw("Retry"),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Loading receipts...",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn render_empty_state(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No receipts yet",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Add an expense with a photo to see it here.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(vec![
            Span::styled(" a ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Add expense"),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn render_header_card(
    frame: &mut Frame,
    area: Rect,
    state: &GalleryUiState,
    formatter: &Formatter,
) {
    let lines = vec![
        Line::from(Span::styled(
            "Receipt Gallery",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(format!("{} photos", state.items().len()), Style::default().fg(Color::White)),
            Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                formatter.format_amount(state.total()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn render_grid(
    frame: &mut Frame,
    area: Rect,
    items: &[ExpenseWithCategory],
    gallery: &mut GalleryComponent,
    formatter: &Formatter,
) {
    let visible_rows = (area.height / CARD_HEIGHT) as usize;
    gallery.scroll_into_view(visible_rows);

    let column_width = area.width / GRID_COLUMNS as u16;
    let first = gallery.scroll_row * GRID_COLUMNS;
    let last = (first + visible_rows.max(1) * GRID_COLUMNS).min(items.len());

    for (index, item) in items.iter().enumerate().take(last).skip(first) {
        let row = ((index - first) / GRID_COLUMNS) as u16;
        let column = (index % GRID_COLUMNS) as u16;
        let card = Rect::new(
            area.x + column * column_width,
            area.y + row * CARD_HEIGHT,
            column_width,
            CARD_HEIGHT.min(area.height.saturating_sub(row * CARD_HEIGHT)),
        );
        render_card(frame, card, item, index == gallery.cursor, formatter);
    }
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    item: &ExpenseWithCategory,
    focused: bool,
    formatter: &Formatter,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let photo = item.photo_uri.as_deref().unwrap_or("no photo");

    let lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&item.product_name, inner_width),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            formatter.format_amount(item.amount),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(vec![
            Span::raw(format!("{} ", icon_glyph(item.icon_name.as_deref()))),
            Span::styled(
                category_label(item.category_name.as_deref()).to_string(),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(Span::styled(
            truncate_to_width(photo, inner_width),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let border = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).border_style(border));
    frame.render_widget(paragraph, area);
}
