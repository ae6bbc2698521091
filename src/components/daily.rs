//! Daily component - expenses of one calendar day
//!
//! Summary card (day, count, total) above a list of the day's expenses.
//! Owns only the list cursor; the day itself lives in the snapshot.

use crate::action::Action;
use crate::component::Component;
use crate::components::format::{category_label, icon_glyph, truncate_to_width, Formatter};
use crate::components::gallery::render_error_banner;
use crate::model::daily::DailyUiState;
use crate::model::ui::Screen;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Width reserved for the product name column
const NAME_WIDTH: usize = 20;

/// List cursor over the displayed day
#[derive(Debug, Default)]
pub struct DailyComponent {
    pub list_state: ListState,
    len: usize,
}

impl DailyComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the item count of the latest snapshot, clamping the cursor
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        let selected = match (len, self.list_state.selected()) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(i)) => Some(i.min(len - 1)),
        };
        self.list_state.select(selected);
    }

    /// Move the cursor back to the top, used when the day changes
    pub fn reset(&mut self) {
        self.list_state.select(if self.len == 0 { None } else { Some(0) });
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    fn next(&mut self) {
        if let Some(i) = self.list_state.selected() {
            if i + 1 < self.len {
                self.list_state.select(Some(i + 1));
            }
        }
    }

    fn previous(&mut self) {
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i.saturating_sub(1)));
        }
    }
}

impl Component for DailyComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.next();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.previous();
                None
            }
            KeyCode::Enter => self.selected().map(Action::SelectItem),
            KeyCode::Char('d') | KeyCode::Delete => self.selected().map(Action::DeleteItem),
            KeyCode::Char('a') => Some(Action::AddExpense),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::NextDay),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::PrevDay),
            KeyCode::Char('t') => Some(Action::Today),
            KeyCode::Char('r') => Some(Action::Refresh),
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
        // Drawing is done through draw_daily_screen which takes the snapshot
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Draw the daily screen for one snapshot
pub fn draw_daily_screen(
    frame: &mut Frame,
    area: Rect,
    state: &DailyUiState,
    daily: &mut DailyComponent,
    formatter: &Formatter,
    header_pattern: &str,
    time_pattern: &str,
) {
    daily.set_len(state.items().len());

    let mut constraints = vec![Constraint::Length(4), Constraint::Min(0)];
    if state.error().is_some() {
        constraints.insert(0, Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (summary_area, body_area) = match state.error() {
        Some(error) => {
            render_error_banner(frame, chunks[0], error);
            (chunks[1], chunks[2])
        }
        None => (chunks[0], chunks[1]),
    };

    render_summary(frame, summary_area, state, formatter, header_pattern);

    if state.is_loading() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Loading expenses...",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(paragraph, body_area);
    } else if state.items().is_empty() {
        render_empty_day(frame, body_area);
    } else {
        render_list(frame, body_area, state, daily, formatter, time_pattern);
    }
}

fn render_summary(
    frame: &mut Frame,
    area: Rect,
    state: &DailyUiState,
    formatter: &Formatter,
    header_pattern: &str,
) {
    let lines = vec![
        Line::from(vec![
            Span::styled(" ◀ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                formatter.format_timestamp(state.day(), header_pattern),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶ ", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(vec![
            Span::styled(format!(" {} expenses", state.items().len()), Style::default().fg(Color::White)),
            Span::styled("  ·  total ", Style::default().fg(Color::DarkGray)),
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

fn render_empty_day(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No expenses on this day",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled(" a ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" to add one"),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    state: &DailyUiState,
    daily: &mut DailyComponent,
    formatter: &Formatter,
    time_pattern: &str,
) {
    let items: Vec<ListItem> = state
        .items()
        .iter()
        .map(|item| {
            let name = truncate_to_width(&item.product_name, NAME_WIDTH);
            let padding = NAME_WIDTH.saturating_sub(name.width());
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", icon_glyph(item.icon_name.as_deref()))),
                Span::styled(
                    format!("{}{} ", name, " ".repeat(padding)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:<12}", category_label(item.category_name.as_deref())),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{} ", formatter.format_timestamp(item.timestamp, time_pattern)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    formatter.format_amount(item.amount),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Expenses ")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut daily.list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::format::Locale;
    use crate::model::daily::{reduce, DailyEvent};
    use crate::model::expense::{CategoryId, ExpenseId, ExpenseWithCategory};
    use chrono_tz::Asia::Seoul;
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    // 2024-03-05 12:00 in Seoul
    const NOON: i64 = 1_709_607_600_000;
    const HOUR: i64 = 3_600_000;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn item(id: u64, name: &str, amount: u64, timestamp: i64) -> ExpenseWithCategory {
        ExpenseWithCategory {
            id: ExpenseId(id),
            product_name: name.to_string(),
            amount,
            category_id: Some(CategoryId(2)),
            timestamp,
            photo_uri: None,
            category_name: Some("Transit".to_string()),
            icon_name: Some("directions_car".to_string()),
        }
    }

    fn render(state: &DailyUiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let formatter = Formatter::new(Seoul, Locale::English, " KRW");
        let mut daily = DailyComponent::new();
        terminal
            .draw(|frame| {
                draw_daily_screen(
                    frame,
                    frame.area(),
                    state,
                    &mut daily,
                    &formatter,
                    "yyyy-MM-dd (E)",
                    "HH:mm",
                )
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_keys() {
        let mut daily = DailyComponent::new();
        assert_eq!(daily.handle_key_event(key(KeyCode::Enter)).unwrap(), None);
        assert_eq!(
            daily.handle_key_event(key(KeyCode::Char('a'))).unwrap(),
            Some(Action::AddExpense)
        );
        assert_eq!(
            daily.handle_key_event(key(KeyCode::Left)).unwrap(),
            Some(Action::PrevDay)
        );

        daily.set_len(3);
        daily.handle_key_event(key(KeyCode::Down)).unwrap();
        daily.handle_key_event(key(KeyCode::Down)).unwrap();
        daily.handle_key_event(key(KeyCode::Down)).unwrap();
        assert_eq!(
            daily.handle_key_event(key(KeyCode::Enter)).unwrap(),
            Some(Action::SelectItem(2))
        );
        assert_eq!(
            daily.handle_key_event(key(KeyCode::Char('d'))).unwrap(),
            Some(Action::DeleteItem(2))
        );

        daily.set_len(1);
        assert_eq!(daily.selected(), Some(0));
        daily.set_len(0);
        assert_eq!(daily.selected(), None);
    }

    #[test]
    fn test_render_day_with_total() {
        let state = reduce(
            &DailyUiState::new(NOON),
            DailyEvent::DataArrived(vec![
                item(1, "Bus", 1_500, NOON - HOUR),
                item(2, "Taxi", 12_000, NOON + HOUR),
                item(3, "Yesterday", 9_999, NOON - 24 * HOUR),
            ]),
            &Seoul,
        );
        let screen = render(&state);
        assert!(screen.contains("2024-03-05 (Tue)"));
        assert!(screen.contains("2 expenses"));
        assert!(screen.contains("13,500 KRW"));
        assert!(screen.contains("Taxi"));
        assert!(screen.contains("13:00"));
        assert!(screen.contains("Transit"));
        assert!(!screen.contains("Yesterday"));
    }

    #[test]
    fn test_render_loading_and_empty_day() {
        let loading = DailyUiState::new(NOON);
        let screen = render(&loading);
        assert!(screen.contains("Loading expenses..."));

        let empty = reduce(&loading, DailyEvent::DataArrived(vec![]), &Seoul);
        let screen = render(&empty);
        assert!(screen.contains("No expenses on this day"));
        assert!(screen.contains("to add one"));
        assert!(!screen.contains("Loading"));
    }
}
