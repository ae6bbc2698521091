//! Expense detail dialog
//!
//! Overlay shown while a snapshot has a selected item. Both screens use it;
//! visibility is decided by the snapshot's `show_detail`, never by this
//! component.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::format::{category_label, icon_glyph, truncate_to_width, Formatter};
use crate::model::expense::ExpenseWithCategory;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Default)]
pub struct ExpenseDetailDialog;

impl ExpenseDetailDialog {
    pub fn new() -> Self {
        Self
    }

    /// Draw the dialog for `item`, formatting its timestamp with `date_pattern`
    pub fn draw_with_item(
        &self,
        frame: &mut Frame,
        area: Rect,
        item: &ExpenseWithCategory,
        formatter: &Formatter,
        date_pattern: &str,
    ) -> Result<()> {
        let popup_area = centered_popup(area, 56, 16);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Expense {} ", item.id))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .split(inner);

        let width = inner.width.saturating_sub(2) as usize;
        let photo_lines = match item.photo_uri.as_deref() {
            Some(uri) => vec![
                Line::from(Span::styled("Receipt photo", Style::default().fg(Color::DarkGray))),
                Line::from(Span::styled(
                    truncate_to_width(uri, width),
                    Style::default().fg(Color::White),
                )),
            ],
            None => vec![Line::from(Span::styled(
                "no photo",
                Style::default().fg(Color::DarkGray),
            ))],
        };
        let photo = Paragraph::new(photo_lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(photo, chunks[0]);

        let label = Style::default().fg(Color::DarkGray);
        let info = vec![
            Line::from(Span::styled(
                item.product_name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Amount    ", label),
                Span::styled(
                    formatter.format_amount(item.amount),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Category  ", label),
                Span::raw(format!("{} ", icon_glyph(item.icon_name.as_deref()))),
                Span::styled(
                    category_label(item.category_name.as_deref()).to_string(),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(vec![
                Span::styled("Date      ", label),
                Span::raw(formatter.format_timestamp(item.timestamp, date_pattern)),
            ]),
        ];
        frame.render_widget(Paragraph::new(info).wrap(Wrap { trim: false }), chunks[1]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" d ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("Delete  "),
            Span::styled(" Esc/Enter ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("Close"),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(help, chunks[2]);

        Ok(())
    }
}

impl Component for ExpenseDetailDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Action::DismissDetail),
            KeyCode::Char('d') | KeyCode::Delete => Some(Action::DeleteSelected),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing needs the selected item, see draw_with_item
        Ok(())
    }
}
