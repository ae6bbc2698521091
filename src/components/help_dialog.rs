//! Help dialog component
//!
//! Displays all keyboard shortcuts available in the application.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Debug, Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl HelpDialog {
    /// Start from the top each time the dialog opens
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
    }
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Clear the area
        frame.render_widget(Clear, area);

        let dialog_area = centered_popup(area, 64, area.height.saturating_sub(4));

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        // Render scrollbar if content exceeds visible area
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

/// Build the help content with all keyboard shortcuts
fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Helper to add a section header
    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    // Helper to add a shortcut line
    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:16}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Screens");
    add_shortcut(&mut lines, "Tab", "Switch between Daily and Gallery");
    add_shortcut(&mut lines, "1 / 2", "Go to Daily / Gallery");
    add_shortcut(&mut lines, "r", "Reload (retries after an error)");
    add_shortcut(&mut lines, "a", "Add an expense");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");
    add_shortcut(&mut lines, "Ctrl+c", "Quit immediately");

    add_section(&mut lines, "Daily");
    add_shortcut(&mut lines, "j / ↓", "Next expense");
    add_shortcut(&mut lines, "k / ↑", "Previous expense");
    add_shortcut(&mut lines, "h / ←", "Previous day");
    add_shortcut(&mut lines, "l / →", "Next day");
    add_shortcut(&mut lines, "t", "Back to today");
    add_shortcut(&mut lines, "Enter", "Open expense detail");
    add_shortcut(&mut lines, "d", "Delete expense");

    add_section(&mut lines, "Gallery");
    add_shortcut(&mut lines, "h j k l", "Move between receipt cards");
    add_shortcut(&mut lines, "Enter", "Open receipt detail");

    add_section(&mut lines, "Detail");
    add_shortcut(&mut lines, "d", "Delete this expense");
    add_shortcut(&mut lines, "Esc / Enter", "Close");

    add_section(&mut lines, "Add Expense");
    add_shortcut(&mut lines, "Tab / ↓", "Next field");
    add_shortcut(&mut lines, "Shift+Tab / ↑", "Previous field");
    add_shortcut(&mut lines, "← / →", "Change category");
    add_shortcut(&mut lines, "Enter", "Save");
    add_shortcut(&mut lines, "Esc", "Cancel");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}
