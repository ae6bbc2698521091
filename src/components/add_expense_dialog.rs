//! Add-expense form dialog
//!
//! Collects name, amount, category and an optional photo reference for the
//! day the form was opened on. Validation failures stay in the form.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::format::{icon_glyph, Formatter, NO_CATEGORY_LABEL};
use crate::model::expense::{Category, NewExpense};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Amount,
    Category,
    Photo,
}

impl FormField {
    const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Amount,
        FormField::Category,
        FormField::Photo,
    ];

    fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Amount => "Amount",
            FormField::Category => "Category",
            FormField::Photo => "Photo",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> FormField {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn previous(&self) -> FormField {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Add-expense form state
#[derive(Debug, Default)]
pub struct AddExpenseDialog {
    pub name: String,
    pub amount: String,
    pub photo: String,
    /// Index into `categories`; `None` means no category
    pub category: Option<usize>,
    pub categories: Vec<Category>,
    pub focus: FormField,
    pub error: Option<String>,
}

impl AddExpenseDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the form for a new entry
    pub fn open(&mut self, categories: Vec<Category>) {
        *self = Self {
            category: if categories.is_empty() { None } else { Some(0) },
            categories,
            ..Self::default()
        };
    }

    /// Show an error returned by the repository
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    fn cycle_category(&mut self, forward: bool) {
        let count = self.categories.len();
        if count == 0 {
            return;
        }
        // None sits between the last and the first category
        self.category = match (self.category, forward) {
            (None, true) => Some(0),
            (None, false) => Some(count - 1),
            (Some(i), true) if i + 1 < count => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            (Some(_), _) => None,
        };
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Amount => Some(&mut self.amount),
            FormField::Photo => Some(&mut self.photo),
            FormField::Category => None,
        }
    }

    /// Build a validated expense from the form
    pub fn build(&self) -> Result<NewExpense, String> {
        if self.amount.is_empty() {
            return Err("Amount is required".to_string());
        }
        let amount: u64 = self
            .amount
            .parse()
            .map_err(|_| "Amount is too large".to_string())?;

        NewExpense {
            product_name: self.name.clone(),
            amount,
            category_id: self
                .category
                .and_then(|i| self.categories.get(i))
                .map(|c| c.id),
            photo_uri: Some(self.photo.clone()),
        }
        .validate()
    }

    fn category_text(&self) -> String {
        match self.category.and_then(|i| self.categories.get(i)) {
            Some(category) => format!(
                "{} {}",
                icon_glyph(category.icon.as_deref()),
                category.name
            ),
            None => NO_CATEGORY_LABEL.to_string(),
        }
    }

    /// Draw the form for the day it was opened on
    pub fn draw_for_day(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        day: i64,
        formatter: &Formatter,
        header_pattern: &str,
    ) -> Result<()> {
        let popup_area = centered_popup(area, 60, 14);
        frame.render_widget(Clear, popup_area);

        let mut content = vec![
            Line::from(Span::styled(
                formatter.format_timestamp(day, header_pattern),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
        ];

        for field in FormField::ALL {
            let focused = field == self.focus;
            let value = match field {
                FormField::Name => self.name.clone(),
                FormField::Amount => self.amount.clone(),
                FormField::Category => format!("◀ {} ▶", self.category_text()),
                FormField::Photo => self.photo.clone(),
            };
            let cursor = if focused && field != FormField::Category { "_" } else { "" };
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            content.push(Line::from(vec![
                Span::styled(format!("{:>9}: ", field.label()), label_style),
                Span::styled(format!("{}{}", value, cursor), Style::default().fg(Color::White)),
            ]));
        }

        content.push(Line::from(""));
        if let Some(ref error) = self.error {
            content.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            content.push(Line::from(""));
        }
        content.push(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Save  "),
            Span::styled(" Tab ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("Next field  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("Cancel"),
        ]));

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green))
                    .title(" Add Expense ")
                    .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Left);

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

impl Component for AddExpenseDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => match self.build() {
                Ok(expense) => Some(Action::SubmitExpense(expense)),
                Err(message) => {
                    self.error = Some(message);
                    None
                }
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.previous();
                None
            }
            KeyCode::Left if self.focus == FormField::Category => {
                self.cycle_category(false);
                None
            }
            KeyCode::Right if self.focus == FormField::Category => {
                self.cycle_category(true);
                None
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
                None
            }
            KeyCode::Char(c) => {
                let digits_only = self.focus == FormField::Amount;
                if let Some(text) = self.focused_text() {
                    if !digits_only || c.is_ascii_digit() {
                        text.push(c);
                    }
                }
                self.error = None;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Drawing needs the target day, see draw_for_day
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expense::CategoryId;
    use crossterm::event::KeyModifiers;

    fn press(dialog: &mut AddExpenseDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(dialog: &mut AddExpenseDialog, text: &str) {
        for c in text.chars() {
            press(dialog, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_submit_builds_new_expense() {
        let mut dialog = AddExpenseDialog::new();
        dialog.open(Category::defaults());

        type_text(&mut dialog, "  Coffee ");
        press(&mut dialog, KeyCode::Tab);
        type_text(&mut dialog, "4a5b00");
        press(&mut dialog, KeyCode::Tab);
        press(&mut dialog, KeyCode::Right);
        press(&mut dialog, KeyCode::Tab);
        type_text(&mut dialog, "/photos/c.jpg");

        assert_eq!(dialog.amount, "4500");
        assert_eq!(
            press(&mut dialog, KeyCode::Enter),
            Some(Action::SubmitExpense(NewExpense {
                product_name: "Coffee".to_string(),
                amount: 4_500,
                category_id: Some(CategoryId(2)),
                photo_uri: Some("/photos/c.jpg".to_string()),
            }))
        );
    }

    #[test]
    fn test_invalid_form_keeps_dialog_open() {
        let mut dialog = AddExpenseDialog::new();
        dialog.open(Category::defaults());

        assert_eq!(press(&mut dialog, KeyCode::Enter), None);
        assert_eq!(dialog.error.as_deref(), Some("Amount is required"));

        press(&mut dialog, KeyCode::Down);
        type_text(&mut dialog, "100");
        assert_eq!(press(&mut dialog, KeyCode::Enter), None);
        assert_eq!(dialog.error.as_deref(), Some("Product name is required"));

        assert_eq!(press(&mut dialog, KeyCode::Esc), Some(Action::CloseModal));
    }

    #[test]
    fn test_category_cycles_through_none() {
        let mut dialog = AddExpenseDialog::new();
        dialog.open(Category::defaults()[..2].to_vec());
        dialog.focus = FormField::Category;

        press(&mut dialog, KeyCode::Right);
        assert_eq!(dialog.category, Some(1));
        press(&mut dialog, KeyCode::Right);
        assert_eq!(dialog.category, None);
        press(&mut dialog, KeyCode::Right);
        assert_eq!(dialog.category, Some(0));
        press(&mut dialog, KeyCode::Left);
        assert_eq!(dialog.category, None);
    }

    #[test]
    fn test_open_resets_previous_entry() {
        let mut dialog = AddExpenseDialog::new();
        dialog.open(Category::defaults());
        type_text(&mut dialog, "stale");
        dialog.set_error("boom");

        dialog.open(Vec::new());
        assert!(dialog.name.is_empty());
        assert!(dialog.error.is_none());
        assert_eq!(dialog.category, None);
        assert_eq!(dialog.focus, FormField::Name);
    }
}
