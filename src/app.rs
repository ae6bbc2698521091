//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that routes keys to the active modal, detail overlay or screen, and turns
//! Actions into controller intents. Screen state lives in the controllers'
//! snapshots; App never edits a snapshot directly.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, draw_daily_screen, draw_gallery_screen, AddExpenseDialog,
    DailyComponent, ExpenseDetailDialog, Formatter, GalleryComponent, HelpDialog, QuitDialog,
};
use crate::config::Config;
use crate::controller::{DailyController, GalleryController};
use crate::model::expense::{ExpenseWithCategory, NewExpense};
use crate::model::modal::{Modal, ModalStack};
use crate::model::ui::Screen;
use crate::services::day_filter::{instant_on_day, start_of_day};
use crate::services::repository::ExpenseRepository;
use anyhow::Result;
use chrono::Utc;
use chrono_tz::Tz;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::sync::Arc;

/// Wall clock in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Midnight of the clock's current day
fn today(clock: fn() -> i64, tz: &Tz) -> i64 {
    let now = clock();
    start_of_day(now, tz).unwrap_or(now)
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between controllers and components
pub struct App {
    /// Screen currently shown
    pub screen: Screen,

    pub config: Config,
    pub formatter: Formatter,

    repository: Arc<dyn ExpenseRepository>,

    pub gallery: GalleryController,
    pub daily: DailyController,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<String>,

    /// Clock used for "today" and for the time of day of new expenses
    clock: fn() -> i64,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub gallery_view: GalleryComponent,
    pub daily_view: DailyComponent,
    pub detail_dialog: ExpenseDetailDialog,
    pub add_dialog: AddExpenseDialog,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create the app; both controllers subscribe immediately
    pub fn new(config: Config, repository: Arc<dyn ExpenseRepository>, clock: fn() -> i64) -> App {
        let formatter = Formatter::from_config(&config);
        let gallery = GalleryController::new(Arc::clone(&repository));
        let tz = config.tz();
        let daily = DailyController::new(Arc::clone(&repository), today(clock, &tz), tz);

        App {
            screen: Screen::Daily,
            config,
            formatter,
            repository,
            gallery,
            daily,
            modals: ModalStack::new(),
            should_quit: false,
            status_message: None,
            clock,
            gallery_view: GalleryComponent::new(),
            daily_view: DailyComponent::new(),
            detail_dialog: ExpenseDetailDialog::new(),
            add_dialog: AddExpenseDialog::new(),
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
        }
    }

    /// Whether the current screen's snapshot has its detail open
    fn detail_open(&self) -> bool {
        match self.screen {
            Screen::Gallery => self.gallery.snapshot().show_detail(),
            Screen::Daily => self.daily.snapshot().show_detail(),
        }
    }

    fn item_at(&self, index: usize) -> Option<ExpenseWithCategory> {
        match self.screen {
            Screen::Gallery => self.gallery.snapshot().items().get(index).cloned(),
            Screen::Daily => self.daily.snapshot().items().get(index).cloned(),
        }
    }

    fn selected_item(&self) -> Option<ExpenseWithCategory> {
        match self.screen {
            Screen::Gallery => self.gallery.snapshot().selected_item().cloned(),
            Screen::Daily => self.daily.snapshot().selected_item().cloned(),
        }
    }

    fn delete(&mut self, item: &ExpenseWithCategory) {
        match self.screen {
            Screen::Gallery => {
                if self.gallery.snapshot().selected_item().map(|s| s.id) == Some(item.id) {
                    self.gallery.hide_detail();
                }
                self.gallery.delete_expense(item);
            }
            Screen::Daily => self.daily.delete_expense(item),
        }
        self.status_message = Some(format!("Deleted {}", item.product_name));
    }

    fn submit_expense(&mut self, expense: NewExpense) {
        let Some(Modal::AddExpense { day }) = self.modals.top().cloned() else {
            return;
        };
        let timestamp = instant_on_day(day, (self.clock)(), &self.config.tz());
        let name = expense.product_name.clone();

        match self.repository.insert(expense, timestamp) {
            Ok(id) => {
                tracing::info!("added expense {} for {}", id, name);
                self.modals.pop();
                self.status_message = Some(format!("Added {}", name));
            }
            Err(e) => {
                tracing::warn!("adding expense failed: {}", e);
                self.add_dialog.set_error(e.to_string());
            }
        }
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::AddExpense { .. } => self.add_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::AddExpense { day } => self.add_dialog.draw_for_day(
                frame,
                area,
                *day,
                &self.formatter,
                &self.config.header_date_pattern,
            )?,
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(Some(Action::ForceQuit));
        }

        if let Some(modal) = self.modals.top().cloned() {
            return self.handle_modal_key_event(&modal, key);
        }

        if self.detail_open() {
            return self.detail_dialog.handle_key_event(key);
        }

        match self.screen {
            Screen::Gallery => {
                self.gallery_view.set_len(self.gallery.snapshot().items().len());
                self.gallery_view.handle_key_event(key)
            }
            Screen::Daily => {
                self.daily_view.set_len(self.daily.snapshot().items().len());
                self.daily_view.handle_key_event(key)
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                if self.gallery.poll() {
                    self.gallery_view.set_len(self.gallery.snapshot().items().len());
                }
                if self.daily.poll() {
                    self.daily_view.set_len(self.daily.snapshot().items().len());
                }
            }
            Action::Resize(_, _) => {}
            Action::ForceQuit => {
                self.gallery.teardown();
                self.daily.teardown();
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Navigation
            // ─────────────────────────────────────────────────────────────────
            Action::SwitchScreen(screen) => self.screen = screen,
            Action::NextScreen => self.screen = self.screen.next(),
            Action::NextDay => {
                self.daily.next_day();
                self.daily_view.reset();
            }
            Action::PrevDay => {
                self.daily.prev_day();
                self.daily_view.reset();
            }
            Action::Today => {
                self.daily.set_day(today(self.clock, &self.config.tz()));
                self.daily_view.reset();
            }

            // ─────────────────────────────────────────────────────────────────
            // Screen intents
            // ─────────────────────────────────────────────────────────────────
            Action::SelectItem(index) => {
                if let Some(item) = self.item_at(index) {
                    match self.screen {
                        Screen::Gallery => self.gallery.show_detail(item),
                        Screen::Daily => self.daily.show_detail(item),
                    }
                }
            }
            Action::DismissDetail => match self.screen {
                Screen::Gallery => self.gallery.hide_detail(),
                Screen::Daily => self.daily.hide_detail(),
            },
            Action::Refresh => {
                match self.screen {
                    Screen::Gallery => self.gallery.refresh(),
                    Screen::Daily => self.daily.refresh(),
                }
                self.status_message = None;
            }
            Action::DeleteItem(index) => {
                if let Some(item) = self.item_at(index) {
                    self.delete(&item);
                }
            }
            Action::DeleteSelected => {
                if let Some(item) = self.selected_item() {
                    self.delete(&item);
                }
            }
            Action::AddExpense => {
                let day = self.daily.add_expense_request();
                self.add_dialog.open(self.repository.categories());
                self.modals.push(Modal::AddExpense { day });
            }
            Action::SubmitExpense(expense) => self.submit_expense(expense),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.push(Modal::QuitConfirm),
            Action::OpenHelp => {
                self.help_dialog.reset();
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                self.modals.pop();
            }
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area, self.status_message.is_some());

        render_tabs(frame, layout.tabs, self.screen);

        match self.screen {
            Screen::Gallery => {
                let state = self.gallery.snapshot();
                draw_gallery_screen(frame, layout.body, &state, &mut self.gallery_view, &self.formatter);
                if let Some(item) = state.selected_item() {
                    self.detail_dialog.draw_with_item(
                        frame,
                        area,
                        item,
                        &self.formatter,
                        &self.config.detail_date_pattern,
                    )?;
                }
            }
            Screen::Daily => {
                let state = self.daily.snapshot();
                draw_daily_screen(
                    frame,
                    layout.body,
                    &state,
                    &mut self.daily_view,
                    &self.formatter,
                    &self.config.header_date_pattern,
                    &self.config.time_pattern,
                );
                if let Some(item) = state.selected_item() {
                    self.detail_dialog.draw_with_item(
                        frame,
                        area,
                        item,
                        &self.formatter,
                        &self.config.detail_date_pattern,
                    )?;
                }
            }
        }

        if let (Some(status_area), Some(status)) = (layout.status, self.status_message.as_deref()) {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                format!(" {} ", status),
                Style::default().fg(Color::Yellow),
            )));
            frame.render_widget(paragraph, status_area);
        }
        render_help_bar(frame, layout.help, self.screen);

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

fn render_tabs(frame: &mut Frame, area: Rect, screen: Screen) {
    let titles: Vec<&str> = Screen::all().iter().map(|s| s.name()).collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::BOTTOM))
        .select(screen.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, screen: Screen) {
    let key = |label: &'static str, color: Color| {
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let mut spans = match screen {
        Screen::Daily => vec![
            key(" ←/→ ", Color::Cyan),
            Span::raw("Day "),
            key(" t ", Color::Cyan),
            Span::raw("Today "),
            key(" Enter ", Color::Green),
            Span::raw("Detail "),
            key(" a ", Color::Green),
            Span::raw("Add "),
            key(" d ", Color::Red),
            Span::raw("Delete "),
        ],
        Screen::Gallery => vec![
            key(" hjkl ", Color::Cyan),
            Span::raw("Move "),
            key(" Enter ", Color::Green),
            Span::raw("Detail "),
        ],
    };
    spans.extend([
        key(" r ", Color::Green),
        Span::raw("Reload "),
        key(" Tab ", Color::Magenta),
        Span::raw("Screen "),
        key(" ? ", Color::White),
        Span::raw("Help "),
        key(" q ", Color::Yellow),
        Span::raw("Quit"),
    ]);

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::format::Locale;
    use crate::model::expense::{Category, CategoryId, Expense, ExpenseId};
    use crate::services::repository::LocalRepository;
    use ratatui::{backend::TestBackend, Terminal};

    // 2024-03-05 12:00 in Seoul
    const NOON: i64 = 1_709_607_600_000;
    const HOUR: i64 = 3_600_000;

    fn clock() -> i64 {
        NOON
    }

    fn expense(id: u64, name: &str, timestamp: i64, photo: bool) -> Expense {
        Expense {
            id: ExpenseId(id),
            product_name: name.to_string(),
            amount: 1_000 * id,
            category_id: Some(CategoryId(1)),
            timestamp,
            photo_uri: photo.then(|| format!("/photos/{}.jpg", id)),
        }
    }

    fn app() -> (LocalRepository, App) {
        let repository = LocalRepository::in_memory(
            vec![
                expense(1, "Lunch", NOON - HOUR, true),
                expense(2, "Bus", NOON + HOUR, false),
                expense(3, "Old book", NOON - 48 * HOUR, true),
            ],
            vec![Category {
                id: CategoryId(1),
                name: "Food".to_string(),
                icon: Some("restaurant".to_string()),
            }],
        );
        let config = Config {
            locale: Locale::English,
            currency_suffix: " KRW".to_string(),
            header_date_pattern: "yyyy-MM-dd (E)".to_string(),
            detail_date_pattern: "yyyy-MM-dd HH:mm".to_string(),
            ..Config::default()
        };
        let mut app = App::new(config, Arc::new(repository.clone()), clock);
        app.update(Action::Tick).unwrap();
        (repository, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        let mut action = app
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
        while let Some(a) = action {
            action = app.update(a).unwrap();
        }
    }

    fn screen_text(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame, frame.area()).unwrap()).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_starts_on_today() {
        let (_, mut app) = app();
        let daily = app.daily.snapshot();
        assert!(!daily.is_loading());
        assert_eq!(daily.items().len(), 2);
        assert_eq!(daily.total(), 3_000);

        let text = screen_text(&mut app);
        assert!(text.contains("2024-03-05 (Tue)"));
        assert!(text.contains("Lunch"));
        assert!(!text.contains("Old book"));
    }

    #[test]
    fn test_switch_screen_shows_gallery() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Gallery);

        let gallery = app.gallery.snapshot();
        let names: Vec<&str> = gallery.items().iter().map(|e| e.product_name.as_str()).collect();
        assert_eq!(names, vec!["Lunch", "Old book"]);
        assert!(screen_text(&mut app).contains("Receipt Gallery"));
    }

    #[test]
    fn test_detail_open_and_dismiss() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Enter);
        let selected = app.daily.snapshot().selected_item().map(|e| e.id);
        assert_eq!(selected, Some(ExpenseId(2)));
        assert!(screen_text(&mut app).contains("Expense #2"));

        // Screen keys are not routed while the detail is open
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Daily);

        press(&mut app, KeyCode::Esc);
        assert!(!app.daily.snapshot().show_detail());
        assert_eq!(app.daily.snapshot().items().len(), 2);
    }

    #[test]
    fn test_delete_from_gallery_detail_updates_both_screens() {
        let (repository, mut app) = app();
        app.update(Action::SwitchScreen(Screen::Gallery)).unwrap();
        press(&mut app, KeyCode::Enter);
        assert!(app.gallery.snapshot().show_detail());

        press(&mut app, KeyCode::Char('d'));
        assert!(!app.gallery.snapshot().show_detail());
        app.update(Action::Tick).unwrap();

        assert_eq!(app.gallery.snapshot().items().len(), 1);
        assert_eq!(app.daily.snapshot().total(), 2_000);
        assert_eq!(repository.subscriber_count(), 2);
        assert_eq!(app.status_message.as_deref(), Some("Deleted Lunch"));
    }

    #[test]
    fn test_add_expense_lands_on_displayed_day() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Left);
        assert_eq!(app.daily.snapshot().items().len(), 0);
        assert!(screen_text(&mut app).contains("No expenses on this day"));

        press(&mut app, KeyCode::Char('a'));
        assert!(matches!(app.modals.top(), Some(Modal::AddExpense { .. })));
        for c in "Snack".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Tab);
        for c in "2500".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.modals.is_empty());

        app.update(Action::Tick).unwrap();
        let daily = app.daily.snapshot();
        assert_eq!(daily.items().len(), 1);
        assert_eq!(daily.items()[0].product_name, "Snack");
        assert_eq!(daily.items()[0].timestamp, NOON - 24 * HOUR);
        assert_eq!(daily.total(), 2_500);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.daily.snapshot().items().len(), 2);
    }

    #[test]
    fn test_quit_flow_releases_subscriptions() {
        let (repository, mut app) = app();
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));
        press(&mut app, KeyCode::Char('n'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.should_quit);
        assert_eq!(repository.subscriber_count(), 0);
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let (_, mut app) = app();
        press(&mut app, KeyCode::Char('a'));
        let action = app
            .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(action, Some(Action::ForceQuit));
    }
}
