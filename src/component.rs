//! Component trait - Interface for UI components
//!
//! Components turn key presses into Actions and draw themselves. Screen
//! state lives in the controllers' snapshots; a component only keeps
//! ephemeral presentation state such as a cursor or a half-typed form.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for UI components
///
/// The pattern follows:
/// 1. `handle_key_event` - Convert key presses to Actions
/// 2. `update` - React to Actions that concern the component itself
/// 3. `draw` - Render the component
pub trait Component {
    /// Initialize the component
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Handle a key event, returning an optional Action
    ///
    /// Components may move their own cursor here, but never touch a
    /// snapshot: anything that changes screen state is returned as an Action.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Update component state based on an Action
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    /// Draw the component to the frame
    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
