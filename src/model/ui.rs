//! UI state - presentation state separate from domain data

/// Top-level screens, shown as tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Daily,
    Gallery,
}

impl Screen {
    pub fn all() -> Vec<Screen> {
        vec![Screen::Daily, Screen::Gallery]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Daily => "Daily",
            Screen::Gallery => "Gallery",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Screen::Daily => 0,
            Screen::Gallery => 1,
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::Daily => Screen::Gallery,
            Screen::Gallery => Screen::Daily,
        }
    }
}
