//! Multi-select chooser for ambiguous kill targets.
//!
//! Shown by `portman kill <port>` when several processes hold the port.
//! Rows `0..N` are candidates, row `N` is "Kill all selected" and row
//! `N + 1` is "Cancel".

use std::collections::BTreeSet;
use std::io;

use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use portman_core::PortInfo;
use ratatui::{backend::CrosstermBackend, Terminal, TerminalOptions, Viewport};

use super::theme::Theme;
use super::{ui, TerminalGuard};

/// How the chooser ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The checked candidates, possibly none.
    Confirmed(Vec<PortInfo>),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRow {
    Candidate(usize),
    KillAll,
    Cancel,
}

pub struct SelectionMenu {
    port: u16,
    candidates: Vec<PortInfo>,
    checked: BTreeSet<usize>,
    cursor: usize,
}

impl SelectionMenu {
    pub fn new(port: u16, candidates: Vec<PortInfo>) -> Self {
        Self {
            port,
            candidates,
            checked: BTreeSet::new(),
            cursor: 0,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn candidates(&self) -> &[PortInfo] {
        &self.candidates
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_checked(&self, index: usize) -> bool {
        self.checked.contains(&index)
    }

    /// Total rows including the two action rows.
    pub fn row_count(&self) -> usize {
        self.candidates.len() + 2
    }

    pub fn row_at(&self, index: usize) -> MenuRow {
        let n = self.candidates.len();
        if index < n {
            MenuRow::Candidate(index)
        } else if index == n {
            MenuRow::KillAll
        } else {
            MenuRow::Cancel
        }
    }

    /// Apply one key; `Some` ends the menu.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Selection> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Selection::Cancelled);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Selection::Cancelled),
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.row_count() {
                    self.cursor += 1;
                }
                None
            }
            KeyCode::Char(' ') => {
                if let MenuRow::Candidate(i) = self.row_at(self.cursor) {
                    self.toggle(i);
                }
                None
            }
            KeyCode::Enter => match self.row_at(self.cursor) {
                MenuRow::Candidate(i) => {
                    self.toggle(i);
                    None
                }
                MenuRow::KillAll => Some(Selection::Confirmed(self.checked_candidates())),
                MenuRow::Cancel => Some(Selection::Cancelled),
            },
            _ => None,
        }
    }

    fn toggle(&mut self, index: usize) {
        if !self.checked.remove(&index) {
            self.checked.insert(index);
        }
    }

    fn checked_candidates(&self) -> Vec<PortInfo> {
        self.checked
            .iter()
            .filter_map(|&i| self.candidates.get(i).cloned())
            .collect()
    }
}

/// Run the chooser inline below the cursor and block until it ends.
pub fn choose(port: u16, candidates: Vec<PortInfo>) -> Result<Selection> {
    let mut menu = SelectionMenu::new(port, candidates);
    let theme = Theme::default();

    let _guard = TerminalGuard::raw()?;
    let height = ui::selection_height(&menu);
    let mut terminal = Terminal::with_options(
        CrosstermBackend::new(io::stdout()),
        TerminalOptions {
            viewport: Viewport::Inline(height),
        },
    )?;

    let selection = loop {
        terminal.draw(|f| ui::draw_selection(f, &menu, &theme))?;
        if let TermEvent::Key(key) = event::read()? {
            if let Some(selection) = menu.handle_key(key) {
                break selection;
            }
        }
    };

    terminal.clear()?;
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn two_node_menu() -> SelectionMenu {
        SelectionMenu::new(
            3000,
            vec![
                PortInfo::new(3000, 111, "node", "node a.js", "tcp"),
                PortInfo::new(3000, 222, "node", "node b.js", "tcp"),
            ],
        )
    }

    #[test]
    fn test_rows() {
        let menu = two_node_menu();
        assert_eq!(menu.row_count(), 4);
        assert_eq!(menu.row_at(1), MenuRow::Candidate(1));
        assert_eq!(menu.row_at(2), MenuRow::KillAll);
        assert_eq!(menu.row_at(3), MenuRow::Cancel);
    }

    #[test]
    fn test_cursor_bounds() {
        let mut menu = two_node_menu();
        menu.handle_key(key(KeyCode::Up));
        assert_eq!(menu.cursor(), 0);
        for _ in 0..10 {
            menu.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(menu.cursor(), 3);
    }

    #[test]
    fn test_toggle_and_confirm() {
        let mut menu = two_node_menu();
        menu.handle_key(key(KeyCode::Char(' ')));
        menu.handle_key(key(KeyCode::Down));
        menu.handle_key(key(KeyCode::Enter));
        assert!(menu.is_checked(0));
        assert!(menu.is_checked(1));

        // Space toggles back off
        menu.handle_key(key(KeyCode::Char(' ')));
        assert!(!menu.is_checked(1));

        menu.handle_key(key(KeyCode::Down));
        let selection = menu.handle_key(key(KeyCode::Enter)).unwrap();
        match selection {
            Selection::Confirmed(chosen) => {
                assert_eq!(chosen.len(), 1);
                assert_eq!(chosen[0].pid, 111);
            }
            Selection::Cancelled => panic!("expected confirmation"),
        }
    }

    #[test]
    fn test_empty_confirmation_is_not_cancellation() {
        let mut menu = two_node_menu();
        menu.handle_key(key(KeyCode::Down));
        menu.handle_key(key(KeyCode::Down));
        let selection = menu.handle_key(key(KeyCode::Enter));
        assert_eq!(selection, Some(Selection::Confirmed(Vec::new())));
        assert_ne!(selection, Some(Selection::Cancelled));
    }

    #[test]
    fn test_space_ignored_on_action_rows() {
        let mut menu = two_node_menu();
        for _ in 0..2 {
            menu.handle_key(key(KeyCode::Down));
        }
        assert_eq!(menu.handle_key(key(KeyCode::Char(' '))), None);
        assert!(!menu.is_checked(0));
        assert!(!menu.is_checked(1));
    }

    #[test]
    fn test_cancel_paths() {
        let mut menu = two_node_menu();
        menu.handle_key(key(KeyCode::Char(' ')));
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            assert_eq!(menu.handle_key(key(code)), Some(Selection::Cancelled));
        }
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(menu.handle_key(ctrl_c), Some(Selection::Cancelled));

        for _ in 0..3 {
            menu.handle_key(key(KeyCode::Down));
        }
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), Some(Selection::Cancelled));
    }
}
