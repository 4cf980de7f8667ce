//! Interactive session state.
//!
//! [`App`] is a pure state machine: the runner feeds it [`Event`]s and
//! executes the [`Effect`] it hands back. Scans and kills never run here,
//! so every transition is testable without a terminal.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use portman_core::{filter_ports, sort_ports, KillOutcome, PortInfo};

/// Longest filter the input accepts.
pub const FILTER_MAX_LEN: usize = 50;

/// Everything the session reacts to.
#[derive(Debug)]
pub enum Event {
    ScanCompleted(portman_core::Result<Vec<PortInfo>>),
    KillCompleted(KillOutcome),
    KeyPressed(KeyEvent),
    Resized(u16, u16),
}

/// Work the runner performs on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Scan,
    Kill(PortInfo),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Filtering,
    /// Waiting for y/N on a record captured when the prompt opened.
    ConfirmingKill { target: PortInfo },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

pub struct App {
    ports: Vec<PortInfo>,
    view: Vec<PortInfo>,
    selected: usize,
    filter: String,
    mode: Mode,
    status: Option<Status>,
    scanning: bool,
    size: (u16, u16),
    last_scan: Option<DateTime<Local>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            ports: Vec::new(),
            view: Vec::new(),
            selected: 0,
            filter: String::new(),
            mode: Mode::Browsing,
            status: None,
            scanning: false,
            size: (0, 0),
            last_scan: None,
        }
    }

    /// The first scan, dispatched as the session opens.
    pub fn start(&mut self) -> Effect {
        self.scanning = true;
        Effect::Scan
    }

    pub fn handle(&mut self, event: Event) -> Option<Effect> {
        match event {
            Event::ScanCompleted(result) => {
                self.on_scan(result);
                None
            }
            Event::KillCompleted(outcome) => self.on_kill(outcome),
            Event::KeyPressed(key) => {
                if key.kind != KeyEventKind::Press {
                    return None;
                }
                match self.mode {
                    Mode::Browsing => self.on_browse_key(key),
                    Mode::Filtering => {
                        self.on_filter_key(key);
                        None
                    }
                    Mode::ConfirmingKill { .. } => self.on_confirm_key(key),
                }
            }
            Event::Resized(width, height) => {
                self.size = (width, height);
                None
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn ports(&self) -> &[PortInfo] {
        &self.ports
    }

    /// Records that pass the current filter, in display order.
    pub fn view(&self) -> &[PortInfo] {
        &self.view
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn last_scan(&self) -> Option<DateTime<Local>> {
        self.last_scan
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn on_scan(&mut self, result: portman_core::Result<Vec<PortInfo>>) {
        self.scanning = false;
        match result {
            Ok(mut ports) => {
                sort_ports(&mut ports);
                self.status = Some(Status::info(format!(
                    "Found {} active port(s)",
                    ports.len()
                )));
                self.ports = ports;
                self.last_scan = Some(Local::now());
                self.recompute_view();
            }
            Err(e) => {
                self.status = Some(Status::error(format!("Error: {}", e)));
            }
        }
    }

    fn on_kill(&mut self, outcome: KillOutcome) -> Option<Effect> {
        let succeeded = outcome.success;
        self.status = Some(Status {
            text: outcome.to_string(),
            is_error: !succeeded,
        });
        if succeeded {
            self.scanning = true;
            return Some(Effect::Scan);
        }
        None
    }

    fn on_browse_key(&mut self, key: KeyEvent) -> Option<Effect> {
        if is_ctrl_c(&key) {
            return Some(Effect::Quit);
        }

        match key.code {
            KeyCode::Char('q') => return Some(Effect::Quit),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.view.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.view.len().saturating_sub(1);
            }
            KeyCode::Char('r') => {
                self.scanning = true;
                self.status = Some(Status::info("Refreshing..."));
                return Some(Effect::Scan);
            }
            KeyCode::Char('/') => self.mode = Mode::Filtering,
            KeyCode::Enter => {
                if let Some(target) = self.view.get(self.selected).cloned() {
                    self.status = Some(Status::info(format!(
                        "Kill process on port {} (PID: {})? [y/N]",
                        target.port, target.pid
                    )));
                    self.mode = Mode::ConfirmingKill { target };
                }
            }
            _ => {}
        }
        None
    }

    fn on_filter_key(&mut self, key: KeyEvent) {
        if is_ctrl_c(&key) || key.code == KeyCode::Esc {
            self.filter.clear();
            self.mode = Mode::Browsing;
            self.recompute_view();
            return;
        }

        match key.code {
            KeyCode::Enter => self.mode = Mode::Browsing,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.filter.chars().count() < FILTER_MAX_LEN {
                    self.filter.push(c);
                }
            }
            _ => return,
        }
        self.recompute_view();
    }

    fn on_confirm_key(&mut self, key: KeyEvent) -> Option<Effect> {
        let mode = std::mem::replace(&mut self.mode, Mode::Browsing);
        let Mode::ConfirmingKill { target } = mode else {
            return None;
        };

        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.status = Some(Status::info(format!(
                    "Killing process on port {}...",
                    target.port
                )));
                Some(Effect::Kill(target))
            }
            _ => {
                self.status = Some(Status::info("Kill cancelled"));
                None
            }
        }
    }

    /// Rebuild the filtered view and pull the cursor back inside it.
    fn recompute_view(&mut self) {
        self.view = filter_ports(&self.ports, &self.filter);
        if self.selected >= self.view.len() {
            self.selected = self.view.len().saturating_sub(1);
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
