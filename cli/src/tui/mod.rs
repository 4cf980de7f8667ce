//! Interactive terminal UI.
//!
//! One current-thread event loop owns the [`App`]. Scans run as spawned
//! tasks and kills on the blocking pool; both report back as [`Event`]s
//! over a channel, so session state never leaves the loop.

mod app;
mod select;
mod theme;
mod ui;

use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{Event as TermEvent, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use portman_core::{
    Config, PortInfo, PortScanner, PortScannerPort, PortService, ProcessKillerPort,
    ProcessTerminator,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::debug;

use app::{App, Effect, Event};
pub use select::{choose, Selection};
use theme::Theme;

/// Puts the terminal into raw mode and restores it on drop, including
/// when the loop exits through `?`.
pub struct TerminalGuard {
    alternate_screen: bool,
}

impl TerminalGuard {
    /// Raw mode only, drawing inline.
    pub fn raw() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            alternate_screen: false,
        })
    }

    /// Raw mode on the alternate screen.
    pub fn alternate() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self {
            alternate_screen: true,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();
    }
}

/// Run the interactive session until the operator quits.
pub async fn run(config: &Config) -> Result<()> {
    // Fails on unsupported platforms before the terminal is touched
    let service = Arc::new(PortService::new(PortScanner::new()?));
    let terminator =
        ProcessTerminator::new().with_timing(config.grace_timeout(), config.poll_interval());
    let theme = Theme::default();

    let _guard = TerminalGuard::alternate()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.hide_cursor()?;

    let result = event_loop(&mut terminal, service, terminator, config, &theme).await;

    terminal.show_cursor()?;
    result
}

async fn event_loop<S, K>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    service: Arc<PortService<S>>,
    killer: K,
    config: &Config,
    theme: &Theme,
) -> Result<()>
where
    S: PortScannerPort + 'static,
    K: ProcessKillerPort + Clone + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let mut input = EventStream::new();
    let mut ticker = tokio::time::interval(config.tick_rate());

    let mut app = App::new();
    let area = terminal.size()?;
    app.handle(Event::Resized(area.width, area.height));
    let mut pending = Some(app.start());

    loop {
        if let Some(effect) = pending.take() {
            if dispatch(effect, &service, &killer, &tx).is_break() {
                return Ok(());
            }
        }

        terminal.draw(|f| ui::draw(f, &app, theme))?;

        let event = tokio::select! {
            _ = ticker.tick() => continue,
            Some(event) = rx.recv() => event,
            next = input.next() => match next {
                Some(Ok(TermEvent::Key(key))) => Event::KeyPressed(key),
                Some(Ok(TermEvent::Resize(width, height))) => Event::Resized(width, height),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        };

        pending = app.handle(event);
    }
}

/// Start the work an effect asks for; its result arrives later on `tx`.
fn dispatch<S, K>(
    effect: Effect,
    service: &Arc<PortService<S>>,
    killer: &K,
    tx: &UnboundedSender<Event>,
) -> ControlFlow<()>
where
    S: PortScannerPort + 'static,
    K: ProcessKillerPort + Clone + 'static,
{
    match effect {
        Effect::Quit => return ControlFlow::Break(()),
        Effect::Scan => spawn_scan(service, tx),
        Effect::Kill(target) => spawn_kill(killer, target, tx),
    }
    ControlFlow::Continue(())
}

fn spawn_scan<S: PortScannerPort + 'static>(
    service: &Arc<PortService<S>>,
    tx: &UnboundedSender<Event>,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = service.scan().await;
        // The receiver only goes away when the session is over
        let _ = tx.send(Event::ScanCompleted(result));
    });
}

fn spawn_kill<K: ProcessKillerPort + Clone + 'static>(
    killer: &K,
    target: PortInfo,
    tx: &UnboundedSender<Event>,
) {
    let killer = killer.clone();
    let tx = tx.clone();
    debug!(port = target.port, pid = target.pid, "Dispatching kill");
    tokio::task::spawn_blocking(move || {
        let outcome = killer.kill(target.pid);
        let _ = tx.send(Event::KillCompleted(outcome));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use portman_core::KillOutcome;
    use std::sync::Mutex;

    struct MockScanner {
        ports: Vec<PortInfo>,
    }

    impl PortScannerPort for MockScanner {
        async fn scan(&self) -> portman_core::Result<Vec<PortInfo>> {
            Ok(self.ports.clone())
        }
    }

    #[derive(Clone, Default)]
    struct MockKiller {
        killed: Arc<Mutex<Vec<u32>>>,
    }

    impl ProcessKillerPort for MockKiller {
        fn kill(&self, pid: u32) -> KillOutcome {
            self.killed.lock().unwrap().push(pid);
            KillOutcome::success("Process terminated gracefully")
        }

        fn is_running(&self, pid: u32) -> bool {
            !self.killed.lock().unwrap().contains(&pid)
        }
    }

    fn service(ports: Vec<PortInfo>) -> Arc<PortService<MockScanner>> {
        Arc::new(PortService::new(MockScanner { ports }))
    }

    #[tokio::test]
    async fn test_scan_result_comes_back_as_event() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = service(vec![
            PortInfo::new(8080, 2, "java", "java", "tcp"),
            PortInfo::new(3000, 1, "node", "node", "tcp"),
        ]);

        let mut app = App::new();
        let effect = app.start();
        assert!(dispatch(effect, &service, &MockKiller::default(), &tx).is_continue());

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, Event::ScanCompleted(Ok(_))));
        assert_eq!(app.handle(event), None);
        assert!(!app.is_scanning());
        let ports: Vec<u16> = app.ports().iter().map(|p| p.port).collect();
        assert_eq!(ports, vec![3000, 8080]);
    }

    #[tokio::test]
    async fn test_kill_result_triggers_rescan() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = service(Vec::new());
        let killer = MockKiller::default();
        let target = PortInfo::new(3000, 4242, "node", "node server.js", "tcp");

        let flow = dispatch(Effect::Kill(target), &service, &killer, &tx);
        assert!(flow.is_continue());

        let event = rx.recv().await.unwrap();
        let Event::KillCompleted(ref outcome) = event else {
            panic!("expected a kill outcome, got {:?}", event);
        };
        assert!(outcome.success);
        assert_eq!(*killer.killed.lock().unwrap(), vec![4242]);

        let mut app = App::new();
        assert_eq!(app.handle(event), Some(Effect::Scan));
        assert_eq!(
            app.status().unwrap().text,
            "✓ Process terminated gracefully"
        );
    }

    #[tokio::test]
    async fn test_quit_dispatches_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let flow = dispatch(Effect::Quit, &service(Vec::new()), &MockKiller::default(), &tx);
        assert!(flow.is_break());
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
