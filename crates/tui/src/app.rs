use std::{io, sync::Arc, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use courtside_core::{
    feed::{spawn_fetch, FeedEvent, RefreshKind, Schedule, ScoreFeed},
    gateway::ScoreSource,
    view::{Role, ViewModel},
    DateTab,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::ui::{self, DrawState, Theme};

const TICK_RATE: Duration = Duration::from_millis(250);

enum AppEvent {
    Input(Event),
    Tick,
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    SelectTab(DateTab),
    NextTab,
    PrevTab,
    MoveCursor(isize),
    ToggleFocused,
    Refresh,
    Quit,
}

/// Map a key press to an intent. Key releases and unbound keys map to nothing.
pub fn key_intent(key: &KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Intent::Quit),
            _ => None,
        };
    }
    let intent = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Intent::Quit,
        KeyCode::Char('1') => Intent::SelectTab(DateTab::Yesterday),
        KeyCode::Char('2') => Intent::SelectTab(DateTab::Today),
        KeyCode::Char('3') => Intent::SelectTab(DateTab::Tomorrow),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => Intent::NextTab,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => Intent::PrevTab,
        KeyCode::Down | KeyCode::Char('j') => Intent::MoveCursor(1),
        KeyCode::Up | KeyCode::Char('k') => Intent::MoveCursor(-1),
        KeyCode::Enter | KeyCode::Char(' ') => Intent::ToggleFocused,
        KeyCode::Char('r') => Intent::Refresh,
        _ => return None,
    };
    Some(intent)
}

/// Terminal scoreboard driven by a [`ScoreSource`].
pub struct ScoreboardApp<S> {
    feed: ScoreFeed,
    source: Arc<S>,
    source_label: String,
    schedule: Schedule,
    state: UiState,
    theme: Theme,
    feed_tx: Option<mpsc::Sender<FeedEvent>>,
}

struct UiState {
    cursor: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            cursor: 0,
            status: "Loading scores…".to_string(),
            should_quit: false,
        }
    }
}

impl<S: ScoreSource> ScoreboardApp<S> {
    pub fn new(source: S, source_label: String, schedule: Schedule) -> Self {
        Self {
            feed: ScoreFeed::new(),
            source: Arc::new(source),
            source_label,
            schedule,
            state: UiState::default(),
            theme: Theme::default(),
            feed_tx: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let (feed_tx, mut feed_rx) = mpsc::channel::<FeedEvent>(32);
        self.feed_tx = Some(feed_tx.clone());
        self.request(RefreshKind::Startup);
        let timers = self.schedule.spawn(feed_tx);
        info!(
            source = %self.source_label,
            active = ?self.schedule.active(),
            full = ?self.schedule.full(),
            "scoreboard started"
        );

        let result = self
            .event_loop(&mut terminal, &mut event_rx, &mut feed_rx)
            .await;

        drop(timers);
        self.feed_tx = None;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        event_rx: &mut mpsc::Receiver<AppEvent>,
        feed_rx: &mut mpsc::Receiver<FeedEvent>,
    ) -> Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            tokio::select! {
                maybe_event = event_rx.recv() => match maybe_event {
                    Some(AppEvent::Input(event)) => self.handle_input(event),
                    Some(AppEvent::Tick) => {}
                    None => break,
                },
                Some(event) = feed_rx.recv() => self.handle_feed_event(event),
            }

            if self.state.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn request(&mut self, kind: RefreshKind) {
        let Some(sender) = self.feed_tx.clone() else {
            return;
        };
        let dates = self.feed.dates_for(kind, Local::now().date_naive());
        debug!(?kind, dates = ?dates.iter().map(ToString::to_string).collect::<Vec<_>>(), "requesting scores");
        self.feed.begin_fetch();
        spawn_fetch(self.source.clone(), kind, dates, sender);
    }

    fn handle_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Refresh(kind) => self.request(kind),
            FeedEvent::Fetched {
                kind,
                dates,
                result,
            } => {
                let status = match &result {
                    Ok(_) => format!("Updated {}", Local::now().format("%H:%M:%S")),
                    Err(err) => format!("Refresh failed: {err}"),
                };
                debug!(?kind, requested = dates.len(), "fetch completed");
                self.feed.apply(kind, result);
                self.state.status = status;
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if let Some(intent) = key_intent(&key) {
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::SelectTab(tab) => self.switch_tab(tab),
            Intent::NextTab => self.switch_tab(self.feed.selection().active_tab().next()),
            Intent::PrevTab => self.switch_tab(self.feed.selection().active_tab().prev()),
            Intent::MoveCursor(delta) => {
                let rows = self.current_view().rows().count();
                self.state.cursor = move_cursor(self.state.cursor, delta, rows);
            }
            Intent::ToggleFocused => {
                let targets = self.current_view().targets();
                if let Some(target) = targets.get(self.state.cursor) {
                    if target.role == Role::Expandable {
                        self.feed.toggle(&target.game_id);
                    }
                }
            }
            Intent::Refresh => {
                self.state.status = "Refreshing…".to_string();
                self.request(RefreshKind::Manual);
            }
            Intent::Quit => {
                info!("quit requested");
                self.state.should_quit = true;
            }
        }
    }

    fn switch_tab(&mut self, tab: DateTab) {
        if self.feed.select_tab(tab) {
            self.state.cursor = 0;
        }
    }

    fn current_view(&self) -> ViewModel {
        self.feed.view(Local::now().date_naive())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let view = self.current_view();
        let rows = view.rows().count();
        self.state.cursor = self.state.cursor.min(rows.saturating_sub(1));

        let updated = self
            .feed
            .last_success()
            .map(|at| at.format("%H:%M:%S").to_string());
        let state = DrawState {
            cursor: self.state.cursor,
            status: &self.state.status,
            source: &self.source_label,
            refreshing: self.feed.in_flight() > 0,
            updated: updated.as_deref(),
        };
        ui::draw(frame, &view, &state, &self.theme);
    }
}

fn move_cursor(cursor: usize, delta: isize, rows: usize) -> usize {
    if rows == 0 {
        return 0;
    }
    let max = rows as isize - 1;
    (cursor as isize + delta).clamp(0, max) as usize
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}
