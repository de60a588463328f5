//! Application core: event loop, screen management, action dispatch.
//!
//! Every gateway call runs on a spawned task that reports back through
//! the action channel; the loop itself never awaits the backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use shopkeep_core::{
    Account, Actor, Backend, CatalogItem, ConfirmPrompt, Console, CoreError, DeleteRequest,
    ErrorKind, Managed, Notification, ResourceGateway, ResourceKind, Submission,
};

use crate::action::{Action, Credentials};
use crate::component::Component;
use crate::data_bridge::spawn_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::{centered, dialog};

const TOAST_TTL: Duration = Duration::from_secs(4);

/// A delete that passed self-protection and waits for y / n.
enum PendingDelete {
    Account(DeleteRequest<Account>),
    Item(DeleteRequest<CatalogItem>),
}

impl PendingDelete {
    fn prompt(&self) -> &ConfirmPrompt {
        match self {
            Self::Account(request) => request.prompt(),
            Self::Item(request) => request.prompt(),
        }
    }
}

fn session_expired() -> Notification {
    Notification::error("Signed out", "Your session has expired. Please log in again.")
}

pub struct App<B: Backend> {
    console: Arc<Console<B>>,
    endpoint: String,
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    actor: Option<Actor>,
    pending_delete: Option<PendingDelete>,
    notification: Option<(Notification, Instant)>,
    data_cancel: CancellationToken,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl<B: Backend> App<B> {
    /// Start on the sign-in screen unless a session was restored.
    pub fn new(console: Arc<Console<B>>, endpoint: impl Into<String>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let actor = console.session().actor();
        let active_screen = if actor.is_some() {
            ScreenId::Accounts
        } else {
            ScreenId::SignIn
        };

        Self {
            console,
            endpoint: endpoint.into(),
            active_screen,
            screens: create_screens().into_iter().collect(),
            running: true,
            help_visible: false,
            actor,
            pending_delete: None,
            notification: None,
            data_cancel: CancellationToken::new(),
            action_tx,
            action_rx,
        }
    }

    /// Mount screens, start the data bridge, load data if signed in.
    fn start(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        spawn_data_bridge(&self.console, self.action_tx.clone(), self.data_cancel.clone());
        if self.actor.is_some() {
            self.reload_all();
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.start()?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // spinner + toast expiry
            Duration::from_millis(33),  // ~30 FPS
        );

        info!(screen = %self.active_screen, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let redraw = matches!(action, Action::Render | Action::Resize(..));
                self.process_action(action)?;
                if redraw {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ───────────────────────────────────────────────────

    fn active(&mut self) -> Option<&mut Box<dyn Component>> {
        self.screens.get_mut(&self.active_screen)
    }

    /// Overlays first, then a capturing screen, then global keys, then
    /// the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_delete.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let captured = self
            .screens
            .get(&self.active_screen)
            .is_some_and(|s| s.captures_input());
        if !captured && !key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('q') => return Ok(Some(Action::Quit)),
                KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
                KeyCode::Char('L') => return Ok(Some(Action::Logout)),
                KeyCode::Esc if self.notification.is_some() => {
                    return Ok(Some(Action::DismissNotification));
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let screen = c
                        .to_digit(10)
                        .and_then(|n| u8::try_from(n).ok())
                        .and_then(ScreenId::from_number);
                    if let Some(screen) = screen {
                        return Ok(Some(Action::SwitchScreen(screen)));
                    }
                }
                KeyCode::Tab => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
                }
                KeyCode::BackTab => {
                    return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
                }
                _ => {}
            }
        }

        match self.active() {
            Some(screen) => screen.handle_key_event(key),
            None => Ok(None),
        }
    }

    // ── Dispatch ────────────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_TTL)
                {
                    self.notification = None;
                }
                self.broadcast(&Action::Tick)?;
            }

            Action::SwitchScreen(target) => self.switch_to(target),

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            // ── Session ──
            Action::SignIn(credentials) => self.spawn_sign_in(credentials),

            Action::SignedIn(actor) => {
                info!(actor = %actor.id, "signed in");
                let note = Notification::success("Signed in", format!("Welcome, {}.", actor.name));
                self.forward(ScreenId::SignIn, &Action::SignedIn(actor.clone()))?;
                self.actor = Some(actor);
                self.notify(note);
                self.switch_to(ScreenId::Accounts);
                self.reload_all();
            }

            Action::SignInFailed(message) => {
                self.forward(ScreenId::SignIn, &Action::SignInFailed(message))?;
            }

            Action::Logout => {
                if let Err(e) = self.console.logout() {
                    warn!(error = %e, "could not clear the persisted session");
                }
                self.signed_out(Notification::info("Signed out", "See you next time."));
            }

            Action::SessionEnded => {
                if self.actor.is_some() {
                    self.signed_out(session_expired());
                }
            }

            // ── Collections ──
            Action::Reload(kind) => self.spawn_refresh(kind),

            // ── Forms ──
            Action::SubmitAccount(submission) => {
                self.spawn_submit(submission, |ticket, result| Action::AccountWritten {
                    ticket,
                    result,
                });
            }
            Action::SubmitItem(submission) => {
                self.spawn_submit(submission, |ticket, result| Action::ItemWritten {
                    ticket,
                    result,
                });
            }
            Action::Recover(kind, err) => self.spawn_recover(kind, err),

            // ── Deletes ──
            Action::DeleteAccount(target) => self.begin_delete(&target, PendingDelete::Account),
            Action::DeleteItem(target) => self.begin_delete(&target, PendingDelete::Item),
            Action::ConfirmYes => match self.pending_delete.take() {
                Some(PendingDelete::Account(request)) => self.spawn_delete(request),
                Some(PendingDelete::Item(request)) => self.spawn_delete(request),
                None => {}
            },
            Action::ConfirmNo => {
                if let Some(pending) = self.pending_delete.take() {
                    debug!(subject = %pending.prompt().subject, "delete cancelled");
                    let _ = match pending {
                        PendingDelete::Account(request) => request.cancel(),
                        PendingDelete::Item(request) => request.cancel(),
                    };
                }
            }

            // ── Notifications ──
            Action::Notify(note) => self.notify(note),
            Action::DismissNotification => self.notification = None,

            other if other.is_broadcast() => self.broadcast(&other)?,

            other => {
                if let Some(screen) = self.active() {
                    if let Some(follow_up) = screen.update(&other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Deliver to every screen; kind-specific actions are ignored by the rest.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn forward(&mut self, target: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&target) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        if target != ScreenId::SignIn && self.actor.is_none() {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.active() {
            screen.set_focused(false);
        }
        self.active_screen = target;
        if let Some(screen) = self.active() {
            screen.set_focused(true);
            debug!(screen = screen.id(), "focused");
        }
    }

    fn notify(&mut self, note: Notification) {
        self.notification = Some((note, Instant::now()));
    }

    /// Back to the sign-in screen with every overlay dropped.
    fn signed_out(&mut self, note: Notification) {
        info!("signed out");
        self.actor = None;
        self.pending_delete = None;
        self.help_visible = false;
        self.notify(note);
        self.switch_to(ScreenId::SignIn);
    }

    // ── Spawned work ────────────────────────────────────────────

    fn reload_all(&self) {
        self.spawn_refresh(ResourceKind::Account);
        self.spawn_refresh(ResourceKind::CatalogItem);
    }

    fn spawn_sign_in(&self, credentials: Credentials) {
        let console = Arc::clone(&self.console);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let Credentials {
                name,
                email,
                password,
            } = credentials;
            let result = match name {
                Some(name) => console.register(&name, &email, password).await,
                None => console.login(&email, password).await,
            };
            let _ = match result {
                Ok(actor) => tx.send(Action::SignedIn(actor)),
                Err(e) => {
                    warn!(error = %e, "sign-in failed");
                    tx.send(Action::SignInFailed(sign_in_message(&e)))
                }
            };
        });
    }

    /// Refetch one collection. The view publishes the outcome; an
    /// auth failure additionally ends the session.
    fn spawn_refresh(&self, kind: ResourceKind) {
        let console = Arc::clone(&self.console);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = match kind {
                ResourceKind::Account => console.refresh::<Account>().await,
                ResourceKind::CatalogItem => console.refresh::<CatalogItem>().await,
            };
            if let Err(e) = result {
                if e.kind() == ErrorKind::Auth {
                    let _ = tx.send(Action::SessionEnded);
                }
            }
        });
    }

    fn spawn_submit<R>(
        &self,
        submission: Submission<R>,
        wrap: fn(u64, Result<R, CoreError>) -> Action,
    ) where
        R: Managed,
        B: ResourceGateway<R>,
    {
        let console = Arc::clone(&self.console);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let Submission { ticket, request } = submission;
            debug!(kind = %R::KIND, ticket, "submitting");
            let result = request.dispatch(console.backend()).await;
            let _ = tx.send(wrap(ticket, result));
        });
    }

    fn spawn_recover(&self, kind: ResourceKind, err: CoreError) {
        let console = Arc::clone(&self.console);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let note = console.recover(kind, &err).await;
            let ended = !console.session().is_authenticated();
            let _ = tx.send(Action::Notify(note));
            if ended {
                let _ = tx.send(Action::SessionEnded);
            }
        });
    }

    /// Self-protection first; only an allowed request shows the dialog.
    fn begin_delete<R: Managed>(
        &mut self,
        target: &R,
        wrap: fn(DeleteRequest<R>) -> PendingDelete,
    ) {
        match self.console.request_delete(target) {
            Ok(request) => self.pending_delete = Some(wrap(request)),
            Err(refused) => {
                if let Some(note) = refused.notification() {
                    self.notify(note.clone());
                }
            }
        }
    }

    fn spawn_delete<R>(&self, request: DeleteRequest<R>)
    where
        R: Managed,
        B: ResourceGateway<R>,
    {
        let console = Arc::clone(&self.console);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let outcome = console.delete(request).await;
            if let Some(note) = outcome.notification() {
                let _ = tx.send(Action::Notify(note.clone()));
            }
            if !console.session().is_authenticated() {
                let _ = tx.send(Action::SessionEnded);
            }
        });
    }

    // ── Rendering ───────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if self.active_screen == ScreenId::SignIn {
            if let Some(screen) = self.screens.get(&ScreenId::SignIn) {
                screen.render(frame, area);
            }
        } else {
            let layout = Layout::vertical([
                Constraint::Min(1),    // screen
                Constraint::Length(1), // tabs
                Constraint::Length(1), // status
            ])
            .split(area);

            if let Some(screen) = self.screens.get(&self.active_screen) {
                screen.render(frame, layout[0]);
            }
            self.render_tab_bar(frame, layout[1]);
            self.render_status_bar(frame, layout[2]);
        }

        // Last drawn is topmost.
        if let Some((ref note, _)) = self.notification {
            dialog::render_notification(frame, area, note);
        }
        if let Some(ref pending) = self.pending_delete {
            dialog::render_confirm(frame, area, pending.prompt());
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let selected = ScreenId::ALL
            .iter()
            .position(|&s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let who = match &self.actor {
            Some(actor) => Span::styled(
                format!("● {} <{}>", actor.name, actor.email),
                Style::default().fg(theme::SUCCESS_GREEN),
            ),
            None => Span::styled("○ signed out", Style::default().fg(theme::ERROR_RED)),
        };
        let line = Line::from(vec![
            Span::raw(" "),
            who,
            Span::styled(format!(" │ {}", self.endpoint), Style::default().fg(theme::CORAL)),
            Span::styled(" │ ? help  L logout  q quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = centered(area, 52, 18);
        frame.render_widget(Clear, help_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let heading = |text: &'static str| {
            Line::from(Span::styled(format!("  {text}"), Style::default().fg(theme::NEON_CYAN)))
        };

        let lines = vec![
            Line::from(""),
            heading("Navigation"),
            entry("1-2 Tab", "Switch screen"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("r", "Reload"),
            Line::from(""),
            heading("Records"),
            entry("a", "Add new"),
            entry("e Enter", "Edit selected"),
            entry("d", "Delete selected"),
            Line::from(""),
            heading("Global"),
            entry("L", "Log out"),
            entry("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled("                 Esc or ? to close", theme::key_hint())),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// The text shown under the sign-in form. Backend texts pass through
/// unchanged ("invalid email or password").
fn sign_in_message(err: &CoreError) -> String {
    match err {
        CoreError::Auth { message } | CoreError::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use shopkeep_core::{
        MemoryBackend, MemorySessionStore, SessionState, StoredSession, ViewState,
    };

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn anonymous_app() -> App<MemoryBackend> {
        let session = SessionState::new(Arc::new(MemorySessionStore::default()));
        let console = Arc::new(Console::new(Arc::new(MemoryBackend::new()), session));
        console.initialize();
        App::new(console, "memory")
    }

    /// Signed in as a seeded "Ana" account.
    fn signed_in_app() -> (App<MemoryBackend>, Account) {
        let backend = Arc::new(MemoryBackend::new());
        let ana = backend.seed_account("Ana", "ana@x.com");
        let store = MemorySessionStore::with_record(StoredSession {
            token: Some("tok".into()),
            name: Some(ana.name.clone()),
            email: Some(ana.email.clone()),
            actor_id: Some(ana.id.to_string()),
        });
        let console = Arc::new(Console::new(backend, SessionState::new(Arc::new(store))));
        assert!(console.initialize());
        (App::new(console, "memory"), ana)
    }

    /// Process actions until the channel stays quiet.
    async fn settle(app: &mut App<MemoryBackend>) {
        while let Ok(Some(action)) =
            tokio::time::timeout(Duration::from_millis(100), app.action_rx.recv()).await
        {
            app.process_action(action).unwrap();
        }
    }

    async fn press(app: &mut App<MemoryBackend>, code: KeyCode) {
        if let Some(action) = app.handle_key_event(key(code)).unwrap() {
            app.process_action(action).unwrap();
        }
        settle(app).await;
    }

    async fn type_text(app: &mut App<MemoryBackend>, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch)).await;
        }
    }

    fn toast_title(app: &App<MemoryBackend>) -> Option<&str> {
        app.notification.as_ref().map(|(n, _)| n.title.as_str())
    }

    #[tokio::test]
    async fn anonymous_start_shows_sign_in() {
        let mut app = anonymous_app();
        app.start().unwrap();
        settle(&mut app).await;

        assert_eq!(app.active_screen, ScreenId::SignIn);
        // Navigation is locked until signed in.
        app.process_action(Action::SwitchScreen(ScreenId::Catalog))
            .unwrap();
        assert_eq!(app.active_screen, ScreenId::SignIn);
    }

    #[tokio::test]
    async fn register_signs_in_and_loads_collections() {
        let mut app = anonymous_app();
        app.start().unwrap();

        app.process_action(Action::SignIn(Credentials {
            name: Some("Ana".into()),
            email: "ana@x.com".into(),
            password: SecretString::from("p1".to_string()),
        }))
        .unwrap();
        settle(&mut app).await;

        assert_eq!(app.active_screen, ScreenId::Accounts);
        assert_eq!(app.actor.as_ref().map(|a| a.name.as_str()), Some("Ana"));
        let ViewState::Loaded { items, .. } = app.console.accounts().current() else {
            panic!("accounts not loaded");
        };
        assert_eq!(items.len(), 1);
        assert!(matches!(app.console.items().current(), ViewState::Loaded { .. }));
    }

    #[tokio::test]
    async fn failed_login_stays_on_sign_in() {
        let mut app = anonymous_app();
        app.start().unwrap();

        app.process_action(Action::SignIn(Credentials {
            name: None,
            email: "ghost@x.com".into(),
            password: SecretString::from("nope".to_string()),
        }))
        .unwrap();
        settle(&mut app).await;

        assert_eq!(app.active_screen, ScreenId::SignIn);
        assert!(app.actor.is_none());
    }

    #[tokio::test]
    async fn create_item_from_keyboard_refreshes_catalog() {
        let (mut app, _) = signed_in_app();
        app.start().unwrap();
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('2')).await;
        assert_eq!(app.active_screen, ScreenId::Catalog);

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Kopi").await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "1500000").await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "7").await;
        press(&mut app, KeyCode::Enter).await;

        let backend = app.console.backend();
        assert_eq!(backend.items.creates(), 1);
        let rows = app.console.items().items();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Kopi");
        assert_eq!(toast_title(&app), Some("Saved"));
    }

    #[tokio::test]
    async fn global_keys_are_text_while_form_is_open() {
        let (mut app, _) = signed_in_app();
        app.start().unwrap();
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('a')).await;
        press(&mut app, KeyCode::Char('q')).await;
        press(&mut app, KeyCode::Char('2')).await;

        assert!(app.running);
        assert_eq!(app.active_screen, ScreenId::Accounts);
    }

    #[tokio::test]
    async fn self_delete_is_refused_without_prompt() {
        let (mut app, _) = signed_in_app();
        app.start().unwrap();
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('d')).await;

        assert!(app.pending_delete.is_none());
        assert_eq!(toast_title(&app), Some("Not allowed"));
        assert_eq!(app.console.backend().accounts.deletes(), 0);
    }

    #[tokio::test]
    async fn delete_waits_for_confirmation() {
        let (mut app, _) = signed_in_app();
        app.console.backend().seed_item("Teh", 5_000.0, 2);
        app.start().unwrap();
        settle(&mut app).await;
        press(&mut app, KeyCode::Char('2')).await;

        press(&mut app, KeyCode::Char('d')).await;
        assert!(app.pending_delete.is_some());
        press(&mut app, KeyCode::Char('n')).await;
        assert!(app.pending_delete.is_none());
        assert_eq!(app.console.backend().items.deletes(), 0);

        press(&mut app, KeyCode::Char('d')).await;
        press(&mut app, KeyCode::Char('y')).await;

        assert_eq!(app.console.backend().items.deletes(), 1);
        assert!(app.console.items().items().is_empty());
        assert_eq!(toast_title(&app), Some("Deleted!"));
    }

    #[tokio::test]
    async fn rejected_token_returns_to_sign_in() {
        let (mut app, _) = signed_in_app();
        app.start().unwrap();
        settle(&mut app).await;

        app.console.backend().fail_next(CoreError::Auth {
            message: "Invalid or expired token".into(),
        });
        press(&mut app, KeyCode::Char('r')).await;

        assert_eq!(app.active_screen, ScreenId::SignIn);
        assert!(app.actor.is_none());
        assert!(!app.console.session().is_authenticated());
        assert_eq!(toast_title(&app), Some("Signed out"));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let (mut app, _) = signed_in_app();
        app.start().unwrap();
        settle(&mut app).await;

        press(&mut app, KeyCode::Char('L')).await;

        assert_eq!(app.active_screen, ScreenId::SignIn);
        assert!(!app.console.session().is_authenticated());
        assert!(matches!(app.console.accounts().current(), ViewState::Idle));
    }
}
