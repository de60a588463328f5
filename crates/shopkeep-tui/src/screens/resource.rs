//! Table screen shared by every resource kind.
//!
//! Rows come from the kind's `CollectionView` snapshots. `a` / `e` open
//! the form overlay, whose whole lifecycle lives in a `FormMachine`: the
//! screen only forwards keystrokes, hands validated submissions to the
//! app, and folds ticketed results back in.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use shopkeep_core::{
    Begin, CoreError, Draft, FormMachine, Managed, Notification, Resource, SubmitOutcome,
    Submission, ViewState,
};

use crate::action::Action;
use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;
use crate::widgets::form::render_form;

/// How a resource kind appears in the TUI and which actions carry it.
pub trait Tabular: Managed {
    type Form: Draft<Target = Self>;

    const SCREEN: ScreenId;
    const HEADERS: &'static [&'static str];

    fn widths() -> Vec<Constraint>;

    fn cells(&self) -> Vec<String>;

    /// The view snapshot carried by `action`, if it is for this kind.
    fn view_update(action: &Action) -> Option<&ViewState<Self>>;

    /// The ticketed write result carried by `action`, if it is for this kind.
    fn write_result(action: &Action) -> Option<(u64, &Result<Self, CoreError>)>;

    fn submit_action(submission: Submission<Self>) -> Action;

    fn delete_action(target: Self) -> Action;
}

pub struct ResourceScreen<R: Tabular> {
    focused: bool,
    view: ViewState<R>,
    rows: Arc<Vec<R>>,
    table_state: TableState,
    form: FormMachine<R::Form>,
    field_focus: usize,
    throbber: ThrobberState,
    action_tx: Option<UnboundedSender<Action>>,
}

impl<R: Tabular> ResourceScreen<R> {
    pub fn new() -> Self {
        Self {
            focused: false,
            view: ViewState::Idle,
            rows: Arc::new(Vec::new()),
            table_state: TableState::default(),
            form: FormMachine::new(),
            field_focus: 0,
            throbber: ThrobberState::default(),
            action_tx: None,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn select(&mut self, idx: usize) {
        let clamped = idx.min(self.rows.len().saturating_sub(1));
        self.table_state.select(Some(clamped));
    }

    fn move_selection(&mut self, down: bool) {
        if self.rows.is_empty() {
            return;
        }
        let current = self.selected_index();
        let next = if down {
            current + 1
        } else {
            current.saturating_sub(1)
        };
        self.select(next);
    }

    fn selected(&self) -> Option<&R> {
        self.rows.get(self.selected_index())
    }

    fn send(&self, action: Action) {
        if let Some(tx) = &self.action_tx {
            let _ = tx.send(action);
        }
    }

    // ── Form input ──────────────────────────────────────────────

    fn open_create(&mut self) {
        self.form.open_create();
        self.field_focus = 0;
    }

    fn open_edit(&mut self) {
        if let Some(entity) = self.selected().cloned() {
            self.form.open_edit(&entity);
            self.field_focus = 0;
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let field_count = <R::Form as Draft>::FIELDS.len();
        match key.code {
            KeyCode::Esc => {
                // A result still in flight is discarded by ticket.
                self.form.cancel();
                None
            }
            KeyCode::Enter => match self.form.begin_submit() {
                Begin::Dispatch(submission) => Some(R::submit_action(submission)),
                Begin::Invalid(err) => {
                    self.focus_invalid_field(&err);
                    None
                }
                Begin::Ignored => None,
            },
            KeyCode::Tab | KeyCode::Down => {
                self.field_focus = (self.field_focus + 1) % field_count;
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field_focus = (self.field_focus + field_count - 1) % field_count;
                None
            }
            KeyCode::Char(ch) => {
                if let Some(value) = self
                    .form
                    .draft_mut()
                    .and_then(|d| d.value_mut(self.field_focus))
                {
                    value.push(ch);
                }
                None
            }
            KeyCode::Backspace => {
                if let Some(value) = self
                    .form
                    .draft_mut()
                    .and_then(|d| d.value_mut(self.field_focus))
                {
                    value.pop();
                }
                None
            }
            _ => None,
        }
    }

    fn focus_invalid_field(&mut self, err: &CoreError) {
        if let CoreError::Validation {
            field: Some(key), ..
        } = err
        {
            if let Some(idx) = <R::Form as Draft>::FIELDS
                .iter()
                .position(|f| f.key == *key)
            {
                self.field_focus = idx;
            }
        }
    }

    /// Fold a gateway result into the form and decide what follows.
    fn complete(&mut self, ticket: u64, result: &Result<R, CoreError>) -> Option<Action> {
        match self.form.complete(ticket, result.clone()) {
            SubmitOutcome::Saved(entity) => {
                self.send(Action::Notify(Notification::success(
                    "Saved",
                    format!("The {} \"{}\" was saved.", R::KIND, entity.label()),
                )));
                Some(Action::Reload(R::KIND))
            }
            SubmitOutcome::Rejected(err) => {
                self.focus_invalid_field(&err);
                Some(Action::Recover(R::KIND, err))
            }
            SubmitOutcome::Discarded { saved: true } => Some(Action::Reload(R::KIND)),
            SubmitOutcome::Discarded { saved: false }
            | SubmitOutcome::Ignored
            | SubmitOutcome::Invalid(_) => None,
        }
    }

    // ── Rendering ───────────────────────────────────────────────

    fn title(&self) -> String {
        let label = R::SCREEN.label();
        match &self.view {
            ViewState::Loaded { items, fetched_at } => {
                let at = fetched_at.with_timezone(&chrono::Local).format("%H:%M:%S");
                format!(" {label} ({}) · {at} ", items.len())
            }
            ViewState::Loading { stale: Some(items) } => {
                format!(" {label} ({}) · reloading ", items.len())
            }
            _ => format!(" {label} "),
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        if self.rows.is_empty() {
            let text = format!("  No {}s yet. Press a to add one.", R::KIND);
            frame.render_widget(Paragraph::new(Span::styled(text, theme::key_hint())), area);
            return;
        }

        let header = Row::new(
            R::HEADERS
                .iter()
                .map(|h| Cell::from(*h).style(theme::table_header())),
        );

        let selected_idx = self.selected_index();
        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, entity)| {
                let is_selected = i == selected_idx;
                let mut cells = entity.cells().into_iter();
                let first = cells.next().unwrap_or_default();
                let prefix = if is_selected { "▸" } else { " " };
                let first = Cell::from(format!("{prefix}{first}")).style(
                    Style::default().fg(theme::NEON_CYAN).add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
                );
                Row::new(std::iter::once(first).chain(cells.map(Cell::from))).style(
                    if is_selected {
                        theme::table_selected()
                    } else {
                        theme::table_row()
                    },
                )
            })
            .collect();

        let table = Table::new(rows, R::widths())
            .header(header)
            .row_highlight_style(theme::table_selected());
        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        match &self.view {
            ViewState::Idle => {
                let hint = Span::styled("  Not loaded. Press r to load.", theme::key_hint());
                frame.render_widget(Paragraph::new(hint), area);
            }
            ViewState::Loading { stale: None } => {
                let spinner = Throbber::default()
                    .label(" Loading…")
                    .style(Style::default().fg(theme::NEON_CYAN))
                    .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
                frame.render_stateful_widget(spinner, area, &mut self.throbber.clone());
            }
            ViewState::Failed { error } => {
                let lines = vec![
                    Line::from(Span::styled(format!("  {error}"), theme::error_text())),
                    Line::from(Span::styled("  Press r to retry.", theme::key_hint())),
                ];
                frame.render_widget(Paragraph::new(lines), area);
            }
            ViewState::Loading { stale: Some(_) } | ViewState::Loaded { .. } => {
                self.render_table(frame, area);
            }
        }
    }
}

impl<R: Tabular> Component for ResourceScreen<R> {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if !self.form.is_idle() {
            return Ok(self.handle_form_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Char('g') => {
                self.select(0);
                None
            }
            KeyCode::Char('G') => {
                self.select(self.rows.len().saturating_sub(1));
                None
            }
            KeyCode::Char('a') => {
                self.open_create();
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                self.open_edit();
                None
            }
            KeyCode::Char('d') => self.selected().cloned().map(R::delete_action),
            KeyCode::Char('r') => Some(Action::Reload(R::KIND)),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::Tick = action {
            self.throbber.calc_next();
            return Ok(None);
        }
        if let Some(state) = R::view_update(action) {
            self.view = state.clone();
            if let Some(rows) = self.view.rows() {
                self.rows = Arc::clone(rows);
            } else if !self.view.is_loading() {
                self.rows = Arc::new(Vec::new());
            }
            if self.selected_index() >= self.rows.len() {
                self.select(self.rows.len().saturating_sub(1));
            }
            return Ok(None);
        }
        if let Some((ticket, result)) = R::write_result(action) {
            debug!(kind = %R::KIND, ticket, "write result");
            return Ok(self.complete(ticket, result));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        self.render_body(frame, layout[0]);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("a ", theme::key_hint_key()),
            Span::styled("add  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("edit  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("reload", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);

        if !self.form.is_idle() {
            render_form(frame, area, &self.form, self.field_focus, &self.throbber);
        }
    }

    fn captures_input(&self) -> bool {
        !self.form.is_idle()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &'static str {
        R::SCREEN.label()
    }
}
