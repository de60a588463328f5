//! Sign-in screen shown while the session is anonymous.
//!
//! Takes every key. `Ctrl+r` switches between logging in and registering
//! a new account. Field rules are enforced by the console, whose error
//! comes back as `SignInFailed`.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use secrecy::SecretString;
use throbber_widgets_tui::{Throbber, ThrobberState};

use crate::action::{Action, Credentials};
use crate::component::Component;
use crate::theme;
use crate::widgets::centered;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Email,
    Password,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Password => "Password",
        }
    }
}

pub struct SignInScreen {
    mode: Mode,
    name: String,
    email: String,
    password: String,
    focus: usize,
    busy: bool,
    error: Option<String>,
    throbber: ThrobberState,
}

impl SignInScreen {
    pub fn new() -> Self {
        Self {
            mode: Mode::Login,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            focus: 0,
            busy: false,
            error: None,
            throbber: ThrobberState::default(),
        }
    }

    fn fields(&self) -> &'static [Field] {
        match self.mode {
            Mode::Login => &[Field::Email, Field::Password],
            Mode::Register => &[Field::Name, Field::Email, Field::Password],
        }
    }

    fn focused_field(&self) -> Field {
        self.fields()
            .get(self.focus)
            .copied()
            .unwrap_or(Field::Email)
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            Mode::Login => Mode::Register,
            Mode::Register => Mode::Login,
        };
        self.focus = 0;
        self.error = None;
    }

    fn submit(&mut self) -> Option<Action> {
        if self.busy {
            return None;
        }
        self.busy = true;
        self.error = None;
        Some(Action::SignIn(Credentials {
            name: (self.mode == Mode::Register).then(|| self.name.clone()),
            email: self.email.clone(),
            password: SecretString::from(self.password.clone()),
        }))
    }

    fn reset(&mut self) {
        *self = Self {
            mode: self.mode,
            ..Self::new()
        };
    }
}

impl Component for SignInScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') && !self.busy {
                self.toggle_mode();
            }
            return Ok(None);
        }

        let count = self.fields().len();
        let action = match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Enter => self.submit(),
            _ if self.busy => None,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % count;
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + count - 1) % count;
                None
            }
            KeyCode::Char(ch) => {
                let field = self.focused_field();
                self.value_mut(field).push(ch);
                None
            }
            KeyCode::Backspace => {
                let field = self.focused_field();
                self.value_mut(field).pop();
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.throbber.calc_next(),
            Action::SignInFailed(message) => {
                self.busy = false;
                self.password.clear();
                self.error = Some(message.clone());
                if let Some(idx) = self.fields().iter().position(|f| *f == Field::Password) {
                    self.focus = idx;
                }
            }
            Action::SignedIn(_) => self.reset(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let fields = self.fields();
        let height = u16::try_from(fields.len()).unwrap_or(3) + 8;
        let panel = centered(area, 58, height);

        let title = match self.mode {
            Mode::Login => " shopkeep · Sign in ",
            Mode::Register => " shopkeep · Register ",
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let mut lines = vec![Line::from("")];
        for (idx, field) in fields.iter().enumerate() {
            let focused = idx == self.focus && !self.busy;
            let label_style = if focused {
                theme::field_focused()
            } else {
                theme::field_label()
            };
            let value = match field {
                Field::Name => self.name.clone(),
                Field::Email => self.email.clone(),
                Field::Password => "•".repeat(self.password.chars().count()),
            };
            lines.push(Line::from(vec![
                Span::styled(if focused { " ▸ " } else { "   " }, label_style),
                Span::styled(format!("{:<10}", field.label()), label_style),
                Span::styled(value, theme::field_value()),
                Span::styled(
                    if focused { "▎" } else { "" },
                    Style::default().fg(theme::ELECTRIC_YELLOW),
                ),
            ]));
        }
        lines.push(Line::from(""));
        if let Some(ref err) = self.error {
            lines.push(Line::from(Span::styled(format!("   {err}"), theme::error_text())));
        }

        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        frame.render_widget(Paragraph::new(lines), rows[0]);

        if self.busy {
            let spinner = Throbber::default()
                .label(" Contacting the backend…")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(spinner, rows[1], &mut self.throbber.clone());
        } else {
            let other = match self.mode {
                Mode::Login => "register",
                Mode::Register => "sign in",
            };
            let hints = Line::from(vec![
                Span::styled(" Enter", theme::key_hint_key()),
                Span::styled(" submit  ", theme::key_hint()),
                Span::styled("Tab", theme::key_hint_key()),
                Span::styled(" next  ", theme::key_hint()),
                Span::styled("Ctrl+r", theme::key_hint_key()),
                Span::styled(format!(" {other}  "), theme::key_hint()),
                Span::styled("Esc", theme::key_hint_key()),
                Span::styled(" quit", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(hints), rows[1]);
        }
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &'static str {
        "SignIn"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn press(screen: &mut SignInScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut SignInScreen, text: &str) {
        for ch in text.chars() {
            press(screen, KeyCode::Char(ch));
        }
    }

    #[test]
    fn login_submits_email_and_password() {
        let mut screen = SignInScreen::new();
        type_text(&mut screen, "ana@x.com");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "p1");

        let Some(Action::SignIn(creds)) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected SignIn");
        };
        assert_eq!(creds.name, None);
        assert_eq!(creds.email, "ana@x.com");
        assert_eq!(creds.password.expose_secret(), "p1");

        // Busy: a second Enter sends nothing.
        assert!(press(&mut screen, KeyCode::Enter).is_none());
    }

    #[test]
    fn register_mode_adds_name() {
        let mut screen = SignInScreen::new();
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
            .unwrap();
        type_text(&mut screen, "Ana");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "ana@x.com");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "p1");

        let Some(Action::SignIn(creds)) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected SignIn");
        };
        assert_eq!(creds.name.as_deref(), Some("Ana"));
    }

    #[test]
    fn failure_clears_password_and_shows_error() {
        let mut screen = SignInScreen::new();
        type_text(&mut screen, "ana@x.com");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "wrong");
        press(&mut screen, KeyCode::Enter);

        screen
            .update(&Action::SignInFailed("invalid email or password".into()))
            .unwrap();

        assert!(!screen.busy);
        assert_eq!(screen.password, "");
        assert_eq!(screen.email, "ana@x.com");
        assert_eq!(screen.error.as_deref(), Some("invalid email or password"));
        assert_eq!(screen.focused_field(), Field::Password);
    }
}
