//! Create/edit overlay rendered straight from a `FormMachine`.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use shopkeep_core::{CoreError, Draft, FormMachine, FormMode, Resource};

use super::centered;
use crate::theme;

const LABEL_WIDTH: usize = 10;

/// Overlay title, e.g. " New product " or " Edit account ".
pub fn title<D: Draft>(form: &FormMachine<D>) -> String {
    let kind = D::Target::KIND;
    match form.mode() {
        Some(FormMode::Edit(_)) => format!(" Edit {kind} "),
        _ => format!(" New {kind} "),
    }
}

/// What a field shows: secrets masked, a hint for a blank secret on edit.
fn shown_value<D: Draft>(form: &FormMachine<D>, idx: usize) -> (String, Style) {
    let Some(draft) = form.draft() else {
        return (String::new(), theme::field_value());
    };
    let raw = draft.value(idx);
    let secret = D::FIELDS.get(idx).is_some_and(|f| f.secret);
    if !secret {
        return (raw.to_owned(), theme::field_value());
    }
    if raw.is_empty() && matches!(form.mode(), Some(FormMode::Edit(_))) {
        return ("(unchanged)".into(), theme::key_hint());
    }
    ("•".repeat(raw.chars().count()), theme::field_value())
}

pub fn render_form<D: Draft>(
    frame: &mut Frame,
    area: Rect,
    form: &FormMachine<D>,
    focus: usize,
    throbber: &ThrobberState,
) {
    let field_count = u16::try_from(D::FIELDS.len()).unwrap_or(u16::MAX);
    let overlay = centered(area, 56, field_count + 7);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .title(title(form))
        .title_style(theme::field_focused())
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme::ELECTRIC_PURPLE))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let submitting = form.is_submitting();
    let invalid_field = match form.error() {
        Some(CoreError::Validation { field, .. }) => *field,
        _ => None,
    };

    let mut lines = Vec::with_capacity(D::FIELDS.len() + 4);
    for (idx, field) in D::FIELDS.iter().enumerate() {
        let focused = idx == focus && !submitting;
        let label_style = if invalid_field == Some(field.key) {
            theme::error_text().add_modifier(Modifier::BOLD)
        } else if focused {
            theme::field_focused()
        } else {
            theme::field_label()
        };
        let (value, value_style) = shown_value(form, idx);
        lines.push(Line::from(vec![
            Span::styled(if focused { "▸ " } else { "  " }, label_style),
            Span::styled(format!("{:<LABEL_WIDTH$}", field.label), label_style),
            Span::styled(value, value_style),
            Span::styled(
                if focused { "▎" } else { "" },
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(err) = form.error() {
        lines.push(Line::from(Span::styled(format!("  {err}"), theme::error_text())));
    } else {
        lines.push(Line::from(""));
    }

    let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(Paragraph::new(lines), rows[0]);

    if submitting {
        let spinner = Throbber::default()
            .label(" Saving…")
            .style(Style::default().fg(theme::NEON_CYAN))
            .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
        frame.render_stateful_widget(spinner, rows[1], &mut throbber.clone());
    } else {
        let hints = Line::from(vec![
            Span::styled(" Tab", theme::key_hint_key()),
            Span::styled(" next  ", theme::key_hint()),
            Span::styled("Enter", theme::key_hint_key()),
            Span::styled(" save  ", theme::key_hint()),
            Span::styled("Esc", theme::key_hint_key()),
            Span::styled(" cancel", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[1]);
    }
}
