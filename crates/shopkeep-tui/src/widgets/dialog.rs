//! Delete confirmation dialog and notification toast.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use shopkeep_core::{ConfirmPrompt, Notification, NotificationLevel};

use super::{centered, text_width};
use crate::theme;

/// "Are you sure?" with explicit y / n answers.
pub fn render_confirm(frame: &mut Frame, area: Rect, prompt: &ConfirmPrompt) {
    let question = format!("Delete {}?", prompt.subject);
    let width = (text_width(&question) + 6).clamp(44, 70);
    let dialog = centered(area, width, 7);

    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .title(format!(" {} ", prompt.title))
        .title_style(theme::field_focused())
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let text = vec![
        Line::from(Span::styled(
            format!(" {question}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(Span::styled(format!(" {}", prompt.text), theme::error_text())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y ", theme::key_hint_key()),
            Span::styled(format!("{}   ", prompt.confirm_label), theme::key_hint()),
            Span::styled("n/Esc ", theme::key_hint_key()),
            Span::styled(prompt.cancel_label, theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }), inner);
}

/// Toast in the bottom-right corner, above the status bar.
pub fn render_notification(frame: &mut Frame, area: Rect, note: &Notification) {
    let width = (text_width(&note.title) + text_width(&note.message) + 8).clamp(24, 72);
    let height = 3u16;
    let x = area.x + area.width.saturating_sub(width + 1);
    let y = area.y + area.height.saturating_sub(height + 2);
    let toast = Rect::new(x, y, width.min(area.width), height.min(area.height));

    let (color, icon) = match note.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(theme::BG_DARK));

    let inner = block.inner(toast);
    frame.render_widget(block, toast);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(
            format!("{} ", note.title),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(note.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
