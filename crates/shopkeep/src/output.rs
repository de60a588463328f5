//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use shopkeep_core::{Notification, NotificationLevel};
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(no_color: bool) -> bool {
    !no_color && io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Render a notification as a one-line status message.
pub fn format_notification(note: &Notification, color: bool) -> String {
    let title = if color {
        match note.level {
            NotificationLevel::Success => note.title.green().bold().to_string(),
            NotificationLevel::Error => note.title.red().bold().to_string(),
            NotificationLevel::Info => note.title.cyan().bold().to_string(),
        }
    } else {
        note.title.clone()
    };
    format!("{title} {}", note.message)
}

/// Print a notification to stderr, respecting quiet mode for non-errors.
pub fn print_notification(note: &Notification, quiet: bool, color: bool) {
    if quiet && note.level != NotificationLevel::Error {
        return;
    }
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{}", format_notification(note, color));
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Thing {
        id: &'static str,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ThingRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn things() -> Vec<Thing> {
        vec![
            Thing { id: "a1", name: "Kopi" },
            Thing { id: "b2", name: "Teh" },
        ]
    }

    #[test]
    fn plain_lists_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &things(),
            |t| ThingRow { name: t.name.into() },
            |t| t.id.into(),
        );
        assert_eq!(out, "a1\nb2");
    }

    #[test]
    fn table_uses_row_columns() {
        let out = render_list(
            &OutputFormat::Table,
            &things(),
            |t| ThingRow { name: t.name.into() },
            |t| t.id.into(),
        );
        assert!(out.contains("Name"));
        assert!(out.contains("Kopi"));
        assert!(!out.contains("a1"));
    }

    #[test]
    fn notification_without_color_is_plain_text() {
        let note = Notification::success("Deleted!", "The product has been deleted.");
        assert_eq!(
            format_notification(&note, false),
            "Deleted! The product has been deleted."
        );
    }
}
