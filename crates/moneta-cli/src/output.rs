//! Plain-text tables for terminal output.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub struct Column {
    pub title: &'static str,
    pub align: Align,
}

impl Column {
    pub const fn left(title: &'static str) -> Self {
        Self { title, align: Align::Left }
    }

    pub const fn right(title: &'static str) -> Self {
        Self { title, align: Align::Right }
    }
}

fn pad(value: &str, width: usize, align: Align) -> String {
    let fill = width.saturating_sub(value.chars().count());
    match align {
        Align::Left => format!("{}{}", value, " ".repeat(fill)),
        Align::Right => format!("{}{}", " ".repeat(fill), value),
    }
}

/// Render rows under a header line. Widths are measured in characters so
/// accented names line up.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.title.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(columns.iter().zip(&widths))
            .map(|(cell, (column, width))| pad(cell, *width, column.align))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(columns.iter().map(|c| c.title).collect()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

pub fn print_table(columns: &[Column], rows: &[Vec<String>]) {
    println!("{}", render_table(columns, rows));
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
