//! Plain padded tables for read-only views.

use crate::cli::io;

/// Simple table model; column widths follow the widest cell.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<T: Into<String>>(title: Option<T>, headers: &[&str]) -> Self {
        Self {
            title: title.map(|value| value.into()),
            headers: headers.iter().map(|header| header.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.rows
            .push(cells.into_iter().map(|value| value.into()).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders the table as lines without a trailing newline.
    pub fn render_lines(&self) -> Vec<String> {
        let widths = self.widths();
        let format_row = |cells: &[String]| {
            widths
                .iter()
                .enumerate()
                .map(|(idx, width)| {
                    let cell = cells.get(idx).map(String::as_str).unwrap_or("");
                    format!("{:width$}", cell, width = *width)
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        if let Some(title) = &self.title {
            lines.push(title.clone());
        }
        lines.push(format_row(&self.headers));
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        lines.push("-".repeat(total.max(1)));
        for row in &self.rows {
            lines.push(format_row(row));
        }
        lines
    }

    pub fn print(&self) {
        for line in self.render_lines() {
            io::print_info(line);
        }
    }
}
