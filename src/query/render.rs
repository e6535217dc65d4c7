//! Plain-text table rendering for result pages

use std::io::{self, Write};

use super::pager::PageView;
use crate::storage::{
    Field, MAX_NAME_BYTES, MAX_NATIONAL_ID_BYTES, MAX_PHONE_BYTES, MAX_POSITION_BYTES,
};

const ELLIPSIS: &str = "...";
const COLUMN_GAP: usize = 2;

/// Text budget per column, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name_width: usize,
    pub position_width: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            name_width: 47,
            position_width: 27,
        }
    }
}

impl ColumnLayout {
    /// Characters of text shown before the ellipsis.
    pub fn budget(&self, field: Field) -> usize {
        match field {
            Field::Id => 7,
            Field::Name => self.name_width,
            Field::Position => self.position_width,
            Field::Phone => 15,
            Field::NationalId => 14,
            Field::Status => 18,
        }
    }

    /// Full cell width including room for the ellipsis.
    pub fn cell_width(&self, field: Field) -> usize {
        let budget = self.budget(field);
        if budget >= self.max_text(field) {
            budget
        } else {
            budget + ELLIPSIS.len()
        }
    }

    // Longest text a field can hold, so columns that never truncate stay narrow.
    fn max_text(&self, field: Field) -> usize {
        match field {
            Field::Id => 7,
            Field::Name => MAX_NAME_BYTES,
            Field::Position => MAX_POSITION_BYTES,
            Field::Phone => MAX_PHONE_BYTES,
            Field::NationalId => MAX_NATIONAL_ID_BYTES,
            Field::Status => 18,
        }
    }
}

/// Column heading for a field.
pub fn header_label(field: Field) -> &'static str {
    match field {
        Field::Id => "Staff ID",
        Field::Name => "Name",
        Field::Position => "Position",
        Field::Phone => "Phone",
        Field::NationalId => "National ID",
        Field::Status => "Status",
    }
}

/// Cuts `text` to `budget` characters and appends `...` when it was longer.
pub fn ellipsize(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
    }
}

/// Writes header, divider, rows and footer for one page.
pub fn render_page<W: Write>(out: &mut W, view: &PageView, layout: &ColumnLayout) -> io::Result<()> {
    let widths: Vec<usize> = view
        .projection
        .iter()
        .map(|&f| layout.cell_width(f).max(header_label(f).len()))
        .collect();

    let mut header = String::new();
    let mut divider = String::new();
    for (field, width) in view.projection.iter().zip(&widths) {
        let label = header_label(*field);
        header.push_str(&format!("{:<w$}", label, w = width + COLUMN_GAP));
        divider.push_str(&format!(
            "{:<w$}",
            "-".repeat(label.len()),
            w = width + COLUMN_GAP
        ));
    }
    writeln!(out, "{}", header.trim_end())?;
    writeln!(out, "{}", divider.trim_end())?;

    if view.rows.is_empty() {
        writeln!(out, "No more records!")?;
    }

    for row in &view.rows {
        let mut line = String::new();
        for ((field, cell), width) in view.projection.iter().zip(&row.cells).zip(&widths) {
            let text = ellipsize(cell, layout.budget(*field));
            line.push_str(&format!("{:<w$}", text, w = width + COLUMN_GAP));
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", footer(view))?;
    Ok(())
}

fn footer(view: &PageView) -> String {
    let shown = view.rows.len();
    let matched = view.matched;
    format!(
        "Displaying {} {} of {} {}. (Page {} of {})",
        shown,
        if shown == 1 { "entry" } else { "entries" },
        matched,
        if matched == 1 { "entry" } else { "entries" },
        view.page + 1,
        view.last_page + 1,
    )
}
