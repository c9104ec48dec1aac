//! Interactive selection over a previewed listing.
//!
//! Selection expressions: `a` selects everything, `n` nothing, otherwise a
//! comma separated list of 1-based indices. Indices are kept in the order
//! typed, repeats included; out-of-range and non-numeric tokens are dropped.

use crate::console::{Console, TableView, Tone};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    None,
    /// 1-based, each within `1..=len`.
    Indices(Vec<usize>),
}

impl Selection {
    /// Records chosen by this selection, in selection order.
    pub fn pick<'a, T>(&self, records: &'a [T]) -> Vec<&'a T> {
        match self {
            Selection::All => records.iter().collect(),
            Selection::None => Vec::new(),
            Selection::Indices(indices) => indices
                .iter()
                .filter_map(|&i| records.get(i.checked_sub(1)?))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Parsed {
    All,
    Skip,
    Indices(Vec<usize>),
    NothingValid,
}

fn parse_selection(input: &str, len: usize) -> Parsed {
    let input = input.trim().to_lowercase();
    match input.as_str() {
        "a" => return Parsed::All,
        "n" => return Parsed::Skip,
        _ => {}
    }

    let indices: Vec<usize> = input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|t| t.parse::<usize>().ok())
        .filter(|&i| (1..=len).contains(&i))
        .collect();

    if indices.is_empty() {
        Parsed::NothingValid
    } else {
        Parsed::Indices(indices)
    }
}

/// What to show while selecting.
pub struct Preview<'a, T> {
    pub title: &'a str,
    pub headers: &'a [&'a str],
    pub records: &'a [T],
    pub cells: &'a dyn Fn(&T) -> Vec<String>,
    pub prompt: &'a str,
}

impl<T> Preview<'_, T> {
    fn table(&self, title: String, limit: usize) -> TableView {
        let mut headers = vec!["#"];
        headers.extend_from_slice(self.headers);
        let mut view = TableView::new(title, &headers);
        for (idx, record) in self.records.iter().take(limit).enumerate() {
            let mut row = vec![(idx + 1).to_string()];
            row.extend((self.cells)(record));
            view.push(row);
        }
        view
    }
}

/// Show up to `preview_limit` records, offer the full list when there are
/// more, then resolve the user's selection expression.
///
/// Malformed input never fails; it resolves to `Selection::None` with a
/// notice. Only a closed input stream is an error.
pub fn select<T>(
    console: &mut dyn Console,
    preview: &Preview<'_, T>,
    preview_limit: usize,
) -> Result<Selection> {
    let total = preview.records.len();
    if total == 0 {
        return Ok(Selection::None);
    }

    let title = if total > preview_limit {
        format!("{} (showing up to {})", preview.title, preview_limit)
    } else {
        preview.title.to_string()
    };
    console.table(&preview.table(title, preview_limit));
    console.message(Tone::Info, &format!("Total: {}", total));

    if total > preview_limit && console.confirm("See the full list?")? {
        console.table(&preview.table(format!("All {}", preview.title), total));
    }

    let answer = console.ask(preview.prompt)?;
    Ok(match parse_selection(&answer, total) {
        Parsed::All => Selection::All,
        Parsed::Skip => Selection::None,
        Parsed::Indices(indices) => Selection::Indices(indices),
        Parsed::NothingValid => {
            console.message(Tone::Warning, "No valid selection.");
            Selection::None
        }
    })
}
