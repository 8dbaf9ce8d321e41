//! Plain-text rendering of search results.
//!
//! ```text
//! +---------------------------------+----------+-------+------------+
//! | Book                            | Shop     | Price | Date       |
//! +---------------------------------+----------+-------+------------+
//! | Programming Python, 4th Edition | Labirint | 50.05 | 25-10-2018 |
//! +---------------------------------+----------+-------+------------+
//! ```

use bookstore_core::{PublisherSelector, SaleDetail};

const HEADERS: [&str; 4] = ["Book", "Shop", "Price", "Date"];

/// Column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

const ALIGN: [Align; 4] = [Align::Left, Align::Left, Align::Right, Align::Left];

/// Book / Shop / Price / Date table of sales.
#[derive(Debug, Default)]
pub struct SalesTable {
    rows: Vec<[String; 4]>,
}

impl SalesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one sale. Dates are shown as `dd-mm-YYYY`.
    pub fn push(&mut self, detail: &SaleDetail) {
        self.rows.push([
            detail.book_title.clone(),
            detail.shop_name.clone(),
            detail.sale.price().to_string(),
            detail.sale.date_sale.format("%d-%m-%Y").to_string(),
        ]);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table, header included even when there are no rows.
    pub fn render(&self) -> String {
        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let separator = {
            let parts: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
            format!("+{}+", parts.join("+"))
        };

        let mut lines = vec![separator.clone(), render_row(&HEADERS.map(String::from), &widths)];
        lines.push(separator.clone());
        for row in &self.rows {
            lines.push(render_row(row, &widths));
        }
        if !self.rows.is_empty() {
            lines.push(separator);
        }

        lines.join("\n")
    }
}

fn render_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(ALIGN)
        .map(|((cell, &width), align)| match align {
            Align::Left => format!(" {:<width$} ", cell, width = width),
            Align::Right => format!(" {:>width$} ", cell, width = width),
        })
        .collect();
    format!("|{}|", parts.join("|"))
}

/// Heading printed above a selector's table.
pub fn caption(selector: &str) -> String {
    match PublisherSelector::parse(selector) {
        PublisherSelector::Id(id) => format!("Publisher has ID {}:", id),
        PublisherSelector::IdOutOfRange(digits) => format!("Publisher has ID {}:", digits),
        PublisherSelector::NamePattern(pattern) if pattern.contains(|c: char| c == '%' || c == '_') => {
            format!("Publisher's name matches \"{}\":", pattern)
        }
        PublisherSelector::NamePattern(pattern) => format!("Publisher is {}:", pattern),
    }
}
