//! Terminal table rendering

use colored::*;
use unicode_width::UnicodeWidthStr;

const MAX_CELL_WIDTH: usize = 40;

/// Cut a cell to `max` display columns, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let text = text.replace(['\n', '\r'], " ");
    if text.width() <= max {
        return text;
    }

    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Column widths fitting the header and every cell
pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.width())
                .chain(std::iter::once(h.width()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Print an aligned table. `style` may colour a whole row by index.
pub fn print_table<F>(headers: &[String], rows: &[Vec<String>], style: F)
where
    F: Fn(usize, String) -> ColoredString,
{
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| truncate(c, MAX_CELL_WIDTH)).collect())
        .collect();
    let headers: Vec<String> = headers.iter().map(|h| truncate(h, MAX_CELL_WIDTH)).collect();
    let widths = column_widths(&headers, &rows);

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    println!("{}", header_line.join("  ").bold());

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    println!("{}", rule.join("  ").dimmed());

    for (i, row) in rows.iter().enumerate() {
        let line: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, w)| pad(row.get(col).map(String::as_str).unwrap_or(""), *w))
            .collect();
        println!("{}", style(i, line.join("  ")));
    }
}
