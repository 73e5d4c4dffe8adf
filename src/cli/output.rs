//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use std::collections::HashMap;

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::client::{PlainCard, PlainLogin};
use crate::rpc::protocol::{BinaryItem, TextItem};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Render metadata as `key=value` pairs in key order.
pub fn format_meta(meta: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = meta.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_logins_table(items: &[PlainLogin]) {
    if items.is_empty() {
        info("No logins stored.");
        return;
    }
    let mut table = new_table(vec!["Login", "Password", "Meta"]);
    for item in items {
        table.add_row(vec![
            item.login.clone(),
            item.password.as_str().to_string(),
            format_meta(&item.meta),
        ]);
    }
    println!("{table}");
}

pub fn print_cards_table(items: &[PlainCard]) {
    if items.is_empty() {
        info("No bank cards stored.");
        return;
    }
    let mut table = new_table(vec!["Number", "Holder", "Expires", "CSC", "Meta"]);
    for item in items {
        table.add_row(vec![
            item.number.clone(),
            item.holder.clone(),
            item.expires.clone(),
            item.security_code.as_str().to_string(),
            format_meta(&item.meta),
        ]);
    }
    println!("{table}");
}

pub fn print_texts_table(items: &[TextItem]) {
    if items.is_empty() {
        info("No texts stored.");
        return;
    }
    let mut table = new_table(vec!["Text", "Meta"]);
    for item in items {
        table.add_row(vec![item.value.clone(), format_meta(&item.meta)]);
    }
    println!("{table}");
}

/// Binary items are listed by size; contents are not printed.
pub fn print_binaries_table(items: &[BinaryItem]) {
    if items.is_empty() {
        info("No binary items stored.");
        return;
    }
    let mut table = new_table(vec!["#", "Size", "Meta"]);
    for (i, item) in items.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            format!("{} bytes", item.value.len()),
            format_meta(&item.meta),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_is_sorted_by_key() {
        let meta = HashMap::from([
            ("site".to_string(), "example.com".to_string()),
            ("note".to_string(), "work".to_string()),
        ]);
        assert_eq!(format_meta(&meta), "note=work, site=example.com");
    }

    #[test]
    fn empty_meta_formats_empty() {
        assert_eq!(format_meta(&HashMap::new()), "");
    }
}
