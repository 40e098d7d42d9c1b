use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => print_warning(&format!("could not render JSON: {}", e)),
    }
}

pub fn print_table<T: Tabled>(items: Vec<T>) {
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("  {:<12} {}", format!("{}:", label).dimmed(), value);
}

pub fn print_rows<T: Serialize, R: Tabled>(items: &[T], rows: Vec<R>, format: Format) {
    match format {
        Format::Json => print_json(&items),
        Format::Table => {
            if rows.is_empty() {
                println!("No records");
            } else {
                print_table(rows);
            }
        }
    }
}
