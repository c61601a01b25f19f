// File: ./src/cli.rs
//! Command-line front end: argument parsing, help and text rendering.
use crate::model::display::EntryDisplay;
use crate::model::entry::Entry;
use crate::model::filter::TagSelection;
use crate::model::parser::Zone;
use crate::model::record::{DeadlineRecord, TagType};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List { json: bool, all: bool },
    Add {
        name: String,
        datetime: Option<String>,
        tags: Vec<String>,
        details: Option<String>,
    },
    Remove(usize),
    Local,
    Tags,
    Toggle(String),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

/// Parses the arguments following the binary name.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut root: Option<PathBuf> = None;
    let mut verbose = false;
    let mut json = false;
    let mut all = false;
    let mut at: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut details: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "--help" | "-h" | "help" => {
                return Ok(Invocation {
                    root,
                    verbose,
                    command: Command::Help,
                });
            }
            "--root" | "-r" | "--at" | "--tags" | "--details" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("{} requires a value", arg);
                };
                match arg {
                    "--root" | "-r" => root = Some(PathBuf::from(value)),
                    "--at" => at = Some(value.clone()),
                    "--tags" => tags.extend(value.split_whitespace().map(str::to_string)),
                    _ => details = Some(value.clone()),
                }
                i += 1;
            }
            "--verbose" | "-v" => verbose = true,
            "--json" => json = true,
            "--all" | "-a" => all = true,
            other if other.starts_with('-') && other.len() > 1 => {
                bail!("Unknown option '{}'", other)
            }
            _ => positional.push(args[i].clone()),
        }
        i += 1;
    }

    let command = match positional.first().map(String::as_str) {
        None | Some("list") => Command::List { json, all },
        Some("add") => {
            let name = positional[1..].join(" ");
            if name.trim().is_empty() {
                bail!("add requires a name");
            }
            Command::Add {
                name,
                datetime: at,
                tags,
                details,
            }
        }
        Some("remove") | Some("rm") => {
            let Some(raw) = positional.get(1) else {
                bail!("remove requires an index (see 'deadlines local')");
            };
            match raw.parse::<usize>() {
                Ok(index) => Command::Remove(index),
                Err(_) => bail!("'{}' is not an index", raw),
            }
        }
        Some("local") => Command::Local,
        Some("tags") => Command::Tags,
        Some("toggle") => match positional.get(1) {
            Some(tag) => Command::Toggle(tag.clone()),
            None => bail!("toggle requires a tag"),
        },
        Some(other) => bail!("Unknown command '{}'", other),
    };

    Ok(Invocation {
        root,
        verbose,
        command,
    })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Deadlines v{} - Countdown board for conference and user deadlines",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [list] [--json] [--all]", binary_name);
    println!(
        "    {} add <name> [--at <datetime>] [--tags \"<tag> ...\"] [--details <text>]",
        binary_name
    );
    println!("    {} local", binary_name);
    println!("    {} remove <index>", binary_name);
    println!("    {} tags", binary_name);
    println!("    {} toggle <tag>", binary_name);
    println!("    {} --help", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -v, --verbose         Print debug logs to stderr.");
    println!("    --json                Print the list as JSON.");
    println!("    -a, --all             Ignore the tag filter.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("DATETIMES:");
    println!("    2026-03-15 23:59      Read in 'user_timezone' (default: this machine's zone)");
    println!("    2026-03-15T23:59      Same; stored as '2026-03-15 23:59:00'");
    println!("    2026-03-15T23:59Z     The trailing Z is dropped on submission");
    println!();
    println!("FILTER:");
    println!("    Selected tags combine with AND. With no tag selected every deadline is shown.");
}

fn pad(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - w))
    }
}

/// One line per entry: status, name, timer, deadline time and tags.
pub fn render_table(entries: &[&Entry], now: DateTime<Utc>, zone: &Zone) -> String {
    if entries.is_empty() {
        return "No deadlines.\n".to_string();
    }
    let rows: Vec<[String; 5]> = entries
        .iter()
        .map(|e| {
            [
                e.status_symbol(now).to_string(),
                e.name.clone(),
                e.timer_text(now),
                e.deadline_text(zone),
                e.tags.join(" "),
            ]
        })
        .collect();

    let mut widths = [0usize; 5];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| pad(cell, *w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn entries_json(entries: &[&Entry], now: DateTime<Utc>, zone: &Zone) -> Value {
    Value::Array(
        entries
            .iter()
            .map(|e| {
                json!({
                    "id": e.id,
                    "name": e.name,
                    "details": e.details,
                    "instant": e.instant.map(|i| i.to_rfc3339()),
                    "tags": e.tags,
                    "source": e.source,
                    "past": e.is_past(now),
                    "timer": e.timer_text(now),
                    "deadline": e.deadline_text(zone),
                })
            })
            .collect(),
    )
}

pub fn render_tags(types: &[TagType], selection: &TagSelection) -> String {
    if types.is_empty() {
        return "No tags in the catalog.\n".to_string();
    }
    let width = types
        .iter()
        .map(|t| UnicodeWidthStr::width(t.tag.as_str()))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for t in types {
        let mark = if selection.is_selected(&t.tag) { "[x]" } else { "[ ]" };
        out.push_str(format!("{} {}  {}", mark, pad(&t.tag, width), t.name).trim_end());
        out.push('\n');
    }
    out
}

pub fn render_local(records: &[DeadlineRecord]) -> String {
    if records.is_empty() {
        return "No local deadlines.\n".to_string();
    }
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        let datetime = record.datetime.as_deref().unwrap_or("TBA");
        out.push_str(&format!("{:>3}  {}  {}\n", index, datetime, record.display_name()));
    }
    out
}
