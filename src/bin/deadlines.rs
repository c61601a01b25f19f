use anyhow::{Result, bail};
use chrono::Utc;
use deadlines::cli::{self, Command, Invocation};
use deadlines::config::Config;
use deadlines::context::{AppContext, StandardContext};
use deadlines::controller::{Board, RenderOutcome};
use deadlines::logging;
use deadlines::model::record::DeadlineRecord;
use std::env;
use std::io::{self, Write};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Invocation {
        root,
        verbose,
        command,
    } = match cli::parse_args(&args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try 'deadlines --help'.");
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        cli::print_help("deadlines");
        return Ok(());
    }

    let ctx = StandardContext::from_env(root);
    let config = Config::load_or_default(&ctx)?;
    if let Err(e) = logging::init(&ctx, config.log_level(), verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    log::debug!("Data directory: {}", ctx.get_data_dir()?.display());

    let board = Board::open(&ctx, config)?;
    let mut out = io::stdout().lock();

    match command {
        Command::List { json, all } => {
            let render = match board.render(Utc::now()).await {
                RenderOutcome::Fresh(render) => render,
                RenderOutcome::Stale => bail!("render superseded by a newer one"),
            };
            let entries = if all {
                render.ordered()
            } else {
                render.visible()
            };
            if json {
                let value = cli::entries_json(&entries, render.now, board.zone());
                writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
            } else {
                write!(out, "{}", cli::render_table(&entries, render.now, board.zone()))?;
            }
        }
        Command::Add {
            name,
            datetime,
            tags,
            details,
        } => {
            let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            let mut record = DeadlineRecord::new(&name, datetime.as_deref(), &tag_refs);
            record.details = details;
            let count = board.add_local(record)?;
            writeln!(out, "Added '{}' ({} local deadlines).", name, count)?;
        }
        Command::Remove(index) => match board.remove_local(index)? {
            Some(removed) => writeln!(out, "Removed '{}'.", removed.display_name())?,
            None => bail!("No local deadline at index {}", index),
        },
        Command::Local => {
            write!(out, "{}", cli::render_local(&board.local_records()?))?;
        }
        Command::Tags => {
            let selection = board.selection(&board.all_tags());
            write!(out, "{}", cli::render_tags(&board.tag_types(), &selection))?;
        }
        Command::Toggle(tag) => {
            if !board.all_tags().contains(&tag) {
                bail!("Unknown tag '{}' (see 'deadlines tags')", tag);
            }
            let selection = board.toggle_tag(&tag)?;
            let state = if selection.is_selected(&tag) {
                "selected"
            } else {
                "unselected"
            };
            writeln!(out, "Tag '{}' {}.", tag, state)?;
        }
        Command::Help => cli::print_help("deadlines"),
    }
    Ok(())
}
