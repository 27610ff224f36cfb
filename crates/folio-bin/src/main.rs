//! Folio driver: opens a demo book document, feeds it scripted edit
//! commands, and prints page contents plus the wire records a page turn or
//! close would transmit.
//!
//! Script syntax, one command per line (`#` starts a comment):
//!
//! ```text
//! type <text>      insert text at the caret ("\n" escapes allowed)
//! paste <text>     bulk insertion with the same escapes
//! key <name>       left|right|up|down|home|end|backspace|delete|enter
//! title <text>     set the header title
//! author <text>    set the header author
//! turn <pair>      turn to a leaf pair (flushes or requests pages)
//! show             print every non-empty page
//! flush            serialize dirty pages now
//! close            flush and stop
//! ```

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use folio_edit::{Applied, Caret, EditCommand, apply};
use folio_store::{Book, BookParams};
use folio_text::{FixedMeasure, WidthPartitioner};
use folio_wire::{SyncSerializer, WireRecord};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Book pagination engine driver")]
struct Args {
    /// Command script to run (stdin when omitted).
    pub script: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `folio.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Page count override.
    #[arg(long)]
    pub pages: Option<usize>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    /// Speak the legacy wire formats.
    #[arg(long)]
    pub legacy: bool,
    /// Open the document read-only.
    #[arg(long)]
    pub readonly: bool,
}

fn configure_logging(cfg: &folio_config::Config) -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(".", cfg.log.file.clone());
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cfg.log.level.clone()));
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None, // already installed (tests); drop guard
    }
}

fn unescape(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\t", "\t")
}

fn key_command(name: &str) -> Option<EditCommand> {
    Some(match name {
        "left" => EditCommand::Left,
        "right" => EditCommand::Right,
        "up" => EditCommand::Up,
        "down" => EditCommand::Down,
        "home" => EditCommand::Home,
        "end" => EditCommand::End,
        "backspace" => EditCommand::Backspace,
        "delete" => EditCommand::Delete,
        "enter" => EditCommand::Insert('\n'),
        _ => return None,
    })
}

fn print_records(records: &[WireRecord]) {
    for r in records {
        let hex: Vec<String> = r.bytes.iter().map(|b| format!("{b:02X}")).collect();
        println!("  -> {:?} [{}]", r.kind, hex.join(" "));
    }
    if records.is_empty() {
        println!("  -> nothing to send");
    }
}

fn show(book: &Book, caret: &Caret) {
    println!(
        "book {:#010x}: {} pages, pair {}/{}, caret page {} offset {} ({:?})",
        book.id(),
        book.page_count(),
        book.active_pair(),
        book.max_pair(),
        caret.page,
        caret.offset,
        caret.marker,
    );
    for p in 0..book.page_count() {
        if book.line_count(p) == 0 {
            continue;
        }
        println!("page {}:", p + 1);
        for l in 0..folio_text::PAGE_LINES {
            let text = book.line_text(p, l);
            if !book.line(p, l).is_empty() {
                println!("  |{text}|");
            }
        }
    }
}

fn report(applied: Applied) {
    if let Some(pair) = applied.page_turn {
        println!("  (page flipped to pair {pair})");
    }
    if applied.dropped_chars > 0 {
        println!("  ({} chars dropped past the last page)", applied.dropped_chars);
    }
}

fn run_line(book: &mut Book, caret: &mut Caret, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return true;
    }
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    match cmd {
        "type" => {
            for c in unescape(rest).chars() {
                report(apply(book, caret, EditCommand::Insert(c)));
            }
        }
        "paste" => report(apply(book, caret, EditCommand::Paste(unescape(rest)))),
        "key" => match key_command(rest) {
            Some(command) => report(apply(book, caret, command)),
            None => error!(target: "driver", key = rest, "unknown key"),
        },
        "title" => book.set_title(rest),
        "author" => book.set_author(rest),
        "turn" => match rest.parse::<usize>() {
            Ok(pair) => {
                let records = SyncSerializer::on_page_turn(book, pair);
                println!("turned to pair {}", book.active_pair());
                print_records(&records);
            }
            Err(_) => error!(target: "driver", arg = rest, "turn wants a pair number"),
        },
        "show" => show(book, caret),
        "flush" => print_records(&SyncSerializer::flush(book)),
        "close" => {
            print_records(&SyncSerializer::close(book));
            return false;
        }
        _ => error!(target: "driver", cmd, "unknown command"),
    }
    true
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = folio_config::load_from(args.config.clone())?;
    let _log_guard = configure_logging(&cfg);
    info!(target: "driver", "startup");

    let params = BookParams {
        id: 0x0B00_C001,
        page_count: args.pages.unwrap_or(cfg.book.pages).max(1),
        title: args.title.unwrap_or_else(|| cfg.book.title.clone()),
        author: args.author.unwrap_or_else(|| cfg.book.author.clone()),
        editable: !args.readonly,
        legacy_wire: args.legacy || cfg.protocol.legacy,
    };
    let partitioner = WidthPartitioner::new(FixedMeasure(1), cfg.book.columns);
    let mut book = Book::new(params, Box::new(partitioner));
    let mut caret = Caret::place(&book, 0, 0);

    let reader: Box<dyn Read> = match &args.script {
        Some(path) => Box::new(
            std::fs::File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?,
        ),
        None => Box::new(std::io::stdin()),
    };
    for line in BufReader::new(reader).lines() {
        let line = line.context("reading command")?;
        if !run_line(&mut book, &mut caret, &line) {
            break;
        }
    }
    info!(target: "driver", "shutdown");
    Ok(())
}
