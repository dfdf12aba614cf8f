//! Replay a recorded editor event trace through a `Tracker` and print what
//! happens, for debugging tracking behavior outside any editor.
//!
//! The trace is JSON lines, one event per line:
//!
//! ```json
//! {"event":"open","text":"","cursors":[{"line":0,"character":0}]}
//! {"event":"edit","changes":[{"start":{"line":0,"character":0},"end":{"line":0,"character":0},"text":"()"}]}
//! {"event":"select","cursors":[{"line":0,"character":1}]}
//! {"event":"leap"}
//! {"event":"snapshot"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result, bail};
use overleap_config::Config;
use overleap_engine::{
    ContentChange, ContextBroadcaster, DecorationStyle, Decorator, PairId, Position, Tracker,
};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use std::{env, fs::File, io::stdin, process};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum TraceEvent {
    Open {
        text: String,
        cursors: Vec<Position>,
    },
    Edit {
        changes: Vec<ContentChange>,
    },
    Select {
        cursors: Vec<Position>,
    },
    Config {
        #[serde(flatten)]
        config: Config,
    },
    Leap,
    Escape,
    Snapshot,
    Close,
}

/// Prints decoration traffic instead of drawing anything.
struct PrintDecorator;

impl Decorator for PrintDecorator {
    fn decorate(&mut self, id: PairId, close: Position, _style: &DecorationStyle) {
        println!("decorate   pair={} close={}", id.0, close);
    }

    fn undecorate(&mut self, id: PairId) {
        println!("undecorate pair={}", id.0);
    }
}

struct PrintBroadcaster;

impl ContextBroadcaster for PrintBroadcaster {
    fn set_in_leaper_mode(&mut self, active: bool) {
        println!("context    in_leaper_mode={active}");
    }

    fn set_has_line_of_sight(&mut self, visible: bool) {
        println!("context    has_line_of_sight={visible}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: overleap-cli [trace.jsonl]");
        eprintln!("Reads a JSON-lines event trace (stdin when omitted or `-`).");
        process::exit(1);
    }
    let input: Box<dyn Read> = match args.get(1).map(String::as_str) {
        None | Some("-") => Box::new(stdin()),
        Some(path) => {
            Box::new(File::open(path).with_context(|| format!("Failed to open trace {path}"))?)
        }
    };

    let config = Config::load()
        .context("Failed to load config")?
        .unwrap_or_default();
    let settings = config.to_settings().context("Invalid config")?;

    let mut tracker: Option<Tracker> = None;
    for (number, line) in BufReader::new(input).lines().enumerate() {
        let line = line.context("Failed to read trace line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event: TraceEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("Bad event on line {}", number + 1))?;
        debug!(line = number + 1, "replaying trace event");
        if let TraceEvent::Open { text, cursors } = &event {
            let mut replaced = tracker.replace(Tracker::new(
                text,
                cursors,
                settings.clone(),
                Box::new(PrintDecorator),
                Box::new(PrintBroadcaster),
            ));
            if let Some(tracker) = replaced.as_mut() {
                tracker.dispose();
            }
            continue;
        }

        let Some(tracker) = tracker.as_mut() else {
            bail!("Event on line {} arrived before any `open`", number + 1);
        };
        match event {
            TraceEvent::Open { .. } => unreachable!("handled above"),
            TraceEvent::Edit { changes } => tracker.handle_content_changes(&changes),
            TraceEvent::Select { cursors } => tracker.handle_selection_change(&cursors),
            TraceEvent::Config { config } => {
                tracker.handle_configuration_change(config.to_settings()?)
            }
            TraceEvent::Leap => match tracker.leap() {
                Some(target) => {
                    println!("leap       -> {target}");
                    // The host would move the cursor; the trace does not
                    // repeat that, so echo the selection change here.
                    tracker.handle_selection_change(&[target]);
                }
                None => println!("leap       -> (no-op)"),
            },
            TraceEvent::Escape => tracker.escape_leaper_mode(),
            TraceEvent::Snapshot => {
                println!("{}", serde_json::to_string_pretty(&tracker.snapshot())?)
            }
            TraceEvent::Close => tracker.dispose(),
        }
    }

    Ok(())
}
