//! Interactive terminal edit loop for a terrarium playground
//!
//! Each snippet is entered across one or more lines and submitted with
//! a blank line; the playground re-renders and the result (or the
//! error slot, with the previous output preserved) is printed. This is
//! the same edit cycle an embedded playground runs, driven by a
//! terminal instead of an editor widget.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use terrarium::{
    Element, Limits, Playground, PlaygroundConfig, RenderState, ScopeTable, Value,
};

const DEFAULT_SOURCE: &str = r#"render(<Card title="terrarium">Edit me!</Card>)"#;

#[derive(Parser)]
#[command(name = "terrarium-repl", version, about = "Live snippet playground in the terminal")]
struct Cli {
    /// Initial snippet file (defaults to a small demo)
    file: Option<PathBuf>,

    /// Print machine-readable state after each cycle
    #[arg(long)]
    json: bool,

    /// Maximum call depth during evaluation
    #[arg(long, default_value_t = 256)]
    depth: usize,
}

/// One cycle's outcome, as printed in `--json` mode.
#[derive(Serialize)]
struct Snapshot<'a> {
    success: bool,
    generation: u64,
    html: Option<&'a str>,
    error: Option<&'a str>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let initial = match &cli.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => DEFAULT_SOURCE.to_string(),
    };

    let config = PlaygroundConfig::new(initial, demo_scope()).limits(Limits {
        max_call_depth: cli.depth,
    });
    let mut playground = Playground::new(config);
    debug!(generation = playground.generation(), "playground ready");

    print_state(&playground, cli.json);

    let mut editor = DefaultEditor::new().context("initializing line editor")?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { ">> " } else { " . " };
        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && trimmed.starts_with(':') {
                    if !handle_command(trimmed, &mut playground, cli.json)? {
                        break;
                    }
                    continue;
                }

                if trimmed.is_empty() {
                    if buffer.is_empty() {
                        continue;
                    }
                    let source = std::mem::take(&mut buffer);
                    editor.add_history_entry(&source).ok();
                    playground.submit(source);
                    print_state(&playground, cli.json);
                } else {
                    buffer.push_str(&line);
                    buffer.push('\n');
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                println!("(cancelled)");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err).context("reading input"),
        }
    }

    Ok(())
}

/// Handle a `:command`. Returns false when the loop should exit.
fn handle_command(command: &str, playground: &mut Playground, json: bool) -> Result<bool> {
    match command {
        ":quit" | ":q" => return Ok(false),

        ":help" => {
            println!("Enter a snippet, then a blank line to run it.");
            println!("  :scope   list the names the snippet may reference");
            println!("  :source  show the current snippet");
            println!("  :state   re-print the current output and error");
            println!("  :reset   forget output and re-run the current snippet");
            println!("  :quit    exit");
        }

        ":scope" => {
            for name in playground.sandbox().scope().names() {
                println!("  {name}");
            }
        }

        ":source" => println!("{}", playground.source()),

        ":state" => print_state(playground, json),

        ":reset" => {
            let source = playground.source().to_string();
            playground.submit(source);
            print_state(playground, json);
        }

        other => println!("unknown command `{other}` (try :help)"),
    }
    Ok(true)
}

fn print_state(playground: &Playground, json: bool) {
    let state = playground.render_state();
    if json {
        print_snapshot(state, playground.generation());
        return;
    }

    match state.html() {
        Some(html) => println!("{html}"),
        None => println!("(no output)"),
    }
    if let Some(error) = state.error() {
        eprintln!("! {error}");
    }
}

fn print_snapshot(state: &RenderState, generation: u64) {
    let snapshot = Snapshot {
        success: state.error().is_none(),
        generation,
        html: state.html(),
        error: state.error(),
    };
    match serde_json::to_string(&snapshot) {
        Ok(line) => println!("{line}"),
        Err(err) => eprintln!("! snapshot serialization failed: {err}"),
    }
}

/// The demo allow-list: a couple of node components and helpers. Hosts
/// embedding the engine supply their own table; nothing here is special
/// to the engine.
fn demo_scope() -> ScopeTable {
    ScopeTable::builder()
        .bind("Box", Element::new("div").attr("id", "b"))
        .bind(
            "Card",
            Element::new("article").attr("class", "card"),
        )
        .bind("Badge", Element::new("span").attr("class", "badge"))
        .bind_fn("repeat", 2, |args| match (&args[0], &args[1]) {
            (Value::String(s), Value::Int(n)) if *n >= 0 => {
                Ok(Value::string(s.repeat(*n as usize)))
            }
            _ => Err("repeat(text, times) expects a string and a non-negative int".to_string()),
        })
        .bind_fn("join", 2, |args| match (&args[0], &args[1]) {
            (Value::List(items), Value::String(sep)) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                Ok(Value::string(parts.join(sep)))
            }
            _ => Err("join(list, separator) expects a list and a string".to_string()),
        })
        .build()
}
