use std::collections::BTreeSet;
use std::fmt::Display;
use std::io::{self, BufRead};

use anyhow::{Context, Result, bail};
use clap::Parser;
use itertools::Itertools;
use tracing::{Level, info};

use seqmatch::{Automaton, Direction, Segments, Specials, Text, Token};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern to compile
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// Inputs to match (one per line from stdin if omitted)
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Match right to left; indices are still reported in written order
    #[arg(short = 'b', long)]
    backward: bool,

    /// Treat inputs as whitespace-separated symbols
    #[arg(short = 's', long)]
    segments: bool,

    /// Multi-character symbol to keep whole in the pattern
    #[arg(short = 'S', long = "special", value_name = "SYMBOL")]
    specials: Vec<String>,

    /// Macro class, e.g. `V=a,e,ai`; expansions are tried in order
    #[arg(short = 'm', long = "macro", value_name = "KEY=EXP,...", value_parser = parse_macro)]
    macros: Vec<(String, Vec<String>)>,

    /// Report every start index, not just index 0
    #[arg(long)]
    search: bool,

    /// Require the whole input to match
    #[arg(long, conflicts_with = "search")]
    full: bool,

    /// Print the parsed tree and the automaton before matching
    #[arg(long)]
    dump: bool,

    /// More logging (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_macro(arg: &str) -> Result<(String, Vec<String>), String> {
    let (key, expansions) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=EXP,... but got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("macro key is empty".to_string());
    }
    let expansions = expansions
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
        .collect();
    Ok((key.to_string(), expansions))
}

fn init_tracing(verbose: u8) {
    let from_env = std::env::var("SEQMATCH_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok());
    let level = from_env.unwrap_or(match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    });
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let inputs = if args.inputs.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read stdin")?
    } else {
        args.inputs.clone()
    };

    let failed = if args.segments {
        run(&args, &inputs, Segments::parse)?
    } else {
        run(&args, &inputs, Text::new)?
    };
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Match every input; returns true if none matched.
fn run<T>(args: &Args, inputs: &[String], read: fn(&str) -> T) -> Result<bool>
where
    T: Token + Display,
{
    let mut specials = Specials::<T>::new();
    for (key, expansions) in &args.macros {
        specials.insert_literals(key.as_str(), expansions);
    }
    let direction = if args.backward {
        Direction::Backward
    } else {
        Direction::Forward
    };

    let automaton = Automaton::builder(&args.pattern)
        .direction(direction)
        .special_symbols(args.specials.iter().cloned())
        .specials(specials)
        .build()
        .with_context(|| format!("Invalid pattern '{}'", args.pattern))?;
    info!(
        states = automaton.machine().graph.len(),
        groups = automaton.groups().len(),
        "pattern compiled"
    );

    if args.dump {
        let tree = automaton.expression();
        println!("tree: {tree} ({} nodes)", tree.size());
        print!("{}", automaton.machine());
        for (id, group) in automaton.groups() {
            println!("group {id}:");
            print!("{group}");
        }
    }

    if inputs.is_empty() {
        bail!("No inputs to match.");
    }

    let mut any = false;
    for line in inputs {
        let natural = read(line);
        let len = natural.len();
        let input = match direction {
            Direction::Forward => natural.clone(),
            Direction::Backward => natural.reversed(),
        };
        let shown = |indices: &BTreeSet<usize>| {
            indices
                .iter()
                .map(|&i| natural_index(direction, len, i))
                .sorted()
                .join(",")
        };
        if args.search {
            let hits = automaton.search(&input);
            any |= !hits.is_empty();
            let listed = hits
                .iter()
                .map(|(start, ends)| (natural_index(direction, len, *start), shown(ends)))
                .sorted()
                .map(|(start, ends)| format!("{start}:{{{ends}}}"))
                .join(" ");
            println!("{natural}\t{listed}");
        } else if args.full {
            let ok = automaton.full_match(&input);
            any |= ok;
            println!("{natural}\t{}", if ok { "match" } else { "no match" });
        } else {
            let ends = automaton.find(&input, 0);
            any |= !ends.is_empty();
            println!("{natural}\t{{{}}}", shown(&ends));
        }
    }
    Ok(!any)
}

/// Map an index of the matched input back to the input as written.
///
/// A backward automaton runs over the reversed input, so its index `i`
/// is position `len - i` of the original.
fn natural_index(direction: Direction, len: usize, index: usize) -> usize {
    match direction {
        Direction::Forward => index,
        Direction::Backward => len - index,
    }
}
