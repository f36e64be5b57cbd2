use std::ffi::OsString;
use std::fmt::Display;
use std::hash::Hash;
use std::io::{self, Read};
use std::process;

use clap::{App, Arg};
use huffman_table::{build_code_table, build_tree, count_frequencies, CodeTable, Result};
use log::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Options {
    chars: bool,
    sort: bool,
}

fn app() -> App<'static, 'static> {
    App::new("huffman-table")
        .about("Prints a Huffman code for the symbols read from standard input.")
        .arg(Arg::with_name("chars")
            .long("chars")
            .help("Uses every non-whitespace character as a symbol instead of whitespace-delimited tokens")
        )
        .arg(Arg::with_name("sort")
            .long("sort")
            .help("Prints entries by code length instead of tree order")
        )
}

fn parse_options<I, T>(args: I) -> clap::Result<Options>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = app().get_matches_from_safe(args)?;
    Ok(Options {
        chars: matches.is_present("chars"),
        sort: matches.is_present("sort"),
    })
}

fn code_table_for<Symbol, I>(symbols: I) -> Result<CodeTable<Symbol>>
where
    Symbol: Hash + Eq + Clone,
    I: IntoIterator<Item = Symbol>,
{
    let frequencies = count_frequencies(symbols);
    info!("Tallied {} distinct symbols", frequencies.len());

    let root = build_tree(frequencies)?;
    build_code_table(&root)
}

fn print_table<Symbol: Hash + Eq + Clone + Display>(table: &CodeTable<Symbol>, sort: bool) {
    let entries = if sort {
        table.sorted_by_code()
    } else {
        table.iter().collect()
    };

    for (symbol, code) in entries {
        println!("Symbol: {}, Code: {}", symbol, code);
    }
}

fn main() {
    env_logger::init();

    let options = parse_options(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        error!("Failed to read standard input: {}", e);
        process::exit(1);
    }

    let result = if options.chars {
        code_table_for(input.chars().filter(|c| !c.is_whitespace()))
            .map(|table| print_table(&table, options.sort))
    } else {
        code_table_for(input.split_whitespace()).map(|table| print_table(&table, options.sort))
    };

    if let Err(e) = result {
        error!("Could not build code table: {}", e);
        process::exit(1);
    }
}
