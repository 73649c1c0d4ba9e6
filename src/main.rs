// SQOPL: tokenizer and parser driver

use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser as _;
use crossterm::style::Stylize;
use env_logger::{self as logger};

use sqopl::parser::ast::Node;
use sqopl::parser::{Diagnostic, Lexer, Parser};

const SQOPL_DEBUG_LOG: &str = "SQOPL_DEBUG_LOG";
const SQOPL_DEBUG_LOG_STYLE: &str = "SQOPL_DEBUG_LOG_STYLE";

/// Tokenize and parse SQOPL source files.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Source file to read, or `-` for stdin
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the token stream instead of parsing
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST
    #[arg(long, conflicts_with = "tokens")]
    ast: bool,

    /// Disable coloured diagnostics
    #[arg(long)]
    no_color: bool,
}

fn bootstrap() {
    if std::env::var(SQOPL_DEBUG_LOG).is_ok() {
        logger::Builder::from_env(
            logger::Env::new()
                .filter(SQOPL_DEBUG_LOG)
                .write_style(SQOPL_DEBUG_LOG_STYLE),
        )
        .format_timestamp_micros()
        .init();
        log::debug!("logging initialized");
    } else {
        logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .format_timestamp_millis()
            .init()
    }
}

fn open(opt: &Opt) -> Result<Lexer, Diagnostic> {
    if opt.input.as_os_str() == "-" {
        Lexer::from_reader(io::stdin().lock())
    } else {
        Lexer::from_reader(File::open(&opt.input)?)
    }
}

fn run(opt: &Opt) -> Result<(), Diagnostic> {
    let mut lexer = open(opt)?;
    let mut out = io::stdout().lock();

    if opt.tokens {
        for token in lexer.by_ref() {
            writeln!(out, "{}", token?)?;
        }
        return Ok(());
    }

    let mut count = 0;
    for statement in Parser::from_lexer(lexer) {
        let statement = statement?;
        count += 1;
        if opt.ast {
            writeln!(out, "{:#?}", statement)?;
        } else {
            writeln!(out, "{} {}", statement.location(), statement.kind())?;
        }
    }

    log::info!("parsed {} top-level statements", count);
    Ok(())
}

fn report(opt: &Opt, err: &Diagnostic) {
    let color = !opt.no_color && io::stderr().is_terminal();
    let name = opt.input.display();
    let place = match err.location() {
        Some(location) => format!("{}:{}", name, location.start),
        None => name.to_string(),
    };

    if color {
        eprintln!("{} {} {}", "error:".red().bold(), place.bold(), err);
    } else {
        eprintln!("error: {} {}", place, err);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap();
    let opt = Opt::parse();

    if let Err(err) = run(&opt) {
        log::debug!("{:?}", err);
        report(&opt, &err);
        process::exit(1);
    }

    Ok(())
}
