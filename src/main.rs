use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::Ast;
use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::scanner::Scanner;
use rox::token::Token;
use rox::{parser, resolver, RunError};

/// Exit code for errors found before execution.
const EXIT_STATIC: i32 = 65;

/// Exit code for errors raised while executing.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses and resolves a file, printing its AST
    Parse { filename: PathBuf },

    /// Runs a file as a Rox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt
    Repl,
}

/// Reads the contents of a file as UTF‑8 text
fn read_file(filename: &PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = String::new();

    let bytes = reader
        .read_to_string(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        debug!("Reporting: {}", e);
        eprintln!("{}", e);
    }
}

fn tokenize(filename: PathBuf, json: bool) -> Result<()> {
    let source = read_file(&filename)?;
    let mut tokens: Vec<Token> = Vec::new();
    let mut tokenized = true;

    for item in Scanner::new(&source) {
        match item {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }
            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?
        );
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_STATIC);
        std::process::exit(EXIT_STATIC);
    }

    Ok(())
}

fn parse(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;

    let checked = rox::scanner::scan(&source).and_then(|tokens| {
        let statements = parser::parse(&tokens)?;
        resolver::resolve(&statements)?;
        Ok(statements)
    });

    match checked {
        Ok(statements) => {
            println!("{}", Ast.print_program(&statements));
            Ok(())
        }
        Err(errors) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
    }
}

fn run_file(filename: PathBuf) -> Result<()> {
    let source = read_file(&filename)?;
    let mut interpreter = Interpreter::new();

    match rox::run(&mut interpreter, &source) {
        Ok(()) => {
            info!("Program executed successfully");
            Ok(())
        }
        Err(RunError::Static(errors)) => {
            report(&errors);
            std::process::exit(EXIT_STATIC);
        }
        Err(RunError::Runtime(e)) => {
            report(std::slice::from_ref(&e));
            std::process::exit(EXIT_RUNTIME);
        }
    }
}

/// One interpreter for the whole session, so each line sees earlier globals.
fn repl() -> Result<()> {
    let mut interpreter = Interpreter::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        match rox::run(&mut interpreter, &line) {
            Ok(()) => {}
            Err(RunError::Static(errors)) => report(&errors),
            Err(RunError::Runtime(e)) => report(std::slice::from_ref(&e)),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => tokenize(filename, json),
        Commands::Parse { filename } => parse(filename),
        Commands::Run { filename } => run_file(filename),
        Commands::Repl => repl(),
    }
}
