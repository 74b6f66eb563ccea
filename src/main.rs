//! minic - a small-C compiler front end
//!
//! Pipeline: lex -> parse -> semantic analysis -> (stub) code generation.

mod backend;
mod frontend;
mod utils;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use log::debug;

use backend::CodeGenerator;
use frontend::ast::Stmt;
use frontend::parser::Parser;
use frontend::semantic::SemanticAnalyzer;

/// minic compiler
#[derive(ClapParser, Debug)]
#[command(name = "minic")]
#[command(version = "0.1.0")]
#[command(about = "A compiler front end for a small C-like language")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output assembly file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pass the optimization flag to the code generator
    #[arg(long)]
    optimize: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to assembly
    Build {
        /// Input source file
        input: PathBuf,

        /// Output assembly file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pass the optimization flag to the code generator
        #[arg(long)]
        optimize: bool,
    },
    /// Check a source file for errors without generating code
    Check {
        /// Input source file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Build {
            input,
            output,
            optimize,
        }) => compile_file(&input, output, optimize),
        Some(Commands::Check { input }) => check_file(&input),
        None => match cli.input {
            Some(input) => compile_file(&input, cli.output, cli.optimize),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: minic <FILE> or minic build <FILE>");
                process::exit(1);
            }
        },
    }
}

/// Run the front end. Prints diagnostics and exits nonzero when the
/// source does not check out.
fn front_end(input: &Path) -> Result<Stmt> {
    let filename = input.display().to_string();
    let source =
        fs::read_to_string(input).with_context(|| format!("could not read '{filename}'"))?;

    debug!("parsing {filename}");
    let mut parser = Parser::new(&source);
    let mut program = parser.parse_program();
    if parser.had_error() {
        if let Some(error) = parser.into_error() {
            eprintln!("{}", error.report(&filename));
        }
        process::exit(1);
    }

    debug!("analyzing {filename}");
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze_program(&mut program);
    if analyzer.had_error() {
        for error in analyzer.errors() {
            eprintln!("{}", error.report(&filename));
        }
        process::exit(1);
    }

    Ok(program)
}

/// Compile a source file to assembly
fn compile_file(input: &Path, output: Option<PathBuf>, optimize: bool) -> Result<()> {
    println!("Compiling: {}", input.display());

    let program = front_end(input)?;

    let out_path = output.unwrap_or_else(|| input.with_extension("s"));
    let file = fs::File::create(&out_path)
        .with_context(|| format!("could not create '{}'", out_path.display()))?;

    let mut gen = CodeGenerator::new(file, optimize);
    gen.generate_program(&program)
        .with_context(|| format!("could not write '{}'", out_path.display()))?;

    println!("Wrote: {}", out_path.display());
    Ok(())
}

/// Check a source file for errors without generating code
fn check_file(input: &Path) -> Result<()> {
    println!("Checking: {}", input.display());

    front_end(input)?;

    println!("No errors found");
    Ok(())
}
