//! Parses a C++ compound statement and prints its outline.
//!
//! ```text
//! cpp-parser input.cpp
//! cpp-parser --trace --max-depth 512 input.cpp
//! ```

use clap::Parser;
use parsing_example::cpp::CppParser;
use parsing_framework::config::DEFAULT_MAX_RECURSION_DEPTH;
use parsing_framework::ParserConfig;
use std::error::Error;
use std::path::PathBuf;
use std::{fs, io, process};

#[derive(Parser)]
#[command(name = "cpp-parser")]
#[command(about = "Parses a C++ compound statement and prints its outline")]
struct Args {
    /// Source file containing one compound statement
    file: PathBuf,

    /// Write a trace of rule activations to standard error
    #[arg(long)]
    trace: bool,

    /// Maximum number of nested rule activations
    #[arg(long, default_value_t = DEFAULT_MAX_RECURSION_DEPTH)]
    max_depth: usize,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(&args.file)?;
    let file_name = args.file.display().to_string();
    let parser = CppParser::with_config(
        ParserConfig::new().with_max_recursion_depth(args.max_depth),
    )?;

    let result = if args.trace {
        let log = parser.domain().parse_log(Box::new(io::stderr()));
        parser.trace_statement(&source, &file_name, log)
    } else {
        parser.parse_statement(&source, &file_name)
    };
    let statement = result.map_err(|error| error.render())?;

    let mut outline = String::new();
    statement.write_outline(&mut outline, 0)?;
    print!("{outline}");
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("{error}");
        process::exit(1);
    }
}
