//! Parses an XML document and prints the events it reports.
//!
//! ```text
//! xml-parser document.xml
//! xml-parser --trace document.xml
//! ```

use clap::Parser;
use parsing_example::xml::{EventRecorder, XmlParser};
use parsing_framework::config::DEFAULT_MAX_RECURSION_DEPTH;
use parsing_framework::ParserConfig;
use std::cell::RefCell;
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;
use std::{fs, io, process};

#[derive(Parser)]
#[command(name = "xml-parser")]
#[command(about = "Parses an XML document and prints its events")]
struct Args {
    /// XML document to parse
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
    let parser = XmlParser::with_config(
        ParserConfig::new().with_max_recursion_depth(args.max_depth),
    )?;

    let recorder = Rc::new(RefCell::new(EventRecorder::new()));
    let result = if args.trace {
        let log = parser.domain().parse_log(Box::new(io::stderr()));
        parser.trace(&source, &file_name, recorder.clone(), log)
    } else {
        parser.parse(&source, &file_name, recorder.clone())
    };
    result.map_err(|error| error.render())?;

    for event in recorder.borrow().events() {
        println!("{event}");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("{error}");
        process::exit(1);
    }
}
