//! CDXML Scheme Dump CLI
//!
//! A command line tool that parses a CDXML drawing and prints the
//! normalized reaction-scheme JSON.
//!
//! Usage:
//!   cdxml-dump <input-file> [options]
//!
//! Options:
//!   --svg <file>     Vector rendering of the same page (enables SVG crops)
//!   --position       Include positions in the output
//!   --cdxml          Include embedded fragment cdxml strings
//!   --compact        Print compact JSON instead of pretty

use clap::{Arg, Command};
use std::fs;

use cdxml::{parse, ParseRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("cdxml-dump")
        .version("0.1.0")
        .about("CDXML reaction-scheme extraction tool")
        .arg(
            Arg::new("input")
                .help("Input CDXML file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("svg")
                .long("svg")
                .value_name("FILE")
                .help("Vector rendering of the same page"),
        )
        .arg(
            Arg::new("position")
                .long("position")
                .help("Include positions in the output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cdxml")
                .long("cdxml")
                .help("Include embedded fragment cdxml strings")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print compact JSON instead of pretty")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input = matches
        .get_one::<String>("input")
        .expect("input is required");
    let content = fs::read_to_string(input)?;
    let svg_content = match matches.get_one::<String>("svg") {
        Some(path) => Some(fs::read_to_string(path)?),
        None => None,
    };

    let mut request = ParseRequest::new(&content);
    request.svg = svg_content.as_deref();
    request.with_position = matches.get_flag("position");
    request.with_cdxml = matches.get_flag("cdxml");
    let output = parse(request)?;

    let json = if matches.get_flag("compact") {
        serde_json::to_string(&output.data)?
    } else {
        serde_json::to_string_pretty(&output.data)?
    };
    println!("{}", json);
    Ok(())
}
