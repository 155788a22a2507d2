//! quarry-infer: Infer a selection set from a GraphQL response
//!
//! Prints every leaf path found in the response data, one dotted path per
//! line (or a JSON array with --json). The output can be edited down and fed
//! into a query model, or used to preview which columns `quarry-flatten`
//! would produce without a model.
//!
//! Usage:
//!   # Read from file, output to stdout
//!   quarry-infer response.json
//!
//!   # Read from stdin
//!   echo '{"data": {"xs": [{"a": 1}]}}' | quarry-infer
//!
//!   # Bare document, JSON output
//!   quarry-infer --bare --json data.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use quarry::{infer_selection, GraphQlResponse};
use serde_json::Value;
use std::fs::File;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "quarry-infer")]
#[command(about = "Infer a selection set from a GraphQL response", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Treat the input as a bare data document, not a {data, errors} envelope
    #[arg(long)]
    bare: bool,

    /// Separator for printed paths (default: ".")
    #[arg(long)]
    separator: Option<String>,

    /// Output a JSON array instead of one path per line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let separator = args.separator.as_deref().unwrap_or(".");

    let body = read_json(args.input.as_deref())?;
    let data = if args.bare {
        body
    } else {
        GraphQlResponse::from_value(body)?.data
    };

    let selection = infer_selection(std::slice::from_ref(&data));
    if selection.is_empty() {
        eprintln!("Warning: no leaf paths found in input");
    }

    let paths: Vec<String> = selection
        .sorted()
        .into_iter()
        .map(|p| p.join(separator))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        for path in paths {
            println!("{}", path);
        }
    }

    Ok(())
}

fn read_json(input: Option<&str>) -> Result<Value> {
    let mut content = Vec::new();
    match input {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("Failed to open file: {}", path))?
                .read_to_end(&mut content)?;
        }
        None => {
            std::io::stdin().read_to_end(&mut content)?;
        }
    }

    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_slice(&content).context("Failed to parse JSON"),
    }
}
