//! quarry-flatten: Flatten a GraphQL response into tabular frames
//!
//! Usage:
//!   # Read a response from a file, flatten against a query model
//!   quarry-flatten response.json --model query_model.json
//!
//!   # Read from stdin; without a model the selection set is inferred
//!   echo '{"data": {"xs": [{"a": 1}]}}' | quarry-flatten
//!
//!   # Write one .jsonl file per frame
//!   quarry-flatten response.json --model query_model.json --output-dir ./frames
//!
//!   # Short column names, overridden per frame
//!   quarry-flatten response.json --model m.json --naming short --naming-override launches=full

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use quarry::{
    infer_selection, FlattenOptions, Flattener, FrameWriter, GraphQlResponse, NamingOptions,
    NamingStrategy, QueryModel, SingleWriter,
};
use serde_json::Value;
use std::fs::File;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "quarry-flatten")]
#[command(about = "Flatten a GraphQL response into tabular frames", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Query model JSON file; without it the whole document is flattened as
    /// one frame with an inferred selection set
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Treat the input as a bare data document, not a {data, errors} envelope
    #[arg(long)]
    bare: bool,

    /// Output directory for separate .jsonl files per frame
    /// If omitted, writes to stdout as a single stream with a _frame column
    #[arg(long, short = 'o')]
    output_dir: Option<String>,

    /// Separator for nested column names (default: ".")
    #[arg(long)]
    separator: Option<String>,

    /// Column naming strategy: full or short (default: full)
    #[arg(long)]
    naming: Option<NamingStrategy>,

    /// Per-frame naming override, as frame=strategy (repeatable)
    #[arg(long = "naming-override", value_name = "FRAME=STRATEGY")]
    naming_overrides: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let body = read_json(args.input.as_deref())?;
    let (data, errors) = if args.bare {
        (body, None)
    } else {
        let response = GraphQlResponse::from_value(body)?;
        (response.data, response.errors)
    };

    if let Some(errors) = errors {
        eprintln!("Warning: the response carries upstream GraphQL errors:");
        eprintln!("{}", serde_json::to_string_pretty(&errors)?);
    }

    let model = match &args.model {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open model: {}", path))?;
            serde_json::from_reader(file).context("Failed to parse query model")?
        }
        None => QueryModel::implicit(infer_selection(std::slice::from_ref(&data))),
    };

    let options = build_options(&args)?;
    let tables = Flattener::new(options).flatten(&data, &model)?;

    if let Some(output_dir) = &args.output_dir {
        let mut writer = FrameWriter::new(output_dir)?;
        writer.write_tables(&tables)?;
        writer.flush()?;
    } else {
        let mut writer = SingleWriter::new(std::io::stdout());
        writer.write_tables(&tables)?;
        writer.flush()?;
    }

    Ok(())
}

fn build_options(args: &Args) -> Result<FlattenOptions> {
    let mut options = FlattenOptions::new();
    if let Some(separator) = &args.separator {
        if separator.is_empty() {
            bail!("separator must not be empty");
        }
        options.separator = separator.clone();
    }
    if let Some(naming) = args.naming {
        options.naming = NamingOptions {
            default: naming,
            ..NamingOptions::default()
        };
    }
    for entry in &args.naming_overrides {
        let Some((frame, strategy)) = entry.split_once('=') else {
            bail!("invalid naming override '{}': expected FRAME=STRATEGY", entry);
        };
        let strategy: NamingStrategy = strategy
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        options.naming.per_frame.insert(frame.to_string(), strategy);
    }
    Ok(options)
}

/// Read one JSON value, trying SIMD parsing first and falling back to
/// serde_json on malformed or exotic input.
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

    // simd-json parses in place, so give it a scratch copy. Deserializing
    // straight into serde_json::Value keeps object members in received order.
    let mut scratch = content.clone();
    match simd_json::serde::from_slice::<Value>(&mut scratch) {
        Ok(value) => Ok(value),
        Err(_) => serde_json::from_slice(&content).context("Failed to parse JSON"),
    }
}
