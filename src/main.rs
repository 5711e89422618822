use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

use anyhow::{Context, Result};
use bayesnet::common::setup::{OutputFormat, parse_configuration_options};
use bayesnet::inference::query::{answer, parse_queries};
use bayesnet::{print_blue, print_green, print_yellow};
use log::{info, warn};

fn main() -> Result<()> {
    let config = parse_configuration_options()?;
    let source = config.network_source()?;
    let network = source.load()?;
    print_blue!("Loaded {:?} with {} variables", source, network.len());

    let text = match &config.queries_file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read query file {}", path))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read queries from stdin")?;
            buffer
        }
    };
    let queries = parse_queries(&text)?;
    info!("Parsed {} queries", queries.len());

    let mut out: Box<dyn Write> = match &config.output_file {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create output file {}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut failures = 0;
    for query in &queries {
        match answer(&network, query) {
            Ok(result) => match config.format {
                OutputFormat::Plain => writeln!(out, "{}", result.render(config.precision))?,
                OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&result)?)?,
            },
            Err(err) => {
                failures += 1;
                warn!("{}: {}", query, err);
                match config.format {
                    OutputFormat::Plain => writeln!(out, "error: {}", err)?,
                    OutputFormat::Json => writeln!(
                        out,
                        "{}",
                        serde_json::json!({"kind": "error", "query": query.to_string(), "message": err.to_string()})
                    )?,
                }
            }
        }
    }
    out.flush()?;

    if failures == 0 {
        print_green!("Answered {} queries", queries.len());
    } else {
        print_yellow!("Answered {} queries, {} failed", queries.len() - failures, failures);
    }
    Ok(())
}
