// PATHDIV: Batch Aggregation of AS-Path Diversity from Collected BGP Updates
// Copyright (C) 2024-2025 The pathdiv developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
use std::path::Path;

use clap::{Parser, ValueEnum};
use itertools::Itertools;

use pathdiv::{
    aggregator::BatchAggregator,
    plot,
    records::RawUpdate,
    sink::CsvSink,
    source::{CsvSource, MrtSource, SourceError},
    strategy::ReductionStrategy,
    util,
};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Format {
    /// MRT update dumps, one per collector.
    #[default]
    Mrt,
    /// Pre-extracted update CSVs (`collector;time;prefix;path`).
    Csv,
}

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
struct Args {
    /// Input files, one per collector for MRT inputs.
    #[arg(required = true)]
    inputs: Vec<String>,
    /// Input file format.
    #[arg(short, long, value_enum, default_value_t = Format::Mrt)]
    format: Format,
    /// Collectors to track, in order. With MRT inputs, the i-th name is
    /// assigned to the i-th input file.
    #[arg(short, long, value_delimiter = ',', default_value = "rrc00")]
    collectors: Vec<String>,
    /// Window duration in minutes.
    #[arg(short, long, default_value_t = 60)]
    window_minutes: i64,
    /// Reduction strategies to apply per window, in order.
    #[arg(short, long, value_delimiter = ',', default_value = "max_paths")]
    strategies: Vec<ReductionStrategy>,
    /// Output path for the per-window summary CSV.
    #[arg(short, long, default_value = "./diversity_batches.csv")]
    output: String,
    /// Also emit the trailing partial window.
    #[arg(long)]
    flush_partial: bool,
    /// Directly show the plot.
    #[arg(long)]
    show_plot: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    util::init_logging();

    let args = Args::parse();

    let mut aggregator = BatchAggregator::new(
        chrono::Duration::minutes(args.window_minutes),
        args.collectors.iter().cloned(),
        args.strategies.clone(),
    );
    let mut sink = CsvSink::create(&args.output)?;

    // open all inputs and merge them into one time-ordered stream
    let mut sources: Vec<Box<dyn Iterator<Item = Result<RawUpdate, SourceError>>>> = Vec::new();
    for (i, input) in args.inputs.iter().enumerate() {
        log::info!("Opening {input}");
        match args.format {
            Format::Mrt => {
                let collector = args
                    .collectors
                    .get(i)
                    .ok_or(format!("no collector name given for input file {input}"))?;
                sources.push(Box::new(MrtSource::new(input, collector.as_str())?));
            }
            Format::Csv => sources.push(Box::new(CsvSource::new(input)?)),
        }
    }
    let merged = sources.into_iter().kmerge_by(|a, b| {
        // surface errors as early as possible
        let key = |u: &Result<RawUpdate, SourceError>| {
            u.as_ref().map(|u| u.time).unwrap_or(f64::NEG_INFINITY)
        };
        key(a) <= key(b)
    });

    let mut rows = Vec::new();
    for update in merged {
        let emitted = aggregator.ingest(update?);
        sink.append(&emitted)?;
        rows.extend(emitted);
    }
    if args.flush_partial {
        let emitted = aggregator.flush();
        sink.append(&emitted)?;
        rows.extend(emitted);
    }
    sink.flush()?;
    log::info!("wrote {} summary rows to {}", rows.len(), args.output);

    plot::render(
        &rows,
        Path::new(&args.output).with_extension("html"),
        args.show_plot,
    );

    Ok(())
}
