// samlap: Memory-bounded batching of SAM alignments into overlaps.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::BufWriter;
use std::path::Path;

use clap::CommandFactory;
use clap::Parser;

use samlap::parser::BatchParser;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    // Only fails if a logger is already set
    let _ = stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init();
}

/// Opens `path` or exits with an error message.
fn open_parser(
    path: &Path,
    record_overhead: u64,
) -> BatchParser {
    match BatchParser::open(path) {
        Ok(parser) => {
            log::info!("reading alignments from {}", path.display());
            parser.with_record_overhead(record_overhead)
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        },
    }
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    match &cli.command {
        // View
        Some(cli::Commands::View {
            input_file,
            format,
            max_bytes,
            record_overhead,
            verbose,
        }) => {
            init_log(if *verbose { 3 } else { 1 });

            let format: samlap::Format = match format.parse() {
                Ok(format) => format,
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                },
            };

            let mut parser = open_parser(input_file, *record_overhead);
            let mut conn_out = BufWriter::new(std::io::stdout().lock());

            match samlap::parse_to_write(&mut parser, format, *max_bytes, &mut conn_out) {
                Ok(summary) => log::info!("wrote {} overlaps in {} batches, skipped {} records", summary.overlaps, summary.batches, summary.skipped),
                Err(e) => {
                    log::error!("failed to convert {}: {}", input_file.display(), e);
                    std::process::exit(1);
                },
            }
        },

        // Stats
        Some(cli::Commands::Stats {
            input_file,
            max_bytes,
            record_overhead,
            passes,
            verbose,
        }) => {
            init_log(if *verbose { 3 } else { 1 });

            let mut parser = open_parser(input_file, *record_overhead);

            for pass in 0..*passes {
                if pass > 0 {
                    if let Err(e) = parser.reset() {
                        log::error!("{}", e);
                        std::process::exit(1);
                    }
                }
                match samlap::summarize(&mut parser, *max_bytes) {
                    Ok(summary) => println!("{}\t{}\t{}\t{}\t{}",
                                            input_file.display(), pass + 1, summary.batches, summary.overlaps, summary.skipped),
                    Err(e) => {
                        log::error!("failed to read {}: {}", input_file.display(), e);
                        std::process::exit(1);
                    },
                }
            }
        },

        None => {
            let _ = cli::Cli::command().print_help();
        },
    }
}
