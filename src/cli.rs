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
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Print overlaps from SAM alignments
    View {
        // Input file
        #[arg(group = "input", required = true, help = "Input .sam or .sam.gz file")]
        input_file: PathBuf,

        // Output format, defaults to PAF
        #[arg(long = "format", default_value = "paf")]
        format: String,

        // Batch size
        #[arg(short = 'b', long = "max-bytes", default_value_t = 1_073_741_824, help = "Estimated memory per batch in bytes")]
        max_bytes: u64,

        // Byte estimate
        #[arg(long = "overhead", default_value_t = samlap::parser::DEFAULT_RECORD_OVERHEAD, help = "Estimated fixed cost of one overlap in bytes")]
        record_overhead: u64,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Count batches and overlaps
    Stats {
        // Input file
        #[arg(group = "input", required = true, help = "Input .sam or .sam.gz file")]
        input_file: PathBuf,

        // Batch size
        #[arg(short = 'b', long = "max-bytes", default_value_t = 1_073_741_824, help = "Estimated memory per batch in bytes")]
        max_bytes: u64,

        // Byte estimate
        #[arg(long = "overhead", default_value_t = samlap::parser::DEFAULT_RECORD_OVERHEAD, help = "Estimated fixed cost of one overlap in bytes")]
        record_overhead: u64,

        // Number of passes over the input
        #[arg(long = "passes", default_value_t = 1, help = "Read the input this many times, resetting in between")]
        passes: u32,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}
