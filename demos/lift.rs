// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use btoraig::btor2::TranslateOptions;
use btoraig::lift;
use btoraig::mc::CheckResult;
use clap::{arg, Parser};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "lift")]
#[command(author = "Kevin Laeufer <laeufer@berkeley.edu>")]
#[command(version)]
#[command(about = "Translates the AIGER witness of a flattened btor2 model into a btor2 witness.", long_about = None)]
struct Args {
    #[arg(short, long)]
    verbose: bool,
    #[arg(long, help = "Append signal names to every assignment.")]
    names: bool,
    #[arg(
        short = 'w',
        long,
        help = "Directory that contains the AIGER witness. The btor2 witness is written there as well."
    )]
    witness_dir: PathBuf,
    #[arg(
        long,
        help = "File with the console output of the model checker. Nothing is translated unless it ends in `Unsafe`."
    )]
    checker_output: Option<PathBuf>,
    #[arg(value_name = "BTOR2", index = 1)]
    filename: PathBuf,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new().filter_level(level).init();

    let result = match &args.checker_output {
        Some(path) => CheckResult::from_checker_output(&read(path)),
        // without checker output, the header of the AIGER witness decides
        None => CheckResult::Unsafe,
    };
    let options = TranslateOptions {
        with_names: args.names,
    };
    match lift::lift_witness(result, &args.filename, &args.witness_dir, &options) {
        Ok(Some(path)) => println!("{}", path.display()),
        Ok(None) => println!("No counterexample to translate."),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read checker output!")
}
