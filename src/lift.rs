// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

//! File level glue around the witness translation: where the flattened model and its
//! witnesses live, and writing the btor2 witness without leaving broken files behind.

use crate::btor2::{self, BitLayout, ModelError, TraceError, TranslateOptions, TranslateStats};
use crate::mc::CheckResult;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },
    #[error("{}: {source}", .path.display())]
    Trace {
        path: PathBuf,
        #[source]
        source: TraceError,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The AIGER version of the model, as produced by `btor2aiger <model> -a`.
pub fn aiger_model_path(model: &Path) -> PathBuf {
    append_extension(model, "aig")
}

/// Where the bit-level checker writes its witness.
pub fn aiger_witness_path(model: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join(append_extension(Path::new(file_name(model)), "cex"))
}

/// Where the lifted btor2 witness goes.
pub fn btor2_witness_path(model: &Path, out_dir: &Path) -> PathBuf {
    out_dir.join(append_extension(Path::new(file_name(model)), "cexb"))
}

fn file_name(path: &Path) -> &std::ffi::OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Parses the btor2 model and computes its bit layout.
pub fn load_layout(model: &Path) -> Result<BitLayout, Error> {
    let to_err = |source| Error::Model {
        path: model.to_path_buf(),
        source,
    };
    let decls = btor2::parse_file(model).map_err(to_err)?;
    BitLayout::build(&decls).map_err(to_err)
}

/// Translates the AIGER witness at `cex` into a btor2 witness at `cexb`.
/// The output is first written next to its destination and only moved into place once the
/// translation succeeded. If the witness is not a counterexample or cannot be translated,
/// no file is left at `cexb`, including one from an earlier run.
pub fn translate_file(
    layout: &BitLayout,
    cex: &Path,
    cexb: &Path,
    options: &TranslateOptions,
) -> Result<Option<TranslateStats>, Error> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| Error::Io { path, source }
    };
    let input = std::io::BufReader::new(std::fs::File::open(cex).map_err(io_err(cex))?);
    let tmp = append_extension(cexb, "tmp");
    let file = std::fs::File::create(&tmp).map_err(io_err(&tmp))?;
    let mut out = std::io::BufWriter::new(file);

    let res = btor2::translate(layout, input, &mut out, options).and_then(|stats| {
        std::io::Write::flush(&mut out)?;
        Ok(stats)
    });
    drop(out);
    match res {
        Ok(Some(stats)) => {
            std::fs::rename(&tmp, cexb).map_err(io_err(cexb))?;
            log::info!("wrote {} frame(s) to {}", stats.frames, cexb.display());
            Ok(Some(stats))
        }
        Ok(None) => {
            std::fs::remove_file(&tmp).map_err(io_err(&tmp))?;
            remove_stale(cexb).map_err(io_err(cexb))?;
            Ok(None)
        }
        Err(source) => {
            for path in [tmp.as_path(), cexb] {
                if let Err(e) = remove_stale(path) {
                    log::warn!("failed to remove {}: {e}", path.display());
                }
            }
            Err(Error::Trace {
                path: cex.to_path_buf(),
                source,
            })
        }
    }
}

fn remove_stale(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Lifts the witness of a finished checker run on the flattened `model`.
/// Returns the path of the btor2 witness, or `None` if the checker did not find a bug.
pub fn lift_witness(
    result: CheckResult,
    model: &Path,
    out_dir: &Path,
    options: &TranslateOptions,
) -> Result<Option<PathBuf>, Error> {
    if !result.is_counterexample() {
        log::info!("checker reported {result:?}, no witness to lift");
        return Ok(None);
    }
    let layout = load_layout(model)?;
    let cex = aiger_witness_path(model, out_dir);
    let cexb = btor2_witness_path(model, out_dir);
    log::info!("lifting {} to {}", cex.display(), cexb.display());
    Ok(translate_file(&layout, &cex, &cexb, options)?.map(|_| cexb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_paths() {
        let model = Path::new("bench/counter.btor2");
        assert_eq!(
            aiger_model_path(model),
            PathBuf::from("bench/counter.btor2.aig")
        );
        assert_eq!(
            aiger_witness_path(model, Path::new("out")),
            PathBuf::from("out/counter.btor2.cex")
        );
        assert_eq!(
            btor2_witness_path(model, Path::new("out")),
            PathBuf::from("out/counter.btor2.cexb")
        );
    }
}
