// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::btor2::LineId;
use thiserror::Error;

/// A syntax problem found while tokenizing a btor2 line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub msg: String,
    /// 1-based line inside the model file
    pub line: usize,
    /// byte range of the offending token inside the whole file
    pub start: usize,
    pub end: usize,
}

/// The btor2 model cannot be turned into a bit layout.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to parse btor2 model: {}", describe_syntax(.0))]
    Syntax(Vec<SyntaxError>),
    #[error("[{id}] sort `{sort}` was not declared before its use")]
    UndeclaredSort { id: LineId, sort: LineId },
    #[error("[{id}] `{target}` does not point to a valid state")]
    UnknownState { id: LineId, target: LineId },
    #[error("[{id}] sort `{sort}` is an array, only array-free models can be flattened")]
    ArrayUnsupported { id: LineId, sort: LineId },
    #[error("[{id}] declared more than once")]
    DuplicateId { id: LineId },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn describe_syntax(errors: &[SyntaxError]) -> String {
    match errors.first() {
        Some(first) if errors.len() > 1 => format!(
            "line {}: {} (and {} more)",
            first.line,
            first.msg,
            errors.len() - 1
        ),
        Some(first) => format!("line {}: {}", first.line, first.msg),
        None => "unknown error".to_string(),
    }
}

/// The AIGER counterexample does not match the bit layout of the model.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: `{id}` needs bits [{start}, {end}), but the line only has {actual} bits")]
    LineTooShort {
        line: usize,
        id: LineId,
        start: usize,
        end: usize,
        actual: usize,
    },
    #[error("line {line}: trace ended while waiting for {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("line {line}: frame {frame} is missing its input line")]
    IncompleteFrame { line: usize, frame: u64 },
    #[error("line {line}, column {column}: `{found}` is not a valid bit (expected 0, 1 or x)")]
    InvalidBit {
        line: usize,
        column: usize,
        found: char,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
