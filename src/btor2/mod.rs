// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>
mod error;
mod layout;
mod parse;
mod witness;

pub use error::{ModelError, SyntaxError, TraceError};
pub use layout::{BitLayout, BitRange, BitSpace, InputVar, StateVar};
pub use parse::{parse_file, parse_str, Declaration, SortKind};
pub use witness::{translate, translate_to_string, TranslateOptions, TranslateStats};

/// Id of a line in a btor2 file.
pub type LineId = u32;
pub type WidthInt = u32;
