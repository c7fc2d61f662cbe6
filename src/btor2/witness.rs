// Copyright 2023 The Regents of the University of California
// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

//! Lifts an AIGER witness into a btor2 witness.
//!
//! The AIGER witness of a flattened btor2 model consists of a status line, a property line,
//! an initialization line and then, for every frame, one line of latch bits and one line of
//! input bits, terminated by a `.`.

use crate::btor2::{BitLayout, BitRange, BitSpace, InputVar, LineId, StateVar, TraceError};
use crate::mc::CheckResult;
use std::collections::HashMap;
use std::io::{BufRead, Write};

type Result<T> = std::result::Result<T, TraceError>;

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Appends the btor2 symbol name (if any) to each assignment, e.g., `0 1 reset@0`.
    pub with_names: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslateStats {
    pub frames: u64,
}

enum ParserState {
    Header,
    Property,
    InitLine,
    StateLineAt(u64),
    InputLineAt(u64),
    Done,
}

impl ParserState {
    fn expected(&self) -> &'static str {
        match self {
            ParserState::Header => "the witness header",
            ParserState::Property => "the property line",
            ParserState::InitLine => "the initialization line",
            ParserState::StateLineAt(_) => "a latch line or `.`",
            ParserState::InputLineAt(_) => "an input line",
            ParserState::Done => "nothing",
        }
    }
}

/// Reads the AIGER witness from `input` and writes the corresponding btor2 witness to `out`.
/// Returns `None` without writing anything if the witness does not describe a counterexample.
pub fn translate(
    layout: &BitLayout,
    input: impl BufRead,
    out: &mut impl Write,
    options: &TranslateOptions,
) -> Result<Option<TranslateStats>> {
    let mut translator = Translator::new(layout, options);
    let mut state = ParserState::Header;
    let mut line_no = 0;
    // latch values of the frame whose inputs we are waiting for
    let mut latches = String::new();

    for line_res in input.lines() {
        let full_line = line_res?;
        line_no += 1;
        let line = full_line.trim();

        state = match state {
            ParserState::Header => {
                let result = CheckResult::from_aiger_header(line);
                if !result.is_counterexample() {
                    log::info!("witness reports {result:?}, nothing to translate");
                    return Ok(None);
                }
                writeln!(out, "sat")?;
                ParserState::Property
            }
            ParserState::Property => {
                writeln!(out, "b0")?;
                ParserState::InitLine
            }
            ParserState::InitLine => {
                let bits = normalize(line, line_no)?;
                translator.cache_init(&bits, line_no)?;
                ParserState::StateLineAt(0)
            }
            ParserState::StateLineAt(k) => {
                if line == "." {
                    writeln!(out, ".")?;
                    ParserState::Done
                } else {
                    latches = normalize(line, line_no)?;
                    translator.check_width(&latches, BitSpace::State, line_no)?;
                    ParserState::InputLineAt(k)
                }
            }
            ParserState::InputLineAt(k) => {
                if line == "." {
                    return Err(TraceError::IncompleteFrame { line: line_no, frame: k });
                }
                let inputs = normalize(line, line_no)?;
                translator.check_width(&inputs, BitSpace::Input, line_no)?;
                translator.write_frame(out, k, &latches, &inputs)?;
                ParserState::StateLineAt(k + 1)
            }
            ParserState::Done => unreachable!("we stop reading after the terminator"),
        };
        if let ParserState::Done = state {
            break;
        }
    }

    match state {
        ParserState::Done => {
            let frames = translator.frames;
            log::debug!("translated {frames} frame(s)");
            Ok(Some(TranslateStats { frames }))
        }
        other => Err(TraceError::UnexpectedEof {
            line: line_no,
            expected: other.expected(),
        }),
    }
}

/// Convenience wrapper around [`translate`] that returns the btor2 witness as a string.
pub fn translate_to_string(
    layout: &BitLayout,
    input: &str,
    options: &TranslateOptions,
) -> Result<Option<String>> {
    let mut buf = Vec::new();
    match translate(layout, input.as_bytes(), &mut buf, options)? {
        None => Ok(None),
        Some(_) => Ok(Some(String::from_utf8_lossy(&buf).into_owned())),
    }
}

struct Translator<'a> {
    options: &'a TranslateOptions,
    /// states that are latches, sorted by btor2 id
    latches: Vec<(LineId, &'a StateVar)>,
    inputs: Vec<(LineId, &'a InputVar)>,
    pseudo_inputs: Vec<(LineId, &'a StateVar)>,
    /// initial values of uninitialized latches, only needed for the first frame
    init: HashMap<LineId, String>,
    frames: u64,
}

impl<'a> Translator<'a> {
    fn new(layout: &'a BitLayout, options: &'a TranslateOptions) -> Self {
        Translator {
            options,
            latches: layout.latches_by_id(),
            inputs: layout.inputs().collect(),
            pseudo_inputs: layout.pseudo_inputs().collect(),
            init: HashMap::new(),
            frames: 0,
        }
    }

    fn cache_init(&mut self, bits: &str, line: usize) -> Result<()> {
        for (id, state) in self.latches.iter() {
            if !state.has_init {
                let value = slice(bits, state.range, *id, line)?;
                self.init.insert(*id, value.to_string());
            }
        }
        Ok(())
    }

    fn check_width(&self, bits: &str, space: BitSpace, line: usize) -> Result<()> {
        let ranges = self
            .inputs
            .iter()
            .map(|(id, i)| (*id, i.range))
            .filter(|_| space == BitSpace::Input)
            .chain(
                self.latches
                    .iter()
                    .chain(self.pseudo_inputs.iter())
                    .filter(|(_, s)| s.space == space)
                    .map(|(id, s)| (*id, s.range)),
            );
        for (id, range) in ranges {
            slice(bits, range, id, line)?;
        }
        Ok(())
    }

    fn write_frame(
        &mut self,
        out: &mut impl Write,
        k: u64,
        latches: &str,
        inputs: &str,
    ) -> std::io::Result<()> {
        writeln!(out, "#{k}")?;
        let suffix = format!("#{k}");
        for (id, state) in self.latches.iter() {
            let value = match self.init.get(id) {
                Some(value) if k == 0 => value.as_str(),
                _ => &latches[state.range.start..state.range.end],
            };
            self.write_assignment(out, state.index, value, state.name.as_deref(), &suffix)?;
        }
        // the init values are only needed once
        if k == 0 {
            self.init.clear();
        }

        writeln!(out, "@{k}")?;
        let suffix = format!("@{k}");
        for (_, input) in self.inputs.iter() {
            let value = &inputs[input.range.start..input.range.end];
            self.write_assignment(out, input.index, value, input.name.as_deref(), &suffix)?;
        }
        for (_, state) in self.pseudo_inputs.iter() {
            let value = &inputs[state.range.start..state.range.end];
            self.write_assignment(out, state.index, value, state.name.as_deref(), &suffix)?;
        }
        self.frames += 1;
        Ok(())
    }

    fn write_assignment(
        &self,
        out: &mut impl Write,
        index: usize,
        value: &str,
        name: Option<&str>,
        suffix: &str,
    ) -> std::io::Result<()> {
        match name {
            Some(name) if self.options.with_names => writeln!(out, "{index} {value} {name}{suffix}"),
            _ => writeln!(out, "{index} {value}"),
        }
    }
}

fn slice(bits: &str, range: BitRange, id: LineId, line: usize) -> Result<&str> {
    range.slice(bits).ok_or(TraceError::LineTooShort {
        line,
        id,
        start: range.start,
        end: range.end,
        actual: bits.len(),
    })
}

/// Don't care bits are reported as zero.
fn normalize(line: &str, line_no: usize) -> Result<String> {
    line.chars()
        .enumerate()
        .map(|(column, c)| match c {
            '0' | '1' => Ok(c),
            'x' => Ok('0'),
            found => Err(TraceError::InvalidBit {
                line: line_no,
                column: column + 1,
                found,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btor2::parse_str;

    fn layout(src: &str) -> BitLayout {
        BitLayout::build(&parse_str(src).unwrap()).unwrap()
    }

    #[test]
    fn normalize_dont_care() {
        assert_eq!(normalize("01x1xx", 1).unwrap(), "010100");
        assert_eq!(normalize("", 1).unwrap(), "");
        assert!(matches!(
            normalize("01X", 7),
            Err(TraceError::InvalidBit {
                line: 7,
                column: 3,
                found: 'X'
            })
        ));
    }

    #[test]
    fn safe_result_produces_nothing() {
        let l = layout("1 sort bitvec 1\n2 input 1\n");
        let mut buf = Vec::new();
        let res = translate(&l, "0\nb0\n\n".as_bytes(), &mut buf, &Default::default()).unwrap();
        assert!(res.is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn model_without_latches() {
        let l = layout("1 sort bitvec 2\n2 input 1 a\n3 input 1 b\n");
        let out = translate_to_string(&l, "1\nb0\n\n\n01x1\n\n10xx\n.\n", &Default::default())
            .unwrap()
            .unwrap();
        assert_eq!(out, "sat\nb0\n#0\n@0\n0 01\n1 01\n#1\n@1\n0 10\n1 00\n.\n");
    }

    #[test]
    fn names_are_appended_on_request() {
        let l = layout("1 sort bitvec 1\n2 input 1 reset\n3 state 1 s\n4 next 1 3 2\n5 input 1\n");
        let options = TranslateOptions { with_names: true };
        let out = translate_to_string(&l, "1\nb0\n1\n0\n10\n.\n", &options)
            .unwrap()
            .unwrap();
        assert_eq!(out, "sat\nb0\n#0\n0 1 s#0\n@0\n0 1 reset@0\n1 0\n.\n");
    }

    #[test]
    fn frame_without_inputs_is_an_error() {
        let l = layout("1 sort bitvec 1\n2 input 1\n");
        let res = translate_to_string(&l, "1\nb0\n\n\n.\n", &Default::default());
        assert!(matches!(
            res,
            Err(TraceError::IncompleteFrame { line: 5, frame: 0 })
        ));
    }
}
