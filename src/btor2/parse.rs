// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::btor2::{LineId, ModelError, SyntaxError, WidthInt};
use fuzzy_matcher::FuzzyMatcher;
use lazy_static::lazy_static;
use smallvec::SmallVec;
use std::collections::HashSet;

/// The kind of a `sort` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    BitVec(WidthInt),
    Array,
}

/// The subset of a btor2 line that matters for mapping bits back to variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Sort {
        id: LineId,
        kind: SortKind,
    },
    Input {
        id: LineId,
        sort: LineId,
        name: Option<String>,
    },
    State {
        id: LineId,
        sort: LineId,
        name: Option<String>,
    },
    Init {
        id: LineId,
        state: LineId,
    },
    Next {
        id: LineId,
        state: LineId,
    },
    /// Any other valid operation. Only the id is retained.
    Other {
        id: LineId,
    },
}

impl Declaration {
    pub fn id(&self) -> LineId {
        match self {
            Declaration::Sort { id, .. }
            | Declaration::Input { id, .. }
            | Declaration::State { id, .. }
            | Declaration::Init { id, .. }
            | Declaration::Next { id, .. }
            | Declaration::Other { id } => *id,
        }
    }
}

pub fn parse_str(input: &str) -> Result<Vec<Declaration>, ModelError> {
    match Parser::default().parse(input.as_bytes()) {
        Ok(decls) => Ok(decls),
        Err(errors) => {
            report_errors(&errors, "str", input);
            Err(ModelError::Syntax(errors))
        }
    }
}

pub fn parse_file(path: &std::path::Path) -> Result<Vec<Declaration>, ModelError> {
    let source = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("model.btor");
    match Parser::default().parse(source.as_bytes()) {
        Ok(decls) => Ok(decls),
        Err(errors) => {
            report_errors(&errors, name, &source);
            Err(ModelError::Syntax(errors))
        }
    }
}

#[derive(Default)]
struct Parser {
    decls: Vec<Declaration>,
    errors: Errors,
    /// offset of the current line inside the file
    offset: usize,
    /// 1-based number of the current line
    line_no: usize,
}

type Errors = Vec<SyntaxError>;

impl Parser {
    fn parse(mut self, input: impl std::io::BufRead) -> Result<Vec<Declaration>, Errors> {
        for line_res in input.lines() {
            let line = match line_res {
                Ok(line) => line,
                Err(e) => {
                    self.line_no += 1;
                    let _ = self.add_error("", "", format!("failed to read line: {e}"));
                    break;
                }
            };
            self.line_no += 1;
            let _ignore_errors = self.parse_line(&line);
            self.offset += line.len() + 1; // TODO: this assumes that the line terminates with a single character
        }
        if self.errors.is_empty() {
            Ok(self.decls)
        } else {
            Err(self.errors)
        }
    }

    fn parse_line(&mut self, line: &str) -> ParseLineResult {
        let cont = tokenize_line(line);
        let tokens = &cont.tokens;
        if tokens.is_empty() {
            // early exit if there are no tokens on this line
            return Ok(());
        }

        // the first token should be an ID
        let id = self.parse_line_id(line, tokens[0])?;

        // make sure that there is a second token following the id
        let op: &str = match tokens.get(1) {
            None => {
                return self.add_error(line, tokens[0], "No operation after ID.".to_owned());
            }
            Some(op) => op,
        };

        let decl = match op {
            "sort" => {
                self.require_at_least_n_tokens(line, tokens, 3)?;
                let kind = self.parse_sort(line, tokens)?;
                Declaration::Sort { id, kind }
            }
            "input" | "state" => {
                self.require_at_least_n_tokens(line, tokens, 3)?;
                let sort = self.parse_line_id(line, tokens[2])?;
                let name = tokens.get(3).map(|n| n.to_string());
                if op == "input" {
                    Declaration::Input { id, sort, name }
                } else {
                    Declaration::State { id, sort, name }
                }
            }
            "init" | "next" => {
                self.require_at_least_n_tokens(line, tokens, 5)?;
                self.parse_line_id(line, tokens[2])?;
                let state = self.parse_line_id(line, tokens[3])?;
                // tokens[4] is the value, which may be a negated reference
                if op == "init" {
                    Declaration::Init { id, state }
                } else {
                    Declaration::Next { id, state }
                }
            }
            other if ALL_OPS_SET.contains(other) => Declaration::Other { id },
            _ => return self.invalid_op_error(line, op),
        };
        self.decls.push(decl);
        Ok(())
    }

    fn parse_sort(&mut self, line: &str, tokens: &[&str]) -> ParseLineResult<SortKind> {
        match tokens[2] {
            "bitvec" => {
                self.require_at_least_n_tokens(line, tokens, 4)?;
                match tokens[3].parse::<WidthInt>() {
                    Ok(width) if width > 0 => Ok(SortKind::BitVec(width)),
                    _ => {
                        let _ = self.add_error(
                            line,
                            tokens[3],
                            format!(
                                "Not a valid bit-vector width. An integer between 1 and {} is required!",
                                WidthInt::MAX
                            ),
                        );
                        Err(())
                    }
                }
            }
            "array" => {
                self.require_at_least_n_tokens(line, tokens, 5)?;
                self.parse_line_id(line, tokens[3])?;
                self.parse_line_id(line, tokens[4])?;
                Ok(SortKind::Array)
            }
            other => {
                let _ = self.add_error(
                    line,
                    tokens[2],
                    format!("Expected `bitvec` or `array`. Not `{other}`."),
                );
                Err(())
            }
        }
    }

    fn parse_line_id(&mut self, line: &str, token: &str) -> ParseLineResult<LineId> {
        match token.parse::<LineId>().ok() {
            None => {
                let _ = self.add_error(
                    line,
                    token,
                    "Expected valid non-negative integer ID.".to_owned(),
                );
                Err(())
            }
            Some(id) => Ok(id),
        }
    }

    fn add_error(&mut self, line: &str, token: &str, msg: String) -> ParseLineResult {
        let start = if token.is_empty() {
            0
        } else {
            str_offset(token, line)
        };
        let end = start + token.len();
        self.errors.push(SyntaxError {
            msg,
            line: self.line_no,
            start: start + self.offset,
            end: end + self.offset,
        });
        Err(())
    }

    fn require_at_least_n_tokens(
        &mut self,
        line: &str,
        tokens: &[&str],
        n: usize,
    ) -> ParseLineResult {
        if tokens.len() < n {
            let op = tokens[1];
            let start = str_offset(op, line);
            let last_token = tokens[tokens.len() - 1];
            let end = str_offset(last_token, line) + last_token.len();
            self.add_error(
                line,
                &line[start..end],
                format!(
                    "{op} requires at least {n} tokens, only {} provided",
                    tokens.len()
                ),
            )
        } else {
            Ok(())
        }
    }

    fn invalid_op_error(&mut self, line: &str, op: &str) -> ParseLineResult {
        let matcher = fuzzy_matcher::skim::SkimMatcherV2::default();
        let mut matches: Vec<(&&str, i64)> = ALL_OPS
            .iter()
            .flat_map(|other| matcher.fuzzy_match(other, op).map(|s| (other, s)))
            .collect();
        matches.sort_by_key(|(_, s)| -(*s));
        let suggestions = matches
            .iter()
            .take(5)
            .map(|(n, _)| **n)
            .collect::<Vec<&str>>()
            .join(", ");
        let msg = if suggestions.is_empty() {
            format!("Invalid op {op}.")
        } else {
            format!("Invalid op {op}. Did you mean: {suggestions}?")
        };
        self.add_error(line, op, msg)
    }
}

// Line Tokenizer
#[derive(Default, Debug)]
pub(crate) struct LineTokens<'a> {
    pub(crate) tokens: SmallVec<[&'a str; 4]>,
    pub(crate) comment: Option<&'a str>,
}

const NO_TOKEN: usize = usize::MAX;
pub(crate) fn tokenize_line(line: &str) -> LineTokens {
    if line.is_empty() {
        // special handling for empty lines
        return LineTokens::default();
    }
    let line_len = line.len();
    let mut out = LineTokens::default();
    let mut token_start: usize = NO_TOKEN;
    #[inline]
    fn finish_token<'a>(
        token_start: &mut usize,
        out: &mut LineTokens<'a>,
        line: &'a str,
        ii: usize,
    ) {
        if *token_start != NO_TOKEN {
            out.tokens.push(&line[*token_start..ii]);
            *token_start = NO_TOKEN;
        }
    }

    for (ii, cc) in line.char_indices() {
        match cc {
            // white space character
            ' ' | '\t' | '\r' => finish_token(&mut token_start, &mut out, line, ii),
            // comment start
            ';' => {
                finish_token(&mut token_start, &mut out, line, ii);
                out.comment = Some(&line[ii + 1..line_len]);
                return out;
            }
            _ => {
                if token_start == NO_TOKEN {
                    token_start = ii
                }
            }
        }
    }
    finish_token(&mut token_start, &mut out, line, line_len);
    out
}

fn report_errors(errors: &[SyntaxError], name: &str, source: &str) {
    let report_file = codespan_reporting::files::SimpleFile::new(name, source);
    for err in errors.iter() {
        report_error(err, &report_file);
    }
}

fn report_error(error: &SyntaxError, file: &codespan_reporting::files::SimpleFile<&str, &str>) {
    let diagnostic = codespan_reporting::diagnostic::Diagnostic::error()
        .with_message(error.msg.clone())
        .with_labels(vec![codespan_reporting::diagnostic::Label::primary(
            (),
            error.start..error.end,
        )]);
    let writer = codespan_reporting::term::termcolor::StandardStream::stderr(
        codespan_reporting::term::termcolor::ColorChoice::Auto,
    );
    let config = codespan_reporting::term::Config::default();
    let mut lock = writer.lock();
    if let Err(e) = codespan_reporting::term::emit(&mut lock, &config, file, &diagnostic) {
        log::warn!("failed to render diagnostic: {e}");
    }
}

fn str_offset(needle: &str, haystack: &str) -> usize {
    let offset = (needle.as_ptr() as usize) - (haystack.as_ptr() as usize);
    debug_assert!(
        offset <= haystack.len(),
        "{} is not fully contained in {}",
        needle,
        haystack
    );
    offset
}

const ALL_OPS: &[&str] = &[
    // unary
    "not", "inc", "dec", "neg", "redand", "redor", "redxor", "slice", "uext", "sext",
    // binary
    "iff", "implies", "sgt", "ugt", "sgte", "ugte", "slt", "ult", "slte", "ulte", "and", "nand",
    "nor", "or", "xnor", "xor", "rol", "ror", "sll", "sra", "srl", "add", "mul", "sdiv", "udiv",
    "smod", "srem", "urem", "sub", "saddo", "uaddo", "sdivo", "udivo", "smulo", "umulo", "ssubo",
    "usubo", "concat", "eq", "neq", "read",
    // ternary
    "ite", "write",
    // everything else
    "sort", "input", "output", "bad", "constraint", "fair", "justice", "state", "next", "init",
    "const", "constd", "consth", "zero", "one", "ones",
];

lazy_static! {
    static ref ALL_OPS_SET: HashSet<&'static str> = ALL_OPS.iter().copied().collect();
}

/// Indicated success or failure. Errors are not returned, but rather collected by the parser.
type ParseLineResult<T = ()> = std::result::Result<T, ()>;
