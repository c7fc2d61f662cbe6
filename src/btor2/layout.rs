// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

use crate::btor2::{Declaration, LineId, ModelError, SortKind, WidthInt};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

/// Half-open range `[start, end)` of characters inside one line of an AIGER witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitRange {
    pub start: usize,
    pub end: usize,
}

impl BitRange {
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &BitRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `None` if the line is too short to contain the full range.
    pub fn slice<'a>(&self, line: &'a str) -> Option<&'a str> {
        line.get(self.start..self.end)
    }
}

/// The two kinds of lines in an AIGER witness that carry bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitSpace {
    /// latch values
    State,
    /// input values, including states without a next function
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputVar {
    /// position among all btor2 inputs
    pub index: usize,
    pub range: BitRange,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateVar {
    /// position among all btor2 states
    pub index: usize,
    pub space: BitSpace,
    pub range: BitRange,
    pub has_init: bool,
    pub has_next: bool,
    pub name: Option<String>,
}

impl StateVar {
    /// States without a next function are re-supplied every cycle, just like an input.
    pub fn is_pseudo_input(&self) -> bool {
        self.space == BitSpace::Input
    }
}

/// Maps every btor2 input and state onto the bits of the flattened AIGER circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitLayout {
    inputs: IndexMap<LineId, InputVar>,
    states: IndexMap<LineId, StateVar>,
    init_from_dedicated_line: IndexSet<LineId>,
    input_width: usize,
    state_width: usize,
}

impl BitLayout {
    /// Classifies all states and assigns bit ranges. Needs two passes, since a `next`
    /// declaration may come after the state it updates, and pseudo-inputs are placed
    /// behind all real inputs.
    pub fn build(decls: &[Declaration]) -> Result<Self, ModelError> {
        let mut layout = BitLayout::default();
        let mut sorts: HashMap<LineId, SortKind> = HashMap::new();
        let mut declared: HashSet<LineId> = HashSet::new();
        // (id, width, name) in declaration order
        let mut states: Vec<(LineId, WidthInt, Option<String>)> = Vec::new();
        let mut no_init: HashSet<LineId> = HashSet::new();
        let mut no_next: HashSet<LineId> = HashSet::new();
        // init and next targets are resolved once all states are known
        let mut targets: Vec<(LineId, LineId, bool)> = Vec::new();

        // first pass: classification
        for decl in decls.iter() {
            if !declared.insert(decl.id()) {
                return Err(ModelError::DuplicateId { id: decl.id() });
            }
            match decl {
                Declaration::Sort { id, kind } => {
                    sorts.insert(*id, *kind);
                }
                Declaration::Input { id, sort, name } => {
                    let width = lookup_width(&sorts, *id, *sort)? as usize;
                    let range = BitRange {
                        start: layout.input_width,
                        end: layout.input_width + width,
                    };
                    layout.input_width += width;
                    let index = layout.inputs.len();
                    layout.inputs.insert(
                        *id,
                        InputVar {
                            index,
                            range,
                            name: name.clone(),
                        },
                    );
                }
                Declaration::State { id, sort, name } => {
                    let width = lookup_width(&sorts, *id, *sort)?;
                    no_init.insert(*id);
                    no_next.insert(*id);
                    states.push((*id, width, name.clone()));
                }
                Declaration::Init { id, state } => targets.push((*id, *state, true)),
                Declaration::Next { id, state } => targets.push((*id, *state, false)),
                Declaration::Other { .. } => {}
            }
        }
        for (id, target, is_init) in targets {
            let set = if is_init { &mut no_init } else { &mut no_next };
            if !set.remove(&target) && !states.iter().any(|(s, _, _)| *s == target) {
                return Err(ModelError::UnknownState { id, target });
            }
        }

        // second pass: bit range assignment
        for (index, (id, width, name)) in states.into_iter().enumerate() {
            let width = width as usize;
            let has_init = !no_init.contains(&id);
            let has_next = !no_next.contains(&id);
            let (space, range) = if has_next {
                let range = BitRange {
                    start: layout.state_width,
                    end: layout.state_width + width,
                };
                layout.state_width += width;
                if !has_init {
                    layout.init_from_dedicated_line.insert(id);
                }
                (BitSpace::State, range)
            } else {
                let range = BitRange {
                    start: layout.input_width,
                    end: layout.input_width + width,
                };
                layout.input_width += width;
                (BitSpace::Input, range)
            };
            layout.states.insert(
                id,
                StateVar {
                    index,
                    space,
                    range,
                    has_init,
                    has_next,
                    name,
                },
            );
        }

        log::debug!(
            "bit layout: {} inputs and {} states, {} input bits, {} state bits, {} uninitialized",
            layout.inputs.len(),
            layout.states.len(),
            layout.input_width,
            layout.state_width,
            layout.init_from_dedicated_line.len()
        );
        Ok(layout)
    }

    /// All btor2 inputs in declaration order.
    pub fn inputs(&self) -> impl Iterator<Item = (LineId, &InputVar)> + '_ {
        self.inputs.iter().map(|(id, v)| (*id, v))
    }

    /// All btor2 states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = (LineId, &StateVar)> + '_ {
        self.states.iter().map(|(id, v)| (*id, v))
    }

    pub fn input(&self, id: LineId) -> Option<&InputVar> {
        self.inputs.get(&id)
    }

    pub fn state(&self, id: LineId) -> Option<&StateVar> {
        self.states.get(&id)
    }

    /// States that live in the latch line, sorted by ascending btor2 id.
    pub fn latches_by_id(&self) -> Vec<(LineId, &StateVar)> {
        let mut out: Vec<_> = self.states().filter(|(_, s)| !s.is_pseudo_input()).collect();
        out.sort_by_key(|(id, _)| *id);
        out
    }

    /// States without a next function, in declaration order.
    pub fn pseudo_inputs(&self) -> impl Iterator<Item = (LineId, &StateVar)> + '_ {
        self.states().filter(|(_, s)| s.is_pseudo_input())
    }

    /// Whether the initial value of this state needs to come from the witness' initialization line.
    pub fn needs_dedicated_init(&self, id: LineId) -> bool {
        self.init_from_dedicated_line.contains(&id)
    }

    pub fn dedicated_init_states(&self) -> impl Iterator<Item = LineId> + '_ {
        self.init_from_dedicated_line.iter().copied()
    }

    /// Total number of bits in one line of the given space.
    pub fn width(&self, space: BitSpace) -> usize {
        match space {
            BitSpace::State => self.state_width,
            BitSpace::Input => self.input_width,
        }
    }

    /// All ranges that were assigned to a space, in assignment order.
    pub fn ranges(&self, space: BitSpace) -> Vec<BitRange> {
        let mut out: Vec<BitRange> = Vec::new();
        if space == BitSpace::Input {
            out.extend(self.inputs.values().map(|i| i.range));
        }
        out.extend(
            self.states
                .values()
                .filter(|s| s.space == space)
                .map(|s| s.range),
        );
        out
    }
}

fn lookup_width(
    sorts: &HashMap<LineId, SortKind>,
    id: LineId,
    sort: LineId,
) -> Result<WidthInt, ModelError> {
    match sorts.get(&sort) {
        None => Err(ModelError::UndeclaredSort { id, sort }),
        Some(SortKind::Array) => Err(ModelError::ArrayUnsupported { id, sort }),
        Some(SortKind::BitVec(width)) => Ok(*width),
    }
}
