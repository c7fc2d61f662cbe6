// Copyright 2023 The Regents of the University of California
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@berkeley.edu>

/// Outcome of a bit-level model checker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// no bad state is reachable
    Safe,
    /// a bad state is reachable and a counterexample was written
    Unsafe,
    /// anything else, e.g., a timeout
    Unknown,
}

impl CheckResult {
    /// Interprets the console output of the checker. Only the last non-empty line counts.
    pub fn from_checker_output(output: &str) -> Self {
        match output.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
            Some("Unsafe") => CheckResult::Unsafe,
            Some("Safe") => CheckResult::Safe,
            _ => CheckResult::Unknown,
        }
    }

    /// Interprets the first line of an AIGER witness file.
    pub fn from_aiger_header(line: &str) -> Self {
        match line.trim() {
            "0" | "unsat" => CheckResult::Safe,
            "2" | "unknown" => CheckResult::Unknown,
            "1" | "sat" => CheckResult::Unsafe,
            other => {
                log::warn!("unrecognized witness header `{other}`");
                CheckResult::Unknown
            }
        }
    }

    pub fn is_counterexample(&self) -> bool {
        *self == CheckResult::Unsafe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_output() {
        let out = "reading model\nstarting search\nUnsafe\n\n";
        assert_eq!(CheckResult::from_checker_output(out), CheckResult::Unsafe);
        assert_eq!(CheckResult::from_checker_output("Safe"), CheckResult::Safe);
        assert_eq!(
            CheckResult::from_checker_output("Unsafe\ntimeout"),
            CheckResult::Unknown
        );
        assert_eq!(CheckResult::from_checker_output(""), CheckResult::Unknown);
    }

    #[test]
    fn aiger_header() {
        assert!(CheckResult::from_aiger_header("1\n").is_counterexample());
        assert!(!CheckResult::from_aiger_header("0").is_counterexample());
        assert_eq!(CheckResult::from_aiger_header("2"), CheckResult::Unknown);
        assert_eq!(CheckResult::from_aiger_header("garbage"), CheckResult::Unknown);
        assert_eq!(CheckResult::from_aiger_header(""), CheckResult::Unknown);
    }
}
