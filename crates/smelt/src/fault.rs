use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can produce a runtime error.
pub type RunResult<T> = Result<T, RunError>;

/// Runtime fault kinds raised by the evaluation core.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations. The string representation matches the variant name exactly
/// (e.g., `Subscript` -> "Subscript"). The set is closed: user programs cannot
/// introduce new kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum FaultKind {
    /// Head, tail or last of an empty collection; `only` of an empty relation.
    Empty,
    /// Pattern match exhaustion in a closure.
    Bind,
    /// Character ordinal out of 0..=255, or `succ`/`pred` at a boundary.
    Chr,
    /// `Real.checkFloat` on nan. Real division by zero produces nan, not this.
    Div,
    /// Argument outside a function's domain, e.g. `Real.sign` on nan.
    Domain,
    /// `valOf` applied to `NONE`.
    Option,
    /// Integer arithmetic overflow; `Real.checkFloat` on an infinity.
    Overflow,
    /// Result size out of range: oversized concatenation, negative `tabulate`,
    /// `only` of a relation with more than one row.
    Size,
    /// Index out of bounds on `nth`, `sub`, `take`, `substring` or `update`.
    Subscript,
    /// `ListPair.*Eq` applied to lists of different lengths.
    UnequalLengths,
    /// `Real.compare` involving nan.
    Unordered,
    /// Session-level failure: `use` on an unreadable file, unknown property
    /// names, driver compile/evaluate errors.
    Error,
}

/// A source position attached to Code nodes and positioned built-ins.
///
/// Line and column are 1-based; the range is inclusive of the start and
/// exclusive of the end, matching what the frontend reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32, end_line: u32, end_col: u32) -> Self {
        Self { line, col, end_line, end_col }
    }

    /// A single-point position, used by tests and synthetic code.
    pub fn point(line: u32, col: u32) -> Self {
        Self { line, col, end_line: line, end_col: col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.line, self.col) == (self.end_line, self.end_col) {
            write!(f, "{}.{}", self.line, self.col)
        } else {
            write!(f, "{}.{}-{}.{}", self.line, self.col, self.end_line, self.end_col)
        }
    }
}

/// A runtime fault: a kind, an optional human-readable message, and the
/// position of the call site that raised it.
///
/// Faults propagate upward without local recovery inside the core; the driver
/// surfaces them. Positioned built-ins stamp their configured position onto
/// faults that do not already carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub kind: FaultKind,
    pub message: Option<String>,
    pub pos: Option<Pos>,
}

impl Fault {
    pub fn new(kind: FaultKind) -> Self {
        Self { kind, message: None, pos: None }
    }

    pub fn new_msg(kind: FaultKind, message: impl Into<String>) -> Self {
        Self { kind, message: Some(message.into()), pos: None }
    }

    /// Attaches a position if the fault does not already carry one.
    ///
    /// The innermost positioned frame wins, so re-stamping on the way up is a
    /// no-op once a position is present.
    pub fn or_pos(mut self, pos: Option<Pos>) -> Self {
        if self.pos.is_none() {
            self.pos = pos;
        }
        self
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uncaught exception {}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, " [{message}]")?;
        }
        if let Some(pos) = self.pos {
            write!(f, " at {pos}")?;
        }
        Ok(())
    }
}

/// A runtime error: either a typed fault visible to user programs, or an
/// assertion failure on malformed Code leaked from the frontend.
///
/// Assertions are deliberately distinct from `FaultKind`: a user handler can
/// never observe them, and the driver reports them as internal errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    Fault(Fault),
    Assert(String),
}

impl RunError {
    /// Shorthand for an assertion failure on malformed Code.
    pub fn assert(message: impl Into<String>) -> Self {
        Self::Assert(message.into())
    }
}

impl From<Fault> for RunError {
    fn from(fault: Fault) -> Self {
        Self::Fault(fault)
    }
}

impl From<FaultKind> for RunError {
    fn from(kind: FaultKind) -> Self {
        Self::Fault(Fault::new(kind))
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fault(fault) => write!(f, "{fault}"),
            Self::Assert(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl std::error::Error for RunError {}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn fault_kind_round_trips_through_strings() {
        assert_eq!(FaultKind::Subscript.to_string(), "Subscript");
        assert_eq!(FaultKind::from_str("UnequalLengths").unwrap(), FaultKind::UnequalLengths);
        assert!(FaultKind::from_str("NoSuchKind").is_err());
    }

    #[test]
    fn innermost_position_wins() {
        let inner = Pos::point(1, 5);
        let outer = Pos::point(9, 1);
        let fault = Fault::new(FaultKind::Bind).or_pos(Some(inner)).or_pos(Some(outer));
        assert_eq!(fault.pos, Some(inner));
    }

    #[test]
    fn display_includes_kind_message_and_position() {
        let fault = Fault::new_msg(FaultKind::Error, "unknown property \"foo\"").or_pos(Some(Pos::new(2, 3, 2, 10)));
        assert_eq!(
            fault.to_string(),
            "uncaught exception Error [unknown property \"foo\"] at 2.3-2.10"
        );
    }
}
