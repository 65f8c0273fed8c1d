//! Identity-keyed variable handles.
//!
//! A [`Variable`] is a cheap `Copy` handle: a unique id plus a kind tag.
//! All per-variable state (current value, tableau rows) lives in the solver,
//! keyed by the handle. External variables are the caller's unknowns; slack,
//! dummy, and objective variables are created internally by the solver.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// What role a variable plays in the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarKind {
    /// A caller-visible unknown; holds a meaningful value between solves.
    External,
    /// Converts inequalities to equalities and measures constraint error.
    Slack,
    /// Marks required equality rows; may never enter the basis through
    /// optimization.
    Dummy,
    /// The variable owning an objective row.
    Objective,
}

/// A variable handle.
///
/// Identity is the unique id; two handles compare equal only if they were
/// produced by the same constructor call.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    id: u64,
    kind: VarKind,
    integer: bool,
}

impl Variable {
    /// A new external variable.
    pub fn external() -> Self {
        Self {
            id: fresh_id(),
            kind: VarKind::External,
            integer: false,
        }
    }

    /// A new external variable restricted to integer values under
    /// branch-and-bound.
    pub fn integer() -> Self {
        Self {
            id: fresh_id(),
            kind: VarKind::External,
            integer: true,
        }
    }

    /// A new slack variable. Created by the solver.
    pub fn slack() -> Self {
        Self {
            id: fresh_id(),
            kind: VarKind::Slack,
            integer: false,
        }
    }

    /// A new dummy variable. Created by the solver.
    pub fn dummy() -> Self {
        Self {
            id: fresh_id(),
            kind: VarKind::Dummy,
            integer: false,
        }
    }

    /// A new objective variable. Created by the solver.
    pub fn objective() -> Self {
        Self {
            id: fresh_id(),
            kind: VarKind::Objective,
            integer: false,
        }
    }

    /// The unique id of this variable.
    pub fn id(self) -> u64 {
        self.id
    }

    /// The kind tag.
    pub fn kind(self) -> VarKind {
        self.kind
    }

    pub fn is_external(self) -> bool {
        self.kind == VarKind::External
    }

    /// Whether this variable may be chosen to enter or leave the basis
    /// during optimization. Error variables are slack-kind, so they
    /// qualify; dummies never do.
    pub fn is_pivotable(self) -> bool {
        self.kind == VarKind::Slack
    }

    /// Whether this variable is constrained to be non-negative.
    pub fn is_restricted(self) -> bool {
        matches!(self.kind, VarKind::Slack | VarKind::Dummy)
    }

    pub fn is_dummy(self) -> bool {
        self.kind == VarKind::Dummy
    }

    /// Whether branch-and-bound must drive this variable to an integer.
    pub fn is_integer(self) -> bool {
        self.integer
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            VarKind::External if self.integer => "i",
            VarKind::External => "v",
            VarKind::Slack => "s",
            VarKind::Dummy => "d",
            VarKind::Objective => "z",
        };
        write!(f, "{}{}", prefix, self.id)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
