//! The simplex tableau.
//!
//! The tableau owns one defining expression per basic variable and a
//! column back-index mapping every parametric variable to the set of
//! basic variables whose row mentions it. Every row mutation goes through
//! methods here so the two structures can never drift apart. Each row's
//! expression is exclusively owned by the tableau; callers clone before
//! reusing one elsewhere.

use indexmap::{IndexMap, IndexSet};
use log::trace;
use num_traits::{Signed, Zero};

use quadrille_core::{LinearExpression, Rational, SolverError, TermChange, Variable};

/// Row/column index for the simplex method.
#[derive(Debug, Default)]
pub struct Tableau {
    /// Defining expression for each basic variable.
    rows: IndexMap<Variable, LinearExpression>,
    /// Parametric variable → basic variables whose row mentions it.
    columns: IndexMap<Variable, IndexSet<Variable>>,
    /// Restricted basic variables whose row constant went negative.
    infeasible_rows: Vec<Variable>,
    /// External variables that are currently basic.
    external_rows: IndexSet<Variable>,
    /// External variables that currently appear as row terms.
    external_parametric_vars: IndexSet<Variable>,
}

impl Tableau {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `var` is basic.
    pub fn has_row(&self, var: Variable) -> bool {
        self.rows.contains_key(&var)
    }

    /// The defining expression of a basic variable.
    pub fn row(&self, var: Variable) -> Option<&LinearExpression> {
        self.rows.get(&var)
    }

    pub(crate) fn row_mut(&mut self, var: Variable) -> Option<&mut LinearExpression> {
        self.rows.get_mut(&var)
    }

    /// Whether `var` appears as a term in any row.
    pub fn has_column(&self, var: Variable) -> bool {
        self.columns.contains_key(&var)
    }

    /// The basic variables whose rows mention `var`.
    pub fn columns_of(&self, var: Variable) -> Option<&IndexSet<Variable>> {
        self.columns.get(&var)
    }

    pub fn external_rows(&self) -> impl Iterator<Item = Variable> + '_ {
        self.external_rows.iter().copied()
    }

    pub fn external_parametric_vars(&self) -> impl Iterator<Item = Variable> + '_ {
        self.external_parametric_vars.iter().copied()
    }

    /// Install `expr` as the defining row of `basic`.
    pub fn add_row(&mut self, basic: Variable, expr: LinearExpression) {
        for (&var, _) in expr.terms() {
            self.columns.entry(var).or_default().insert(basic);
            if var.is_external() {
                self.external_parametric_vars.insert(var);
            }
        }
        if basic.is_external() {
            self.external_rows.insert(basic);
        }
        self.rows.insert(basic, expr);
    }

    /// Remove the defining row of `basic`, scrubbing the column index.
    pub fn remove_row(&mut self, basic: Variable) -> Option<LinearExpression> {
        let expr = self.rows.swap_remove(&basic)?;
        for (&var, _) in expr.terms() {
            if let Some(set) = self.columns.get_mut(&var) {
                set.swap_remove(&basic);
                if set.is_empty() {
                    self.columns.swap_remove(&var);
                }
            }
        }
        if basic.is_external() {
            self.external_rows.swap_remove(&basic);
        }
        Some(expr)
    }

    /// Drop every occurrence of a parametric variable from the tableau.
    pub fn remove_column(&mut self, var: Variable) {
        if let Some(basics) = self.columns.swap_remove(&var) {
            for basic in basics {
                if let Some(row) = self.rows.get_mut(&basic) {
                    row.remove_variable(var);
                }
            }
        }
        if var.is_external() {
            self.external_rows.swap_remove(&var);
            self.external_parametric_vars.swap_remove(&var);
        }
    }

    /// Replace every occurrence of `var` with its defining expression.
    ///
    /// Rows of restricted basic variables whose constant turns negative
    /// are flagged infeasible for the dual simplex to repair.
    pub fn substitute_out(&mut self, var: Variable, definition: &LinearExpression) {
        if let Some(basics) = self.columns.swap_remove(&var) {
            for basic in basics {
                let Some(row) = self.rows.get_mut(&basic) else {
                    continue;
                };
                let delta = row.substitute_out(var, definition);
                let went_infeasible = basic.is_restricted() && row.constant().is_negative();
                for added in delta.added {
                    self.note_added(added, basic);
                }
                for removed in delta.removed {
                    self.note_removed(removed, basic);
                }
                if went_infeasible {
                    self.infeasible_rows.push(basic);
                }
            }
        }
        if var.is_external() {
            self.external_parametric_vars.swap_remove(&var);
        }
    }

    /// Exchange a basic and a nonbasic variable: solve the exiting row for
    /// the entering variable, substitute the result everywhere, and store
    /// it as the entering variable's row.
    pub fn pivot(&mut self, entering: Variable, exiting: Variable) -> Result<(), SolverError> {
        trace!("pivot: {entering} enters, {exiting} leaves");
        let mut expr = self
            .remove_row(exiting)
            .ok_or(SolverError::InternalError("pivot: exiting variable has no row"))?;
        expr.change_subject(exiting, entering)?;
        self.substitute_out(entering, &expr);
        self.add_row(entering, expr);
        Ok(())
    }

    /// Merge `coeff·var` into an existing row, keeping columns consistent.
    pub fn add_variable_to_row(&mut self, basic: Variable, var: Variable, coeff: &Rational) {
        let Some(row) = self.rows.get_mut(&basic) else {
            return;
        };
        match row.add_variable(var, coeff) {
            TermChange::Inserted => self.note_added(var, basic),
            TermChange::Removed => self.note_removed(var, basic),
            TermChange::Modified | TermChange::Untouched => {}
        }
    }

    /// Overwrite a coefficient in an existing row, keeping columns
    /// consistent.
    pub fn set_variable_in_row(&mut self, basic: Variable, var: Variable, coeff: Rational) {
        let Some(row) = self.rows.get_mut(&basic) else {
            return;
        };
        let had = row.contains(var);
        let zero = coeff.is_zero();
        row.set_variable(var, coeff);
        match (had, zero) {
            (false, false) => self.note_added(var, basic),
            (true, true) => self.note_removed(var, basic),
            _ => {}
        }
    }

    /// Add `multiplier · expr` into an existing row, keeping columns
    /// consistent.
    pub fn add_expression_to_row(
        &mut self,
        basic: Variable,
        expr: &LinearExpression,
        multiplier: &Rational,
    ) {
        let Some(row) = self.rows.get_mut(&basic) else {
            return;
        };
        let delta = row.add_expression(expr, multiplier);
        for added in delta.added {
            self.note_added(added, basic);
        }
        for removed in delta.removed {
            self.note_removed(removed, basic);
        }
    }

    /// Add `delta` to a row's constant, reporting whether the constant is
    /// now negative. `None` if `basic` has no row.
    pub(crate) fn bump_row_constant(&mut self, basic: Variable, delta: &Rational) -> Option<bool> {
        let row = self.rows.get_mut(&basic)?;
        row.increment_constant(delta);
        Some(row.constant().is_negative())
    }

    /// Zero a row's constant. Reports whether the row exists.
    pub(crate) fn zero_row_constant(&mut self, basic: Variable) -> bool {
        match self.rows.get_mut(&basic) {
            Some(row) => {
                row.set_constant(Rational::zero());
                true
            }
            None => false,
        }
    }

    pub fn mark_infeasible(&mut self, basic: Variable) {
        self.infeasible_rows.push(basic);
    }

    pub fn next_infeasible(&mut self) -> Option<Variable> {
        self.infeasible_rows.pop()
    }

    pub fn clear_infeasible(&mut self) {
        self.infeasible_rows.clear();
    }

    fn note_added(&mut self, var: Variable, basic: Variable) {
        self.columns.entry(var).or_default().insert(basic);
        if var.is_external() {
            self.external_parametric_vars.insert(var);
        }
    }

    fn note_removed(&mut self, var: Variable, basic: Variable) {
        if let Some(set) = self.columns.get_mut(&var) {
            set.swap_remove(&basic);
            if set.is_empty() {
                self.columns.swap_remove(&var);
            }
        }
    }
}
