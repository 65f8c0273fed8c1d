//! The incremental simplex solver.
//!
//! Rows keep the tableau in solved form at all times: every basic
//! variable is defined by an expression over parametric variables only.
//! Adding a constraint augments it with marker and error variables,
//! substitutes the current definitions, and either inserts the row
//! directly or runs a phase-one pass with an artificial variable.
//! Removing a constraint pivots its marker variable out of the basis and
//! drops the row. Interactive edits adjust row constants in place and
//! re-establish feasibility with the dual simplex.

use indexmap::IndexMap;
use log::{debug, trace};
use num_traits::{One, Signed, Zero};
use smallvec::SmallVec;

use quadrille_core::{
    fraction, Constraint, ConstraintOp, ConstraintRole, LinearExpression, Rational, SolverError,
    Strength, Variable,
};

use crate::tableau::Tableau;

/// Handle returned by [`SimplexSolver::add_constraint`]; pass it back to
/// [`SimplexSolver::remove_constraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(usize);

/// Per-constraint bookkeeping needed for removal.
#[derive(Debug)]
struct ConstraintRecord {
    marker: Variable,
    errors: SmallVec<[Variable; 2]>,
    error_coefficient: Rational,
    role: ConstraintRole,
}

/// State of one variable registered for interactive editing.
#[derive(Debug)]
struct EditInfo {
    constraint: ConstraintId,
    plus: Variable,
    minus: Variable,
    prev_value: Rational,
    index: usize,
}

/// A constraint prepared for insertion: the working row plus the fresh
/// marker and error variables it introduced.
struct NewRow {
    expr: LinearExpression,
    marker: Variable,
    errors: SmallVec<[Variable; 2]>,
    plus: Option<Variable>,
    minus: Option<Variable>,
    prev_value: Rational,
}

/// An incremental solver for linear equality and inequality constraints
/// ranked by strength, over exact rational arithmetic.
#[derive(Debug)]
pub struct SimplexSolver {
    tableau: Tableau,
    objective: Variable,
    epsilon: Rational,
    auto_solve: bool,
    needs_solving: bool,
    next_constraint_id: usize,
    records: IndexMap<ConstraintId, ConstraintRecord>,
    edits: IndexMap<Variable, EditInfo>,
    /// Edit-session frames; the sentinel 0 stays at the bottom so
    /// `end_edit` always has a level to unwind to.
    edit_frames: Vec<usize>,
    stay_plus_error_vars: Vec<Variable>,
    stay_minus_error_vars: Vec<Variable>,
    values: IndexMap<Variable, Rational>,
}

impl SimplexSolver {
    pub fn new() -> Self {
        let objective = Variable::objective();
        let mut tableau = Tableau::new();
        tableau.add_row(objective, LinearExpression::zero());
        Self {
            tableau,
            objective,
            epsilon: fraction(1, 100_000_000),
            auto_solve: true,
            needs_solving: false,
            next_constraint_id: 0,
            records: IndexMap::new(),
            edits: IndexMap::new(),
            edit_frames: vec![0],
            stay_plus_error_vars: Vec::new(),
            stay_minus_error_vars: Vec::new(),
            values: IndexMap::new(),
        }
    }

    /// Add a constraint and re-optimize (unless auto-solving is off).
    ///
    /// A [`SolverError::RequiredFailure`] means the constraint cannot be
    /// satisfied together with the required constraints already present;
    /// the solver is left exactly as it was.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, SolverError> {
        let NewRow {
            mut expr,
            marker,
            errors,
            plus,
            minus,
            prev_value,
        } = self.new_expression(&constraint);

        match self.choose_subject(&mut expr)? {
            Some(subject) => {
                expr.solve_for(subject)?;
                self.tableau.substitute_out(subject, &expr);
                self.tableau.add_row(subject, expr);
            }
            None => self.add_with_artificial_variable(expr)?,
        }
        self.needs_solving = true;

        let id = ConstraintId(self.next_constraint_id);
        self.next_constraint_id += 1;
        self.records.insert(
            id,
            ConstraintRecord {
                marker,
                errors,
                error_coefficient: constraint.error_coefficient(),
                role: constraint.role(),
            },
        );
        if let ConstraintRole::Edit(var) = constraint.role() {
            let (Some(plus), Some(minus)) = (plus, minus) else {
                return Err(SolverError::InternalError(
                    "edit constraint lacks an error pair",
                ));
            };
            let index = self.edits.len();
            self.edits.insert(
                var,
                EditInfo {
                    constraint: id,
                    plus,
                    minus,
                    prev_value,
                    index,
                },
            );
        }
        debug!("added constraint {id:?} with marker {marker}");

        if self.auto_solve {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(id)
    }

    /// Remove a previously added constraint.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SolverError> {
        let record = self
            .records
            .swap_remove(&id)
            .ok_or(SolverError::ConstraintNotFound)?;
        self.needs_solving = true;
        self.reset_stay_constants();

        // Strip the constraint's error terms back out of the objective.
        let reverse = -record.error_coefficient.clone();
        for &error in &record.errors {
            match self.tableau.row(error).cloned() {
                Some(definition) => {
                    self.tableau
                        .add_expression_to_row(self.objective, &definition, &reverse)
                }
                None => self
                    .tableau
                    .add_variable_to_row(self.objective, error, &reverse),
            }
        }

        let marker = record.marker;
        if !self.tableau.has_row(marker) {
            match self.find_marker_exit(marker) {
                Some(exiting) => self.tableau.pivot(marker, exiting)?,
                None => self.tableau.remove_column(marker),
            }
        }
        if self.tableau.has_row(marker) {
            self.tableau.remove_row(marker);
        }

        for &error in &record.errors {
            if error != marker {
                self.tableau.remove_column(error);
            }
        }

        match record.role {
            ConstraintRole::Stay(_) => {
                if let Some(&plus) = record.errors.first() {
                    if let Some(pos) = self.stay_plus_error_vars.iter().position(|&v| v == plus) {
                        self.stay_plus_error_vars.remove(pos);
                        self.stay_minus_error_vars.remove(pos);
                    }
                }
            }
            ConstraintRole::Edit(var) => {
                self.edits.swap_remove(&var);
            }
            ConstraintRole::Regular => {}
        }
        debug!("removed constraint {id:?}");

        if self.auto_solve {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(())
    }

    pub fn has_constraint(&self, id: ConstraintId) -> bool {
        self.records.contains_key(&id)
    }

    /// Add a stay pinning `var` to its current value at the given
    /// strength.
    pub fn add_stay(&mut self, var: Variable, strength: Strength) -> Result<ConstraintId, SolverError> {
        let value = self.get_value(var);
        self.add_constraint(Constraint::stay(var, value, strength))
    }

    /// Register `var` for interactive editing at the given strength.
    pub fn add_edit_var(&mut self, var: Variable, strength: Strength) -> Result<(), SolverError> {
        if strength.is_required() {
            return Err(SolverError::BadEditStrength);
        }
        if self.edits.contains_key(&var) {
            return Err(SolverError::DuplicateEditVariable);
        }
        let value = self.get_value(var);
        self.add_constraint(Constraint::edit(var, value, strength))?;
        Ok(())
    }

    /// Unregister an edit variable, removing its edit constraint.
    pub fn remove_edit_var(&mut self, var: Variable) -> Result<(), SolverError> {
        let id = self
            .edits
            .get(&var)
            .map(|info| info.constraint)
            .ok_or(SolverError::UnknownEditVariable)?;
        self.remove_constraint(id)
    }

    /// Open an edit session for the currently registered edit variables.
    pub fn begin_edit(&mut self) -> Result<(), SolverError> {
        if self.edits.is_empty() {
            return Err(SolverError::InternalError(
                "begin_edit requires at least one edit variable",
            ));
        }
        self.tableau.clear_infeasible();
        self.reset_stay_constants();
        self.edit_frames.push(self.edits.len());
        Ok(())
    }

    /// Close the innermost edit session, dropping the edit variables it
    /// registered.
    pub fn end_edit(&mut self) -> Result<(), SolverError> {
        if self.edits.is_empty() {
            return Err(SolverError::InternalError(
                "end_edit without active edit variables",
            ));
        }
        self.resolve()?;
        if self.edit_frames.len() > 1 {
            self.edit_frames.pop();
        }
        let level = self.edit_frames.last().copied().unwrap_or(0);
        self.remove_edit_vars_to(level)
    }

    /// Propose a new value for an edit variable. The change takes effect
    /// on the next [`Self::resolve`].
    pub fn suggest_value(&mut self, var: Variable, value: Rational) -> Result<(), SolverError> {
        let (plus, minus, delta) = {
            let info = self
                .edits
                .get_mut(&var)
                .ok_or(SolverError::UnknownEditVariable)?;
            let delta = &value - &info.prev_value;
            info.prev_value = value;
            (info.plus, info.minus, delta)
        };
        trace!("suggest {var} moves by {delta}");
        self.delta_edit_constant(delta, plus, minus);
        Ok(())
    }

    /// Re-establish feasibility after suggested values and refresh the
    /// external variables.
    pub fn resolve(&mut self) -> Result<(), SolverError> {
        self.dual_optimize()?;
        self.set_external_variables();
        self.tableau.clear_infeasible();
        self.reset_stay_constants();
        Ok(())
    }

    /// Re-optimize and refresh external variable values, if needed.
    pub fn solve(&mut self) -> Result<(), SolverError> {
        if self.needs_solving {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(())
    }

    /// When on (the default), every add and remove re-optimizes
    /// immediately. When off, call [`Self::solve`] explicitly.
    pub fn set_auto_solve(&mut self, auto_solve: bool) {
        self.auto_solve = auto_solve;
    }

    pub fn auto_solve(&self) -> bool {
        self.auto_solve
    }

    /// The current value of a variable; zero if the solver has never
    /// assigned one.
    pub fn get_value(&self, var: Variable) -> Rational {
        self.values
            .get(&var)
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    /// Seed a variable's value, e.g. before pinning it with a stay.
    pub fn set_value(&mut self, var: Variable, value: Rational) {
        self.values.insert(var, value);
    }

    /// The current total weighted error over all non-required
    /// constraints.
    pub fn objective_value(&self) -> Rational {
        self.tableau
            .row(self.objective)
            .map(|row| row.constant().clone())
            .unwrap_or_else(Rational::zero)
    }

    /// Discarding all state in place is not supported; build a fresh
    /// solver instead.
    pub fn reset(&mut self) -> Result<(), SolverError> {
        Err(SolverError::InternalError("reset is not implemented"))
    }

    /// Build the working row for a constraint: substitute current basic
    /// definitions into its canonical expression and attach marker and
    /// error variables according to its operator and strength.
    fn new_expression(&mut self, constraint: &Constraint) -> NewRow {
        let source = constraint.expression();
        let mut expr = LinearExpression::from_constant(source.constant().clone());
        for (&var, coeff) in source.terms() {
            match self.tableau.row(var) {
                Some(definition) => {
                    expr.add_expression(definition, coeff);
                }
                None => {
                    expr.add_variable(var, coeff);
                }
            }
        }

        let error_coefficient = constraint.error_coefficient();
        let mut errors: SmallVec<[Variable; 2]> = SmallVec::new();
        let mut plus = None;
        let mut minus = None;
        let marker;
        match constraint.op() {
            ConstraintOp::Inequality => {
                // expr - slack == 0; the slack doubles as the marker.
                let slack = Variable::slack();
                expr.set_variable(slack, -Rational::one());
                marker = slack;
                if !constraint.is_required() {
                    let error = Variable::slack();
                    expr.set_variable(error, Rational::one());
                    self.tableau
                        .add_variable_to_row(self.objective, error, &error_coefficient);
                    errors.push(error);
                }
            }
            ConstraintOp::Equation if constraint.is_required() => {
                // A dummy marker that can never be pivoted in.
                let dummy = Variable::dummy();
                expr.set_variable(dummy, Rational::one());
                marker = dummy;
            }
            ConstraintOp::Equation => {
                // expr - eplus + eminus == 0, both penalized in the
                // objective; eplus doubles as the marker.
                let eplus = Variable::slack();
                let eminus = Variable::slack();
                expr.set_variable(eplus, -Rational::one());
                expr.set_variable(eminus, Rational::one());
                marker = eplus;
                self.tableau
                    .add_variable_to_row(self.objective, eplus, &error_coefficient);
                self.tableau
                    .add_variable_to_row(self.objective, eminus, &error_coefficient);
                match constraint.role() {
                    ConstraintRole::Stay(_) => {
                        self.stay_plus_error_vars.push(eplus);
                        self.stay_minus_error_vars.push(eminus);
                    }
                    ConstraintRole::Edit(_) => {
                        plus = Some(eplus);
                        minus = Some(eminus);
                    }
                    ConstraintRole::Regular => {}
                }
                errors.push(eplus);
                errors.push(eminus);
            }
        }

        if expr.constant().is_negative() {
            expr.multiply(&-Rational::one());
        }
        NewRow {
            expr,
            marker,
            errors,
            plus,
            minus,
            prev_value: source.constant().clone(),
        }
    }

    /// Pick a basic variable for a new row, or `None` if the row needs
    /// the artificial-variable pass.
    ///
    /// Preference order: an unrestricted variable; then a restricted
    /// non-dummy variable with a negative coefficient that appears in no
    /// other row (outside the objective). If only dummies remain the row
    /// is satisfiable exactly when its constant is zero.
    fn choose_subject(
        &self,
        expr: &mut LinearExpression,
    ) -> Result<Option<Variable>, SolverError> {
        let mut subject = None;
        let mut found_unrestricted = false;
        let mut found_new_restricted = false;
        for (&var, coeff) in expr.terms() {
            if found_unrestricted {
                if !var.is_restricted() && !self.tableau.has_column(var) {
                    return Ok(Some(var));
                }
            } else if var.is_restricted() {
                if !found_new_restricted && !var.is_dummy() && coeff.is_negative() {
                    let fresh = match self.tableau.columns_of(var) {
                        None => true,
                        Some(col) => col.len() == 1 && col.contains(&self.objective),
                    };
                    if fresh {
                        subject = Some(var);
                        found_new_restricted = true;
                    }
                }
            } else {
                subject = Some(var);
                found_unrestricted = true;
            }
        }
        if subject.is_some() {
            return Ok(subject);
        }

        let mut flip = false;
        for (&var, coeff) in expr.terms() {
            if !var.is_dummy() {
                return Ok(None);
            }
            if !self.tableau.has_column(var) {
                subject = Some(var);
                flip = coeff.is_positive();
            }
        }
        if !expr.constant().is_zero() {
            return Err(SolverError::RequiredFailure);
        }
        if flip {
            expr.multiply(&-Rational::one());
        }
        Ok(subject)
    }

    /// Phase-one insertion: introduce an artificial basic variable for
    /// the row and minimize it. If it cannot be driven to zero the row is
    /// infeasible and every trace of the attempt is removed.
    fn add_with_artificial_variable(&mut self, expr: LinearExpression) -> Result<(), SolverError> {
        let artificial = Variable::slack();
        let artificial_objective = Variable::objective();
        trace!("phase-one pass through {artificial}");

        self.tableau.add_row(artificial_objective, expr.clone());
        self.tableau.add_row(artificial, expr);
        self.optimize(artificial_objective)?;

        let residue = self
            .tableau
            .row(artificial_objective)
            .map(|row| row.constant().clone())
            .ok_or(SolverError::InternalError(
                "artificial objective row is missing",
            ))?;
        if !residue.is_zero() {
            self.tableau.remove_row(artificial_objective);
            self.tableau.remove_row(artificial);
            self.tableau.remove_column(artificial);
            return Err(SolverError::RequiredFailure);
        }

        if self.tableau.has_row(artificial) {
            let (is_constant, entering) = {
                let row = self
                    .tableau
                    .row(artificial)
                    .ok_or(SolverError::InternalError("artificial row is missing"))?;
                (row.is_constant(), row.any_pivotable_variable())
            };
            if is_constant {
                self.tableau.remove_row(artificial);
            } else if let Some(entering) = entering {
                self.tableau.pivot(entering, artificial)?;
            } else {
                self.tableau.remove_row(artificial_objective);
                self.tableau.remove_row(artificial);
                self.tableau.remove_column(artificial);
                return Err(SolverError::RequiredFailure);
            }
        }
        self.tableau.remove_column(artificial);
        self.tableau.remove_row(artificial_objective);
        Ok(())
    }

    /// Primal simplex: minimize the given objective row.
    ///
    /// Entering variable: the pivotable parametric variable with the most
    /// negative objective coefficient. Exiting variable: the pivotable
    /// basic row with the smallest non-negative ratio.
    fn optimize(&mut self, objective: Variable) -> Result<(), SolverError> {
        let threshold = -self.epsilon.clone();
        loop {
            let entering = {
                let row = self
                    .tableau
                    .row(objective)
                    .ok_or(SolverError::InternalError("objective row is missing"))?;
                let mut entry: Option<(Variable, &Rational)> = None;
                for (&var, coeff) in row.terms() {
                    if !var.is_pivotable() {
                        continue;
                    }
                    match entry {
                        Some((_, best)) if coeff >= best => {}
                        _ => entry = Some((var, coeff)),
                    }
                }
                match entry {
                    Some((var, coeff)) if *coeff < threshold => Some(var),
                    _ => None,
                }
            };
            let Some(entering) = entering else {
                return Ok(());
            };

            let exiting = {
                let mut best: Option<(Variable, Rational)> = None;
                if let Some(candidates) = self.tableau.columns_of(entering) {
                    for &basic in candidates {
                        if !basic.is_pivotable() {
                            continue;
                        }
                        let Some(row) = self.tableau.row(basic) else {
                            continue;
                        };
                        let Some(coeff) = row.coefficient(entering) else {
                            continue;
                        };
                        if !coeff.is_negative() {
                            continue;
                        }
                        let ratio = -(row.constant() / coeff);
                        match &best {
                            Some((_, min)) if &ratio >= min => {}
                            _ => best = Some((basic, ratio)),
                        }
                    }
                }
                best.map(|(basic, _)| basic)
            };
            let Some(exiting) = exiting else {
                return Err(SolverError::InternalError("objective function is unbounded"));
            };
            self.tableau.pivot(entering, exiting)?;
        }
    }

    /// Dual simplex: repair rows whose constants went negative after an
    /// edit, preserving optimality.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        while let Some(exiting) = self.tableau.next_infeasible() {
            let entering = {
                let Some(row) = self.tableau.row(exiting) else {
                    continue;
                };
                if !row.constant().is_negative() {
                    continue;
                }
                let objective_row = self
                    .tableau
                    .row(self.objective)
                    .ok_or(SolverError::InternalError("objective row is missing"))?;
                let mut best: Option<(Variable, Rational)> = None;
                for (&var, coeff) in row.terms() {
                    if !coeff.is_positive() || !var.is_pivotable() {
                        continue;
                    }
                    let objective_coeff = objective_row
                        .coefficient(var)
                        .cloned()
                        .unwrap_or_else(Rational::zero);
                    let ratio = objective_coeff / coeff;
                    match &best {
                        Some((_, min)) if &ratio >= min => {}
                        _ => best = Some((var, ratio)),
                    }
                }
                best.map(|(var, _)| var)
            };
            let Some(entering) = entering else {
                return Err(SolverError::InternalError(
                    "dual optimize found no entering variable",
                ));
            };
            self.tableau.pivot(entering, exiting)?;
        }
        Ok(())
    }

    /// Choose the row a nonbasic marker variable should be pivoted into
    /// before removal. `None` means the marker's column can simply be
    /// dropped.
    fn find_marker_exit(&self, marker: Variable) -> Option<Variable> {
        let col = self.tableau.columns_of(marker)?;
        let mut best: Option<(Variable, Rational)> = None;
        for &basic in col {
            if !basic.is_restricted() {
                continue;
            }
            let Some(row) = self.tableau.row(basic) else {
                continue;
            };
            let Some(coeff) = row.coefficient(marker) else {
                continue;
            };
            if !coeff.is_negative() {
                continue;
            }
            let ratio = -(row.constant() / coeff);
            match &best {
                Some((_, min)) if &ratio >= min => {}
                _ => best = Some((basic, ratio)),
            }
        }
        if best.is_none() {
            // No restricted row carries a negative coefficient for the
            // marker; settle for the smallest constant/coefficient ratio
            // regardless of its sign.
            for &basic in col {
                if !basic.is_restricted() {
                    continue;
                }
                let Some(row) = self.tableau.row(basic) else {
                    continue;
                };
                let Some(coeff) = row.coefficient(marker) else {
                    continue;
                };
                let ratio = row.constant() / coeff;
                match &best {
                    Some((_, min)) if &ratio >= min => {}
                    _ => best = Some((basic, ratio)),
                }
            }
        }
        match best {
            Some((basic, _)) => Some(basic),
            None => col.first().copied(),
        }
    }

    /// Apply a suggested-value delta through a plus/minus error pair.
    fn delta_edit_constant(&mut self, delta: Rational, plus: Variable, minus: Variable) {
        if let Some(negative) = self.tableau.bump_row_constant(plus, &delta) {
            if negative {
                self.tableau.mark_infeasible(plus);
            }
            return;
        }
        let minus_delta = -delta.clone();
        if let Some(negative) = self.tableau.bump_row_constant(minus, &minus_delta) {
            if negative {
                self.tableau.mark_infeasible(minus);
            }
            return;
        }
        // Both error variables are parametric; push the delta through
        // every row mentioning the minus variable.
        let basics: Vec<Variable> = self
            .tableau
            .columns_of(minus)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for basic in basics {
            let Some(coeff) = self
                .tableau
                .row(basic)
                .and_then(|row| row.coefficient(minus))
                .cloned()
            else {
                continue;
            };
            let increment = &coeff * &delta;
            if let Some(negative) = self.tableau.bump_row_constant(basic, &increment) {
                if negative && basic.is_restricted() {
                    self.tableau.mark_infeasible(basic);
                }
            }
        }
    }

    /// Re-pin every stay at its variable's current value by zeroing the
    /// constants of the stay error rows.
    fn reset_stay_constants(&mut self) {
        for i in 0..self.stay_plus_error_vars.len() {
            let plus = self.stay_plus_error_vars[i];
            if !self.tableau.zero_row_constant(plus) {
                let minus = self.stay_minus_error_vars[i];
                self.tableau.zero_row_constant(minus);
            }
        }
    }

    /// Copy the solved tableau out to the value table: basic externals
    /// take their row constant, parametric externals are zero.
    fn set_external_variables(&mut self) {
        for var in self.tableau.external_parametric_vars() {
            if self.tableau.has_row(var) {
                continue;
            }
            self.values.insert(var, Rational::zero());
        }
        for var in self.tableau.external_rows() {
            if let Some(row) = self.tableau.row(var) {
                self.values.insert(var, row.constant().clone());
            }
        }
        self.needs_solving = false;
    }

    fn remove_edit_vars_to(&mut self, level: usize) -> Result<(), SolverError> {
        let doomed: Vec<Variable> = self
            .edits
            .iter()
            .filter(|(_, info)| info.index >= level)
            .map(|(&var, _)| var)
            .collect();
        for var in doomed {
            self.remove_edit_var(var)?;
        }
        Ok(())
    }
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use quadrille_core::int;

    fn eq(var: Variable, value: i64, strength: Strength) -> Constraint {
        Constraint::eq(var, int(value), strength)
    }

    #[test]
    fn solves_a_required_equation() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::REQUIRED)).unwrap();
        assert_eq!(solver.get_value(x), int(100));
    }

    #[test]
    fn solves_chained_equations() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let y = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::REQUIRED)).unwrap();
        let mut rhs = LinearExpression::from_variable(x);
        rhs.increment_constant(&int(50));
        solver
            .add_constraint(Constraint::eq(y, rhs, Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(y), int(150));
    }

    #[test]
    fn results_are_exact_rationals() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let lhs = LinearExpression::term(x, int(2));
        solver
            .add_constraint(Constraint::eq(lhs, int(7), Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), fraction(7, 2));
    }

    #[test]
    fn binding_inequality_overrides_a_weak_pin() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 30, Strength::WEAK)).unwrap();
        solver
            .add_constraint(Constraint::geq(x, int(50), Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), int(50));
    }

    #[test]
    fn slack_inequality_leaves_a_weak_pin_alone() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 30, Strength::WEAK)).unwrap();
        solver
            .add_constraint(Constraint::geq(x, int(10), Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), int(30));
    }

    #[test]
    fn stronger_equation_wins() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::WEAK)).unwrap();
        solver.add_constraint(eq(x, 50, Strength::STRONG)).unwrap();
        assert_eq!(solver.get_value(x), int(50));
    }

    #[test]
    fn weight_breaks_ties_within_a_strength() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::WEAK)).unwrap();
        solver
            .add_constraint(eq(x, 50, Strength::WEAK).with_weight(int(3)))
            .unwrap();
        assert_eq!(solver.get_value(x), int(50));
    }

    #[test]
    fn required_equality_pulls_stayed_variables_together() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let y = Variable::external();
        solver.set_value(x, int(167));
        solver.set_value(y, int(2));
        solver.add_stay(x, Strength::WEAK).unwrap();
        solver.add_stay(y, Strength::WEAK).unwrap();
        solver
            .add_constraint(Constraint::eq(x, y, Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), solver.get_value(y));
        assert_eq!(solver.get_value(y), int(2));
    }

    #[test]
    fn removing_constraints_restores_the_next_weaker() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::WEAK)).unwrap();
        let c10 = solver
            .add_constraint(Constraint::leq(x, int(10), Strength::REQUIRED))
            .unwrap();
        let c20 = solver
            .add_constraint(Constraint::leq(x, int(20), Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), int(10));

        solver.remove_constraint(c10).unwrap();
        assert_eq!(solver.get_value(x), int(20));

        solver.remove_constraint(c20).unwrap();
        assert_eq!(solver.get_value(x), int(100));
    }

    #[test]
    fn conflicting_required_equations_fail_and_leave_state_intact() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 10, Strength::REQUIRED)).unwrap();

        let err = solver.add_constraint(eq(x, 5, Strength::REQUIRED)).unwrap_err();
        assert_eq!(err, SolverError::RequiredFailure);
        assert_eq!(solver.get_value(x), int(10));

        // The solver stays usable after the failure.
        solver
            .add_constraint(Constraint::leq(x, int(15), Strength::REQUIRED))
            .unwrap();
        assert_eq!(solver.get_value(x), int(10));
    }

    #[test]
    fn conflicting_required_inequality_fails_through_the_phase_one_pass() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 10, Strength::REQUIRED)).unwrap();

        let err = solver
            .add_constraint(Constraint::geq(x, int(20), Strength::REQUIRED))
            .unwrap_err();
        assert_eq!(err, SolverError::RequiredFailure);
        assert_eq!(solver.get_value(x), int(10));
    }

    #[test]
    fn removing_twice_reports_constraint_not_found() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let id = solver.add_constraint(eq(x, 1, Strength::REQUIRED)).unwrap();
        solver.remove_constraint(id).unwrap();
        assert_eq!(solver.remove_constraint(id), Err(SolverError::ConstraintNotFound));
        assert!(!solver.has_constraint(id));
    }

    #[test]
    fn objective_value_measures_unsatisfied_error() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.add_constraint(eq(x, 100, Strength::WEAK)).unwrap();
        solver.add_constraint(eq(x, 0, Strength::REQUIRED)).unwrap();
        assert_eq!(solver.get_value(x), int(0));
        assert_eq!(
            solver.objective_value(),
            Strength::WEAK.coefficient(&int(1)) * int(100)
        );
    }

    #[test]
    fn edit_session_tracks_suggested_values() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.set_value(x, int(20));
        solver.add_stay(x, Strength::WEAK).unwrap();

        solver.add_edit_var(x, Strength::STRONG).unwrap();
        solver.begin_edit().unwrap();

        solver.suggest_value(x, int(42)).unwrap();
        solver.resolve().unwrap();
        assert_eq!(solver.get_value(x), int(42));

        solver.suggest_value(x, int(-7)).unwrap();
        solver.resolve().unwrap();
        assert_eq!(solver.get_value(x), int(-7));

        solver.end_edit().unwrap();
        assert_eq!(solver.get_value(x), int(-7));
        assert_eq!(
            solver.suggest_value(x, int(0)),
            Err(SolverError::UnknownEditVariable)
        );
    }

    #[test]
    fn edits_leave_unrelated_variables_alone() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let y = Variable::external();
        solver.set_value(x, int(10));
        solver.set_value(y, int(20));
        solver.add_stay(x, Strength::WEAK).unwrap();
        solver.add_stay(y, Strength::WEAK).unwrap();

        solver.add_edit_var(x, Strength::STRONG).unwrap();
        solver.begin_edit().unwrap();
        solver.suggest_value(x, int(30)).unwrap();
        solver.resolve().unwrap();
        solver.end_edit().unwrap();

        assert_eq!(solver.get_value(x), int(30));
        assert_eq!(solver.get_value(y), int(20));
    }

    #[test]
    fn nested_edit_sessions_unwind_in_order() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let y = Variable::external();
        solver.add_stay(x, Strength::WEAK).unwrap();
        solver.add_stay(y, Strength::WEAK).unwrap();

        solver.add_edit_var(x, Strength::STRONG).unwrap();
        solver.begin_edit().unwrap();
        solver.suggest_value(x, int(5)).unwrap();
        solver.resolve().unwrap();

        solver.add_edit_var(y, Strength::STRONG).unwrap();
        solver.begin_edit().unwrap();
        solver.suggest_value(y, int(7)).unwrap();
        solver.resolve().unwrap();
        assert_eq!(solver.get_value(x), int(5));
        assert_eq!(solver.get_value(y), int(7));

        // Closing the inner session drops y but keeps x editable.
        solver.end_edit().unwrap();
        assert_eq!(
            solver.suggest_value(y, int(0)),
            Err(SolverError::UnknownEditVariable)
        );
        solver.suggest_value(x, int(9)).unwrap();
        solver.resolve().unwrap();
        assert_eq!(solver.get_value(x), int(9));

        solver.end_edit().unwrap();
        assert_eq!(
            solver.suggest_value(x, int(0)),
            Err(SolverError::UnknownEditVariable)
        );
    }

    #[test]
    fn edit_registration_validates_input() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        let y = Variable::external();
        solver.add_stay(x, Strength::WEAK).unwrap();

        assert_eq!(
            solver.add_edit_var(x, Strength::REQUIRED),
            Err(SolverError::BadEditStrength)
        );
        solver.add_edit_var(x, Strength::STRONG).unwrap();
        assert_eq!(
            solver.add_edit_var(x, Strength::STRONG),
            Err(SolverError::DuplicateEditVariable)
        );
        assert_eq!(
            solver.suggest_value(y, int(1)),
            Err(SolverError::UnknownEditVariable)
        );
    }

    #[test]
    fn deferred_solving_updates_values_on_solve() {
        let mut solver = SimplexSolver::new();
        solver.set_auto_solve(false);
        assert!(!solver.auto_solve());

        let x = Variable::external();
        solver.add_constraint(eq(x, 12, Strength::REQUIRED)).unwrap();
        assert_eq!(solver.get_value(x), int(0));

        solver.solve().unwrap();
        assert_eq!(solver.get_value(x), int(12));
    }

    #[test]
    fn removing_a_stay_cleans_its_bookkeeping() {
        let mut solver = SimplexSolver::new();
        let x = Variable::external();
        solver.set_value(x, int(5));
        let id = solver.add_stay(x, Strength::WEAK).unwrap();
        assert_eq!(solver.get_value(x), int(5));

        // An unconstrained variable parks at zero.
        solver.remove_constraint(id).unwrap();
        assert_eq!(solver.get_value(x), int(0));

        solver.add_stay(x, Strength::WEAK).unwrap();
        assert_eq!(solver.get_value(x), int(0));
    }

    #[test]
    fn reset_is_not_supported() {
        let mut solver = SimplexSolver::new();
        assert!(matches!(
            solver.reset(),
            Err(SolverError::InternalError(_))
        ));
    }

    proptest! {
        #[test]
        fn add_remove_round_trips(a in -1000i64..1000, b in -1000i64..1000) {
            let mut solver = SimplexSolver::new();
            let x = Variable::external();
            solver.add_constraint(eq(x, a, Strength::WEAK)).unwrap();
            prop_assert_eq!(solver.get_value(x), int(a));

            let id = solver.add_constraint(eq(x, b, Strength::REQUIRED)).unwrap();
            prop_assert_eq!(solver.get_value(x), int(b));

            solver.remove_constraint(id).unwrap();
            prop_assert_eq!(solver.get_value(x), int(a));
        }
    }
}
