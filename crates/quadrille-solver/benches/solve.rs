//! Solver benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quadrille_core::{int, Constraint, LinearExpression, Strength, Variable};
use quadrille_solver::SimplexSolver;

/// A chain x₀ == 0 (at `head_strength`), xᵢ == xᵢ₋₁ + 1 of length `n`.
fn build_chain(n: usize, head_strength: Strength) -> (SimplexSolver, Vec<Variable>) {
    let mut solver = SimplexSolver::new();
    let vars: Vec<Variable> = (0..n).map(|_| Variable::external()).collect();
    solver
        .add_constraint(Constraint::eq(vars[0], int(0), head_strength))
        .unwrap();
    for pair in vars.windows(2) {
        let mut rhs = LinearExpression::from_variable(pair[0]);
        rhs.increment_constant(&int(1));
        solver
            .add_constraint(Constraint::eq(pair[1], rhs, Strength::REQUIRED))
            .unwrap();
    }
    (solver, vars)
}

fn add_chain(c: &mut Criterion) {
    c.bench_function("add_chain_50", |b| {
        b.iter(|| build_chain(black_box(50), Strength::REQUIRED))
    });
}

fn edit_chain(c: &mut Criterion) {
    c.bench_function("edit_chain_50", |b| {
        let (mut solver, vars) = build_chain(50, Strength::WEAK);
        let head = vars[0];
        solver.add_edit_var(head, Strength::STRONG).unwrap();
        solver.begin_edit().unwrap();
        let mut step = 0i64;
        b.iter(|| {
            step += 1;
            solver.suggest_value(head, int(step % 17)).unwrap();
            solver.resolve().unwrap();
            black_box(solver.get_value(vars[49]))
        });
        solver.end_edit().unwrap();
    });
}

criterion_group!(benches, add_chain, edit_chain);
criterion_main!(benches);
