//! Penalised least squares for the small design matrices used here.

use nalgebra::{DMatrix, DVector};

use crate::CoreError;

/// Smallest Cholesky pivot accepted, relative to the largest.
const CONDITION_FLOOR: f64 = 1e-7;

/// Minimises `|y - X b|^2 + sum(penalty_j * b_j^2)` via the normal equations,
/// solved with a Cholesky factorisation.
///
/// `rows` holds the design matrix row by row; every row must have
/// `penalties.len()` columns.
pub(crate) fn ridge_solve(
    rows: &[Vec<f64>],
    targets: &[f64],
    penalties: &[f64],
) -> Result<Vec<f64>, CoreError> {
    let width = penalties.len();
    if rows.len() != targets.len() {
        return Err(CoreError::Engine(format!(
            "design has {} rows but {} targets",
            rows.len(),
            targets.len()
        )));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
        return Err(CoreError::Engine(format!(
            "design row has {} columns, expected {}",
            row.len(),
            width
        )));
    }

    let design = DMatrix::from_fn(rows.len(), width, |i, j| rows[i][j]);
    let y = DVector::from_column_slice(targets);
    let transposed = design.transpose();
    let ridge = DMatrix::from_diagonal(&DVector::from_column_slice(penalties));
    let gram = &transposed * &design + ridge;
    let rhs = &transposed * y;

    let singular =
        || CoreError::Engine("design matrix is singular; try fewer seasonal terms".into());
    let factor = gram.cholesky().ok_or_else(singular)?;
    let diagonal = factor.l_dirty().diagonal();
    if diagonal.min() <= diagonal.max() * CONDITION_FLOOR {
        return Err(singular());
    }
    let solution = factor.solve(&rhs);
    if solution.iter().any(|value| !value.is_finite()) {
        return Err(CoreError::Engine(
            "regression produced non-finite coefficients".into(),
        ));
    }
    Ok(solution.iter().copied().collect())
}
