//! Scalar regression used to neutralize features against the grouping column.
//!
//! Neutralization only needs "fit on (x, y) pairs, then predict at x", so the
//! merger takes any [`Regressor`]. The default is [`OrdinaryLeastSquares`]:
//! intercept plus slope, solved as a two-column least squares problem with SVD.

use anyhow::Context as _;
use nalgebra::{DMatrix, DVector};

pub trait Regressor {
    /// Fit against one scalar predictor per row.
    fn fit(&mut self, x: &[f64], y: &[f64]) -> anyhow::Result<()>;

    fn predict(&self, x: &[f64]) -> anyhow::Result<Vec<f64>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrdinaryLeastSquares {
    coefficients: Option<LinearFit>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl OrdinaryLeastSquares {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<LinearFit> {
        self.coefficients
    }
}

impl Regressor for OrdinaryLeastSquares {
    fn fit(&mut self, x: &[f64], y: &[f64]) -> anyhow::Result<()> {
        if x.len() != y.len() {
            anyhow::bail!(
                "regression input length mismatch: {} predictors vs {} responses",
                x.len(),
                y.len()
            );
        }
        if x.is_empty() {
            anyhow::bail!("cannot fit regression on zero rows");
        }

        let design = DMatrix::from_fn(x.len(), 2, |r, c| if c == 0 { 1.0 } else { x[r] });
        let response = DVector::from_column_slice(y);
        let beta = solve_least_squares(&design, &response)
            .context("least squares solve failed (non-finite input?)")?;

        self.coefficients = Some(LinearFit {
            intercept: beta[0],
            slope: beta[1],
        });
        Ok(())
    }

    fn predict(&self, x: &[f64]) -> anyhow::Result<Vec<f64>> {
        let fit = self
            .coefficients
            .context("regressor used before fit")?;
        Ok(x.iter().map(|v| fit.intercept + fit.slope * v).collect())
    }
}

/// Solve `min |X b - y|^2` with SVD.
///
/// A rank-deficient design (constant predictor) gets the minimum-norm
/// solution, whose predictions equal the response mean.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
