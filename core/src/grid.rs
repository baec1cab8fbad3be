use crate::error::{AnalysisError, Result};

/// `n` cyclic frequencies linearly spaced over `[0, max_alpha]`, endpoints included
///
/// A single-point grid is just `[0.0]`.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidGridSize` if `n` is zero.
pub fn alpha_grid(n: usize, max_alpha: f64) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(AnalysisError::InvalidGridSize {
            name: "n_alpha",
            value: n,
        });
    }
    if n == 1 {
        return Ok(vec![0.0]);
    }

    let last = (n - 1) as f64;
    Ok((0..n).map(|i| i as f64 * max_alpha / last).collect())
}

/// Index of the grid point closest to `alpha`, first on ties
///
/// Returns `None` for an empty grid.
pub fn nearest_alpha_index(alphas: &[f64], alpha: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &candidate) in alphas.iter().enumerate() {
        let diff = (candidate - alpha).abs();
        match best {
            Some((_, min_diff)) if diff >= min_diff => {}
            _ => best = Some((i, diff)),
        }
    }
    best.map(|(i, _)| i)
}

/// Evaluate `f` at every grid point, keeping grid order
///
/// Grid points are independent, so with the `parallel` feature they are
/// spread across the rayon pool.
#[cfg(feature = "parallel")]
pub(crate) fn map_grid<T, F>(alphas: &[f64], f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(f64) -> Result<T> + Sync + Send,
{
    use rayon::prelude::*;
    alphas.par_iter().map(|&alpha| f(alpha)).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_grid<T, F>(alphas: &[f64], f: F) -> Result<Vec<T>>
where
    F: Fn(f64) -> Result<T>,
{
    alphas.iter().map(|&alpha| f(alpha)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_grid_quarter_rate() {
        let grid = alpha_grid(32, 250.0).unwrap();
        assert_eq!(grid.len(), 32);
        assert_eq!(grid[0], 0.0);
        assert!((grid[31] - 250.0).abs() < 1e-12);
        let step = 250.0 / 31.0;
        for (i, alpha) in grid.iter().enumerate() {
            assert!((alpha - i as f64 * step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_alpha_grid_single_point() {
        assert_eq!(alpha_grid(1, 500.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_alpha_grid_rejects_zero() {
        assert_eq!(
            alpha_grid(0, 500.0).unwrap_err(),
            AnalysisError::InvalidGridSize { name: "n_alpha", value: 0 }
        );
    }

    #[test]
    fn test_nearest_alpha_index() {
        let grid = [0.0, 10.0, 20.0, 30.0];
        assert_eq!(nearest_alpha_index(&grid, 0.0), Some(0));
        assert_eq!(nearest_alpha_index(&grid, 12.0), Some(1));
        assert_eq!(nearest_alpha_index(&grid, 17.0), Some(2));
        assert_eq!(nearest_alpha_index(&grid, 1000.0), Some(3));
        // Exactly between two points: the first one wins
        assert_eq!(nearest_alpha_index(&grid, 15.0), Some(1));
        assert_eq!(nearest_alpha_index(&[], 5.0), None);
    }

    #[test]
    fn test_map_grid_keeps_order() {
        let grid = alpha_grid(100, 99.0).unwrap();
        let doubled = map_grid(&grid, |alpha| Ok(alpha * 2.0)).unwrap();
        for (i, value) in doubled.iter().enumerate() {
            assert!((value - 2.0 * i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn test_map_grid_propagates_errors() {
        let grid = [0.0, 1.0, 2.0];
        let result: Result<Vec<f64>> = map_grid(&grid, |alpha| {
            if alpha > 1.5 {
                Err(AnalysisError::InvalidAlpha(alpha))
            } else {
                Ok(alpha)
            }
        });
        assert_eq!(result.unwrap_err(), AnalysisError::InvalidAlpha(2.0));
    }
}
