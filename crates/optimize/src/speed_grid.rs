//! Discrete speed grids shared by the LP and DP/RH transforms.

/// Evenly spaced grid of `count` speeds between `min` and `max` inclusive,
/// used by the static LP (one speed choice per segment).
pub fn linspace_grid(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![min];
    }
    let step = (max - min) / (count - 1) as f64;
    (0..count).map(|i| min + step * i as f64).collect()
}

/// Grid stepped by `granularity` knots starting at `min`, used by the
/// dynamic DP and rolling-horizon tiers.
pub fn granularity_grid(min: f64, max: f64, granularity: f64) -> Vec<f64> {
    let count = ((max - min) / granularity).round() as i64 + 1;
    (0..count.max(1)).map(|k| min + k as f64 * granularity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_covers_bounds() {
        let grid = linspace_grid(10.0, 15.0, 6);
        assert_eq!(grid.len(), 6);
        assert!((grid[0] - 10.0).abs() < 1e-9);
        assert!((grid[5] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn linspace_degenerate_single_choice() {
        let grid = linspace_grid(10.0, 15.0, 1);
        assert_eq!(grid, vec![10.0]);
    }

    #[test]
    fn granularity_grid_steps_evenly() {
        let grid = granularity_grid(8.0, 10.0, 0.5);
        assert_eq!(grid.len(), 5);
        assert!((grid[4] - 10.0).abs() < 1e-9);
    }
}
