//! Fractal Brownian motion particle walks
//!
//! A particle is a sequence of unit displacement steps whose
//! correlation is controlled by the Hurst exponent `H`. Raw uncorrelated
//! steps are drawn per axis, then transformed through the fBM covariance
//! identity over consecutive values. The resulting walk carves winding
//! tunnels that read far more naturally than white noise.

use glam::IVec3;
use rand::Rng;

use crate::error::{CaveError, Result};
use crate::grid::VoxelGrid;

/// A generated particle walk
///
/// Holds the displacement sequence only; call
/// [`materialize`](Particle::materialize) to place it in a grid.
#[derive(Debug, Clone)]
pub struct Particle {
    steps: Vec<IVec3>,
}

impl Particle {
    /// The displacement steps, each axis in {-1, 0, 1}
    pub fn steps(&self) -> &[IVec3] {
        &self.steps
    }

    /// Place the walk in a grid as absolute coordinates
    ///
    /// Picks a uniformly random start strictly inside a margin of
    /// `edge_margin` cells from every face, then integrates each step
    /// scaled by `step_length`. The returned path starts at the start
    /// point and has one point per step. Points may leave the grid;
    /// carving handles that (see [`carve_path`]).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the margin leaves no interior cell.
    pub fn materialize<R: Rng>(
        &self,
        grid: &VoxelGrid,
        step_length: i32,
        edge_margin: i32,
        rng: &mut R,
    ) -> Result<Vec<IVec3>> {
        let dims = grid.dimensions();
        if edge_margin < 0
            || 2 * edge_margin >= dims.x
            || 2 * edge_margin >= dims.y
            || 2 * edge_margin >= dims.z
        {
            return Err(CaveError::InvalidInput(format!(
                "edge margin {} leaves no interior in a {}x{}x{} grid",
                edge_margin, dims.x, dims.y, dims.z
            )));
        }

        let start = IVec3::new(
            rng.gen_range(edge_margin..dims.x - edge_margin),
            rng.gen_range(edge_margin..dims.y - edge_margin),
            rng.gen_range(edge_margin..dims.z - edge_margin),
        );

        let mut path = Vec::with_capacity(self.steps.len() + 1);
        path.push(start);
        let mut current = start;
        for step in &self.steps {
            current += *step * step_length;
            path.push(current);
        }
        Ok(path)
    }
}

/// Generate a particle of exactly `length` displacement steps
///
/// Each axis draws `length` raw steps uniformly from {-1, 0, 1} and runs
/// them through the fBM transform; the three axis sequences are then
/// zipped into displacement steps. Steps matching the degenerate filter
/// are dropped and the shortfall regenerated until the walk is full.
///
/// The filter drops a step when all three axes are zero, or when x and z
/// are zero with y at plus or minus one. The extra y-only case
/// suppresses purely vertical wandering, so walks spread laterally
/// instead of drilling straight shafts.
///
/// # Errors
///
/// Returns `InvalidInput` unless `0 < hurst <= 1`.
pub fn generate_particle<R: Rng>(length: usize, hurst: f32, rng: &mut R) -> Result<Particle> {
    if !(hurst > 0.0 && hurst <= 1.0) {
        return Err(CaveError::InvalidInput(format!(
            "Hurst exponent must be in (0, 1] (got {})",
            hurst
        )));
    }

    let mut steps = Vec::with_capacity(length);
    while steps.len() < length {
        let remaining = length - steps.len();
        let xs = fbm_axis(&raw_axis(remaining, rng), hurst);
        let ys = fbm_axis(&raw_axis(remaining, rng), hurst);
        let zs = fbm_axis(&raw_axis(remaining, rng), hurst);

        for i in 0..remaining {
            let step = IVec3::new(xs[i], ys[i], zs[i]);
            if is_degenerate(step) {
                continue;
            }
            steps.push(step);
        }
    }

    Ok(Particle { steps })
}

/// Uncorrelated raw walk, each value uniform in {-1, 0, 1}
fn raw_axis<R: Rng>(length: usize, rng: &mut R) -> Vec<i32> {
    (0..length).map(|_| rng.gen_range(-1..=1)).collect()
}

/// Correlate a raw axis walk with the fBM covariance identity
///
/// The first value passes through unchanged; every later value is the
/// covariance of the current and previous raw values.
fn fbm_axis(raw: &[i32], hurst: f32) -> Vec<i32> {
    let mut out = Vec::with_capacity(raw.len());
    let Some(&first) = raw.first() else {
        return out;
    };
    out.push(first);
    for pair in raw.windows(2) {
        out.push(fbm_step(pair[1] as f32, pair[0] as f32, hurst));
    }
    out
}

/// fBM covariance of two consecutive raw values
///
/// Bases are offset by +1 to stay non-negative under fractional
/// exponents, shifted back afterwards, and clamped so every step remains
/// a unit step.
fn fbm_step(t: f32, s: f32, hurst: f32) -> i32 {
    let e = 2.0 * hurst;
    let value = 0.5 * ((t + 1.0).powf(e) + (s + 1.0).powf(e) - (t - s).abs().powf(e)) - 1.0;
    value.clamp(-1.0, 1.0).round() as i32
}

/// The degenerate-step filter
fn is_degenerate(step: IVec3) -> bool {
    (step.x == 0 && step.y == 0 && step.z == 0)
        || (step.x == 0 && step.z == 0 && (step.y == 1 || step.y == -1))
}

/// Carve a materialized path into the grid
///
/// Stamps a sphere at every path point in order. The first point that
/// falls outside the grid ends carving for the whole path; the walk has
/// left the level and whatever remains would land out of bounds anyway.
pub fn carve_path<R: Rng>(
    grid: &mut VoxelGrid,
    path: &[IVec3],
    radius: i32,
    carve_percent: u32,
    rng: &mut R,
) {
    for &point in path {
        if !grid.in_bounds(point) {
            log::debug!("particle path left the grid at {}; carving stopped", point);
            return;
        }
        grid.stamp_sphere(point, radius, carve_percent, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_zero_hurst_is_invalid() {
        assert!(generate_particle(10, 0.0, &mut test_rng()).is_err());
        assert!(generate_particle(10, -0.5, &mut test_rng()).is_err());
        assert!(generate_particle(10, 1.5, &mut test_rng()).is_err());
    }

    #[test]
    fn test_exact_length() {
        for length in [1, 5, 64, 200] {
            let particle = generate_particle(length, 0.8, &mut test_rng()).unwrap();
            assert_eq!(particle.steps().len(), length);
        }
    }

    #[test]
    fn test_steps_are_unit_bounded() {
        let particle = generate_particle(500, 0.3, &mut test_rng()).unwrap();
        for step in particle.steps() {
            assert!((-1..=1).contains(&step.x));
            assert!((-1..=1).contains(&step.y));
            assert!((-1..=1).contains(&step.z));
        }
    }

    #[test]
    fn test_degenerate_steps_filtered() {
        let particle = generate_particle(500, 0.7, &mut test_rng()).unwrap();
        for step in particle.steps() {
            // Both filter cases collapse to "x and z simultaneously zero"
            // for unit-bounded steps
            assert!(!(step.x == 0 && step.z == 0), "degenerate step {} kept", step);
        }
    }

    #[test]
    fn test_fbm_step_known_values() {
        // Identical consecutive values keep their sign
        assert_eq!(fbm_step(1.0, 1.0, 0.5), 1);
        assert_eq!(fbm_step(0.0, 0.0, 0.5), 0);
        assert_eq!(fbm_step(-1.0, -1.0, 0.5), -1);
        // Opposite values cancel to the floor
        assert_eq!(fbm_step(-1.0, 1.0, 0.5), -1);
    }

    #[test]
    fn test_determinism() {
        let a = generate_particle(100, 0.6, &mut test_rng()).unwrap();
        let b = generate_particle(100, 0.6, &mut test_rng()).unwrap();
        assert_eq!(a.steps(), b.steps());
    }

    #[test]
    fn test_materialize_starts_inside_margin() {
        let grid = VoxelGrid::new(20, 20, 20, 2).unwrap();
        let particle = generate_particle(30, 0.8, &mut test_rng()).unwrap();

        for trial in 0..10u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(trial);
            let path = particle.materialize(&grid, 1, 2, &mut rng).unwrap();
            assert_eq!(path.len(), 31);
            let start = path[0];
            assert!(grid.in_bounds(start));
            assert!(!grid.is_edge(start));
        }
    }

    #[test]
    fn test_materialize_step_scaling() {
        let grid = VoxelGrid::new(40, 40, 40, 1).unwrap();
        let particle = generate_particle(10, 0.9, &mut test_rng()).unwrap();
        let path = particle.materialize(&grid, 3, 1, &mut test_rng()).unwrap();

        for (i, pair) in path.windows(2).enumerate() {
            assert_eq!(pair[1] - pair[0], particle.steps()[i] * 3);
        }
    }

    #[test]
    fn test_materialize_rejects_wide_margin() {
        let grid = VoxelGrid::new(10, 10, 10, 1).unwrap();
        let particle = generate_particle(5, 0.5, &mut test_rng()).unwrap();
        assert!(particle.materialize(&grid, 1, 5, &mut test_rng()).is_err());
    }

    #[test]
    fn test_carve_path_opens_cells() {
        let mut grid = VoxelGrid::new(20, 20, 20, 1).unwrap();
        let mut rng = test_rng();
        grid.random_fill(100, &mut rng);

        let path = vec![IVec3::new(10, 10, 10), IVec3::new(12, 10, 10)];
        carve_path(&mut grid, &path, 1, 100, &mut rng);

        assert_eq!(grid.cell(IVec3::new(10, 10, 10)), Some(CellState::Open));
        assert_eq!(grid.cell(IVec3::new(12, 10, 10)), Some(CellState::Open));
    }

    #[test]
    fn test_carve_path_stops_out_of_bounds() {
        let mut grid = VoxelGrid::new(20, 20, 20, 1).unwrap();
        let mut rng = test_rng();
        grid.random_fill(100, &mut rng);

        // The second point is outside, so the third must not be carved
        let path = vec![
            IVec3::new(10, 10, 10),
            IVec3::new(10, 10, 40),
            IVec3::new(15, 15, 15),
        ];
        carve_path(&mut grid, &path, 0, 100, &mut rng);

        assert_eq!(grid.cell(IVec3::new(10, 10, 10)), Some(CellState::Open));
        assert_eq!(grid.cell(IVec3::new(15, 15, 15)), Some(CellState::Wall));
    }
}
