//! Three-axis PCA by power iteration with deflation.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use crate::error::{CoreError, Result};

pub const TARGET_DIMS: usize = 3;
pub const POWER_ITERATIONS: usize = 20;
/// Largest absolute coordinate after rescaling.
pub const VISUAL_EXTENT: f64 = 2.0;

const EPSILON: f64 = 1e-10;
// Fixed so the layout does not jump between refreshes of the same store.
const SEED: u64 = 0x5eed_c0de;

/// Reduce the rows of `data` (n × d) to n × 3 coordinates.
///
/// Rows are centered, three dominant directions are found by power iteration
/// on `Xᵀ X` with deflation after each axis, and the centered rows are
/// projected onto them. Coordinates are then scaled uniformly so the largest
/// absolute value is [`VISUAL_EXTENT`]. `cancel` is polled at every iteration.
pub fn project_3d(data: &Array2<f64>, cancel: &CancellationToken) -> Result<Array2<f64>> {
    let (n, d) = data.dim();
    if n == 0 || d == 0 {
        return Ok(Array2::zeros((n, TARGET_DIMS)));
    }

    let mean = data.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d));
    let centered = data - &mean;
    let mut residual = centered.clone();
    let mut axes = Array2::<f64>::zeros((TARGET_DIMS, d));
    let mut rng = StdRng::seed_from_u64(SEED);

    for k in 0..TARGET_DIMS {
        let mut v = Array1::from_shape_fn(d, |_| rng.gen_range(-1.0..1.0));
        normalize(&mut v);

        for _ in 0..POWER_ITERATIONS {
            if cancel.is_cancelled() {
                return Err(CoreError::Cancelled);
            }
            let xv = residual.dot(&v);
            v = residual.t().dot(&xv);
            normalize(&mut v);
        }

        // Deflate: remove each row's component along the recovered axis.
        let along = residual.dot(&v);
        for (mut row, p) in residual.rows_mut().into_iter().zip(along.iter()) {
            row.scaled_add(-*p, &v);
        }
        axes.row_mut(k).assign(&v);
    }

    let mut coords = centered.dot(&axes.t());
    let max_abs = coords.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
    if max_abs > EPSILON {
        let scale = VISUAL_EXTENT / max_abs;
        coords.mapv_inplace(|c| c * scale);
    }
    Ok(coords)
}

fn normalize(v: &mut Array1<f64>) {
    let norm = v.dot(v).sqrt().max(EPSILON);
    v.mapv_inplace(|x| x / norm);
}
