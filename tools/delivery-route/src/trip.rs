//! Tour optimization for round trips from a fixed origin
//!
//! Builds a closed tour over a precomputed N×N distance matrix (index 0 is
//! the origin) with a nearest-neighbor greedy heuristic followed by 2-opt
//! local improvement. The result is heuristic, not guaranteed optimal.
//!
//! Tours are stored closed: `order[0] == order[n] == 0`.

/// Relative improvement a 2-opt move must beat to be applied
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Result of tour optimization
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    /// Point indices in visit order, starting and ending at the origin
    pub order: Vec<usize>,
    /// Sum of matrix distances along `order`
    pub total_distance: f64,
    /// Length of the nearest-neighbor tour before 2-opt
    pub seed_distance: f64,
    /// Number of 2-opt passes executed
    pub passes: usize,
    /// Percentage improvement from 2-opt over the greedy tour
    pub improvement_pct: f64,
}

/// Default 2-opt pass cap for `n` points
pub fn default_pass_cap(n: usize) -> usize {
    n.saturating_mul(n).max(1)
}

/// Solve the round trip over `matrix`, a flat row-major N×N matrix where
/// `matrix[i * n + j]` is the distance from point i to j. All entries must be
/// finite.
///
/// `max_passes` caps the number of full 2-opt passes (default `n²`).
pub fn solve_tour(matrix: &[f64], n: usize, max_passes: Option<usize>) -> Tour {
    // Trivial cases
    if n == 0 {
        return Tour {
            order: vec![],
            total_distance: 0.0,
            seed_distance: 0.0,
            passes: 0,
            improvement_pct: 0.0,
        };
    }
    if n <= 2 {
        let order: Vec<usize> = if n == 1 { vec![0, 0] } else { vec![0, 1, 0] };
        let total = tour_length(matrix, n, &order);
        return Tour {
            order,
            total_distance: total,
            seed_distance: total,
            passes: 0,
            improvement_pct: 0.0,
        };
    }

    let seed = nearest_neighbor(matrix, n);
    let seed_distance = tour_length(matrix, n, &seed);

    let cap = max_passes.unwrap_or_else(|| default_pass_cap(n)).max(1);
    let (order, passes) = two_opt(matrix, n, seed, seed_distance, cap);
    let total_distance = tour_length(matrix, n, &order);

    let improvement_pct = if seed_distance > 0.0 {
        (1.0 - total_distance / seed_distance) * 100.0
    } else {
        0.0
    };

    tracing::debug!(
        points = n,
        passes,
        seed_distance,
        total_distance,
        improvement_pct,
        "tour optimized"
    );

    Tour {
        order,
        total_distance,
        seed_distance,
        passes,
        improvement_pct,
    }
}

#[inline]
fn dist(matrix: &[f64], n: usize, i: usize, j: usize) -> f64 {
    matrix[i * n + j]
}

/// Nearest-neighbor greedy tour from the origin, closed back to it.
/// Ties go to the lowest point index.
pub fn nearest_neighbor(matrix: &[f64], n: usize) -> Vec<usize> {
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n + 1);

    let mut current = 0;
    visited[current] = true;
    order.push(current);

    for _ in 1..n {
        let mut best_next = usize::MAX;
        let mut best_dist = f64::INFINITY;

        for j in 0..n {
            if !visited[j] {
                let d = dist(matrix, n, current, j);
                if best_next == usize::MAX || d < best_dist {
                    best_dist = d;
                    best_next = j;
                }
            }
        }

        visited[best_next] = true;
        order.push(best_next);
        current = best_next;
    }

    order.push(0);
    order
}

/// Total length of a tour given as a sequence of point indices
pub fn tour_length(matrix: &[f64], n: usize, order: &[usize]) -> f64 {
    order
        .windows(2)
        .map(|w| dist(matrix, n, w[0], w[1]))
        .sum()
}

fn is_symmetric(matrix: &[f64], n: usize) -> bool {
    (0..n).all(|i| (i + 1..n).all(|j| dist(matrix, n, i, j) == dist(matrix, n, j, i)))
}

/// Change in tour length from reversing `order[i+1..=j]`.
///
/// With an asymmetric matrix the edges inside the segment flip direction,
/// so their cost has to be re-summed.
fn reversal_delta(matrix: &[f64], n: usize, order: &[usize], i: usize, j: usize, symmetric: bool) -> f64 {
    let a = order[i];
    let b = order[i + 1];
    let c = order[j];
    let e = order[j + 1];

    let mut delta = dist(matrix, n, a, c) + dist(matrix, n, b, e)
        - dist(matrix, n, a, b)
        - dist(matrix, n, c, e);

    if !symmetric {
        for k in i + 1..j {
            let (u, v) = (order[k], order[k + 1]);
            delta += dist(matrix, n, v, u) - dist(matrix, n, u, v);
        }
    }

    delta
}

/// 2-opt over a closed tour with both ends pinned to the origin.
///
/// Every pass scans edge pairs `(i, j)`, `j >= i + 2`, in ascending order and
/// applies each improving reversal immediately. Stops after a pass with no
/// improvement or after `max_passes`. Returns the tour and passes executed.
fn two_opt(
    matrix: &[f64],
    n: usize,
    mut order: Vec<usize>,
    mut current: f64,
    max_passes: usize,
) -> (Vec<usize>, usize) {
    // order has n + 1 entries and n edges
    let edges = order.len() - 1;
    if edges < 3 {
        return (order, 0);
    }

    let symmetric = is_symmetric(matrix, n);
    let mut passes = 0;

    loop {
        let mut improved = false;
        passes += 1;

        for i in 0..edges - 2 {
            for j in i + 2..edges {
                // First and last edge meet at the origin
                if i == 0 && j == edges - 1 {
                    continue;
                }

                let delta = reversal_delta(matrix, n, &order, i, j, symmetric);
                if delta < -IMPROVEMENT_EPS * current.abs().max(1.0) {
                    order[i + 1..=j].reverse();
                    current += delta;
                    improved = true;
                }
            }
        }

        tracing::trace!(pass = passes, length = current, improved, "2-opt pass");

        if !improved || passes >= max_passes {
            break;
        }
    }

    (order, passes)
}
