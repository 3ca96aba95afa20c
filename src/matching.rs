use nalgebra::DMatrix;
use pathfinding::kuhn_munkres::kuhn_munkres;
use pathfinding::matrix::Matrix;

const SCORE_I64_MULT: f64 = 1_000_000.0;

/// Maximum-weight bipartite matching over a dense score matrix. Returns
/// (row, column) pairs, deterministically for a given input. Every row (or
/// every column when rows outnumber columns) receives an assignment,
/// including zero-weight ones; callers filter those out against their own
/// threshold.
pub fn max_weight_matching(scores: &DMatrix<f64>) -> Vec<(usize, usize)> {
    let (rows, cols) = scores.shape();
    if rows == 0 || cols == 0 {
        return Vec::new();
    }

    // kuhn_munkres wants rows <= columns
    let transposed = rows > cols;
    let (r, c) = if transposed { (cols, rows) } else { (rows, cols) };

    let mut weights = Matrix::new(r, c, 0i64);
    for i in 0..r {
        for j in 0..c {
            let score = if transposed {
                scores[(j, i)]
            } else {
                scores[(i, j)]
            };
            *weights.get_mut((i, j)).unwrap() = (score * SCORE_I64_MULT) as i64;
        }
    }

    let (_, assignment) = kuhn_munkres(&weights);
    assignment
        .into_iter()
        .enumerate()
        .map(|(i, j)| if transposed { (j, i) } else { (i, j) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::max_weight_matching;
    use nalgebra::DMatrix;

    #[test]
    fn picks_max_weight() {
        let scores = DMatrix::from_row_slice(2, 2, &[0.9, 0.1, 0.2, 0.8]);
        let mut matches = max_weight_matching(&scores);
        matches.sort_unstable();
        assert_eq!(matches, vec![(0, 0), (1, 1)]);

        // greedy would take (0, 0); optimal is the cross assignment
        let scores = DMatrix::from_row_slice(2, 2, &[0.6, 0.5, 0.5, 0.0]);
        let mut matches = max_weight_matching(&scores);
        matches.sort_unstable();
        assert_eq!(matches, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn more_rows_than_columns() {
        let scores = DMatrix::from_row_slice(3, 1, &[0.1, 0.9, 0.3]);
        let matches = max_weight_matching(&scores);
        assert_eq!(matches, vec![(1, 0)]);
    }

    #[test]
    fn empty_inputs() {
        assert!(max_weight_matching(&DMatrix::<f64>::zeros(0, 3)).is_empty());
        assert!(max_weight_matching(&DMatrix::<f64>::zeros(3, 0)).is_empty());
    }

    #[test]
    fn deterministic() {
        let scores = DMatrix::from_row_slice(3, 3, &[0.5, 0.5, 0.1, 0.5, 0.5, 0.2, 0.1, 0.2, 0.9]);
        let a = max_weight_matching(&scores);
        let b = max_weight_matching(&scores);
        assert_eq!(a, b);
    }
}
