pub trait Matrix {
    fn get(&self, row: usize, col: usize) -> usize;
    fn shape(&self) -> (usize, usize);
}

/// Row-major cost matrix built one cell at a time.
pub struct VecMatrix {
    data: Vec<usize>,
    rows: usize,
    cols: usize,
}

impl VecMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        VecMatrix {
            data: Vec::with_capacity(rows * cols),
            rows,
            cols,
        }
    }

    pub fn push(&mut self, item: usize) {
        debug_assert!(self.data.len() < self.rows * self.cols);
        self.data.push(item);
    }
}

impl Matrix for VecMatrix {
    fn get(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

/// Minimum total cost of assigning every row to a distinct column.
///
/// Requires `rows <= cols`; surplus columns stay unassigned.
// Reference: Andrey Lopatin (https://cp-algorithms.com/graph/hungarian-algorithm.html).
pub fn hungarian_algorithm(a: &impl Matrix) -> usize {
    const INF: i64 = i64::MAX / 4;

    let (n, m) = a.shape();
    assert!(n <= m, "more rows ({}) than columns ({})", n, m);

    // 1-indexed arrays with dummy 0 element
    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; m + 1];
    let mut p = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![INF; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0;

            for j in 1..=m {
                if !used[j] {
                    let cur = a.get(i0 - 1, j - 1) as i64 - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;

            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;

            if j0 == 0 {
                break;
            }
        }
    }

    (-v[0]).max(0) as usize
}
