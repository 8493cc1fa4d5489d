//! Linear algebra utilities.
//!
//! Symmetric tridiagonal eigenvalues (implicit QL), dense LU solves,
//! small SVD and pseudoinverse for least-squares regression.

use ndarray::{Array1, Array2};
use uq_types::error::{UqError, UqResult};

const MAX_QL_SWEEPS: usize = 60;
const MAX_JACOBI_SWEEPS: usize = 100;

/// Eigenvalues of a symmetric tridiagonal matrix, ascending.
///
/// `diag` has length `n`, `offdiag` length `n - 1` (`offdiag[i]` couples rows
/// `i` and `i + 1`). Implicit QL with Wilkinson-style shifts.
pub fn tridiagonal_eigenvalues(diag: &[f64], offdiag: &[f64]) -> UqResult<Vec<f64>> {
    let n = diag.len();
    if n == 0 {
        return Err(UqError::LinAlg("empty tridiagonal matrix".to_string()));
    }
    if offdiag.len() + 1 != n {
        return Err(UqError::dimension_mismatch(
            "tridiagonal off-diagonal",
            n - 1,
            offdiag.len(),
        ));
    }
    let mut d = diag.to_vec();
    let mut e = offdiag.to_vec();
    e.push(0.0);

    for l in 0..n {
        let mut sweeps = 0;
        loop {
            let mut m = l;
            while m + 1 < n {
                let dd = d[m].abs() + d[m + 1].abs();
                if e[m].abs() <= f64::EPSILON * dd {
                    break;
                }
                m += 1;
            }
            if m == l {
                break;
            }
            sweeps += 1;
            if sweeps > MAX_QL_SWEEPS {
                return Err(UqError::LinAlg(format!(
                    "tridiagonal QL did not converge for eigenvalue {l}"
                )));
            }

            let mut g = (d[l + 1] - d[l]) / (2.0 * e[l]);
            let mut r = g.hypot(1.0);
            g = d[m] - d[l] + e[l] / (g + r.copysign(g));
            let (mut s, mut c, mut p) = (1.0, 1.0, 0.0);
            let mut deflated = false;
            let mut i = m;
            while i > l {
                i -= 1;
                let f = s * e[i];
                let b = c * e[i];
                r = f.hypot(g);
                e[i + 1] = r;
                if r == 0.0 {
                    d[i + 1] -= p;
                    e[m] = 0.0;
                    deflated = true;
                    break;
                }
                s = f / r;
                c = g / r;
                g = d[i + 1] - p;
                r = (d[i] - g) * s + 2.0 * c * b;
                p = s * r;
                d[i + 1] = g + p;
                g = c * r - b;
            }
            if deflated {
                continue;
            }
            d[l] -= p;
            e[l] = g;
            e[m] = 0.0;
        }
    }

    d.sort_by(|a, b| a.total_cmp(b));
    Ok(d)
}

/// Solve the dense system `A x = b` by LU with partial pivoting.
pub fn solve_dense(a: &Array2<f64>, b: &Array1<f64>) -> UqResult<Array1<f64>> {
    let (n, ncols) = a.dim();
    if n != ncols {
        return Err(UqError::dimension_mismatch("square system", n, ncols));
    }
    if b.len() != n {
        return Err(UqError::dimension_mismatch("right-hand side", n, b.len()));
    }
    let mut lu = a.clone();
    let mut x = b.clone();
    let scale = a.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return Err(UqError::LinAlg("system matrix is zero".to_string()));
    }

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if lu[[row, col]].abs() > lu[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if lu[[pivot, col]].abs() <= 1e-14 * scale {
            return Err(UqError::LinAlg(format!(
                "singular system: pivot {col} is {:e}",
                lu[[pivot, col]]
            )));
        }
        if pivot != col {
            for k in 0..n {
                lu.swap([col, k], [pivot, k]);
            }
            x.swap(col, pivot);
        }
        let inv = 1.0 / lu[[col, col]];
        for row in (col + 1)..n {
            let factor = lu[[row, col]] * inv;
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                lu[[row, k]] -= factor * lu[[col, k]];
            }
            x[row] -= factor * x[col];
        }
    }

    for row in (0..n).rev() {
        let mut acc = x[row];
        for k in (row + 1)..n {
            acc -= lu[[row, k]] * x[k];
        }
        x[row] = acc / lu[[row, row]];
    }
    Ok(x)
}

/// Cyclic Jacobi eigen-decomposition of a symmetric matrix.
/// Returns the eigenvalues (unsorted) and eigenvectors as columns.
fn symmetric_eigen(mut s: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = s.nrows();
    let mut v = Array2::eye(n);
    let scale = s.iter().map(|x| x.abs()).sum::<f64>();

    for _ in 0..MAX_JACOBI_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| s[[i, j]].abs())
            .sum();
        if off <= 1e-15 * scale {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let spq = s[[p, q]];
                if spq.abs() < 1e-300 {
                    continue;
                }
                let tau = (s[[q, q]] - s[[p, p]]) / (2.0 * spq);
                let t = tau.signum() / (tau.abs() + (1.0 + tau * tau).sqrt());
                let c = 1.0 / (1.0 + t * t).sqrt();
                let sn = t * c;

                for k in 0..n {
                    let skp = s[[k, p]];
                    let skq = s[[k, q]];
                    s[[k, p]] = c * skp - sn * skq;
                    s[[k, q]] = sn * skp + c * skq;
                }
                for k in 0..n {
                    let spk = s[[p, k]];
                    let sqk = s[[q, k]];
                    s[[p, k]] = c * spk - sn * sqk;
                    s[[q, k]] = sn * spk + c * sqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - sn * vkq;
                    v[[k, q]] = sn * vkp + c * vkq;
                }
            }
        }
    }

    (s.diag().to_owned(), v)
}

/// Thin SVD through the eigen-decomposition of `AᵀA`.
///
/// Returns `(U, sigma, Vt)` with `A ≈ U diag(sigma) Vt`, singular values
/// descending. Adequate for the modest design matrices of PC regression.
pub fn svd_small(a: &Array2<f64>) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
    let (m, n) = a.dim();
    let k = m.min(n);
    let ata = a.t().dot(a);
    let (eig, v) = symmetric_eigen(ata);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eig[j].total_cmp(&eig[i]));

    let mut sigma = Array1::zeros(k);
    let mut vt = Array2::zeros((k, n));
    for (row, &col) in order.iter().take(k).enumerate() {
        sigma[row] = eig[col].max(0.0).sqrt();
        vt.row_mut(row).assign(&v.column(col));
    }

    let av = a.dot(&vt.t());
    let mut u = Array2::zeros((m, k));
    for idx in 0..k {
        if sigma[idx] > 1e-14 {
            let inv = 1.0 / sigma[idx];
            u.column_mut(idx).assign(&av.column(idx).mapv(|x| x * inv));
        }
    }
    (u, sigma, vt)
}

/// Moore–Penrose pseudoinverse; singular values at or below
/// `rcond * sigma_max` are discarded.
pub fn pinv_svd(a: &Array2<f64>, rcond: f64) -> UqResult<Array2<f64>> {
    if a.is_empty() {
        return Err(UqError::LinAlg("pseudoinverse of an empty matrix".to_string()));
    }
    if !a.iter().all(|v| v.is_finite()) {
        return Err(UqError::LinAlg(
            "pseudoinverse input contains non-finite values".to_string(),
        ));
    }
    let (u, sigma, vt) = svd_small(a);
    let (m, n) = a.dim();
    let cutoff = rcond * sigma.iter().copied().fold(0.0, f64::max);

    let mut result = Array2::zeros((n, m));
    for idx in 0..sigma.len() {
        if sigma[idx] > cutoff && sigma[idx] > 0.0 {
            let inv = 1.0 / sigma[idx];
            for i in 0..n {
                let vi = vt[[idx, i]] * inv;
                for j in 0..m {
                    result[[i, j]] += vi * u[[j, idx]];
                }
            }
        }
    }
    Ok(result)
}
