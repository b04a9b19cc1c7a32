use num_traits::Float;

/// Numeric element type for the cell: single or double precision.
///
/// All gate formulas are precision-agnostic; the only per-precision code is
/// the dense matrix multiply, which dispatches to faer through this trait.
pub trait Element:
    Float + Send + Sync + std::fmt::Debug + std::fmt::Display + 'static
{
    fn from_f64(value: f64) -> Self;

    /// C = alpha * op(A) * op(B) + beta * C, row-major, op(A): m x k,
    /// op(B): k x n, C: m x n. A transposed operand is stored k x m
    /// (resp. n x k).
    fn gemm(
        trans_a: bool,
        trans_b: bool,
        m: usize,
        n: usize,
        k: usize,
        alpha: Self,
        a: &[Self],
        b: &[Self],
        beta: Self,
        c: &mut [Self],
    );
}

macro_rules! impl_element {
    ($t:ty) => {
        impl Element for $t {
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn gemm(
                trans_a: bool,
                trans_b: bool,
                m: usize,
                n: usize,
                k: usize,
                alpha: Self,
                a: &[Self],
                b: &[Self],
                beta: Self,
                c: &mut [Self],
            ) {
                debug_assert_eq!(a.len(), m * k);
                debug_assert_eq!(b.len(), k * n);
                debug_assert_eq!(c.len(), m * n);

                // A row-major p x q slice is the column-major view of its own
                // q x p transpose, so the two op() cases differ only in where
                // the .transpose() lands.
                let op_a = if trans_a {
                    faer::mat::from_column_major_slice::<$t>(a, m, k)
                } else {
                    faer::mat::from_column_major_slice::<$t>(a, k, m).transpose()
                };
                let op_b = if trans_b {
                    faer::mat::from_column_major_slice::<$t>(b, k, n)
                } else {
                    faer::mat::from_column_major_slice::<$t>(b, n, k).transpose()
                };

                let prod = op_a * op_b;

                if beta == 0.0 {
                    // The row-major m x n destination doubles as the
                    // column-major n x m view of its own transpose.
                    let mut c_mat =
                        faer::mat::from_column_major_slice_mut::<$t>(c, n, m);
                    c_mat.copy_from(prod.transpose());
                    if alpha != 1.0 {
                        for v in c.iter_mut() {
                            *v = *v * alpha;
                        }
                    }
                } else {
                    for i in 0..m {
                        for j in 0..n {
                            let idx = i * n + j;
                            c[idx] = alpha * prod.read(i, j) + beta * c[idx];
                        }
                    }
                }
            }
        }
    };
}

impl_element!(f32);
impl_element!(f64);
